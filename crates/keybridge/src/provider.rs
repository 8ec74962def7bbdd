//! Provider boundary
//!
//! The underlying cryptography provider performs the actual key generation,
//! structured import/export, digests and cipher operations; this layer only
//! prepares its inputs and consumes its outputs. Provider calls are async
//! and hold no state across them — callers may invoke them with unbounded
//! concurrency.

use serde::{Deserialize, Serialize};

use crate::{
    alg::{HashAlg, KeyDescriptor, KeyUsage},
    errors::Result,
    jwk::JWK,
};

/// Key handle class, mirroring the provider's view of the key
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeyClass {
    Secret,
    Private,
    Public,
}

/// Opaque provider-native key reference plus its metadata
///
/// Created by the provider and owned by the caller for the whole session.
/// This layer never mutates a handle; it only reads the metadata and passes
/// the handle back into provider calls.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyHandle {
    /// Provider-scoped opaque identifier
    pub id: u64,
    pub class: KeyClass,
    pub descriptor: KeyDescriptor,
    pub usages: Vec<KeyUsage>,
    pub extractable: bool,
}

/// A private/public key handle pair
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPairHandle {
    pub private_key: KeyHandle,
    pub public_key: KeyHandle,
}

/// Key data crossing the provider boundary
#[derive(Debug, Clone)]
pub enum ProviderKeyData {
    Jwk(JWK),
    Raw(Vec<u8>),
    Pkcs8(Vec<u8>),
}

/// Wire format selector for provider exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFormat {
    Jwk,
    Raw,
    Pkcs8,
}

/// Result of a provider key generation call
#[derive(Debug, Clone)]
pub enum GeneratedKey {
    Single(KeyHandle),
    Pair(KeyPairHandle),
}

/// Cipher parameters for provider encrypt/decrypt calls
#[derive(Debug, Clone, PartialEq)]
pub enum CipherParams {
    AesGcm { iv: Vec<u8> },
}

/// The underlying cryptography provider
///
/// Implementations perform real cryptography; keybridge itself never
/// touches a primitive. Errors must propagate unmodified in kind —
/// in particular a capability gap is `Error::NotImplemented`, which the
/// export facade relies on to select its X25519 PKCS#8 fallback.
#[allow(async_fn_in_trait)]
pub trait CryptoProvider {
    /// Generates a key (AES) or key pair (everything else)
    async fn generate_key(
        &self,
        descriptor: &KeyDescriptor,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<GeneratedKey>;

    /// Imports key data under the given descriptor and usage set
    async fn import_key(
        &self,
        data: ProviderKeyData,
        descriptor: &KeyDescriptor,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyHandle>;

    /// Exports a key in the requested provider format
    async fn export_key(&self, format: ProviderFormat, key: &KeyHandle) -> Result<ProviderKeyData>;

    /// One-shot digest
    async fn digest(&self, hash: HashAlg, data: &[u8]) -> Result<Vec<u8>>;

    async fn encrypt(
        &self,
        params: &CipherParams,
        key: &KeyHandle,
        data: &[u8],
    ) -> Result<Vec<u8>>;

    async fn decrypt(
        &self,
        params: &CipherParams,
        key: &KeyHandle,
        data: &[u8],
    ) -> Result<Vec<u8>>;
}
