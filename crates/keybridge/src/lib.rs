/*!
 * # Keybridge
 *
 * Key-material translation between JWK, raw fixed-width bytes and
 * hex/base64url text, layered over a pluggable [`CryptoProvider`] that
 * performs the actual cryptography.
 *
 * The crate never touches a primitive on the hot path. Imports funnel raw
 * and text material into JWKs, infer the provider descriptor and usage set,
 * and hand the result to the provider's structured import. Exports pull a
 * JWK back out and unpack it into the requested wire form, with a PKCS#8
 * fallback for providers that can't express X25519 private keys as JWK.
 *
 * The `soft-provider` feature (on by default) ships [`SoftProvider`], an
 * in-memory RustCrypto-backed provider used in tests and on hosts without
 * a platform keystore.
 */

pub mod alg;
pub mod errors;
pub mod export;
pub mod import;
pub mod infer;
pub mod jwk;
pub mod keys;
pub mod pkcs8;
pub mod provider;
pub mod raw;

#[cfg(feature = "soft-provider")]
pub mod soft;

pub use alg::{
    AesMode, CoordinateLengths, EcCurve, HashAlg, KeyAlgorithm, KeyDescriptor, KeyUsage,
    RsaScheme,
};
pub use errors::{Error, Result};
pub use export::{ExportedKey, ExportedKeyPair, KeyFormat, export_key, export_key_pair};
pub use import::{
    import_jwk, import_key_pair_raw, import_key_pair_text, import_raw, import_text,
};
pub use infer::{Inference, infer};
pub use jwk::{JWK, Params};
pub use keys::{aes_decrypt, aes_encrypt, derive_aes_key, generate_aes_key, generate_key_pair};
pub use provider::{
    CipherParams, CryptoProvider, GeneratedKey, KeyClass, KeyHandle, KeyPairHandle,
    ProviderFormat, ProviderKeyData,
};
pub use raw::RawKeyMaterial;

#[cfg(feature = "soft-provider")]
pub use soft::SoftProvider;

pub use keybridge_encoding::TextFormat;
