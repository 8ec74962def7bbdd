//! Export facade
//!
//! Produces the raw bytes, hex/base64url text or JWK form of a
//! provider-held key, dispatching on the key's algorithm descriptor.

use std::fmt;

use keybridge_encoding::{TextFormat, encode_text};

use crate::{
    alg::{KeyAlgorithm, KeyDescriptor},
    errors::{Error, Result},
    jwk::JWK,
    pkcs8,
    provider::{
        CryptoProvider, KeyClass, KeyHandle, KeyPairHandle, ProviderFormat, ProviderKeyData,
    },
    raw,
};

/// Key wire formats accepted and produced by the export facade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    Raw,
    Hex,
    Base64Url,
    Jwk,
}

impl KeyFormat {
    pub fn name(&self) -> &'static str {
        match self {
            KeyFormat::Raw => "raw",
            KeyFormat::Hex => "hex",
            KeyFormat::Base64Url => "base64url",
            KeyFormat::Jwk => "jwk",
        }
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A key exported in one of the supported wire formats
#[derive(Debug, Clone)]
pub enum ExportedKey {
    Raw(Vec<u8>),
    Text(String),
    Jwk(JWK),
}

impl ExportedKey {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ExportedKey::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExportedKey::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_jwk(&self) -> Option<&JWK> {
        match self {
            ExportedKey::Jwk(jwk) => Some(jwk),
            _ => None,
        }
    }
}

/// An exported private/public pair
#[derive(Debug, Clone)]
pub struct ExportedKeyPair {
    pub private_key: ExportedKey,
    pub public_key: ExportedKey,
}

/// Exports a single key in the requested format
///
/// ECDSA and OKP keys support all formats: a private key's raw form is its
/// scalar `d`, a public key's raw form is x‖y (EC) or x (OKP). RSA and AES
/// keys only leave the provider as JWK.
pub async fn export_key<P: CryptoProvider>(
    provider: &P,
    format: KeyFormat,
    key: &KeyHandle,
) -> Result<ExportedKey> {
    match key.descriptor {
        KeyDescriptor::Ed25519 => {
            export_asymmetric(provider, format, key, KeyAlgorithm::Ed25519).await
        }
        KeyDescriptor::Ecdsa { curve } => {
            export_asymmetric(provider, format, key, curve.algorithm()).await
        }
        KeyDescriptor::X25519 => export_x25519(provider, format, key).await,
        KeyDescriptor::Rsa { .. } | KeyDescriptor::Aes { .. } => {
            export_jwk_only(provider, format, key).await
        }
    }
}

/// Exports both halves of a pair, re-wrapped per key
pub async fn export_key_pair<P: CryptoProvider>(
    provider: &P,
    format: KeyFormat,
    pair: &KeyPairHandle,
) -> Result<ExportedKeyPair> {
    Ok(ExportedKeyPair {
        private_key: export_key(provider, format, &pair.private_key).await?,
        public_key: export_key(provider, format, &pair.public_key).await?,
    })
}

async fn export_provider_jwk<P: CryptoProvider>(provider: &P, key: &KeyHandle) -> Result<JWK> {
    match provider.export_key(ProviderFormat::Jwk, key).await? {
        ProviderKeyData::Jwk(jwk) => Ok(jwk),
        _ => Err(Error::Provider(
            "Provider returned non-JWK data for a JWK export".into(),
        )),
    }
}

async fn export_asymmetric<P: CryptoProvider>(
    provider: &P,
    format: KeyFormat,
    key: &KeyHandle,
    algorithm: KeyAlgorithm,
) -> Result<ExportedKey> {
    let jwk = export_provider_jwk(provider, key).await?;
    to_wire(format, key, algorithm, jwk)
}

async fn export_x25519<P: CryptoProvider>(
    provider: &P,
    format: KeyFormat,
    key: &KeyHandle,
) -> Result<ExportedKey> {
    match export_provider_jwk(provider, key).await {
        Ok(jwk) => to_wire(format, key, KeyAlgorithm::X25519, jwk),
        // Some providers can't express X25519 private keys as JWK. The raw
        // scalar is still reachable through their PKCS#8 export.
        Err(Error::NotImplemented(reason)) => {
            if format == KeyFormat::Jwk || key.class != KeyClass::Private {
                return Err(Error::NotImplemented(reason));
            }
            let der = match provider.export_key(ProviderFormat::Pkcs8, key).await? {
                ProviderKeyData::Pkcs8(der) => der,
                _ => {
                    return Err(Error::Provider(
                        "Provider returned non-PKCS#8 data for a PKCS#8 export".into(),
                    ));
                }
            };
            let scalar = pkcs8::extract_x25519_scalar(&der)?;
            Ok(wire_bytes(format, scalar.to_vec()))
        }
        Err(e) => Err(e),
    }
}

async fn export_jwk_only<P: CryptoProvider>(
    provider: &P,
    format: KeyFormat,
    key: &KeyHandle,
) -> Result<ExportedKey> {
    if format != KeyFormat::Jwk {
        return Err(Error::UnsupportedFormat {
            format: format.to_string(),
            algorithm: key.descriptor.name().to_string(),
        });
    }
    Ok(ExportedKey::Jwk(export_provider_jwk(provider, key).await?))
}

/// Converts a provider JWK into the requested wire form
fn to_wire(
    format: KeyFormat,
    key: &KeyHandle,
    algorithm: KeyAlgorithm,
    jwk: JWK,
) -> Result<ExportedKey> {
    if format == KeyFormat::Jwk {
        return Ok(ExportedKey::Jwk(jwk));
    }

    let material = raw::decode(algorithm, &jwk)?;
    let bytes = match key.class {
        KeyClass::Private => material
            .private_bytes()
            .ok_or_else(|| Error::Key("Private handle exported a JWK without 'd'".into()))?
            .to_vec(),
        _ => material.public_bytes().to_vec(),
    };
    Ok(wire_bytes(format, bytes))
}

fn wire_bytes(format: KeyFormat, bytes: Vec<u8>) -> ExportedKey {
    match format {
        KeyFormat::Raw | KeyFormat::Jwk => ExportedKey::Raw(bytes),
        KeyFormat::Hex => ExportedKey::Text(encode_text(TextFormat::Hex, &bytes)),
        KeyFormat::Base64Url => ExportedKey::Text(encode_text(TextFormat::Base64Url, &bytes)),
    }
}
