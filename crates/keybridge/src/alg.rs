//! Algorithm registry
//!
//! Single source of per-algorithm facts: platform descriptors, default key
//! usage sets and the fixed coordinate byte widths of the raw layouts.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::errors::{Error, Result};

/// RSA-PSS salt length in bytes
///
/// Fixed convention of this library; the value isn't recoverable from a
/// JWK's standard fields.
pub const PSS_SALT_LENGTH: u32 = 32;

/// Asymmetric algorithms with a raw fixed-width coordinate layout
///
/// `ES256`/`ES384`/`ES512` tags are aliases of the matching `P-*` curve and
/// parse to the same variant.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Zeroize)]
pub enum KeyAlgorithm {
    Ed25519,
    X25519,
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-384")]
    P384,
    #[serde(rename = "P-521")]
    P521,
}

impl TryFrom<&str> for KeyAlgorithm {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "Ed25519" => Ok(KeyAlgorithm::Ed25519),
            "X25519" => Ok(KeyAlgorithm::X25519),
            "P-256" | "ES256" => Ok(KeyAlgorithm::P256),
            "P-384" | "ES384" => Ok(KeyAlgorithm::P384),
            "P-521" | "ES512" => Ok(KeyAlgorithm::P521),
            _ => Err(Error::UnsupportedAlgorithm(value.to_string())),
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyAlgorithm::Ed25519 => write!(f, "Ed25519"),
            KeyAlgorithm::X25519 => write!(f, "X25519"),
            KeyAlgorithm::P256 => write!(f, "P-256"),
            KeyAlgorithm::P384 => write!(f, "P-384"),
            KeyAlgorithm::P521 => write!(f, "P-521"),
        }
    }
}

/// Fixed big-endian byte widths of an algorithm's raw layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateLengths {
    /// Concatenated x‖y for EC, single x coordinate for OKP
    pub public: usize,
    /// Private scalar
    pub private: usize,
}

impl KeyAlgorithm {
    /// Platform descriptor for this algorithm
    pub fn descriptor(&self) -> KeyDescriptor {
        match self {
            KeyAlgorithm::Ed25519 => KeyDescriptor::Ed25519,
            KeyAlgorithm::X25519 => KeyDescriptor::X25519,
            KeyAlgorithm::P256 => KeyDescriptor::Ecdsa {
                curve: EcCurve::P256,
            },
            KeyAlgorithm::P384 => KeyDescriptor::Ecdsa {
                curve: EcCurve::P384,
            },
            KeyAlgorithm::P521 => KeyDescriptor::Ecdsa {
                curve: EcCurve::P521,
            },
        }
    }

    /// Fixed coordinate byte widths
    pub fn coordinate_lengths(&self) -> CoordinateLengths {
        match self {
            KeyAlgorithm::Ed25519 | KeyAlgorithm::X25519 => CoordinateLengths {
                public: 32,
                private: 32,
            },
            KeyAlgorithm::P256 => CoordinateLengths {
                public: 64,
                private: 32,
            },
            KeyAlgorithm::P384 => CoordinateLengths {
                public: 96,
                private: 48,
            },
            KeyAlgorithm::P521 => CoordinateLengths {
                public: 132,
                private: 66,
            },
        }
    }

    /// Default usage set for a freshly generated key pair
    ///
    /// X25519 is the single agreement-only algorithm; it never signs or
    /// verifies.
    pub fn default_usages(&self) -> Vec<KeyUsage> {
        match self {
            KeyAlgorithm::X25519 => vec![KeyUsage::DeriveKey],
            _ => vec![KeyUsage::Sign, KeyUsage::Verify],
        }
    }

    /// Usages granted to the private half of a pair
    pub fn private_usages(&self) -> Vec<KeyUsage> {
        match self {
            KeyAlgorithm::X25519 => vec![KeyUsage::DeriveKey],
            _ => vec![KeyUsage::Sign],
        }
    }

    /// Usages granted to the public half of a pair (empty for X25519)
    pub fn public_usages(&self) -> Vec<KeyUsage> {
        match self {
            KeyAlgorithm::X25519 => Vec::new(),
            _ => vec![KeyUsage::Verify],
        }
    }

    /// True for the ECDSA curves (`EC` JWK wrapping); false for OKP
    pub fn is_ec(&self) -> bool {
        matches!(
            self,
            KeyAlgorithm::P256 | KeyAlgorithm::P384 | KeyAlgorithm::P521
        )
    }
}

/// Named ECDSA curves
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum EcCurve {
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-384")]
    P384,
    #[serde(rename = "P-521")]
    P521,
}

impl EcCurve {
    pub fn name(&self) -> &'static str {
        match self {
            EcCurve::P256 => "P-256",
            EcCurve::P384 => "P-384",
            EcCurve::P521 => "P-521",
        }
    }

    /// The raw-layout algorithm backing this curve
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            EcCurve::P256 => KeyAlgorithm::P256,
            EcCurve::P384 => KeyAlgorithm::P384,
            EcCurve::P521 => KeyAlgorithm::P521,
        }
    }
}

impl TryFrom<&str> for EcCurve {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "P-256" => Ok(EcCurve::P256),
            "P-384" => Ok(EcCurve::P384),
            "P-521" => Ok(EcCurve::P521),
            _ => Err(Error::UnsupportedCurve(value.to_string())),
        }
    }
}

/// Hash algorithms referenced by RSA descriptors and the digest call
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum HashAlg {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlg {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlg::Sha1 => "SHA-1",
            HashAlg::Sha256 => "SHA-256",
            HashAlg::Sha384 => "SHA-384",
            HashAlg::Sha512 => "SHA-512",
        }
    }
}

/// RSA signature schemes
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum RsaScheme {
    Pkcs1v15,
    Pss { salt_length: u32 },
}

/// AES block cipher modes
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum AesMode {
    Gcm,
    Cbc,
    Ctr,
    Kw,
}

impl AesMode {
    pub fn name(&self) -> &'static str {
        match self {
            AesMode::Gcm => "AES-GCM",
            AesMode::Cbc => "AES-CBC",
            AesMode::Ctr => "AES-CTR",
            AesMode::Kw => "AES-KW",
        }
    }

    /// Mode suffix as it appears in JWK `alg` values (`A256GCM` etc.)
    pub fn alg_suffix(&self) -> &'static str {
        match self {
            AesMode::Gcm => "GCM",
            AesMode::Cbc => "CBC",
            AesMode::Ctr => "CTR",
            AesMode::Kw => "KW",
        }
    }

    /// Default usage set for a freshly generated key of this mode
    pub fn default_usages(&self) -> Vec<KeyUsage> {
        match self {
            AesMode::Kw => vec![KeyUsage::WrapKey, KeyUsage::UnwrapKey],
            _ => vec![KeyUsage::Encrypt, KeyUsage::Decrypt],
        }
    }
}

/// Platform algorithm descriptor handed to the provider
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub enum KeyDescriptor {
    Ed25519,
    X25519,
    Ecdsa { curve: EcCurve },
    Rsa { scheme: RsaScheme, hash: HashAlg },
    Aes { mode: AesMode, length: u16 },
}

impl KeyDescriptor {
    /// WebCrypto-style algorithm name
    pub fn name(&self) -> &'static str {
        match self {
            KeyDescriptor::Ed25519 => "Ed25519",
            KeyDescriptor::X25519 => "X25519",
            KeyDescriptor::Ecdsa { .. } => "ECDSA",
            KeyDescriptor::Rsa {
                scheme: RsaScheme::Pkcs1v15,
                ..
            } => "RSASSA-PKCS1-v1_5",
            KeyDescriptor::Rsa {
                scheme: RsaScheme::Pss { .. },
                ..
            } => "RSA-PSS",
            KeyDescriptor::Aes { mode, .. } => mode.name(),
        }
    }

    /// The raw-layout algorithm behind this descriptor, if it has one
    ///
    /// RSA and AES keys have no raw coordinate layout.
    pub fn key_algorithm(&self) -> Option<KeyAlgorithm> {
        match self {
            KeyDescriptor::Ed25519 => Some(KeyAlgorithm::Ed25519),
            KeyDescriptor::X25519 => Some(KeyAlgorithm::X25519),
            KeyDescriptor::Ecdsa { curve } => Some(curve.algorithm()),
            _ => None,
        }
    }
}

/// Permitted key operations, in JWK `key_ops` naming
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum KeyUsage {
    Sign,
    Verify,
    Encrypt,
    Decrypt,
    WrapKey,
    UnwrapKey,
    DeriveKey,
    DeriveBits,
}

impl KeyUsage {
    /// Parses a `key_ops` entry; `None` for unrecognized names
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sign" => Some(KeyUsage::Sign),
            "verify" => Some(KeyUsage::Verify),
            "encrypt" => Some(KeyUsage::Encrypt),
            "decrypt" => Some(KeyUsage::Decrypt),
            "wrapKey" => Some(KeyUsage::WrapKey),
            "unwrapKey" => Some(KeyUsage::UnwrapKey),
            "deriveKey" => Some(KeyUsage::DeriveKey),
            "deriveBits" => Some(KeyUsage::DeriveBits),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KeyUsage::Sign => "sign",
            KeyUsage::Verify => "verify",
            KeyUsage::Encrypt => "encrypt",
            KeyUsage::Decrypt => "decrypt",
            KeyUsage::WrapKey => "wrapKey",
            KeyUsage::UnwrapKey => "unwrapKey",
            KeyUsage::DeriveKey => "deriveKey",
            KeyUsage::DeriveBits => "deriveBits",
        }
    }
}

impl fmt::Display for KeyUsage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
