//! JWK inference engine
//!
//! Derives the platform algorithm descriptor and permitted usage set needed
//! to hand a JWK to the provider's structured import. Pure and
//! deterministic: identical input always yields the identical result.

use tracing::warn;

use crate::{
    alg::{AesMode, EcCurve, HashAlg, KeyDescriptor, KeyUsage, PSS_SALT_LENGTH, RsaScheme},
    errors::{Error, Result},
    jwk::{JWK, Params},
};

/// Inference result: the descriptor and usages to import a JWK with
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub descriptor: KeyDescriptor,
    pub usages: Vec<KeyUsage>,
}

/// Infers the platform descriptor and usage set for a JWK
pub fn infer(jwk: &JWK) -> Result<Inference> {
    let usages = infer_usages(jwk);

    let descriptor = match &jwk.params {
        Params::EC(params) => KeyDescriptor::Ecdsa {
            curve: EcCurve::try_from(params.curve.as_str())?,
        },
        Params::OKP(params) => match params.curve.as_str() {
            "Ed25519" => KeyDescriptor::Ed25519,
            "X25519" => KeyDescriptor::X25519,
            other => return Err(Error::UnsupportedCurve(other.to_string())),
        },
        Params::RSA(_) => infer_rsa(jwk.alg.as_deref())?,
        Params::Oct(_) => infer_aes(jwk.alg.as_deref())?,
    };

    Ok(Inference { descriptor, usages })
}

/// `key_ops` wins when present; `use` is the coarse fallback
fn infer_usages(jwk: &JWK) -> Vec<KeyUsage> {
    if let Some(key_ops) = &jwk.key_ops {
        let mut usages = Vec::with_capacity(key_ops.len());
        for op in key_ops {
            match KeyUsage::from_name(op) {
                Some(usage) => usages.push(usage),
                // Lenient: keys in the wild carry experimental operation
                // names, and rejecting them would break round-trips
                None => warn!("Dropping unrecognized key_ops entry '{op}'"),
            }
        }
        usages
    } else if let Some(hint) = &jwk.public_key_use {
        match hint.as_str() {
            "sig" => vec![KeyUsage::Sign, KeyUsage::Verify],
            "enc" => vec![
                KeyUsage::Encrypt,
                KeyUsage::Decrypt,
                KeyUsage::WrapKey,
                KeyUsage::UnwrapKey,
            ],
            _ => Vec::new(),
        }
    } else {
        Vec::new()
    }
}

/// RSA `alg` values follow `(RS|PS)(1|256|384|512)`
fn infer_rsa(alg: Option<&str>) -> Result<KeyDescriptor> {
    let Some(alg) = alg else {
        return Err(Error::MissingAlgorithmHint("RSA".into()));
    };

    let (scheme, suffix) = if let Some(suffix) = alg.strip_prefix("RS") {
        (RsaScheme::Pkcs1v15, suffix)
    } else if let Some(suffix) = alg.strip_prefix("PS") {
        (
            RsaScheme::Pss {
                salt_length: PSS_SALT_LENGTH,
            },
            suffix,
        )
    } else {
        return Err(Error::UnsupportedAlgorithm(alg.to_string()));
    };

    let hash = match suffix {
        "1" => HashAlg::Sha1,
        "256" => HashAlg::Sha256,
        "384" => HashAlg::Sha384,
        "512" => HashAlg::Sha512,
        _ => return Err(Error::UnsupportedAlgorithm(alg.to_string())),
    };

    Ok(KeyDescriptor::Rsa { scheme, hash })
}

/// AES `alg` values follow `A(128|192|256)(GCM|CBC|CTR|KW)`
fn infer_aes(alg: Option<&str>) -> Result<KeyDescriptor> {
    let Some(alg) = alg else {
        return Err(Error::MissingAlgorithmHint("oct".into()));
    };
    let Some(rest) = alg.strip_prefix('A') else {
        return Err(Error::UnsupportedAlgorithm(alg.to_string()));
    };

    let (length, mode) = if let Some(mode) = rest.strip_prefix("128") {
        (128, mode)
    } else if let Some(mode) = rest.strip_prefix("192") {
        (192, mode)
    } else if let Some(mode) = rest.strip_prefix("256") {
        (256, mode)
    } else {
        return Err(Error::UnsupportedAlgorithm(alg.to_string()));
    };

    let mode = match mode {
        "GCM" => AesMode::Gcm,
        "CBC" => AesMode::Cbc,
        "CTR" => AesMode::Ctr,
        "KW" => AesMode::Kw,
        _ => return Err(Error::UnsupportedAlgorithm(alg.to_string())),
    };

    Ok(KeyDescriptor::Aes { mode, length })
}
