//! In-process software provider
//!
//! A [`CryptoProvider`] backed by the pure-Rust RustCrypto stack, used for
//! tests and for hosts without a platform keystore. Keys live in memory as
//! JWKs behind opaque handles.
//!
//! Known gaps, surfaced as `NotImplemented`: RSA key generation, SHA-1
//! digests, PKCS#8 import and JWK export of X25519 private keys (those
//! leave via PKCS#8 instead).

use std::sync::atomic::{AtomicU64, Ordering};

use aes_gcm::{
    Aes128Gcm, Aes256Gcm, AesGcm, KeyInit,
    aead::{Aead, Nonce, consts::U12},
    aes::Aes192,
};

/// AES-GCM with a 192-bit key; `aes_gcm` exports no alias for it
type Aes192Gcm = AesGcm<Aes192, U12>;
use ahash::AHashMap;
use ed25519_dalek::VerifyingKey;
use p256::elliptic_curve::sec1::FromEncodedPoint;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256, Sha384, Sha512};
use tokio::sync::Mutex;

use crate::{
    alg::{AesMode, EcCurve, HashAlg, KeyAlgorithm, KeyDescriptor, KeyUsage},
    errors::{Error, Result},
    jwk::{JWK, OctParams, Params},
    pkcs8,
    provider::{
        CipherParams, CryptoProvider, GeneratedKey, KeyClass, KeyHandle, KeyPairHandle,
        ProviderFormat, ProviderKeyData,
    },
    raw::{self, RawKeyMaterial},
};

use keybridge_encoding::{decode_base64url, encode_base64url};

/// Software key store
#[derive(Default)]
pub struct SoftProvider {
    keys: Mutex<AHashMap<u64, JWK>>,
    next_id: AtomicU64,
}

impl SoftProvider {
    pub fn new() -> Self {
        Self::default()
    }

    async fn store(&self, jwk: JWK) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.keys.lock().await.insert(id, jwk);
        id
    }

    async fn fetch(&self, key: &KeyHandle) -> Result<JWK> {
        self.keys
            .lock()
            .await
            .get(&key.id)
            .cloned()
            .ok_or_else(|| Error::Key(format!("Unknown key handle {}", key.id)))
    }

    async fn store_pair(
        &self,
        algorithm: KeyAlgorithm,
        material: &RawKeyMaterial,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<GeneratedKey> {
        let private_jwk = raw::encode(algorithm, material)?;
        let public_jwk = private_jwk.to_public();
        let descriptor = algorithm.descriptor();

        let private_key = KeyHandle {
            id: self.store(private_jwk).await,
            class: KeyClass::Private,
            descriptor: descriptor.clone(),
            usages: intersect(usages, &algorithm.private_usages()),
            extractable,
        };
        let public_key = KeyHandle {
            id: self.store(public_jwk).await,
            class: KeyClass::Public,
            descriptor,
            usages: intersect(usages, &algorithm.public_usages()),
            extractable,
        };
        Ok(GeneratedKey::Pair(KeyPairHandle {
            private_key,
            public_key,
        }))
    }

    async fn secret_bytes(&self, key: &KeyHandle) -> Result<Vec<u8>> {
        match &self.fetch(key).await?.params {
            Params::Oct(OctParams { k: Some(k) }) => Ok(decode_base64url(k)?),
            _ => Err(Error::Key("Handle does not reference a secret key".into())),
        }
    }
}

fn intersect(requested: &[KeyUsage], allowed: &[KeyUsage]) -> Vec<KeyUsage> {
    requested
        .iter()
        .copied()
        .filter(|u| allowed.contains(u))
        .collect()
}

fn generate_ed25519() -> RawKeyMaterial {
    let signing_key = ed25519_dalek::SigningKey::generate(&mut OsRng);
    RawKeyMaterial::Private {
        public: signing_key.verifying_key().to_bytes().to_vec(),
        private: signing_key.to_bytes().to_vec(),
    }
}

fn generate_x25519() -> RawKeyMaterial {
    let secret = x25519_dalek::StaticSecret::random_from_rng(OsRng);
    RawKeyMaterial::Private {
        public: x25519_dalek::PublicKey::from(&secret).to_bytes().to_vec(),
        private: secret.to_bytes().to_vec(),
    }
}

macro_rules! generate_ecdsa {
    ($name:ident, $crate_:ident) => {
        fn $name() -> Result<RawKeyMaterial> {
            let signing_key = $crate_::ecdsa::SigningKey::random(&mut OsRng);
            // p521 0.13 gates `verifying_key()` behind a feature that does
            // not exist; `VerifyingKey::from` is its exact body.
            let point = $crate_::ecdsa::VerifyingKey::from(&signing_key).to_encoded_point(false);
            let (Some(x), Some(y)) = (point.x(), point.y()) else {
                return Err(Error::Provider("Generated a degenerate EC point".into()));
            };
            let mut public = x.to_vec();
            public.extend_from_slice(y);
            Ok(RawKeyMaterial::Private {
                public,
                private: signing_key.to_bytes().to_vec(),
            })
        }
    };
}

generate_ecdsa!(generate_p256, p256);
generate_ecdsa!(generate_p384, p384);
generate_ecdsa!(generate_p521, p521);

macro_rules! check_on_curve {
    ($name:ident, $crate_:ident) => {
        fn $name(sec1: &[u8]) -> Result<()> {
            let point = $crate_::EncodedPoint::from_bytes(sec1)
                .map_err(|e| Error::Key(format!("Invalid EC point encoding: {e}")))?;
            match $crate_::AffinePoint::from_encoded_point(&point).into_option() {
                Some(_) => Ok(()),
                None => Err(Error::Key("EC public key is not on the curve".into())),
            }
        }
    };
}

check_on_curve!(check_p256, p256);
check_on_curve!(check_p384, p384);
check_on_curve!(check_p521, p521);

/// Rejects public material the curve arithmetic would later choke on
fn validate_material(algorithm: KeyAlgorithm, material: &RawKeyMaterial) -> Result<()> {
    match algorithm {
        KeyAlgorithm::Ed25519 => {
            let bytes: [u8; 32] = material
                .public_bytes()
                .try_into()
                .map_err(|_| Error::Key("Ed25519 public key must be 32 bytes".into()))?;
            VerifyingKey::from_bytes(&bytes)
                .map_err(|e| Error::Key(format!("Invalid Ed25519 public key: {e}")))?;
            Ok(())
        }
        // Any 32-byte string is a valid X25519 public key
        KeyAlgorithm::X25519 => Ok(()),
        KeyAlgorithm::P256 | KeyAlgorithm::P384 | KeyAlgorithm::P521 => {
            let mut sec1 = Vec::with_capacity(1 + material.public_bytes().len());
            sec1.push(0x04);
            sec1.extend_from_slice(material.public_bytes());
            match algorithm {
                KeyAlgorithm::P256 => check_p256(&sec1),
                KeyAlgorithm::P384 => check_p384(&sec1),
                _ => check_p521(&sec1),
            }
        }
    }
}

fn aes_jwk(mode: AesMode, length: u16, k: &[u8], usages: &[KeyUsage]) -> JWK {
    JWK {
        key_id: None,
        alg: Some(format!("A{length}{}", mode.alg_suffix())),
        key_ops: Some(usages.iter().map(|u| u.name().to_string()).collect()),
        public_key_use: None,
        ext: None,
        params: Params::Oct(OctParams {
            k: Some(encode_base64url(k)),
        }),
    }
}

fn check_aes_key_len(length: u16, actual: usize) -> Result<()> {
    let expected = usize::from(length) / 8;
    if actual == expected {
        Ok(())
    } else {
        Err(Error::InvalidKeyLength { expected, actual })
    }
}

fn run_cipher<C>(key: &[u8], iv: &[u8], data: &[u8], encrypt: bool) -> Result<Vec<u8>>
where
    C: Aead + KeyInit,
{
    let cipher = C::new_from_slice(key)
        .map_err(|_| Error::Key("AES key length does not match the cipher".into()))?;
    let nonce = Nonce::<C>::from_slice(iv);
    if encrypt {
        cipher
            .encrypt(nonce, data)
            .map_err(|_| Error::Provider("AES-GCM encryption failed".into()))
    } else {
        cipher
            .decrypt(nonce, data)
            .map_err(|_| Error::Provider("AES-GCM decryption failed".into()))
    }
}

impl SoftProvider {
    async fn run_aes_gcm(
        &self,
        params: &CipherParams,
        key: &KeyHandle,
        data: &[u8],
        encrypt: bool,
    ) -> Result<Vec<u8>> {
        let KeyDescriptor::Aes {
            mode: AesMode::Gcm,
            length,
        } = key.descriptor
        else {
            return Err(Error::NotImplemented(format!(
                "Cipher operations for {}",
                key.descriptor.name()
            )));
        };
        let required = if encrypt {
            KeyUsage::Encrypt
        } else {
            KeyUsage::Decrypt
        };
        if !key.usages.contains(&required) {
            return Err(Error::Key(format!(
                "Key usages do not permit '{required}'"
            )));
        }

        let CipherParams::AesGcm { iv } = params;
        if iv.len() != 12 {
            return Err(Error::Key(format!(
                "AES-GCM IV must be 12 bytes, got {}",
                iv.len()
            )));
        }

        let k = self.secret_bytes(key).await?;
        check_aes_key_len(length, k.len())?;
        match length {
            128 => run_cipher::<Aes128Gcm>(&k, iv, data, encrypt),
            192 => run_cipher::<Aes192Gcm>(&k, iv, data, encrypt),
            _ => run_cipher::<Aes256Gcm>(&k, iv, data, encrypt),
        }
    }
}

impl CryptoProvider for SoftProvider {
    async fn generate_key(
        &self,
        descriptor: &KeyDescriptor,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<GeneratedKey> {
        match descriptor {
            KeyDescriptor::Ed25519 => {
                self.store_pair(KeyAlgorithm::Ed25519, &generate_ed25519(), extractable, usages)
                    .await
            }
            KeyDescriptor::X25519 => {
                self.store_pair(KeyAlgorithm::X25519, &generate_x25519(), extractable, usages)
                    .await
            }
            KeyDescriptor::Ecdsa { curve } => {
                let material = match curve {
                    EcCurve::P256 => generate_p256()?,
                    EcCurve::P384 => generate_p384()?,
                    EcCurve::P521 => generate_p521()?,
                };
                self.store_pair(curve.algorithm(), &material, extractable, usages)
                    .await
            }
            KeyDescriptor::Aes { mode, length } => {
                if !matches!(*length, 128 | 192 | 256) {
                    return Err(Error::Key(format!("Invalid AES key length {length}")));
                }
                let mut k = vec![0u8; usize::from(*length) / 8];
                OsRng.fill_bytes(&mut k);
                let jwk = aes_jwk(*mode, *length, &k, usages);
                Ok(GeneratedKey::Single(KeyHandle {
                    id: self.store(jwk).await,
                    class: KeyClass::Secret,
                    descriptor: descriptor.clone(),
                    usages: usages.to_vec(),
                    extractable,
                }))
            }
            KeyDescriptor::Rsa { .. } => {
                Err(Error::NotImplemented("RSA key generation".into()))
            }
        }
    }

    async fn import_key(
        &self,
        data: ProviderKeyData,
        descriptor: &KeyDescriptor,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyHandle> {
        let (jwk, class) = match data {
            ProviderKeyData::Jwk(jwk) => match descriptor {
                KeyDescriptor::Ed25519 | KeyDescriptor::X25519 | KeyDescriptor::Ecdsa { .. } => {
                    // key_algorithm() is total over these three descriptors
                    let Some(algorithm) = descriptor.key_algorithm() else {
                        return Err(Error::Key("Descriptor has no raw layout".into()));
                    };
                    let material = raw::decode(algorithm, &jwk)?;
                    validate_material(algorithm, &material)?;
                    let class = if material.is_private() {
                        KeyClass::Private
                    } else {
                        KeyClass::Public
                    };
                    (jwk, class)
                }
                KeyDescriptor::Rsa { .. } => {
                    let Params::RSA(params) = &jwk.params else {
                        return Err(Error::Key("RSA descriptor requires an RSA JWK".into()));
                    };
                    let class = if params.d.is_some() {
                        KeyClass::Private
                    } else {
                        KeyClass::Public
                    };
                    (jwk, class)
                }
                KeyDescriptor::Aes { length, .. } => {
                    let Params::Oct(OctParams { k: Some(k) }) = &jwk.params else {
                        return Err(Error::Key("oct JWK is missing 'k'".into()));
                    };
                    let k = decode_base64url(k)?;
                    check_aes_key_len(*length, k.len())?;
                    (jwk, KeyClass::Secret)
                }
            },
            ProviderKeyData::Raw(bytes) => {
                let KeyDescriptor::Aes { mode, length } = descriptor else {
                    return Err(Error::NotImplemented(format!(
                        "Raw import for {}",
                        descriptor.name()
                    )));
                };
                check_aes_key_len(*length, bytes.len())?;
                (aes_jwk(*mode, *length, &bytes, usages), KeyClass::Secret)
            }
            ProviderKeyData::Pkcs8(_) => {
                return Err(Error::NotImplemented("PKCS#8 import".into()));
            }
        };

        Ok(KeyHandle {
            id: self.store(jwk).await,
            class,
            descriptor: descriptor.clone(),
            usages: usages.to_vec(),
            extractable,
        })
    }

    async fn export_key(&self, format: ProviderFormat, key: &KeyHandle) -> Result<ProviderKeyData> {
        if !key.extractable {
            return Err(Error::Key("Key is not extractable".into()));
        }
        match format {
            ProviderFormat::Jwk => {
                if key.descriptor == KeyDescriptor::X25519 && key.class == KeyClass::Private {
                    return Err(Error::NotImplemented(
                        "JWK export of X25519 private keys".into(),
                    ));
                }
                let jwk = self.fetch(key).await?;
                if key.class == KeyClass::Public {
                    Ok(ProviderKeyData::Jwk(jwk.to_public()))
                } else {
                    Ok(ProviderKeyData::Jwk(jwk))
                }
            }
            ProviderFormat::Pkcs8 => {
                if key.descriptor != KeyDescriptor::X25519 || key.class != KeyClass::Private {
                    return Err(Error::NotImplemented(format!(
                        "PKCS#8 export for {}",
                        key.descriptor.name()
                    )));
                }
                let jwk = self.fetch(key).await?;
                let material = raw::decode(KeyAlgorithm::X25519, &jwk)?;
                let Some(private) = material.private_bytes() else {
                    return Err(Error::Key("Private handle holds no private scalar".into()));
                };
                let scalar: [u8; 32] = private
                    .try_into()
                    .map_err(|_| Error::Key("X25519 scalar must be 32 bytes".into()))?;
                Ok(ProviderKeyData::Pkcs8(pkcs8::wrap_x25519_scalar(&scalar)))
            }
            ProviderFormat::Raw => Ok(ProviderKeyData::Raw(self.secret_bytes(key).await?)),
        }
    }

    async fn digest(&self, hash: HashAlg, data: &[u8]) -> Result<Vec<u8>> {
        match hash {
            HashAlg::Sha1 => Err(Error::NotImplemented("SHA-1 digests".into())),
            HashAlg::Sha256 => Ok(Sha256::digest(data).to_vec()),
            HashAlg::Sha384 => Ok(Sha384::digest(data).to_vec()),
            HashAlg::Sha512 => Ok(Sha512::digest(data).to_vec()),
        }
    }

    async fn encrypt(
        &self,
        params: &CipherParams,
        key: &KeyHandle,
        data: &[u8],
    ) -> Result<Vec<u8>> {
        self.run_aes_gcm(params, key, data, true).await
    }

    async fn decrypt(
        &self,
        params: &CipherParams,
        key: &KeyHandle,
        data: &[u8],
    ) -> Result<Vec<u8>> {
        self.run_aes_gcm(params, key, data, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sha256_matches_known_vector() {
        let provider = SoftProvider::new();
        let digest = provider.digest(HashAlg::Sha256, b"abc").await.unwrap();
        assert_eq!(
            keybridge_encoding::encode_hex(&digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn sha1_is_not_implemented() {
        let provider = SoftProvider::new();
        assert!(matches!(
            provider.digest(HashAlg::Sha1, b"abc").await,
            Err(Error::NotImplemented(_))
        ));
    }

    #[tokio::test]
    async fn x25519_pkcs8_export_carries_the_stored_scalar() {
        let provider = SoftProvider::new();
        let generated = provider
            .generate_key(
                &KeyDescriptor::X25519,
                true,
                &[KeyUsage::DeriveKey],
            )
            .await
            .unwrap();
        let GeneratedKey::Pair(pair) = generated else {
            panic!("Expected a pair");
        };

        let ProviderKeyData::Pkcs8(der) = provider
            .export_key(ProviderFormat::Pkcs8, &pair.private_key)
            .await
            .unwrap()
        else {
            panic!("Expected PKCS#8 data");
        };
        assert_eq!(der.len(), pkcs8::X25519_PKCS8_LEN);
        pkcs8::extract_x25519_scalar(&der).unwrap();

        // the public half has no PKCS#8 form
        assert!(matches!(
            provider
                .export_key(ProviderFormat::Pkcs8, &pair.public_key)
                .await,
            Err(Error::NotImplemented(_))
        ));
    }

    #[tokio::test]
    async fn raw_export_is_secret_keys_only() {
        let provider = SoftProvider::new();
        let generated = provider
            .generate_key(
                &KeyDescriptor::Aes {
                    mode: AesMode::Gcm,
                    length: 128,
                },
                true,
                &[KeyUsage::Encrypt, KeyUsage::Decrypt],
            )
            .await
            .unwrap();
        let GeneratedKey::Single(key) = generated else {
            panic!("Expected a single key");
        };

        let ProviderKeyData::Raw(bytes) = provider
            .export_key(ProviderFormat::Raw, &key)
            .await
            .unwrap()
        else {
            panic!("Expected raw data");
        };
        assert_eq!(bytes.len(), 16);

        let GeneratedKey::Pair(pair) = provider
            .generate_key(
                &KeyDescriptor::Ed25519,
                true,
                &[KeyUsage::Sign, KeyUsage::Verify],
            )
            .await
            .unwrap()
        else {
            panic!("Expected a pair");
        };
        assert!(
            provider
                .export_key(ProviderFormat::Raw, &pair.private_key)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn generated_usage_sets_are_split_per_half() {
        let provider = SoftProvider::new();
        let GeneratedKey::Pair(pair) = provider
            .generate_key(
                &KeyDescriptor::Ed25519,
                true,
                &[KeyUsage::Sign, KeyUsage::Verify],
            )
            .await
            .unwrap()
        else {
            panic!("Expected a pair");
        };
        assert_eq!(pair.private_key.usages, vec![KeyUsage::Sign]);
        assert_eq!(pair.public_key.usages, vec![KeyUsage::Verify]);
    }

    #[tokio::test]
    async fn oct_import_checks_key_length() {
        let provider = SoftProvider::new();
        let err = provider
            .import_key(
                ProviderKeyData::Raw(vec![0u8; 16]),
                &KeyDescriptor::Aes {
                    mode: AesMode::Gcm,
                    length: 256,
                },
                true,
                &[KeyUsage::Encrypt],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidKeyLength {
                expected: 32,
                actual: 16
            }
        ));
    }

    #[tokio::test]
    async fn rsa_generation_is_not_implemented() {
        let provider = SoftProvider::new();
        let err = provider
            .generate_key(
                &KeyDescriptor::Rsa {
                    scheme: crate::alg::RsaScheme::Pkcs1v15,
                    hash: HashAlg::Sha256,
                },
                true,
                &[KeyUsage::Sign],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotImplemented(_)));
    }
}
