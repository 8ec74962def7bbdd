//! Key generation and symmetric helpers
//!
//! Thin orchestration over the provider: pair generation with the
//! registry's default usage sets, AES key generation, digest-based AES key
//! derivation, and the AES-GCM encrypt/decrypt calls.

use keybridge_encoding::encode_base64url;

use crate::{
    alg::{AesMode, HashAlg, KeyAlgorithm, KeyDescriptor},
    errors::{Error, Result},
    import::import_jwk,
    jwk::{JWK, OctParams, Params},
    provider::{CipherParams, CryptoProvider, GeneratedKey, KeyHandle, KeyPairHandle},
};

/// Generates a fresh key pair with the algorithm's default usages
pub async fn generate_key_pair<P: CryptoProvider>(
    provider: &P,
    algorithm: KeyAlgorithm,
    extractable: bool,
) -> Result<KeyPairHandle> {
    let generated = provider
        .generate_key(
            &algorithm.descriptor(),
            extractable,
            &algorithm.default_usages(),
        )
        .await?;
    match generated {
        GeneratedKey::Pair(pair) => Ok(pair),
        GeneratedKey::Single(_) => Err(Error::Provider(format!(
            "Provider returned a single key for {algorithm} pair generation"
        ))),
    }
}

/// Generates a fresh AES key
pub async fn generate_aes_key<P: CryptoProvider>(
    provider: &P,
    mode: AesMode,
    length: u16,
    extractable: bool,
) -> Result<KeyHandle> {
    check_aes_length(length)?;
    let generated = provider
        .generate_key(
            &KeyDescriptor::Aes { mode, length },
            extractable,
            &mode.default_usages(),
        )
        .await?;
    match generated {
        GeneratedKey::Single(key) => Ok(key),
        GeneratedKey::Pair(_) => Err(Error::Provider(
            "Provider returned a key pair for AES generation".into(),
        )),
    }
}

/// Derives an AES key from arbitrary secret bytes
///
/// The secret is hashed with SHA-256 and the digest truncated to the key
/// length, so the same input always derives the same key.
pub async fn derive_aes_key<P: CryptoProvider>(
    provider: &P,
    secret: &[u8],
    mode: AesMode,
    length: u16,
    extractable: bool,
) -> Result<KeyHandle> {
    check_aes_length(length)?;
    let mut digest = provider.digest(HashAlg::Sha256, secret).await?;
    digest.truncate(usize::from(length) / 8);

    let jwk = JWK {
        key_id: None,
        alg: Some(format!("A{length}{}", mode.alg_suffix())),
        key_ops: Some(
            mode.default_usages()
                .iter()
                .map(|u| u.name().to_string())
                .collect(),
        ),
        public_key_use: None,
        ext: None,
        params: Params::Oct(OctParams {
            k: Some(encode_base64url(&digest)),
        }),
    };
    import_jwk(provider, &jwk, extractable).await
}

/// AES-GCM encryption with a caller-supplied 12-byte IV
pub async fn aes_encrypt<P: CryptoProvider>(
    provider: &P,
    key: &KeyHandle,
    iv: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    provider
        .encrypt(&CipherParams::AesGcm { iv: iv.to_vec() }, key, plaintext)
        .await
}

/// AES-GCM decryption; the ciphertext carries the trailing tag
pub async fn aes_decrypt<P: CryptoProvider>(
    provider: &P,
    key: &KeyHandle,
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    provider
        .decrypt(&CipherParams::AesGcm { iv: iv.to_vec() }, key, ciphertext)
        .await
}

fn check_aes_length(length: u16) -> Result<()> {
    match length {
        128 | 192 | 256 => Ok(()),
        _ => Err(Error::Key(format!("Invalid AES key length {length}"))),
    }
}

#[cfg(all(test, feature = "soft-provider"))]
mod tests {
    use super::*;
    use crate::{
        export::{KeyFormat, export_key},
        provider::KeyClass,
        soft::SoftProvider,
    };
    use sha2::{Digest, Sha256};

    #[tokio::test]
    async fn generated_pair_has_split_classes_and_usages() {
        let provider = SoftProvider::new();
        for algorithm in [
            KeyAlgorithm::Ed25519,
            KeyAlgorithm::X25519,
            KeyAlgorithm::P256,
            KeyAlgorithm::P384,
            KeyAlgorithm::P521,
        ] {
            let pair = generate_key_pair(&provider, algorithm, true).await.unwrap();
            assert_eq!(pair.private_key.class, KeyClass::Private, "{algorithm}");
            assert_eq!(pair.public_key.class, KeyClass::Public, "{algorithm}");
            assert_eq!(pair.private_key.usages, algorithm.private_usages());
            assert_eq!(pair.public_key.usages, algorithm.public_usages());
        }
    }

    #[tokio::test]
    async fn generated_ec_raw_has_table_widths() {
        let provider = SoftProvider::new();
        let pair = generate_key_pair(&provider, KeyAlgorithm::P521, true)
            .await
            .unwrap();
        let public = export_key(&provider, KeyFormat::Raw, &pair.public_key)
            .await
            .unwrap();
        let private = export_key(&provider, KeyFormat::Raw, &pair.private_key)
            .await
            .unwrap();
        assert_eq!(public.as_bytes().unwrap().len(), 132);
        assert_eq!(private.as_bytes().unwrap().len(), 66);
    }

    #[tokio::test]
    async fn derive_is_deterministic_and_matches_sha256() {
        let provider = SoftProvider::new();
        let secret = b"correct horse battery staple";

        let a = derive_aes_key(&provider, secret, AesMode::Gcm, 128, true)
            .await
            .unwrap();
        let b = derive_aes_key(&provider, secret, AesMode::Gcm, 128, true)
            .await
            .unwrap();

        let jwk_a = export_key(&provider, KeyFormat::Jwk, &a).await.unwrap();
        let jwk_b = export_key(&provider, KeyFormat::Jwk, &b).await.unwrap();
        let k = |e: &crate::export::ExportedKey| match &e.as_jwk().unwrap().params {
            Params::Oct(OctParams { k: Some(k) }) => k.clone(),
            other => panic!("Expected oct params, got {other:?}"),
        };
        assert_eq!(k(&jwk_a), k(&jwk_b));

        let digest = Sha256::digest(secret);
        assert_eq!(k(&jwk_a), encode_base64url(&digest[..16]));
    }

    #[tokio::test]
    async fn rejects_invalid_aes_lengths() {
        let provider = SoftProvider::new();
        for length in [0, 64, 255, 512] {
            assert!(
                derive_aes_key(&provider, b"x", AesMode::Gcm, length, true)
                    .await
                    .is_err(),
                "{length}"
            );
            assert!(
                generate_aes_key(&provider, AesMode::Gcm, length, true)
                    .await
                    .is_err(),
                "{length}"
            );
        }
    }

    #[tokio::test]
    async fn gcm_round_trip() {
        let provider = SoftProvider::new();
        let key = derive_aes_key(&provider, b"shared secret", AesMode::Gcm, 256, false)
            .await
            .unwrap();

        let iv = [9u8; 12];
        let plaintext = b"attack at dawn";
        let ciphertext = aes_encrypt(&provider, &key, &iv, plaintext).await.unwrap();
        assert_ne!(&ciphertext[..plaintext.len()], plaintext);

        let decrypted = aes_decrypt(&provider, &key, &iv, &ciphertext).await.unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[tokio::test]
    async fn gcm_rejects_tampered_ciphertext_and_bad_iv() {
        let provider = SoftProvider::new();
        let key = derive_aes_key(&provider, b"shared secret", AesMode::Gcm, 192, false)
            .await
            .unwrap();

        let iv = [1u8; 12];
        let mut ciphertext = aes_encrypt(&provider, &key, &iv, b"payload").await.unwrap();
        ciphertext[0] ^= 1;
        assert!(aes_decrypt(&provider, &key, &iv, &ciphertext).await.is_err());

        assert!(aes_encrypt(&provider, &key, &[0u8; 11], b"payload").await.is_err());
    }
}
