//! Import facade
//!
//! Every import funnels through the JWK path: raw bytes and hex/base64url
//! text are first packed into a JWK, then the inference engine derives the
//! descriptor and usage set the provider's structured import needs.

use keybridge_encoding::{TextFormat, decode_text};

use crate::{
    alg::KeyAlgorithm,
    errors::Result,
    infer,
    jwk::JWK,
    provider::{CryptoProvider, KeyHandle, KeyPairHandle, ProviderKeyData},
    raw::{self, RawKeyMaterial},
};

/// Imports a JWK, inferring the descriptor and usages from its fields
pub async fn import_jwk<P: CryptoProvider>(
    provider: &P,
    jwk: &JWK,
    extractable: bool,
) -> Result<KeyHandle> {
    let inference = infer::infer(jwk)?;
    provider
        .import_key(
            ProviderKeyData::Jwk(jwk.clone()),
            &inference.descriptor,
            extractable,
            &inference.usages,
        )
        .await
}

/// Imports raw key material under a known algorithm
pub async fn import_raw<P: CryptoProvider>(
    provider: &P,
    algorithm: KeyAlgorithm,
    material: &RawKeyMaterial,
    extractable: bool,
) -> Result<KeyHandle> {
    let jwk = raw::encode(algorithm, material)?;
    import_jwk(provider, &jwk, extractable).await
}

/// Imports hex or base64url encoded key material under a known algorithm
pub async fn import_text<P: CryptoProvider>(
    provider: &P,
    algorithm: KeyAlgorithm,
    format: TextFormat,
    public: &str,
    private: Option<&str>,
    extractable: bool,
) -> Result<KeyHandle> {
    let public = decode_text(format, public)?;
    let material = match private {
        Some(private) => RawKeyMaterial::Private {
            public,
            private: decode_text(format, private)?,
        },
        None => RawKeyMaterial::Public { public },
    };
    import_raw(provider, algorithm, &material, extractable).await
}

/// Imports a raw pair as two handles, one per half
///
/// The private handle sees the full material; the public handle is imported
/// from the public coordinates alone, so its usages are the public subset.
pub async fn import_key_pair_raw<P: CryptoProvider>(
    provider: &P,
    algorithm: KeyAlgorithm,
    public: &[u8],
    private: &[u8],
    extractable: bool,
) -> Result<KeyPairHandle> {
    let private_key = import_raw(
        provider,
        algorithm,
        &RawKeyMaterial::Private {
            public: public.to_vec(),
            private: private.to_vec(),
        },
        extractable,
    )
    .await?;
    let public_key = import_raw(
        provider,
        algorithm,
        &RawKeyMaterial::Public {
            public: public.to_vec(),
        },
        extractable,
    )
    .await?;
    Ok(KeyPairHandle {
        private_key,
        public_key,
    })
}

/// Imports a hex or base64url encoded pair as two handles
pub async fn import_key_pair_text<P: CryptoProvider>(
    provider: &P,
    algorithm: KeyAlgorithm,
    format: TextFormat,
    public: &str,
    private: &str,
    extractable: bool,
) -> Result<KeyPairHandle> {
    let public = decode_text(format, public)?;
    let private = decode_text(format, private)?;
    import_key_pair_raw(provider, algorithm, &public, &private, extractable).await
}

#[cfg(all(test, feature = "soft-provider"))]
mod tests {
    use super::*;
    use crate::{
        alg::{KeyDescriptor, KeyUsage},
        errors::Error,
        export::{KeyFormat, export_key},
        keys::generate_key_pair,
        provider::KeyClass,
        soft::SoftProvider,
    };

    #[tokio::test]
    async fn imports_private_jwk_as_private_handle() {
        let provider = SoftProvider::new();
        let jwk = JWK::from_json(
            r#"{
                "crv": "Ed25519",
                "d": "jybTAuX6NlN7cJLWNCSOLUnJpblpsGr05TTp7scjSvE",
                "kty": "OKP",
                "x": "Xx4_L89E6RsyvDTzN9wuN3cDwgifPkXMgFJv_HMIxdk",
                "key_ops": ["sign"]
            }"#,
        )
        .unwrap();

        let handle = import_jwk(&provider, &jwk, true).await.unwrap();
        assert_eq!(handle.class, KeyClass::Private);
        assert_eq!(handle.descriptor, KeyDescriptor::Ed25519);
        assert_eq!(handle.usages, vec![KeyUsage::Sign]);
    }

    #[tokio::test]
    async fn exported_hex_pair_reimports() {
        let provider = SoftProvider::new();
        let pair = generate_key_pair(&provider, KeyAlgorithm::P384, true)
            .await
            .unwrap();

        let private_hex = export_key(&provider, KeyFormat::Hex, &pair.private_key)
            .await
            .unwrap();
        let public_hex = export_key(&provider, KeyFormat::Hex, &pair.public_key)
            .await
            .unwrap();

        let reimported = import_key_pair_text(
            &provider,
            KeyAlgorithm::P384,
            TextFormat::Hex,
            public_hex.as_text().unwrap(),
            private_hex.as_text().unwrap(),
            true,
        )
        .await
        .unwrap();

        assert_eq!(reimported.private_key.class, KeyClass::Private);
        assert_eq!(reimported.public_key.class, KeyClass::Public);

        // same bytes come back out
        let round = export_key(&provider, KeyFormat::Hex, &reimported.private_key)
            .await
            .unwrap();
        assert_eq!(round.as_text(), private_hex.as_text());
    }

    #[tokio::test]
    async fn public_only_import_has_public_usages() {
        let provider = SoftProvider::new();
        let pair = generate_key_pair(&provider, KeyAlgorithm::Ed25519, true)
            .await
            .unwrap();
        let public = export_key(&provider, KeyFormat::Raw, &pair.public_key)
            .await
            .unwrap();

        let handle = import_raw(
            &provider,
            KeyAlgorithm::Ed25519,
            &RawKeyMaterial::Public {
                public: public.as_bytes().unwrap().to_vec(),
            },
            true,
        )
        .await
        .unwrap();
        assert_eq!(handle.class, KeyClass::Public);
        assert_eq!(handle.usages, vec![KeyUsage::Verify]);
    }

    #[tokio::test]
    async fn malformed_text_surfaces_the_encoding_error() {
        let provider = SoftProvider::new();
        let err = import_text(
            &provider,
            KeyAlgorithm::Ed25519,
            TextFormat::Hex,
            "not-hex!",
            None,
            true,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::MalformedEncoding(_)));
    }

    #[tokio::test]
    async fn wrong_length_text_is_rejected() {
        let provider = SoftProvider::new();
        let err = import_text(
            &provider,
            KeyAlgorithm::Ed25519,
            TextFormat::Hex,
            &"ab".repeat(31),
            None,
            true,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidKeyLength {
                expected: 32,
                actual: 31
            }
        ));
    }

    #[tokio::test]
    async fn off_curve_point_is_rejected() {
        let provider = SoftProvider::new();
        let err = import_raw(
            &provider,
            KeyAlgorithm::P256,
            &RawKeyMaterial::Public {
                public: vec![0x42; 64],
            },
            true,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Key(_)));
    }
}
