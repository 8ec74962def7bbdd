//! Raw codec
//!
//! Packs and unpacks fixed-width big-endian key coordinates in and out of
//! the JWK shape. EC public material is the concatenation x‖y split at the
//! curve midpoint — that order is part of the contract, never a variant.
//! OKP keys carry a single x coordinate.

use keybridge_encoding::{decode_base64url, encode_base64url};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    alg::KeyAlgorithm,
    errors::{Error, Result},
    jwk::{ECParams, JWK, OKPParams, Params},
};

/// Raw key material in fixed-width big-endian layout
///
/// Private material is a distinct shape rather than an optional field so
/// the private/public distinction stays type-checked.
#[derive(Debug, Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
pub enum RawKeyMaterial {
    Public {
        public: Vec<u8>,
    },
    Private {
        public: Vec<u8>,
        private: Vec<u8>,
    },
}

impl RawKeyMaterial {
    pub fn public_bytes(&self) -> &[u8] {
        match self {
            RawKeyMaterial::Public { public } => public,
            RawKeyMaterial::Private { public, .. } => public,
        }
    }

    pub fn private_bytes(&self) -> Option<&[u8]> {
        match self {
            RawKeyMaterial::Public { .. } => None,
            RawKeyMaterial::Private { private, .. } => Some(private),
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, RawKeyMaterial::Private { .. })
    }
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::InvalidKeyLength { expected, actual })
    }
}

/// Packs raw coordinates into a JWK
///
/// `key_ops` is set from the material's shape: private material signs (or
/// derives, for X25519), public material verifies (or nothing, for X25519).
pub fn encode(algorithm: KeyAlgorithm, material: &RawKeyMaterial) -> Result<JWK> {
    let lengths = algorithm.coordinate_lengths();
    check_len(lengths.public, material.public_bytes().len())?;
    if let Some(private) = material.private_bytes() {
        check_len(lengths.private, private.len())?;
    }

    let d = material.private_bytes().map(encode_base64url);
    let usages = if material.is_private() {
        algorithm.private_usages()
    } else {
        algorithm.public_usages()
    };
    let key_ops = usages.iter().map(|u| u.name().to_string()).collect();

    let params = if algorithm.is_ec() {
        let (x, y) = material.public_bytes().split_at(lengths.public / 2);
        Params::EC(ECParams {
            curve: algorithm.to_string(),
            x: encode_base64url(x),
            y: encode_base64url(y),
            d,
        })
    } else {
        Params::OKP(OKPParams {
            curve: algorithm.to_string(),
            x: encode_base64url(material.public_bytes()),
            d,
        })
    };

    Ok(JWK {
        key_id: None,
        alg: None,
        key_ops: Some(key_ops),
        public_key_use: None,
        ext: None,
        params,
    })
}

/// Unpacks a JWK back into raw coordinates
pub fn decode(algorithm: KeyAlgorithm, jwk: &JWK) -> Result<RawKeyMaterial> {
    let lengths = algorithm.coordinate_lengths();

    let (public, d) = match &jwk.params {
        Params::EC(params) if algorithm.is_ec() => {
            check_curve(algorithm, &params.curve)?;
            let x = decode_base64url(&params.x)?;
            let y = decode_base64url(&params.y)?;
            check_len(lengths.public / 2, x.len())?;
            check_len(lengths.public / 2, y.len())?;
            let mut public = x;
            public.extend_from_slice(&y);
            (public, params.d.as_deref())
        }
        Params::OKP(params) if !algorithm.is_ec() => {
            check_curve(algorithm, &params.curve)?;
            let x = decode_base64url(&params.x)?;
            check_len(lengths.public, x.len())?;
            (x, params.d.as_deref())
        }
        _ => {
            return Err(Error::Key(format!(
                "JWK params don't match algorithm {algorithm}"
            )));
        }
    };

    match d {
        Some(d) => {
            let private = decode_base64url(d)?;
            check_len(lengths.private, private.len())?;
            Ok(RawKeyMaterial::Private { public, private })
        }
        None => Ok(RawKeyMaterial::Public { public }),
    }
}

fn check_curve(algorithm: KeyAlgorithm, curve: &str) -> Result<()> {
    if curve == algorithm.to_string() {
        Ok(())
    } else {
        Err(Error::Key(format!(
            "JWK curve {curve} doesn't match algorithm {algorithm}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alg::KeyUsage;

    fn private_material(algorithm: KeyAlgorithm) -> RawKeyMaterial {
        let lengths = algorithm.coordinate_lengths();
        RawKeyMaterial::Private {
            public: (0..lengths.public).map(|i| i as u8).collect(),
            private: (0..lengths.private).map(|i| 0xa0 ^ i as u8).collect(),
        }
    }

    #[test]
    fn round_trips_every_algorithm() {
        for algorithm in [
            KeyAlgorithm::Ed25519,
            KeyAlgorithm::X25519,
            KeyAlgorithm::P256,
            KeyAlgorithm::P384,
            KeyAlgorithm::P521,
        ] {
            let material = private_material(algorithm);
            let jwk = encode(algorithm, &material).unwrap();
            assert_eq!(decode(algorithm, &jwk).unwrap(), material, "{algorithm}");

            let public = RawKeyMaterial::Public {
                public: material.public_bytes().to_vec(),
            };
            let jwk = encode(algorithm, &public).unwrap();
            assert_eq!(decode(algorithm, &jwk).unwrap(), public, "{algorithm}");
        }
    }

    #[test]
    fn ec_public_splits_x_then_y() {
        let mut public = vec![0x11; 32];
        public.extend_from_slice(&[0x22; 32]);
        let jwk = encode(KeyAlgorithm::P256, &RawKeyMaterial::Public { public }).unwrap();

        let Params::EC(params) = &jwk.params else {
            panic!("Expected EC params");
        };
        assert_eq!(decode_base64url(&params.x).unwrap(), vec![0x11; 32]);
        assert_eq!(decode_base64url(&params.y).unwrap(), vec![0x22; 32]);
    }

    #[test]
    fn rejects_off_by_one_public_lengths() {
        for actual in [31, 33] {
            let err = encode(
                KeyAlgorithm::Ed25519,
                &RawKeyMaterial::Public {
                    public: vec![0; actual],
                },
            )
            .unwrap_err();
            assert!(
                matches!(err, Error::InvalidKeyLength { expected: 32, actual: a } if a == actual)
            );
        }
    }

    #[test]
    fn rejects_wrong_private_length() {
        let err = encode(
            KeyAlgorithm::P384,
            &RawKeyMaterial::Private {
                public: vec![0; 96],
                private: vec![0; 47],
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidKeyLength {
                expected: 48,
                actual: 47
            }
        ));
    }

    #[test]
    fn key_ops_reflect_material_shape() {
        let jwk = encode(KeyAlgorithm::Ed25519, &private_material(KeyAlgorithm::Ed25519)).unwrap();
        assert_eq!(jwk.key_ops, Some(vec![KeyUsage::Sign.name().to_string()]));

        let jwk = encode(
            KeyAlgorithm::X25519,
            &RawKeyMaterial::Public {
                public: vec![0; 32],
            },
        )
        .unwrap();
        assert_eq!(jwk.key_ops, Some(Vec::new()));

        let jwk = encode(KeyAlgorithm::X25519, &private_material(KeyAlgorithm::X25519)).unwrap();
        assert_eq!(
            jwk.key_ops,
            Some(vec![KeyUsage::DeriveKey.name().to_string()])
        );
    }

    #[test]
    fn decode_rejects_mismatched_curve() {
        let jwk = encode(
            KeyAlgorithm::Ed25519,
            &RawKeyMaterial::Public {
                public: vec![0; 32],
            },
        )
        .unwrap();
        // Same byte widths, different curve
        assert!(decode(KeyAlgorithm::X25519, &jwk).is_err());
    }

    #[test]
    fn decode_rejects_wrong_family() {
        let jwk = encode(
            KeyAlgorithm::P256,
            &RawKeyMaterial::Public {
                public: vec![0; 64],
            },
        )
        .unwrap();
        assert!(decode(KeyAlgorithm::Ed25519, &jwk).is_err());
    }
}
