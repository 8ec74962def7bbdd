//! X25519 PKCS#8 scalar extraction
//!
//! One provider can't export X25519 private keys as JWK; the raw scalar has
//! to be pulled out of its PKCS#8 export instead. This walks the exact
//! RFC 8410 PrivateKeyInfo layout that provider produces, byte by byte —
//! it is deliberately rigid and not a general DER parser.

use crate::errors::{Error, Result};

/// Total length of an RFC 8410 X25519 PrivateKeyInfo blob
pub const X25519_PKCS8_LEN: usize = 48;

/// Expected DER prefix ahead of the 32-byte scalar:
/// SEQUENCE(46) { INTEGER 0, SEQUENCE(5) { OID 1.3.101.110 },
/// OCTET STRING(34) { OCTET STRING(32) } }
const DER_PREFIX: [u8; 16] = [
    0x30, 0x2e, // SEQUENCE, 46 bytes
    0x02, 0x01, 0x00, // INTEGER version 0
    0x30, 0x05, // AlgorithmIdentifier SEQUENCE, 5 bytes
    0x06, 0x03, 0x2b, 0x65, 0x6e, // OID id-X25519 (1.3.101.110)
    0x04, 0x22, // OCTET STRING, 34 bytes
    0x04, 0x20, // inner OCTET STRING, 32 bytes
];

/// Extracts the raw 32-byte private scalar from an X25519 PKCS#8 blob
pub fn extract_x25519_scalar(der: &[u8]) -> Result<[u8; 32]> {
    if der.len() != X25519_PKCS8_LEN {
        return Err(Error::InvalidKeyLength {
            expected: X25519_PKCS8_LEN,
            actual: der.len(),
        });
    }

    for (offset, (&expected, &actual)) in DER_PREFIX.iter().zip(der).enumerate() {
        if expected != actual {
            return Err(Error::MalformedPkcs8 {
                offset,
                expected,
                actual,
            });
        }
    }

    let mut scalar = [0u8; 32];
    scalar.copy_from_slice(&der[DER_PREFIX.len()..]);
    Ok(scalar)
}

/// Builds the PKCS#8 blob for a raw X25519 scalar (inverse of extraction)
pub fn wrap_x25519_scalar(scalar: &[u8; 32]) -> Vec<u8> {
    let mut der = Vec::with_capacity(X25519_PKCS8_LEN);
    der.extend_from_slice(&DER_PREFIX);
    der.extend_from_slice(scalar);
    der
}
