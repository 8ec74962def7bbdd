/*!
 * Keybridge error types
 */

use keybridge_encoding::EncodingError;
use thiserror::Error;

/// Errors raised by the key translation layer
///
/// Every error is raised at the point of violation; there is no local
/// recovery or retry. Provider errors pass through unmodified in kind.
#[derive(Error, Debug)]
pub enum Error {
    /// Algorithm tag or name outside the closed registry
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Recognized key type but unrecognized or missing curve
    #[error("Unsupported curve: {0}")]
    UnsupportedCurve(String),

    /// `kty` outside the supported set (EC, OKP, RSA, oct)
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// RSA/AES structured key without a usable `alg` field
    #[error("{0} key is missing a usable 'alg' field")]
    MissingAlgorithmHint(String),

    /// Raw byte input doesn't match the algorithm's fixed coordinate width
    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// hex/base64url text failed to decode
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(#[from] EncodingError),

    /// Unexpected byte at a validated offset of a PKCS#8 blob
    #[error(
        "Malformed PKCS#8 blob at offset {offset}: expected 0x{expected:02x}, got 0x{actual:02x}"
    )]
    MalformedPkcs8 {
        offset: usize,
        expected: u8,
        actual: u8,
    },

    /// Requested wire format isn't available for the key's algorithm family
    #[error("Format '{format}' isn't available for {algorithm} keys")]
    UnsupportedFormat { format: String, algorithm: String },

    /// Known gap in a provider's capability
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Error reported by the underlying cryptography provider
    #[error("Provider error: {0}")]
    Provider(String),

    /// Key material is structurally unusable
    #[error("Key error: {0}")]
    Key(String),
}

pub type Result<T> = std::result::Result<T, Error>;
