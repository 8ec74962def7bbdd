//! Encoding errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("Invalid base64url encoding: {0}")]
    InvalidBase64Url(String),
}
