//! Hex and base64url codecs for raw key bytes

use std::fmt;

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::EncodingError;

/// Textual renderings of raw key bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    Hex,
    Base64Url,
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TextFormat::Hex => write!(f, "hex"),
            TextFormat::Base64Url => write!(f, "base64url"),
        }
    }
}

/// Encodes bytes as lowercase hex
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decodes a hex string (upper or lower case) back to bytes
pub fn decode_hex(input: &str) -> Result<Vec<u8>, EncodingError> {
    hex::decode(input).map_err(|e| EncodingError::InvalidHex(e.to_string()))
}

/// Encodes bytes as unpadded base64url
pub fn encode_base64url(data: &[u8]) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(data)
}

/// Decodes an unpadded base64url string back to bytes
pub fn decode_base64url(input: &str) -> Result<Vec<u8>, EncodingError> {
    BASE64_URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|e| EncodingError::InvalidBase64Url(e.to_string()))
}

/// Encodes bytes in the given text format
pub fn encode_text(format: TextFormat, data: &[u8]) -> String {
    match format {
        TextFormat::Hex => encode_hex(data),
        TextFormat::Base64Url => encode_base64url(data),
    }
}

/// Decodes a textual key rendering back to raw bytes
pub fn decode_text(format: TextFormat, input: &str) -> Result<Vec<u8>, EncodingError> {
    match format {
        TextFormat::Hex => decode_hex(input),
        TextFormat::Base64Url => decode_base64url(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let bytes = [0x00, 0x01, 0xab, 0xff];
        let encoded = encode_hex(&bytes);
        assert_eq!(encoded, "0001abff");
        assert_eq!(decode_hex(&encoded).unwrap(), bytes);
    }

    #[test]
    fn hex_rejects_odd_length() {
        assert!(decode_hex("abc").is_err());
    }

    #[test]
    fn hex_rejects_non_hex_chars() {
        assert!(decode_hex("zz").is_err());
    }

    #[test]
    fn base64url_round_trip() {
        let encoded = encode_base64url(b"hello");
        assert_eq!(encoded, "aGVsbG8");
        assert_eq!(decode_base64url(&encoded).unwrap(), b"hello");
    }

    #[test]
    fn base64url_rejects_padding() {
        assert!(decode_base64url("aGVsbG8=").is_err());
    }

    #[test]
    fn base64url_rejects_standard_alphabet() {
        // '+' and '/' belong to the standard alphabet, not base64url
        assert!(decode_base64url("a+b/").is_err());
    }

    #[test]
    fn text_format_dispatch() {
        let bytes = [0xde, 0xad, 0xbe, 0xef];
        assert_eq!(encode_text(TextFormat::Hex, &bytes), "deadbeef");
        assert_eq!(
            decode_text(TextFormat::Base64Url, &encode_text(TextFormat::Base64Url, &bytes)).unwrap(),
            bytes
        );
    }
}
