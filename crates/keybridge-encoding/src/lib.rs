//! Text encoding utilities for keybridge
//!
//! This crate provides the two textual renderings of raw key bytes used
//! across keybridge:
//! - lowercase hexadecimal (even length)
//! - unpadded base64url (RFC 4648 §5)

pub mod text;

pub use text::{
    TextFormat, decode_base64url, decode_hex, decode_text, encode_base64url, encode_hex,
    encode_text,
};

mod error;
pub use error::EncodingError;
