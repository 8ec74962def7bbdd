//! JWK (JSON Web Key) types per RFC 7517
//!
//! The wire shape round-trips verbatim through serde: recognized fields are
//! typed, `key_ops` entries are kept as raw strings so unrecognized
//! operation names survive a parse/serialize cycle untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{Error, Result};

/// RFC 7517 JWK Struct
#[derive(Debug, Serialize, Deserialize, Clone, Zeroize, ZeroizeOnDrop)]
pub struct JWK {
    #[serde(rename = "kid")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    /// Algorithm hint; required to disambiguate RSA and AES keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Permitted operations; unrecognized entries are preserved verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,

    /// Coarse sig/enc hint, only consulted when `key_ops` is absent
    #[serde(rename = "use")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_use: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<bool>,

    #[serde(flatten)]
    pub params: Params,
}

impl JWK {
    /// True when the JWK carries private (or symmetric secret) key material
    pub fn is_private(&self) -> bool {
        match &self.params {
            Params::EC(params) => params.d.is_some(),
            Params::OKP(params) => params.d.is_some(),
            Params::RSA(params) => params.d.is_some(),
            // Symmetric keys have no public half
            Params::Oct(_) => true,
        }
    }

    /// Returns a copy with private material stripped, leaving the public view
    ///
    /// `oct` keys have no public view and are returned unchanged.
    pub fn to_public(&self) -> JWK {
        let mut public = self.clone();
        match &mut public.params {
            Params::EC(params) => params.d = None,
            Params::OKP(params) => params.d = None,
            Params::RSA(params) => {
                params.d = None;
                params.p = None;
                params.q = None;
                params.dp = None;
                params.dq = None;
                params.qi = None;
            }
            Params::Oct(_) => {}
        }
        public
    }

    /// Parses a JWK from its JSON text form
    pub fn from_json(input: &str) -> Result<JWK> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| Error::Key(format!("Failed to parse JWK: {e}")))?;
        Self::from_value(value)
    }

    /// Parses a JWK from a JSON value, surfacing unknown `kty` values
    pub fn from_value(value: Value) -> Result<JWK> {
        match value.get("kty").and_then(Value::as_str) {
            Some("EC" | "OKP" | "RSA" | "oct") => {}
            Some(other) => return Err(Error::UnsupportedKeyType(other.to_string())),
            None => return Err(Error::Key("JWK is missing 'kty'".into())),
        }
        serde_json::from_value(value).map_err(|e| Error::Key(format!("Failed to parse JWK: {e}")))
    }
}

/// JWK Key Types and associated Parameters
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
#[serde(tag = "kty")]
pub enum Params {
    EC(ECParams),
    OKP(OKPParams),
    RSA(RSAParams),
    #[serde(rename = "oct")]
    Oct(OctParams),
}

/// Elliptic Curve parameters (P-256, P-384, P-521)
#[derive(Debug, Serialize, Deserialize, Clone, Zeroize, PartialEq, ZeroizeOnDrop)]
pub struct ECParams {
    #[serde(rename = "crv")]
    pub curve: String,
    pub x: String,
    pub y: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

/// Octet Key Pair parameters (Ed25519, X25519)
#[derive(Debug, Serialize, Deserialize, Clone, Zeroize, PartialEq, ZeroizeOnDrop)]
pub struct OKPParams {
    #[serde(rename = "crv")]
    pub curve: String,
    pub x: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

/// RSA parameters
#[derive(Debug, Serialize, Deserialize, Clone, Zeroize, PartialEq, ZeroizeOnDrop)]
pub struct RSAParams {
    pub n: String,
    pub e: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,
}

/// Symmetric key parameters (AES)
#[derive(Debug, Serialize, Deserialize, Clone, Zeroize, PartialEq, ZeroizeOnDrop)]
pub struct OctParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<String>,
}
