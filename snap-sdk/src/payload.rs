//! Canonical request bodies.
//!
//! The symmetric signature binds the SHA-256 of the request body, so the
//! body must be serialized once and sent exactly as hashed. Field order is
//! the declaration order of the serialized struct.

use serde::Serialize;

/// A request body frozen to its canonical JSON text together with its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPayload {
    pub json: String,
    pub hash: String,
}

impl CanonicalPayload {
    /// Serialize `body` to compact JSON and hash it.
    pub fn new<T: Serialize + ?Sized>(body: &T) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(body)?;
        let hash = hash(&json);
        Ok(Self { json, hash })
    }
}

/// Lowercase hex SHA-256 of `json`.
pub fn hash(json: &str) -> String {
    hex::encode(ring::digest::digest(&ring::digest::SHA256, json.as_bytes()))
}
