//! SDK for SNAP-style payment gateway APIs.
//!
//! The gateway authenticates merchants with two signature schemes:
//!
//! * **Asymmetric** (access-token endpoints): RSA-SHA256 over
//!   `"{merchant_id}|{timestamp}"`, see [`signature::sign_asymmetric`].
//! * **Symmetric** (transactional endpoints): HMAC-SHA512 over
//!   `"{METHOD}:{path}:{access_token}:{sha256(body)}:{timestamp}"`, see
//!   [`signature::sign_symmetric`] and [`payload`].
//!
//! HTTP clients live in [`client`] behind the `client` cargo feature.

#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod objects;
pub mod payload;
pub mod signature;
pub mod timestamp;
