//! Configuration types for SNAP clients.
//!
//! These types represent the validated runtime configuration handed to the
//! clients. Loading and persisting profiles is left to the caller.

mod merchant;

pub use merchant::MerchantIdentity;
