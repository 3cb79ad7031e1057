//! Token and credential generators.
//!
//! Both generators are pure functions of their inputs and hold no mutable
//! state, so a single instance can be shared freely between requests.

pub mod credential;
pub mod hash;

pub use credential::CredentialGenerator;
pub use hash::HashTokenGenerator;

use burrow_core::Token;

/// Trait for deriving a short token from a target URL.
///
/// Implementations must be deterministic in `(target, salt)`. Salt `0` yields
/// the stable token for a target; callers vary the salt to get a different
/// candidate after a collision.
pub trait TokenGenerator: Send + Sync + 'static {
    fn generate(&self, target: &str, salt: u64) -> Token;
}
