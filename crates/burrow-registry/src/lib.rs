//! Short-link registry service.
//!
//! [`RegistryService`] implements the [`Registry`] operations on top of any
//! [`LinkStore`](burrow_core::LinkStore): it validates targets, resolves or
//! generates tokens, issues deletion credentials and retries generated tokens
//! on collision.

pub mod config;
pub mod error;
pub mod service;

pub use burrow_core::{CreateParams, Registry};
pub use config::{ConfigError, RegistryConfig};
pub use error::RegistryError;
pub use service::RegistryService;
