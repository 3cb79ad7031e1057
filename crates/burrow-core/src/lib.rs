//! Core types and traits for the Burrow short-link registry.
//!
//! This crate provides the shared vocabulary used by the generators, the
//! storage backends, the registry service and the HTTP gateway.

pub mod credential;
pub mod error;
pub mod record;
pub mod registry;
pub mod store;
pub mod token;

pub use credential::Credential;
pub use error::{RegistryError, StorageError, TokenError};
pub use record::LinkRecord;
pub use registry::{CreateParams, Registry};
pub use store::{LinkStore, ReadLinkStore};
pub use token::Token;
