//! Link store backends.
//!
//! Three interchangeable implementations of [`LinkStore`]:
//!
//! - [`SqliteLinkStore`]: one table with partial unique indexes on the live
//!   `token` and `credential` columns.
//! - [`FileLinkStore`]: parallel key directories populated with
//!   create-exclusive hard links.
//! - [`InMemoryLinkStore`]: sharded maps, for tests and throwaway runs.

pub mod files;
pub mod memory;
pub mod sqlite;

mod secret;

pub use burrow_core::error::{Result, StorageError};
pub use burrow_core::{LinkRecord, LinkStore, ReadLinkStore};
pub use files::FileLinkStore;
pub use memory::InMemoryLinkStore;
pub use sqlite::SqliteLinkStore;
