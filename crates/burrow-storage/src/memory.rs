use crate::secret::credentials_match;
use async_trait::async_trait;
use burrow_core::error::{Result, StorageError};
use burrow_core::{Credential, LinkRecord, LinkStore, ReadLinkStore, Token};
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use tracing::trace;

/// In-memory storage entry for a token.
#[derive(Debug, Clone)]
struct Entry {
    target: String,
    credential: Credential,
}

/// In-memory implementation of [`LinkStore`] using DashMap.
///
/// `links` is keyed by token and `credentials` indexes live credentials back
/// to their token. Writers always lock a `links` shard before a
/// `credentials` shard, so the two maps cannot deadlock against each other.
#[derive(Debug, Default)]
pub struct InMemoryLinkStore {
    links: DashMap<String, Entry>,
    credentials: DashMap<String, String>,
}

impl InMemoryLinkStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory store with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            links: DashMap::with_capacity(capacity),
            credentials: DashMap::with_capacity(capacity),
        }
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[async_trait]
impl ReadLinkStore for InMemoryLinkStore {
    async fn get(&self, token: &Token) -> Result<Option<LinkRecord>> {
        Ok(self.links.get(token.as_str()).map(|entry| LinkRecord {
            target: entry.target.clone(),
            token: token.clone(),
            credential: entry.credential.clone(),
        }))
    }
}

#[async_trait]
impl LinkStore for InMemoryLinkStore {
    async fn put(&self, record: &LinkRecord) -> Result<()> {
        // The vacant token entry keeps its shard locked until the record is
        // published, so the token check and the insert are one step.
        let MapEntry::Vacant(link_slot) = self.links.entry(record.token.as_str().to_owned()) else {
            return Err(StorageError::Conflict(record.token.to_string()));
        };

        match self
            .credentials
            .entry(record.credential.as_str().to_owned())
        {
            MapEntry::Occupied(_) => Err(StorageError::Conflict(record.token.to_string())),
            MapEntry::Vacant(credential_slot) => {
                credential_slot.insert(record.token.as_str().to_owned());
                link_slot.insert(Entry {
                    target: record.target.clone(),
                    credential: record.credential.clone(),
                });
                trace!(token = %record.token, "stored link in memory");
                Ok(())
            }
        }
    }

    async fn delete(&self, token: &Token, credential: &Credential) -> Result<()> {
        let MapEntry::Occupied(link) = self.links.entry(token.as_str().to_owned()) else {
            return Err(StorageError::NotFound(token.to_string()));
        };

        if !credentials_match(link.get().credential.as_bytes(), credential.as_bytes()) {
            return Err(StorageError::Unauthorized(token.to_string()));
        }

        self.credentials.remove(credential.as_str());
        link.remove();
        trace!(token = %token, "removed link from memory");
        Ok(())
    }
}
