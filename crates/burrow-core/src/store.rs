use crate::credential::Credential;
use crate::error::Result;
use crate::record::LinkRecord;
use crate::token::Token;
use async_trait::async_trait;

/// A read-only view of a link store.
///
/// Redirect-only consumers can hold this instead of the full [`LinkStore`].
#[async_trait]
pub trait ReadLinkStore: Send + Sync + 'static {
    /// Retrieves the live record for a token.
    /// Returns `None` if no live record exists.
    async fn get(&self, token: &Token) -> Result<Option<LinkRecord>>;
}

/// Durable mapping from token to (target, credential).
///
/// Implementations must be safe under concurrent callers. Uniqueness of
/// both `token` and `credential` among live records is enforced in the
/// backend's write path, never by a separate existence check.
#[async_trait]
pub trait LinkStore: ReadLinkStore {
    /// Inserts a new record atomically.
    ///
    /// Returns `Err(Conflict)` if the token or the credential already belongs
    /// to a live record. On any error nothing of the record is left visible.
    async fn put(&self, record: &LinkRecord) -> Result<()>;

    /// Removes the live record for `token` if its credential matches.
    ///
    /// Returns `Err(NotFound)` if there is no live record for `token` and
    /// `Err(Unauthorized)` if there is one but the credential differs.
    async fn delete(&self, token: &Token, credential: &Credential) -> Result<()>;
}
