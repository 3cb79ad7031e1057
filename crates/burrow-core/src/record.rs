use crate::credential::Credential;
use crate::token::Token;
use serde::{Deserialize, Serialize};

/// A persisted short link.
///
/// Records are immutable once created: there is no update path, only
/// creation and authorized deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// The long URL, stored as submitted.
    pub target: String,
    /// The public short identifier.
    pub token: Token,
    /// The secret required, together with `token`, to delete the record.
    pub credential: Credential,
}
