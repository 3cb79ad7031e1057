use crate::credential::Credential;
use crate::error::RegistryError;
use crate::record::LinkRecord;
use crate::token::Token;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, RegistryError>;

/// Parameters for creating a short link.
#[derive(Debug, Clone, Default)]
pub struct CreateParams {
    /// The long URL to shorten. Must be absolute with an `http` or `https` scheme.
    pub target: String,
    /// Optional caller-chosen token. An empty string counts as absent.
    pub requested_token: Option<String>,
}

impl CreateParams {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            requested_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.requested_token = Some(token.into());
        self
    }
}

/// The operations a transport adapter consumes.
#[async_trait]
pub trait Registry: Send + Sync + 'static {
    /// Creates a short link and returns the persisted record.
    async fn create(&self, params: CreateParams) -> Result<LinkRecord>;

    /// Resolves a token to its live record.
    async fn resolve(&self, token: &Token) -> Result<LinkRecord>;

    /// Deletes the record for `token` if `credential` matches it.
    async fn delete(&self, token: &Token, credential: &Credential) -> Result<()>;
}
