use thiserror::Error;

/// Result type for link store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token length must be between {min} and {max}, got {len}")]
    Length { min: usize, max: usize, len: usize },
    #[error("token must contain only alphanumeric characters, hyphens, or underscores: '{0}'")]
    Charset(String),
}

/// Errors surfaced by [`LinkStore`](crate::store::LinkStore) backends.
///
/// `Conflict`, `NotFound` and `Unauthorized` are contract outcomes that the
/// registry interprets. Every other variant is a storage fault.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("token or credential already taken: {0}")]
    Conflict(String),
    #[error("no live record for token: {0}")]
    NotFound(String),
    #[error("credential does not match token: {0}")]
    Unauthorized(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage i/o failed: {0}")]
    Io(String),
}

impl StorageError {
    /// Whether the error is a backend fault rather than a contract outcome.
    pub fn is_fault(&self) -> bool {
        !matches!(
            self,
            StorageError::Conflict(_) | StorageError::NotFound(_) | StorageError::Unauthorized(_)
        )
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => StorageError::Timeout(err.to_string()),
            _ => StorageError::Io(err.to_string()),
        }
    }
}

/// Errors returned by [`Registry`](crate::registry::Registry) operations.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("token already exists: {0}")]
    AlreadyExists(String),
    #[error("could not allocate a unique token after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
    #[error("link not found: {0}")]
    NotFound(String),
    #[error("credential rejected for token: {0}")]
    Unauthorized(String),
    #[error("storage fault: {0}")]
    Storage(StorageError),
}

impl RegistryError {
    /// A stable machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::InvalidInput(_) => "invalid_input",
            RegistryError::AlreadyExists(_) => "already_exists",
            RegistryError::RetriesExhausted { .. } => "retries_exhausted",
            RegistryError::NotFound(_) => "not_found",
            RegistryError::Unauthorized(_) => "unauthorized",
            RegistryError::Storage(_) => "storage",
        }
    }
}

impl From<TokenError> for RegistryError {
    fn from(value: TokenError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}
