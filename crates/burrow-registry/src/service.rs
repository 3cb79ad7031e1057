use crate::config::{ConfigError, RegistryConfig};
use crate::error::from_storage;
use async_trait::async_trait;
use burrow_core::{
    CreateParams, Credential, LinkRecord, LinkStore, Registry, RegistryError, StorageError, Token,
};
use burrow_generator::{CredentialGenerator, HashTokenGenerator, TokenGenerator};
use jiff::Timestamp;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use url::Url;

type Result<T> = std::result::Result<T, RegistryError>;

/// The short-link registry.
///
/// Wraps a [`LinkStore`] and a [`TokenGenerator`] and handles:
/// - target validation (absolute `http`/`https` URLs only)
/// - caller-chosen versus generated tokens
/// - a fresh deletion credential on every persist attempt
/// - bounded retries for generated tokens that collide
///
/// The store is the only source of truth: nothing is cached here, and
/// uniqueness is left entirely to the store's `put`.
#[derive(Debug, Clone)]
pub struct RegistryService<S, G = HashTokenGenerator> {
    store: Arc<S>,
    tokens: Arc<G>,
    credentials: CredentialGenerator,
    max_attempts: u32,
}

impl<S: LinkStore> RegistryService<S> {
    /// Creates a registry using the default hash token generator.
    pub fn new(store: S, config: RegistryConfig) -> std::result::Result<Self, ConfigError> {
        Self::with_generator(store, HashTokenGenerator::new(), config)
    }
}

impl<S: LinkStore, G: TokenGenerator> RegistryService<S, G> {
    /// Creates a registry with a custom token generator.
    pub fn with_generator(
        store: S,
        generator: G,
        config: RegistryConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store: Arc::new(store),
            tokens: Arc::new(generator),
            credentials: CredentialGenerator::new(config.seed),
            max_attempts: config.max_attempts,
        })
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Checks that the target is an absolute `http` or `https` URL.
    fn validate_target(target: &str) -> Result<Url> {
        // The target is echoed back verbatim in a Location header.
        if target.chars().any(char::is_control) {
            return Err(RegistryError::InvalidInput(
                "target must not contain control characters".to_string(),
            ));
        }

        let url = Url::parse(target)
            .map_err(|e| RegistryError::InvalidInput(format!("target is not a URL: {e}")))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(RegistryError::InvalidInput(format!(
                "target scheme must be http or https, got '{scheme}'"
            ))),
        }
    }

    /// Salt for a generated token. The first attempt uses the stable token
    /// of the target; retries move to a random one so they can converge.
    fn salt_for(attempt: u32) -> u64 {
        if attempt == 0 {
            0
        } else {
            rand::random()
        }
    }
}

#[async_trait]
impl<S: LinkStore, G: TokenGenerator> Registry for RegistryService<S, G> {
    async fn create(&self, params: CreateParams) -> Result<LinkRecord> {
        let url = Self::validate_target(&params.target)?;

        let requested = match params.requested_token.filter(|t| !t.is_empty()) {
            Some(token) => Some(Token::new(token)?),
            None => None,
        };

        for attempt in 0..self.max_attempts {
            let token = match &requested {
                Some(token) => token.clone(),
                None => self.tokens.generate(url.as_str(), Self::salt_for(attempt)),
            };
            let credential =
                self.credentials
                    .generate(&params.target, &token, Timestamp::now().as_second());

            let record = LinkRecord {
                target: params.target.clone(),
                token,
                credential,
            };

            match self.store.put(&record).await {
                Ok(()) => {
                    info!(token = %record.token, attempt, "created short link");
                    return Ok(record);
                }
                Err(StorageError::Conflict(_)) if requested.is_some() => {
                    debug!(token = %record.token, "requested token is taken");
                    return Err(RegistryError::AlreadyExists(record.token.to_string()));
                }
                Err(StorageError::Conflict(_)) => {
                    warn!(
                        token = %record.token,
                        attempt,
                        max_attempts = self.max_attempts,
                        "generated token collided, retrying"
                    );
                }
                Err(err) => {
                    if err.is_fault() {
                        warn!(token = %record.token, error = %err, "link store failed to persist");
                    }
                    return Err(from_storage(err));
                }
            }
        }

        Err(RegistryError::RetriesExhausted {
            attempts: self.max_attempts,
        })
    }

    async fn resolve(&self, token: &Token) -> Result<LinkRecord> {
        trace!(token = %token, "resolving token");

        match self.store.get(token).await.map_err(from_storage)? {
            Some(record) => Ok(record),
            None => Err(RegistryError::NotFound(token.to_string())),
        }
    }

    async fn delete(&self, token: &Token, credential: &Credential) -> Result<()> {
        self.store
            .delete(token, credential)
            .await
            .map_err(from_storage)?;
        info!(token = %token, "deleted short link");
        Ok(())
    }
}
