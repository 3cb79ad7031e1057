use thiserror::Error;
use typed_builder::TypedBuilder;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("the credential seed must not be empty")]
    EmptySeed,
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
}

/// Settings injected into [`RegistryService`](crate::RegistryService).
#[derive(Clone, TypedBuilder)]
pub struct RegistryConfig {
    /// Server-wide secret mixed into every deletion credential.
    #[builder(setter(into))]
    pub seed: String,
    /// Upper bound on persist attempts for a generated token.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
}

impl RegistryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seed.is_empty() {
            return Err(ConfigError::EmptySeed);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("seed", &"..")
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}
