use crate::error::TokenError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The public short identifier of a link.
///
/// Tokens double as file names in the file-backed store, so caller-chosen
/// tokens are restricted to 1-64 characters of `[a-zA-Z0-9_-]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

pub const MIN_LENGTH: usize = 1;
pub const MAX_LENGTH: usize = 64;

impl Token {
    /// Creates a new `Token` after validating the input.
    pub fn new(token: impl Into<String>) -> Result<Self, TokenError> {
        let token = token.into();
        Self::validate(&token)?;
        Ok(Self(token))
    }

    /// Creates a `Token` without validation.
    ///
    /// Use this only for tokens produced by trusted internal sources
    /// (the token generator, or rows read back from a store).
    pub fn new_unchecked(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Builds the full short URL under the given service URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(token: &str) -> Result<(), TokenError> {
        if token.len() < MIN_LENGTH || token.len() > MAX_LENGTH {
            return Err(TokenError::Length {
                min: MIN_LENGTH,
                max: MAX_LENGTH,
                len: token.len(),
            });
        }

        if !token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(TokenError::Charset(token.to_string()));
        }

        Ok(())
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
