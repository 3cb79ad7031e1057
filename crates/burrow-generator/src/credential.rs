use burrow_core::{Credential, Token};
use sha2::{Digest, Sha256};
use std::fmt;
use typed_builder::TypedBuilder;

/// Issues deletion credentials.
///
/// A credential is the SHA-256 of the server seed, the target, the token and
/// the issue time in unix seconds, as lowercase hex. Without the seed it
/// cannot be recomputed from the public token and target. Mixing in the token
/// keeps credentials distinct across retries that land in the same second.
#[derive(Clone, TypedBuilder)]
pub struct CredentialGenerator {
    #[builder(setter(into))]
    seed: String,
}

impl CredentialGenerator {
    pub fn new(seed: impl Into<String>) -> Self {
        Self { seed: seed.into() }
    }

    /// Issues the credential for one persist attempt.
    ///
    /// Takes the candidate token on top of seed, target and time: retries of
    /// one create often land in the same second, and without the token they
    /// would all get the same credential and collide with each other.
    pub fn generate(&self, target: &str, token: &Token, now_unix_seconds: i64) -> Credential {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.as_bytes());
        hasher.update([0u8]);
        hasher.update(target.as_bytes());
        hasher.update([0u8]);
        hasher.update(token.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(now_unix_seconds.to_string().as_bytes());
        Credential::new(format!("{:x}", hasher.finalize()))
    }
}

impl fmt::Debug for CredentialGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialGenerator")
            .field("seed", &"..")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(s: &str) -> Token {
        Token::new_unchecked(s)
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let generator = CredentialGenerator::new("s1");
        let a = generator.generate("https://example.com", &token("abc"), 1_700_000_000);
        let b = generator.generate("https://example.com", &token("abc"), 1_700_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn renders_256_bit_lowercase_hex() {
        let generator = CredentialGenerator::builder().seed("s1").build();
        let credential = generator.generate("https://example.com", &token("abc"), 0);

        assert_eq!(credential.as_str().len(), 64);
        assert!(credential
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn every_input_changes_the_credential() {
        let generator = CredentialGenerator::new("s1");
        let base = generator.generate("https://example.com", &token("abc"), 100);

        assert_ne!(
            base,
            CredentialGenerator::new("s2").generate("https://example.com", &token("abc"), 100)
        );
        assert_ne!(
            base,
            generator.generate("https://example.org", &token("abc"), 100)
        );
        assert_ne!(
            base,
            generator.generate("https://example.com", &token("abd"), 100)
        );
        assert_ne!(
            base,
            generator.generate("https://example.com", &token("abc"), 101)
        );
    }

    #[test]
    fn seed_is_not_leaked() {
        let generator = CredentialGenerator::new("very-secret-seed");
        let credential = generator.generate("https://example.com", &token("abc"), 100);

        assert!(!format!("{generator:?}").contains("very-secret-seed"));
        assert!(!credential.as_str().contains("very-secret-seed"));
    }
}
