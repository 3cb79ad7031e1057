use crate::TokenGenerator;
use burrow_core::Token;
use xxhash_rust::xxh64::xxh64;

/// Derives tokens from a 64-bit xxHash of the target.
///
/// The hash is rendered as lowercase hex without zero padding, so tokens are
/// at most 16 characters and usually shorter by a digit or so.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashTokenGenerator;

impl HashTokenGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl TokenGenerator for HashTokenGenerator {
    fn generate(&self, target: &str, salt: u64) -> Token {
        let hash = xxh64(target.as_bytes(), salt);
        Token::new_unchecked(format!("{hash:x}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_target_same_token() {
        let generator = HashTokenGenerator::new();
        let first = generator.generate("https://example.com/a", 0);
        let second = generator.generate("https://example.com/a", 0);
        assert_eq!(first, second);
    }

    #[test]
    fn different_targets_differ() {
        let generator = HashTokenGenerator::new();
        let a = generator.generate("https://example.com/a", 0);
        let b = generator.generate("https://example.com/b", 0);
        assert_ne!(a, b);
    }

    #[test]
    fn salt_changes_token() {
        let generator = HashTokenGenerator::new();
        let base = generator.generate("https://example.com/a", 0);
        let salted = generator.generate("https://example.com/a", 7);
        assert_ne!(base, salted);
    }

    #[test]
    fn renders_lowercase_unpadded_hex() {
        let generator = HashTokenGenerator::new();
        let token = generator.generate("https://example.com", 0);
        let expected = format!("{:x}", xxh64(b"https://example.com", 0));

        assert_eq!(token.as_str(), expected);
        assert!(!token.as_str().starts_with('0') || token.as_str() == "0");
        assert!(token.as_str().len() <= 16);
        assert!(token
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn generated_tokens_pass_validation() {
        let generator = HashTokenGenerator::new();
        for salt in 0..32 {
            let token = generator.generate("https://example.com/long/path?q=1", salt);
            assert!(Token::new(token.as_str()).is_ok());
        }
    }
}
