use subtle::ConstantTimeEq;

/// Compares two credentials without short-circuiting on the first mismatch.
pub(crate) fn credentials_match(stored: &[u8], presented: &[u8]) -> bool {
    stored.ct_eq(presented).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_only_identical_bytes() {
        assert!(credentials_match(b"abc", b"abc"));
        assert!(!credentials_match(b"abc", b"abd"));
        assert!(!credentials_match(b"abc", b"abcd"));
        assert!(!credentials_match(b"", b"abc"));
    }
}
