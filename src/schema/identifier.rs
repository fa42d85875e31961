//! SQL identifier checks
//!
//! Entity and column names end up interpolated into SQL text (table and
//! column lists cannot be bound as parameters), so every name is checked
//! against a plain identifier pattern first. Names are capped at MySQL's
//! 64-character identifier limit.

use std::sync::OnceLock;

use regex::Regex;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,63}$").expect("identifier pattern compiles")
    })
}

/// Returns true if `name` is safe to use as a table or column identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    identifier_pattern().is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(is_valid_identifier("Meteorology"));
        assert!(is_valid_identifier("cd_target_nm"));
        assert!(is_valid_identifier("_id"));
        assert!(is_valid_identifier("Phase1"));
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1st"));
        assert!(!is_valid_identifier("wafer id"));
        assert!(!is_valid_identifier("x`; DROP TABLE y"));
    }

    #[test]
    fn test_length_limit() {
        assert!(is_valid_identifier(&"a".repeat(64)));
        assert!(!is_valid_identifier(&"a".repeat(65)));
    }
}
