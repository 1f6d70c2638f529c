// File: hppguard-core/src/sanitizers/key_guard.rs
//! Classification of individual object keys.
//!
//! A key is unsafe when it could reach an object's inheritance chain, smuggle
//! a terminator, blow past the length ceiling, or is made only of path
//! punctuation. Unsafe keys are dropped silently by every caller.
//!
//! License: MIT OR APACHE 2.0

use std::collections::HashSet;

use once_cell::sync::Lazy;

static RESERVED_KEYS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut set = HashSet::new();
    set.extend(["__proto__", "prototype", "constructor"]);
    set
});

/// Returns `true` if `key` is one of the inheritance-chain names.
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(key)
}

/// Checks whether `key` may be written into an output tree.
///
/// # Arguments
///
/// * `key` - The raw key.
/// * `max_key_length` - Ceiling on the key length, counted in characters.
///
/// # Returns
///
/// `Some(key)` when the key is safe, `None` when it must be dropped.
pub fn is_safe_key(key: &str, max_key_length: usize) -> Option<&str> {
    if key.is_empty() || is_reserved_key(key) || key.contains('\0') {
        return None;
    }

    if key.chars().count() > max_key_length {
        return None;
    }

    // A lone "." is a legitimate literal key; "..", "[]", ".[" etc. are not.
    let punctuation_only = key.chars().all(|c| matches!(c, '.' | '[' | ']'));
    if punctuation_only && key.len() > 1 {
        return None;
    }

    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inheritance_chain_names() {
        for key in ["__proto__", "prototype", "constructor"] {
            assert_eq!(is_safe_key(key, 200), None, "{key} should be rejected");
        }
        // Only exact matches are reserved.
        assert_eq!(is_safe_key("constructors", 200), Some("constructors"));
        assert_eq!(is_safe_key("__PROTO__", 200), Some("__PROTO__"));
    }

    #[test]
    fn rejects_null_bytes() {
        assert_eq!(is_safe_key("na\0me", 200), None);
    }

    #[test]
    fn enforces_length_in_characters() {
        assert_eq!(is_safe_key("abcd", 4), Some("abcd"));
        assert_eq!(is_safe_key("abcde", 4), None);
        // Four characters, twelve bytes.
        assert_eq!(is_safe_key("ééé€", 4), Some("ééé€"));
    }

    #[test]
    fn punctuation_only_keys() {
        assert_eq!(is_safe_key(".", 200), Some("."));
        assert_eq!(is_safe_key("[", 200), Some("["));
        assert_eq!(is_safe_key("..", 200), None);
        assert_eq!(is_safe_key("[]", 200), None);
        assert_eq!(is_safe_key("].[", 200), None);
        assert_eq!(is_safe_key("a.", 200), Some("a."));
    }

    #[test]
    fn rejects_empty_key() {
        assert_eq!(is_safe_key("", 200), None);
    }
}
