//! Sequence keys.
//!
//! Lazy pipelines carry `(Key, value)` pairs so that keyed terminals
//! (`to_assoc`) and key-aware stages (`filter_with_key`) have something to
//! work with. Eager collections renumber keys to `Int(0..n)` after every
//! structural operation; associations keep whatever keys they were built
//! with, integer or string.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A sequence key: either a position-style integer or a string.
///
/// Ordering sorts all integer keys before all string keys; within a
/// variant the natural order applies. This is the order `sort_keys` uses
/// for mixed-key associations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    /// The integer payload, if this is an `Int` key.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(i) => Some(*i),
            Key::Str(_) => None,
        }
    }

    /// The string payload, if this is a `Str` key.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Int(_) => None,
            Key::Str(s) => Some(s),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Key::Int(v)
    }
}

impl From<usize> for Key {
    fn from(v: usize) -> Self {
        Key::Int(v as i64)
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Key::Str(v.to_string())
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Key::Str(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_keys_sort_before_string_keys() {
        let mut keys = vec![Key::from("b"), Key::from(2i64), Key::from("a"), Key::from(1i64)];
        keys.sort();
        assert_eq!(
            keys,
            vec![Key::from(1i64), Key::from(2i64), Key::from("a"), Key::from("b")]
        );
    }

    #[test]
    fn display_is_bare() {
        assert_eq!(Key::from(7i64).to_string(), "7");
        assert_eq!(Key::from("food").to_string(), "food");
    }
}
