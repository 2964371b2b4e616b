//! Structured node names
//!
//! Node names follow the `PREFIX_body_###` convention: underscore-delimited
//! tokens, where the first token is the category prefix and an all-digit
//! final token is a sequence suffix.

use crate::error::{Result, SceneCheckError};
use std::fmt;
use std::str::FromStr;

/// A node name split into its base and optional numeric suffix.
///
/// `PRP_rock_007` parses to base `PRP_rock`, suffix `7`, width `3`.
/// A name without an all-digit final token has no suffix and its base is
/// the whole name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeName {
    base: String,
    suffix: Option<u64>,
    width: usize,
}

impl NodeName {
    /// Parse a short node name
    pub fn parse(name: &str) -> Result<Self> {
        if !Self::is_valid(name) {
            return Err(SceneCheckError::InvalidName(name.to_string()));
        }

        if let Some((base, digits)) = name.rsplit_once('_') {
            if !base.is_empty() && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(value) = digits.parse::<u64>() {
                    return Ok(Self {
                        base: base.to_string(),
                        suffix: Some(value),
                        width: digits.len(),
                    });
                }
            }
        }

        Ok(Self {
            base: name.to_string(),
            suffix: None,
            width: 0,
        })
    }

    /// Whether `name` is usable as a node name: non-empty, made of ASCII
    /// letters, digits, `_` or `:` (namespaces), and not starting with a digit.
    pub fn is_valid(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn suffix(&self) -> Option<u64> {
        self.suffix
    }

    /// Number of digits in the suffix as written (0 without a suffix)
    pub fn width(&self) -> usize {
        self.width
    }

    /// The first underscore-delimited token (`PRP` for `PRP_rock_001`)
    pub fn prefix(&self) -> &str {
        self.base.split('_').next().unwrap_or(&self.base)
    }

    /// Same base with a new suffix, zero-padded to `width` digits
    pub fn with_suffix(&self, suffix: u64, width: usize) -> Self {
        let digits = suffix.to_string().len();
        Self {
            base: self.base.clone(),
            suffix: Some(suffix),
            width: width.max(digits),
        }
    }

    /// True when the suffix is present and written with exactly `width` digits
    pub fn is_padded_to(&self, width: usize) -> bool {
        self.suffix.is_some() && self.width == width.max(self.suffix.map_or(0, |s| s.to_string().len()))
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suffix {
            Some(n) => write!(f, "{}_{:0width$}", self.base, n, width = self.width),
            None => write!(f, "{}", self.base),
        }
    }
}

impl FromStr for NodeName {
    type Err = SceneCheckError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suffixed() {
        let name = NodeName::parse("PRP_rock_007").unwrap();
        assert_eq!(name.base(), "PRP_rock");
        assert_eq!(name.suffix(), Some(7));
        assert_eq!(name.width(), 3);
        assert_eq!(name.prefix(), "PRP");
    }

    #[test]
    fn test_parse_unsuffixed() {
        let name = NodeName::parse("PRP_rock").unwrap();
        assert_eq!(name.base(), "PRP_rock");
        assert_eq!(name.suffix(), None);
        assert_eq!(name.to_string(), "PRP_rock");
    }

    #[test]
    fn test_digits_without_underscore_are_not_a_suffix() {
        let name = NodeName::parse("rock7").unwrap();
        assert_eq!(name.suffix(), None);
        assert_eq!(name.base(), "rock7");
    }

    #[test]
    fn test_trailing_underscore() {
        let name = NodeName::parse("rock_").unwrap();
        assert_eq!(name.suffix(), None);
        assert_eq!(name.base(), "rock_");
    }

    #[test]
    fn test_with_suffix_pads() {
        let name = NodeName::parse("PRP_rock_1").unwrap();
        assert_eq!(name.with_suffix(2, 3).to_string(), "PRP_rock_002");
        assert_eq!(name.with_suffix(1234, 3).to_string(), "PRP_rock_1234");
    }

    #[test]
    fn test_is_padded_to() {
        assert!(NodeName::parse("a_001").unwrap().is_padded_to(3));
        assert!(!NodeName::parse("a_1").unwrap().is_padded_to(3));
        assert!(NodeName::parse("a_1000").unwrap().is_padded_to(3));
        assert!(!NodeName::parse("a").unwrap().is_padded_to(3));
    }

    #[test]
    fn test_invalid_names() {
        assert!(NodeName::parse("").is_err());
        assert!(NodeName::parse("1rock").is_err());
        assert!(NodeName::parse("a|b").is_err());
        assert!(NodeName::parse("has space").is_err());
        assert!(NodeName::parse("ns:PRP_rock").is_ok());
    }

    #[test]
    fn test_display_roundtrip() {
        for raw in ["PRP_rock_1", "PRP_rock_007", "SET_a", "CHR_hero_0012"] {
            assert_eq!(NodeName::parse(raw).unwrap().to_string(), raw);
        }
    }
}
