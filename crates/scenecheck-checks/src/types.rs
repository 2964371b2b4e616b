//! Check identity, status and capability types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity a failing check reports with. Chosen by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    Warning,
    #[default]
    Error,
}

impl fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorMode::Warning => write!(f, "warning"),
            ErrorMode::Error => write!(f, "error"),
        }
    }
}

impl FromStr for ErrorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warning" | "warn" => Ok(ErrorMode::Warning),
            "error" => Ok(ErrorMode::Error),
            other => Err(format!("unknown error mode '{}'", other)),
        }
    }
}

/// Outcome of the most recent check. `Ok` is the only passing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Status {
    Ok,
    Error(ErrorMode),
}

impl Status {
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }

    pub fn error_mode(&self) -> Option<ErrorMode> {
        match self {
            Status::Ok => None,
            Status::Error(mode) => Some(*mode),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "ok"),
            Status::Error(mode) => write!(f, "{}", mode),
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.to_string()
    }
}

/// Whether a passing result was actually verified
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Validation {
    Validated,
    /// A dependency was missing (no sound node, no tracker, incomplete
    /// shot data) and the rule could not run
    Degraded { reason: String },
}

impl Validation {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Validation::Degraded { .. })
    }
}

/// Optional operations a check supports beyond `check`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub selection: bool,
    pub fix: bool,
}

impl Capabilities {
    pub const CHECK_ONLY: Capabilities = Capabilities {
        selection: false,
        fix: false,
    };

    pub const fn new(selection: bool, fix: bool) -> Self {
        Self { selection, fix }
    }
}

/// Grouping used by runners to list checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Shots,
    Scene,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Shots => write!(f, "Shots"),
            Category::Scene => write!(f, "Scene"),
        }
    }
}

/// Static identity of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckMeta {
    /// Stable id used in configuration
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    pub category: Category,
    pub capabilities: Capabilities,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mode_parse() {
        assert_eq!("warning".parse::<ErrorMode>().unwrap(), ErrorMode::Warning);
        assert_eq!(" ERROR ".parse::<ErrorMode>().unwrap(), ErrorMode::Error);
        assert!("fatal".parse::<ErrorMode>().is_err());
    }

    #[test]
    fn test_error_mode_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: ErrorMode,
        }
        let w: Wrapper = toml::from_str("mode = \"warning\"").unwrap();
        assert_eq!(w.mode, ErrorMode::Warning);
    }

    #[test]
    fn test_status() {
        assert!(Status::Ok.is_ok());
        assert_eq!(Status::Ok.error_mode(), None);
        let failed = Status::Error(ErrorMode::Warning);
        assert!(!failed.is_ok());
        assert_eq!(failed.to_string(), "warning");
        assert_eq!(serde_json::to_string(&failed).unwrap(), "\"warning\"");
    }

    #[test]
    fn test_validation_serde() {
        let degraded = Validation::Degraded {
            reason: "no sound node".into(),
        };
        assert!(degraded.is_degraded());
        let json = serde_json::to_value(&degraded).unwrap();
        assert_eq!(json["state"], "degraded");
        assert_eq!(json["reason"], "no sound node");
    }
}
