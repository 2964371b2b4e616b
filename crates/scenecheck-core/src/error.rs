//! Error types for scenecheck

use thiserror::Error;

/// The main error type for scenecheck operations
#[derive(Debug, Error)]
pub enum SceneCheckError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node is locked: {0}")]
    NodeLocked(String),

    #[error("Name collision: '{name}' already exists under {parent}")]
    NameCollision { name: String, parent: String },

    #[error("Invalid node name: {0:?}")]
    InvalidName(String),

    #[error("Invalid DAG path: {0:?}")]
    InvalidPath(String),

    #[error("Scene error: {0}")]
    SceneError(String),

    #[error("Tracking error: {0}")]
    TrackingError(String),

    #[error("Check '{0}' has not been run yet")]
    NotChecked(String),

    #[error("Check '{check}' does not support {operation}")]
    Unsupported { check: String, operation: String },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("JSON error: {0}")]
    JsonError(String),
}

impl SceneCheckError {
    /// Whether this error concerns a single element and can be skipped
    /// while the rest of a fix batch carries on.
    pub fn is_element_failure(&self) -> bool {
        matches!(
            self,
            SceneCheckError::NodeNotFound(_)
                | SceneCheckError::NodeLocked(_)
                | SceneCheckError::NameCollision { .. }
                | SceneCheckError::InvalidName(_)
        )
    }
}

/// Result type alias for scenecheck operations
pub type Result<T> = std::result::Result<T, SceneCheckError>;

impl From<toml::de::Error> for SceneCheckError {
    fn from(err: toml::de::Error) -> Self {
        SceneCheckError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for SceneCheckError {
    fn from(err: toml::ser::Error) -> Self {
        SceneCheckError::TomlSerError(err.to_string())
    }
}

impl From<serde_json::Error> for SceneCheckError {
    fn from(err: serde_json::Error) -> Self {
        SceneCheckError::JsonError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_failures() {
        assert!(SceneCheckError::NodeLocked("|a".into()).is_element_failure());
        assert!(SceneCheckError::NameCollision {
            name: "a".into(),
            parent: "|".into()
        }
        .is_element_failure());
        assert!(!SceneCheckError::TrackingError("timeout".into()).is_element_failure());
        assert!(!SceneCheckError::NotChecked("x".into()).is_element_failure());
    }

    #[test]
    fn test_toml_error_conversion() {
        let err: SceneCheckError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(matches!(err, SceneCheckError::TomlParseError(_)));
    }
}
