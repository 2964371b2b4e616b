//! Layered check configuration
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `SCENECHECK_ERROR_MODE`, `SCENECHECK_DISABLE`
//! 2. Project-local: `.scenecheck/config.toml`
//! 3. Global: `~/.scenecheck/config.toml`

use crate::types::ErrorMode;
use scenecheck_core::{NodeName, Result, SceneCheckError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENV_ERROR_MODE: &str = "SCENECHECK_ERROR_MODE";
pub const ENV_DISABLE: &str = "SCENECHECK_DISABLE";

/// Per-check overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckOverride {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub error_mode: Option<ErrorMode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsSection {
    #[serde(default)]
    pub error_mode: Option<ErrorMode>,
}

/// Naming settings as written in a file; unset keys fall through to the
/// layer below
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamingSection {
    #[serde(default)]
    pub locator_prefixes: Option<Vec<String>>,
    #[serde(default)]
    pub default_prefix: Option<String>,
    #[serde(default)]
    pub prop_prefix: Option<String>,
    #[serde(default)]
    pub suffix_width: Option<usize>,
    #[serde(default)]
    pub camera_exclusions: Option<Vec<String>>,
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConfigFile {
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default)]
    pub checks: BTreeMap<String, CheckOverride>,
    #[serde(default)]
    pub naming: NamingSection,
}

/// Resolved naming settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConfig {
    /// Accepted first tokens of locator transform names
    pub locator_prefixes: Vec<String>,
    /// Prefix added by the locator prefix fix; no fix without it
    pub default_prefix: Option<String>,
    /// Transforms starting with this are props
    pub prop_prefix: String,
    /// Digits of generated suffixes
    pub suffix_width: usize,
    /// Transform names never treated as props
    pub camera_exclusions: Vec<String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            locator_prefixes: ["SET", "SUB", "PRP", "CHR"].map(String::from).to_vec(),
            default_prefix: None,
            prop_prefix: "PRP".to_string(),
            suffix_width: 3,
            camera_exclusions: ["front", "persp", "side", "top"].map(String::from).to_vec(),
        }
    }
}

/// Resolved configuration with environment overrides applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckConfig {
    pub error_mode: ErrorMode,
    pub checks: BTreeMap<String, CheckOverride>,
    pub naming: NamingConfig,
}

impl CheckConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = CheckConfigFile::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                Self::merge_into(&mut config, global);
            }
        }

        let local_path = PathBuf::from(".scenecheck/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            Self::merge_into(&mut config, local);
        }

        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        Self::resolve(config)
    }

    /// Load config from a specific file path only, plus the environment
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        Self::resolve(config)
    }

    /// Parse a config from TOML, without environment overrides
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::resolve(Self::parse(content, "<string>")?)
    }

    /// Stack `layers` lowest first, then apply overrides read through `env`
    pub fn from_layers<F>(layers: Vec<CheckConfigFile>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = CheckConfigFile::default();
        for layer in layers {
            Self::merge_into(&mut config, layer);
        }
        Self::apply_env_overrides(&mut config, env)?;
        Self::resolve(config)
    }

    pub fn is_enabled(&self, check_id: &str) -> bool {
        self.checks
            .get(check_id)
            .and_then(|c| c.enabled)
            .unwrap_or(true)
    }

    /// Error mode for a check: its override, else the default
    pub fn error_mode_for(&self, check_id: &str) -> ErrorMode {
        self.checks
            .get(check_id)
            .and_then(|c| c.error_mode)
            .unwrap_or(self.error_mode)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".scenecheck").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<CheckConfigFile> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    fn parse(content: &str, origin: &str) -> Result<CheckConfigFile> {
        toml::from_str(content).map_err(|e| {
            SceneCheckError::ConfigError(format!("Failed to parse config {}: {}", origin, e))
        })
    }

    pub fn merge_into(base: &mut CheckConfigFile, overlay: CheckConfigFile) {
        if overlay.defaults.error_mode.is_some() {
            base.defaults.error_mode = overlay.defaults.error_mode;
        }

        for (id, check) in overlay.checks {
            let entry = base.checks.entry(id).or_default();
            if check.enabled.is_some() {
                entry.enabled = check.enabled;
            }
            if check.error_mode.is_some() {
                entry.error_mode = check.error_mode;
            }
        }

        let naming = overlay.naming;
        if naming.locator_prefixes.is_some() {
            base.naming.locator_prefixes = naming.locator_prefixes;
        }
        if naming.default_prefix.is_some() {
            base.naming.default_prefix = naming.default_prefix;
        }
        if naming.prop_prefix.is_some() {
            base.naming.prop_prefix = naming.prop_prefix;
        }
        if naming.suffix_width.is_some() {
            base.naming.suffix_width = naming.suffix_width;
        }
        if naming.camera_exclusions.is_some() {
            base.naming.camera_exclusions = naming.camera_exclusions;
        }
    }

    fn apply_env_overrides<F>(config: &mut CheckConfigFile, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = env(ENV_ERROR_MODE) {
            let mode = mode
                .parse::<ErrorMode>()
                .map_err(|e| SceneCheckError::ConfigError(format!("{}: {}", ENV_ERROR_MODE, e)))?;
            debug!(mode = %mode, "error mode from environment");
            config.defaults.error_mode = Some(mode);
        }

        if let Some(list) = env(ENV_DISABLE) {
            for id in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                debug!(check = id, "disabled from environment");
                config.checks.entry(id.to_string()).or_default().enabled = Some(false);
            }
        }
        Ok(())
    }

    fn resolve(file: CheckConfigFile) -> Result<Self> {
        let defaults = NamingConfig::default();
        let naming = NamingConfig {
            locator_prefixes: file.naming.locator_prefixes.unwrap_or(defaults.locator_prefixes),
            default_prefix: file.naming.default_prefix,
            prop_prefix: file.naming.prop_prefix.unwrap_or(defaults.prop_prefix),
            suffix_width: file.naming.suffix_width.unwrap_or(defaults.suffix_width),
            camera_exclusions: file
                .naming
                .camera_exclusions
                .unwrap_or(defaults.camera_exclusions),
        };

        if !(1..=9).contains(&naming.suffix_width) {
            return Err(SceneCheckError::ConfigError(format!(
                "suffix_width must be between 1 and 9, got {}",
                naming.suffix_width
            )));
        }
        if let Some(prefix) = &naming.default_prefix {
            if !NodeName::is_valid(prefix) || !naming.locator_prefixes.contains(prefix) {
                return Err(SceneCheckError::ConfigError(format!(
                    "default_prefix '{}' must be a valid name listed in locator_prefixes",
                    prefix
                )));
            }
        }

        Ok(Self {
            error_mode: file.defaults.error_mode.unwrap_or_default(),
            checks: file.checks,
            naming,
        })
    }
}
