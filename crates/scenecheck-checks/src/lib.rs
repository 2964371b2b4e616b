//! scenecheck checks - validation rules that check, select and fix
//!
//! Every rule runs through a `CheckUnit`:
//! - `check()` inspects the scene and caches a fresh `CheckResult`
//! - `select()` puts the latest error nodes in the scene selection
//! - `fix()` repairs them, logging and skipping elements it cannot fix,
//!   then checks again and returns the refreshed result
//!
//! `CheckRegistry` builds the enabled rules from a layered `CheckConfig`
//! and a shared `ShotContext`, and runs them into a `ValidationReport`.

mod config;
mod diff;
mod naming;
mod registry;
mod report;
mod result;
pub mod rules;
mod types;
mod unit;

pub use config::{
    CheckConfig, CheckConfigFile, CheckOverride, DefaultsSection, NamingConfig, NamingSection,
    ENV_DISABLE, ENV_ERROR_MODE,
};
pub use diff::{diff_scenes, preview_fix, FixPreview, SceneChange};
pub use registry::{CheckRegistry, BUILTIN_CHECKS};
pub use report::{CheckOutcome, ValidationReport};
pub use result::{CheckResult, ErrorLog, Finding};
pub use types::{Capabilities, Category, CheckMeta, ErrorMode, Status, Validation};
pub use unit::{Check, CheckUnit, Evaluation, FixTally, Rule};
