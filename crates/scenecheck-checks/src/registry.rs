//! Check registry for building and running the enabled checks

use crate::config::CheckConfig;
use crate::report::{CheckOutcome, ValidationReport};
use crate::result::CheckResult;
use crate::rules::{
    DanglingReferences, LocatorPrefix, LocatorShapeName, PropSuffix, ShotFrameRange, SoundOffset,
    Uninstance, UniqueNames,
};
use crate::types::Category;
use crate::unit::{Check, CheckUnit, Rule};
use scenecheck_core::SceneCheckError;
use scenecheck_scene::SceneGraph;
use scenecheck_tracking::ShotContext;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ids of the built-in checks, in run order.
///
/// Checks that rename transforms run before `locator_shape_name`, so shape
/// names are settled after the transforms they follow.
pub const BUILTIN_CHECKS: [&str; 8] = [
    "shot_frame_range",
    "sound_offset",
    "uninstance",
    "locator_prefix",
    "prop_suffix",
    "unique_names",
    "locator_shape_name",
    "dangling_references",
];

/// Registry that holds the check units of a session
#[derive(Default)]
pub struct CheckRegistry {
    checks: Vec<Box<dyn Check>>,
}

impl CheckRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every enabled built-in check
    pub fn from_config(config: &CheckConfig, context: Arc<ShotContext>) -> Self {
        for id in config.checks.keys() {
            if !BUILTIN_CHECKS.contains(&id.as_str()) {
                warn!(check = %id, "configuration names an unknown check");
            }
        }

        let naming = &config.naming;
        let mut registry = Self::new();
        registry.add_rule(config, ShotFrameRange::new(context.clone()));
        registry.add_rule(config, SoundOffset::new(context));
        registry.add_rule(config, Uninstance);
        registry.add_rule(
            config,
            LocatorPrefix::new(naming.locator_prefixes.clone(), naming.default_prefix.clone()),
        );
        registry.add_rule(
            config,
            PropSuffix::new(
                naming.prop_prefix.clone(),
                naming.suffix_width,
                naming.camera_exclusions.clone(),
            ),
        );
        registry.add_rule(config, UniqueNames::new(naming.suffix_width));
        registry.add_rule(config, LocatorShapeName);
        registry.add_rule(config, DanglingReferences);
        registry
    }

    fn add_rule<R: Rule + 'static>(&mut self, config: &CheckConfig, rule: R) {
        let id = rule.meta().id;
        if !config.is_enabled(id) {
            debug!(check = id, "check disabled");
            return;
        }
        self.register(Box::new(CheckUnit::new(rule, config.error_mode_for(id))));
    }

    /// Register a check directly
    pub fn register(&mut self, check: Box<dyn Check>) {
        self.checks.push(check);
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.meta().id).collect()
    }

    pub fn get(&self, id: &str) -> Option<&dyn Check> {
        self.checks
            .iter()
            .find(|c| c.meta().id == id)
            .map(|c| c.as_ref())
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut (dyn Check + 'static)> {
        self.checks
            .iter_mut()
            .find(|c| c.meta().id == id)
            .map(|c| c.as_mut())
    }

    /// Get checks in a category
    pub fn by_category(&self, category: Category) -> Vec<&dyn Check> {
        self.checks
            .iter()
            .filter(|c| c.meta().category == category)
            .map(|c| c.as_ref())
            .collect()
    }

    /// Run every check once.
    ///
    /// A check that returns an error is recorded as aborted and the rest
    /// still run.
    pub fn check_all(&mut self, scene: &dyn SceneGraph) -> ValidationReport {
        let mut report = ValidationReport::new();
        for check in &mut self.checks {
            let outcome = match check.check(scene) {
                Ok(result) => completed(&**check, result, false),
                Err(e) => aborted(&**check, e, false),
            };
            report.outcomes.push(outcome);
        }
        report
    }

    /// Run every check, fixing the ones that fail and support it.
    ///
    /// A fix can invalidate a check that ran before it, so when anything
    /// was fixed every check runs once more and the report holds those
    /// final results.
    pub fn fix_all(&mut self, scene: &mut dyn SceneGraph) -> ValidationReport {
        let mut report = ValidationReport::new();
        for check in &mut self.checks {
            let outcome = match check.check(&*scene) {
                Ok(result) if !result.is_ok() && check.capabilities().fix => {
                    match check.fix(scene) {
                        Ok(result) => completed(&**check, result, true),
                        Err(e) => aborted(&**check, e, false),
                    }
                }
                Ok(result) => completed(&**check, result, false),
                Err(e) => aborted(&**check, e, false),
            };
            report.outcomes.push(outcome);
        }

        if report.fixed_count() == 0 {
            return report;
        }
        debug!(fixed = report.fixed_count(), "re-checking after fixes");
        for (check, outcome) in self.checks.iter_mut().zip(report.outcomes.iter_mut()) {
            if outcome.is_aborted() {
                continue;
            }
            let fixed = outcome.fixed;
            *outcome = match check.check(&*scene) {
                Ok(result) => completed(&**check, result, fixed),
                Err(e) => aborted(&**check, e, fixed),
            };
        }
        report
    }

    /// Get the number of registered checks
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

fn completed(check: &dyn Check, result: CheckResult, fixed: bool) -> CheckOutcome {
    CheckOutcome::completed(check.meta(), check.error_mode(), result, fixed)
}

fn aborted(check: &dyn Check, error: SceneCheckError, fixed: bool) -> CheckOutcome {
    warn!(check = check.meta().id, error = %error, "check could not run");
    CheckOutcome::aborted(check.meta(), check.error_mode(), error.to_string(), fixed)
}
