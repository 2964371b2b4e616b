//! Validation report types

use crate::result::CheckResult;
use crate::types::{Category, CheckMeta, ErrorMode, Status};
use scenecheck_core::Result;
use serde::Serialize;

/// The final result of one check in a run
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub error_mode: ErrorMode,
    /// Whether a fix was applied during the run
    pub fixed: bool,
    /// Latest result; `None` when the check could not run
    pub result: Option<CheckResult>,
    /// Why the check could not run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckOutcome {
    pub fn completed(meta: CheckMeta, mode: ErrorMode, result: CheckResult, fixed: bool) -> Self {
        Self {
            id: meta.id.to_string(),
            name: meta.name.to_string(),
            category: meta.category,
            error_mode: mode,
            fixed,
            result: Some(result),
            error: None,
        }
    }

    /// A check whose `check()` or `fix()` returned an error
    pub fn aborted(meta: CheckMeta, mode: ErrorMode, error: impl Into<String>, fixed: bool) -> Self {
        Self {
            id: meta.id.to_string(),
            name: meta.name.to_string(),
            category: meta.category,
            error_mode: mode,
            fixed,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Aborted checks count as failures at their configured mode
    pub fn status(&self) -> Status {
        match &self.result {
            Some(result) => result.status(),
            None => Status::Error(self.error_mode),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status().is_ok()
    }

    pub fn is_aborted(&self) -> bool {
        self.result.is_none()
    }

    pub fn is_degraded(&self) -> bool {
        self.result.as_ref().is_some_and(|r| r.is_degraded())
    }

    pub fn message(&self) -> &str {
        match (&self.result, &self.error) {
            (Some(result), _) => result.message(),
            (None, Some(error)) => error,
            (None, None) => "",
        }
    }
}

/// A complete validation report
#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    pub outcomes: Vec<CheckOutcome>,
}

impl ValidationReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the scene is valid (no check failed in error mode)
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    fn count_status(&self, status: Status) -> usize {
        self.outcomes.iter().filter(|o| o.status() == status).count()
    }

    pub fn error_count(&self) -> usize {
        self.count_status(Status::Error(ErrorMode::Error))
    }

    pub fn warning_count(&self) -> usize {
        self.count_status(Status::Error(ErrorMode::Warning))
    }

    pub fn degraded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_degraded()).count()
    }

    pub fn aborted_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_aborted()).count()
    }

    pub fn fixed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.fixed).count()
    }

    /// Outcomes that did not pass
    pub fn failing(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn get(&self, id: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.id == id)
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        let failing = self.failing().count();
        let mut text = if failing == 0 {
            format!("All {} check(s) passed", self.outcomes.len())
        } else {
            format!(
                "{} of {} check(s) failed: {} error(s), {} warning(s)",
                failing,
                self.outcomes.len(),
                self.error_count(),
                self.warning_count(),
            )
        };
        let aborted = self.aborted_count();
        if aborted > 0 {
            text.push_str(&format!(", {} could not run", aborted));
        }
        let degraded = self.degraded_count();
        if degraded > 0 {
            text.push_str(&format!(", {} skipped", degraded));
        }
        let fixed = self.fixed_count();
        if fixed > 0 {
            text.push_str(&format!(", {} fixed", fixed));
        }
        text.push('.');

        for outcome in self.failing() {
            text.push_str(&format!(
                "\n  [{}] {}: {}",
                outcome.status(),
                outcome.name,
                outcome.message()
            ));
        }
        text
    }

    /// Render as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Finding;
    use crate::types::Capabilities;
    use scenecheck_core::DagPath;

    fn meta(id: &'static str) -> CheckMeta {
        CheckMeta {
            id,
            name: id,
            category: Category::Scene,
            capabilities: Capabilities::new(true, true),
        }
    }

    fn outcome(id: &'static str, result: CheckResult, fixed: bool) -> CheckOutcome {
        CheckOutcome::completed(meta(id), ErrorMode::Error, result, fixed)
    }

    fn failing(mode: ErrorMode) -> CheckResult {
        CheckResult::from_findings(
            mode,
            vec![Finding::new(DagPath::parse("|PRP_rock").unwrap(), "bad")],
            "1 bad".into(),
        )
    }

    #[test]
    fn test_empty_report() {
        let report = ValidationReport::new();
        assert!(report.is_valid());
        assert_eq!(report.summary(), "All 0 check(s) passed.");
    }

    #[test]
    fn test_counts_and_summary() {
        let report = ValidationReport {
            outcomes: vec![
                outcome("prop_suffix", failing(ErrorMode::Error), false),
                outcome("unique_names", failing(ErrorMode::Warning), false),
                outcome("sound_offset", CheckResult::degraded("no sound node"), false),
                outcome("uninstance", CheckResult::passed(), true),
            ],
        };

        assert!(!report.is_valid());
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.degraded_count(), 1);
        assert_eq!(report.fixed_count(), 1);

        let summary = report.summary();
        assert!(summary.starts_with("2 of 4 check(s) failed: 1 error(s), 1 warning(s), 1 skipped, 1 fixed."));
        assert!(summary.contains("[error] prop_suffix: 1 bad"));
        assert!(summary.contains("[warning] unique_names: 1 bad"));
    }

    #[test]
    fn test_aborted_check_fails_at_its_mode() {
        let report = ValidationReport {
            outcomes: vec![
                CheckOutcome::aborted(
                    meta("sound_offset"),
                    ErrorMode::Warning,
                    "Tracking error: timeout",
                    false,
                ),
                outcome("uninstance", CheckResult::passed(), false),
            ],
        };

        assert!(report.is_valid());
        assert_eq!(report.aborted_count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(
            report.summary(),
            "1 of 2 check(s) failed: 0 error(s), 1 warning(s), 1 could not run.\n  \
             [warning] sound_offset: Tracking error: timeout"
        );
    }

    #[test]
    fn test_warnings_keep_report_valid() {
        let report = ValidationReport {
            outcomes: vec![outcome("unique_names", failing(ErrorMode::Warning), false)],
        };
        assert!(report.is_valid());
    }

    #[test]
    fn test_to_json() {
        let report = ValidationReport {
            outcomes: vec![
                outcome("prop_suffix", failing(ErrorMode::Error), false),
                CheckOutcome::aborted(meta("sound_offset"), ErrorMode::Error, "offline", false),
            ],
        };
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["outcomes"][0]["id"], "prop_suffix");
        assert_eq!(json["outcomes"][0]["category"], "Scene");
        assert_eq!(json["outcomes"][0]["error_mode"], "error");
        assert_eq!(json["outcomes"][0]["result"]["status"], "error");
        assert_eq!(json["outcomes"][0]["result"]["error_nodes"][0], "|PRP_rock");
        assert!(json["outcomes"][0].get("error").is_none());
        assert!(json["outcomes"][1]["result"].is_null());
        assert_eq!(json["outcomes"][1]["error"], "offline");
    }
}
