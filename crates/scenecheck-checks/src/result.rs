//! Check results

use crate::types::{ErrorMode, Status, Validation};
use scenecheck_core::DagPath;
use serde::Serialize;

/// Per-node error strings, kept apart from the summary message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorLog {
    entries: Vec<String>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One offending element found by a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub node: DagPath,
    /// Entry for the error log
    pub detail: String,
}

impl Finding {
    pub fn new(node: DagPath, detail: impl Into<String>) -> Self {
        Self {
            node,
            detail: detail.into(),
        }
    }
}

/// The result of one `check()`.
///
/// Built only through the constructors below, which keep `status` and
/// `error_nodes` in step: the status is `Ok` exactly when there are no
/// error nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    status: Status,
    error_nodes: Vec<DagPath>,
    message: String,
    log: ErrorLog,
    validation: Validation,
}

impl CheckResult {
    pub fn passed() -> Self {
        Self {
            status: Status::Ok,
            error_nodes: Vec::new(),
            message: String::new(),
            log: ErrorLog::new(),
            validation: Validation::Validated,
        }
    }

    /// A pass that could not be verified
    pub fn degraded(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            message: format!("Skipped: {}", reason),
            validation: Validation::Degraded { reason },
            ..Self::passed()
        }
    }

    /// Result for a set of findings. Empty findings pass.
    pub fn from_findings(mode: ErrorMode, findings: Vec<Finding>, message: String) -> Self {
        if findings.is_empty() {
            return Self::passed();
        }

        let mut log = ErrorLog::new();
        let mut error_nodes = Vec::with_capacity(findings.len());
        for finding in findings {
            log.push(finding.detail);
            if !error_nodes.contains(&finding.node) {
                error_nodes.push(finding.node);
            }
        }

        Self {
            status: Status::Error(mode),
            error_nodes,
            message,
            log,
            validation: Validation::Validated,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    pub fn error_nodes(&self) -> &[DagPath] {
        &self.error_nodes
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn log(&self) -> &ErrorLog {
        &self.log
    }

    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    pub fn is_degraded(&self) -> bool {
        self.validation.is_degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(raw: &str) -> DagPath {
        DagPath::parse(raw).unwrap()
    }

    #[test]
    fn test_passed() {
        let result = CheckResult::passed();
        assert!(result.is_ok());
        assert!(result.error_nodes().is_empty());
        assert!(!result.is_degraded());
    }

    #[test]
    fn test_degraded_is_ok() {
        let result = CheckResult::degraded("no tracker configured");
        assert!(result.is_ok());
        assert!(result.error_nodes().is_empty());
        assert!(result.is_degraded());
        assert!(result.message().contains("no tracker"));
    }

    #[test]
    fn test_findings_set_status() {
        let result = CheckResult::from_findings(
            ErrorMode::Warning,
            vec![
                Finding::new(p("|a"), "a is wrong"),
                Finding::new(p("|b"), "b is wrong"),
                Finding::new(p("|a"), "a is wrong twice"),
            ],
            "2 wrong".into(),
        );
        assert_eq!(result.status(), Status::Error(ErrorMode::Warning));
        assert_eq!(result.error_nodes(), &[p("|a"), p("|b")]);
        assert_eq!(result.log().len(), 3);
        assert_eq!(result.message(), "2 wrong");
    }

    #[test]
    fn test_empty_findings_pass() {
        let result = CheckResult::from_findings(ErrorMode::Error, Vec::new(), "0 wrong".into());
        assert_eq!(result, CheckResult::passed());
    }

    #[test]
    fn test_serialize() {
        let result = CheckResult::from_findings(
            ErrorMode::Error,
            vec![Finding::new(p("|grp|PRP_rock"), "bad")],
            "1 bad".into(),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error_nodes"][0], "|grp|PRP_rock");
        assert_eq!(json["log"][0], "bad");
        assert_eq!(json["validation"]["state"], "validated");
    }
}
