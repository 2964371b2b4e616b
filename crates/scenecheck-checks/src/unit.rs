//! The check unit: check, select, fix

use crate::result::{CheckResult, Finding};
use crate::types::{Capabilities, CheckMeta, ErrorMode};
use scenecheck_core::{DagPath, Result, SceneCheckError};
use scenecheck_scene::SceneGraph;
use tracing::{debug, info, warn};

/// What a rule saw in the scene
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation<P> {
    /// Offending elements, plus whatever the rule needs later to repair them
    Findings(Vec<Finding>, P),
    /// The rule could not run; reported as a degraded pass
    Degraded(String),
}

impl<P: Default> Evaluation<P> {
    pub fn findings(findings: Vec<Finding>) -> Self {
        Evaluation::Findings(findings, P::default())
    }
}

/// Counts of a fix batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixTally {
    pub applied: usize,
    pub skipped: usize,
}

impl FixTally {
    pub fn applied(&mut self) {
        self.applied += 1;
    }

    /// Record an element left alone on purpose
    pub fn skip(&mut self, check: &str, node: &DagPath, reason: &str) {
        warn!(check, node = %node, reason, "fix skipped");
        self.skipped += 1;
    }

    /// Record the outcome of one element's mutation. Per-element failures
    /// are logged and absorbed; anything else is returned.
    pub fn record(&mut self, check: &str, node: &DagPath, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => {
                self.applied();
                Ok(())
            }
            Err(e) if e.is_element_failure() => {
                self.skip(check, node, &e.to_string());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// A single validation rule.
///
/// `evaluate` must not mutate the scene. `repair` receives the offenders
/// and plan of the latest evaluation; it does not need to re-check, the
/// unit does that.
pub trait Rule {
    /// Data carried from `evaluate` to `repair`
    type Plan;

    fn meta(&self) -> CheckMeta;

    /// Capabilities may depend on configuration
    fn capabilities(&self) -> Capabilities {
        self.meta().capabilities
    }

    fn evaluate(&self, scene: &dyn SceneGraph) -> Result<Evaluation<Self::Plan>>;

    /// Summary message for `count` offenders
    fn summary(&self, count: usize) -> String;

    fn repair(
        &self,
        _scene: &mut dyn SceneGraph,
        _offenders: &[DagPath],
        _plan: &Self::Plan,
    ) -> Result<FixTally> {
        Err(SceneCheckError::Unsupported {
            check: self.meta().id.to_string(),
            operation: "fix".to_string(),
        })
    }
}

/// Object-safe view of a check unit, used by the registry and runners
pub trait Check {
    fn meta(&self) -> CheckMeta;

    fn capabilities(&self) -> Capabilities;

    fn error_mode(&self) -> ErrorMode;

    /// Result of the latest `check()`, if any
    fn last_result(&self) -> Option<&CheckResult>;

    /// Evaluate the scene and return a fresh result
    fn check(&mut self, scene: &dyn SceneGraph) -> Result<CheckResult>;

    /// Replace the selection with the latest error nodes
    fn select(&mut self, scene: &mut dyn SceneGraph) -> Result<()>;

    /// Repair the latest error nodes, then check again
    fn fix(&mut self, scene: &mut dyn SceneGraph) -> Result<CheckResult>;
}

struct Checked<P> {
    result: CheckResult,
    plan: Option<P>,
}

/// A rule plus the state of its latest run
pub struct CheckUnit<R: Rule> {
    rule: R,
    mode: ErrorMode,
    last: Option<Checked<R::Plan>>,
}

impl<R: Rule> CheckUnit<R> {
    pub fn new(rule: R, mode: ErrorMode) -> Self {
        Self {
            rule,
            mode,
            last: None,
        }
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    fn unsupported(&self, operation: &str) -> SceneCheckError {
        SceneCheckError::Unsupported {
            check: self.rule.meta().id.to_string(),
            operation: operation.to_string(),
        }
    }

    fn require_checked(&self) -> Result<&Checked<R::Plan>> {
        self.last
            .as_ref()
            .ok_or_else(|| SceneCheckError::NotChecked(self.rule.meta().id.to_string()))
    }
}

impl<R: Rule> Check for CheckUnit<R> {
    fn meta(&self) -> CheckMeta {
        self.rule.meta()
    }

    fn capabilities(&self) -> Capabilities {
        self.rule.capabilities()
    }

    fn error_mode(&self) -> ErrorMode {
        self.mode
    }

    fn last_result(&self) -> Option<&CheckResult> {
        self.last.as_ref().map(|c| &c.result)
    }

    fn check(&mut self, scene: &dyn SceneGraph) -> Result<CheckResult> {
        let id = self.rule.meta().id;
        // a failed evaluation leaves nothing to select or fix
        self.last = None;

        let checked = match self.rule.evaluate(scene)? {
            Evaluation::Findings(findings, plan) => {
                let message = self.rule.summary(findings.len());
                Checked {
                    result: CheckResult::from_findings(self.mode, findings, message),
                    plan: Some(plan),
                }
            }
            Evaluation::Degraded(reason) => {
                debug!(check = id, reason = %reason, "check degraded");
                Checked {
                    result: CheckResult::degraded(reason),
                    plan: None,
                }
            }
        };

        debug!(
            check = id,
            status = %checked.result.status(),
            errors = checked.result.error_nodes().len(),
            "check finished"
        );
        let result = checked.result.clone();
        self.last = Some(checked);
        Ok(result)
    }

    fn select(&mut self, scene: &mut dyn SceneGraph) -> Result<()> {
        if !self.rule.capabilities().selection {
            return Err(self.unsupported("select"));
        }
        let checked = self.require_checked()?;
        let nodes = checked.result.error_nodes();
        if nodes.is_empty() {
            return Ok(());
        }

        debug!(check = self.rule.meta().id, count = nodes.len(), "selecting error nodes");
        scene.set_selection(nodes)
    }

    fn fix(&mut self, scene: &mut dyn SceneGraph) -> Result<CheckResult> {
        if !self.rule.capabilities().fix {
            return Err(self.unsupported("fix"));
        }
        let checked = self.require_checked()?;
        let plan = match &checked.plan {
            Some(plan) if !checked.result.error_nodes().is_empty() => plan,
            _ => return Ok(checked.result.clone()),
        };

        let tally = self
            .rule
            .repair(scene, checked.result.error_nodes(), plan)?;
        info!(
            check = self.rule.meta().id,
            applied = tally.applied,
            skipped = tally.skipped,
            "fix applied"
        );

        self.check(&*scene)
    }
}
