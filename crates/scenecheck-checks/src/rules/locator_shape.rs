//! Locator shapes are named after their transform

use crate::naming::{apply_renames, canonical_ls, Rename};
use crate::result::Finding;
use crate::types::{Capabilities, Category, CheckMeta};
use crate::unit::{Evaluation, FixTally, Rule};
use scenecheck_core::{DagPath, Result};
use scenecheck_scene::{NodeKind, SceneGraph};

const META: CheckMeta = CheckMeta {
    id: "locator_shape_name",
    name: "Locator shape rename",
    category: Category::Scene,
    capabilities: Capabilities::new(true, true),
};

pub struct LocatorShapeName;

/// `{transform}Shape`, or `None` for a shape without a parent
fn expected_name(shape: &DagPath) -> Option<String> {
    shape
        .parent()
        .map(|transform| format!("{}Shape", transform.leaf()))
}

impl Rule for LocatorShapeName {
    type Plan = ();

    fn meta(&self) -> CheckMeta {
        META
    }

    fn evaluate(&self, scene: &dyn SceneGraph) -> Result<Evaluation<()>> {
        let findings = canonical_ls(scene, NodeKind::Locator)
            .into_iter()
            .filter(|shape| expected_name(shape).is_some_and(|name| name != shape.leaf()))
            .map(|shape| {
                let detail = format!("{} is missing right shape name", shape);
                Finding::new(shape, detail)
            })
            .collect();
        Ok(Evaluation::findings(findings))
    }

    fn summary(&self, count: usize) -> String {
        format!("{} locator(s) without right shape name", count)
    }

    fn repair(
        &self,
        scene: &mut dyn SceneGraph,
        offenders: &[DagPath],
        _plan: &(),
    ) -> Result<FixTally> {
        let renames = offenders
            .iter()
            .filter_map(|shape| expected_name(shape).map(|name| Rename::new(shape.clone(), name)))
            .collect();

        let mut tally = FixTally::default();
        apply_renames(scene, META.id, renames, &mut tally)?;
        Ok(tally)
    }
}
