//! Instanced nodes are turned into independent copies

use crate::result::Finding;
use crate::types::{Capabilities, Category, CheckMeta};
use crate::unit::{Evaluation, FixTally, Rule};
use scenecheck_core::{DagPath, Result};
use scenecheck_scene::{NodeKind, SceneGraph};
use tracing::info;

const META: CheckMeta = CheckMeta {
    id: "uninstance",
    name: "Un-instance",
    category: Category::Scene,
    capabilities: Capabilities::new(true, true),
};

const DAG_KINDS: [NodeKind; 4] = [
    NodeKind::Transform,
    NodeKind::Locator,
    NodeKind::Mesh,
    NodeKind::Camera,
];

/// Flags every added instance path (all but the first parent link) of a
/// multiply-parented node
pub struct Uninstance;

fn is_added_instance(scene: &dyn SceneGraph, path: &DagPath) -> bool {
    scene.instance_count(path) > 1 && !scene.is_primary_instance(path)
}

/// Copy the instance under its parent, drop the instance link, and give
/// the copy the original name
fn split_instance(scene: &mut dyn SceneGraph, path: &DagPath) -> Result<DagPath> {
    let temp = format!("{}_uninstance_tmp", path.leaf());
    let copy = scene.duplicate(path, &temp)?;
    if let Err(e) = scene.delete(path) {
        scene.delete(&copy)?;
        return Err(e);
    }
    scene.rename(&copy, path.leaf())
}

impl Rule for Uninstance {
    type Plan = ();

    fn meta(&self) -> CheckMeta {
        META
    }

    fn evaluate(&self, scene: &dyn SceneGraph) -> Result<Evaluation<()>> {
        let mut instances: Vec<DagPath> = DAG_KINDS
            .iter()
            .flat_map(|kind| scene.ls(*kind))
            .filter(|path| is_added_instance(scene, path))
            .collect();
        // outermost first, so nested instances are handled through their copies
        instances.sort_by(|a, b| {
            a.depth()
                .cmp(&b.depth())
                .then_with(|| a.to_string().cmp(&b.to_string()))
        });

        let findings = instances
            .into_iter()
            .map(|path| {
                let detail = format!("{} is an instance", path);
                Finding::new(path, detail)
            })
            .collect();
        Ok(Evaluation::findings(findings))
    }

    fn summary(&self, count: usize) -> String {
        format!("{} instances found", count)
    }

    fn repair(
        &self,
        scene: &mut dyn SceneGraph,
        offenders: &[DagPath],
        _plan: &(),
    ) -> Result<FixTally> {
        let mut tally = FixTally::default();
        for path in offenders {
            // an earlier split may already have replaced this path
            if !scene.exists(path) || !is_added_instance(scene, path) {
                continue;
            }
            match split_instance(scene, path) {
                Ok(copy) => {
                    info!(check = META.id, path = %copy, "un-instanced");
                    tally.applied();
                }
                Err(e) => tally.record(META.id, path, Err(e))?,
            }
        }
        Ok(tally)
    }
}
