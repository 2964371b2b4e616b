//! References must resolve to a file

use crate::result::Finding;
use crate::types::{Capabilities, Category, CheckMeta};
use crate::unit::{Evaluation, FixTally, Rule};
use scenecheck_core::{DagPath, Result};
use scenecheck_scene::{NodeKind, SceneGraph};

const META: CheckMeta = CheckMeta {
    id: "dangling_references",
    name: "References point at files",
    category: Category::Scene,
    capabilities: Capabilities::new(true, true),
};

/// Reference nodes whose file cannot be resolved are removed
pub struct DanglingReferences;

impl Rule for DanglingReferences {
    type Plan = ();

    fn meta(&self) -> CheckMeta {
        META
    }

    fn evaluate(&self, scene: &dyn SceneGraph) -> Result<Evaluation<()>> {
        let mut findings = Vec::new();
        for reference in scene.ls(NodeKind::Reference) {
            if scene.reference_file(&reference)?.is_none() {
                let detail = format!("{} does not load a file", reference);
                findings.push(Finding::new(reference, detail));
            }
        }
        Ok(Evaluation::findings(findings))
    }

    fn summary(&self, count: usize) -> String {
        format!("{} reference(s) without a file", count)
    }

    fn repair(
        &self,
        scene: &mut dyn SceneGraph,
        offenders: &[DagPath],
        _plan: &(),
    ) -> Result<FixTally> {
        let mut tally = FixTally::default();
        for reference in offenders {
            if !scene.exists(reference) {
                continue;
            }
            let outcome = scene
                .set_locked(reference, false)
                .and_then(|_| scene.delete(reference));
            tally.record(META.id, reference, outcome)?;
        }
        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorMode;
    use crate::unit::{Check, CheckUnit};
    use scenecheck_scene::{MemoryScene, SceneNode};

    fn p(raw: &str) -> DagPath {
        DagPath::parse(raw).unwrap()
    }

    #[test]
    fn test_removes_locked_dangling_reference() {
        let mut scene = MemoryScene::new();
        scene
            .add_node(
                SceneNode::new("setRN", NodeKind::Reference)
                    .with_reference_file("/prod/assets/set.ma"),
                None,
            )
            .unwrap();
        scene
            .add_node(
                SceneNode::new("ghostRN", NodeKind::Reference).with_locked(true),
                None,
            )
            .unwrap();

        let mut unit = CheckUnit::new(DanglingReferences, ErrorMode::Error);
        let result = unit.check(&scene).unwrap();
        assert_eq!(result.error_nodes(), &[p("|ghostRN")]);
        assert_eq!(result.message(), "1 reference(s) without a file");

        assert!(unit.fix(&mut scene).unwrap().is_ok());
        assert!(!scene.exists(&p("|ghostRN")));
        assert!(scene.exists(&p("|setRN")));
    }
}
