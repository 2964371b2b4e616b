//! Props end with a numeric suffix

use crate::naming::{apply_renames, canonical_ls, Rename};
use crate::result::Finding;
use crate::types::{Capabilities, Category, CheckMeta};
use crate::unit::{Evaluation, FixTally, Rule};
use scenecheck_core::{DagPath, NodeName, Result};
use scenecheck_scene::{NodeKind, SceneGraph};

const META: CheckMeta = CheckMeta {
    id: "prop_suffix",
    name: "Props end with _###",
    category: Category::Scene,
    capabilities: Capabilities::new(true, true),
};

/// Uniquely named prop transforms must end in `_<digits>`. Cameras are
/// exempt, both the default ones and anything named `cam_`.
pub struct PropSuffix {
    prefix: String,
    width: usize,
    exclusions: Vec<String>,
}

impl PropSuffix {
    pub fn new(prefix: impl Into<String>, width: usize, exclusions: Vec<String>) -> Self {
        Self {
            prefix: prefix.into(),
            width,
            exclusions,
        }
    }

    fn is_offender(&self, scene: &dyn SceneGraph, name: &str) -> bool {
        if !name.starts_with(&self.prefix)
            || self.exclusions.iter().any(|e| e == name)
            || name.to_lowercase().contains("cam_")
            || scene.count_named(name) != 1
        {
            return false;
        }
        NodeName::parse(name).is_ok_and(|n| n.suffix().is_none())
    }

    fn target(&self, name: &str) -> String {
        format!("{}_{:0width$}", name, 1, width = self.width)
    }
}

impl Rule for PropSuffix {
    type Plan = ();

    fn meta(&self) -> CheckMeta {
        META
    }

    fn evaluate(&self, scene: &dyn SceneGraph) -> Result<Evaluation<()>> {
        let findings = canonical_ls(scene, NodeKind::Transform)
            .into_iter()
            .filter(|path| self.is_offender(scene, path.leaf()))
            .map(|path| {
                let detail = format!("{} has no _### suffix", path);
                Finding::new(path, detail)
            })
            .collect();
        Ok(Evaluation::findings(findings))
    }

    fn summary(&self, count: usize) -> String {
        format!("{} props with no _### at the end of the name", count)
    }

    fn repair(
        &self,
        scene: &mut dyn SceneGraph,
        offenders: &[DagPath],
        _plan: &(),
    ) -> Result<FixTally> {
        let mut tally = FixTally::default();
        let mut renames = Vec::new();
        for path in offenders {
            let target = self.target(path.leaf());
            if scene.count_named(&target) > 0 {
                tally.skip(META.id, path, &format!("'{}' already exists", target));
                continue;
            }
            renames.push(Rename::new(path.clone(), target));
        }
        renames.sort_by(|a, b| b.path.depth().cmp(&a.path.depth()));

        apply_renames(scene, META.id, renames, &mut tally)?;
        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingConfig;
    use crate::types::ErrorMode;
    use crate::unit::{Check, CheckUnit};
    use scenecheck_scene::{MemoryScene, SceneNode};

    fn p(raw: &str) -> DagPath {
        DagPath::parse(raw).unwrap()
    }

    fn rule() -> PropSuffix {
        let naming = NamingConfig::default();
        PropSuffix::new(naming.prop_prefix, naming.suffix_width, naming.camera_exclusions)
    }

    fn scene(names: &[&str]) -> MemoryScene {
        let mut scene = MemoryScene::new();
        for name in names {
            scene
                .add_node(SceneNode::new(*name, NodeKind::Transform), None)
                .unwrap();
        }
        scene
    }

    #[test]
    fn test_offenders() {
        let scene = scene(&[
            "PRP_rock",
            "PRP_tree_001",
            "PRP_cam_main",
            "PRP_CAM_alt",
            "SET_house",
            "persp",
            "PRP_bush_v2",
        ]);
        let mut unit = CheckUnit::new(rule(), ErrorMode::Warning);
        let result = unit.check(&scene).unwrap();
        assert_eq!(result.error_nodes(), &[p("|PRP_rock"), p("|PRP_bush_v2")]);
        assert_eq!(result.message(), "2 props with no _### at the end of the name");
    }

    #[test]
    fn test_duplicate_names_are_left_to_unique_names() {
        let mut scene = scene(&["a", "b"]);
        for parent in ["|a", "|b"] {
            scene
                .add_node(
                    SceneNode::new("PRP_rock", NodeKind::Transform),
                    Some(&p(parent)),
                )
                .unwrap();
        }
        let mut unit = CheckUnit::new(rule(), ErrorMode::Warning);
        assert!(unit.check(&scene).unwrap().is_ok());
    }

    #[test]
    fn test_fix_appends_suffix() {
        let mut scene = scene(&["PRP_rock", "PRP_tree"]);
        let mut unit = CheckUnit::new(rule(), ErrorMode::Warning);
        unit.check(&scene).unwrap();
        assert!(unit.fix(&mut scene).unwrap().is_ok());
        assert!(scene.exists(&p("|PRP_rock_001")));
        assert!(scene.exists(&p("|PRP_tree_001")));
    }

    #[test]
    fn test_existing_target_anywhere_skips() {
        let mut scene = scene(&["PRP_rock", "PRP_tree", "PRP_bush", "grp"]);
        scene
            .add_node(
                SceneNode::new("PRP_tree_001", NodeKind::Transform),
                Some(&p("|grp")),
            )
            .unwrap();

        let mut unit = CheckUnit::new(rule(), ErrorMode::Warning);
        assert_eq!(unit.check(&scene).unwrap().error_nodes().len(), 3);
        let result = unit.fix(&mut scene).unwrap();
        assert_eq!(result.error_nodes(), &[p("|PRP_tree")]);
        assert!(scene.exists(&p("|PRP_rock_001")));
        assert!(scene.exists(&p("|PRP_bush_001")));
    }
}
