//! Locator transforms carry a known category prefix

use crate::naming::{apply_renames, canonical_ls, Rename};
use crate::result::Finding;
use crate::types::{Capabilities, Category, CheckMeta};
use crate::unit::{Evaluation, FixTally, Rule};
use scenecheck_core::{DagPath, NodeName, Result};
use scenecheck_scene::{NodeKind, SceneGraph};

const ID: &str = "locator_prefix";

pub struct LocatorPrefix {
    prefixes: Vec<String>,
    default_prefix: Option<String>,
}

impl LocatorPrefix {
    pub fn new(prefixes: Vec<String>, default_prefix: Option<String>) -> Self {
        Self {
            prefixes,
            default_prefix,
        }
    }

    fn has_prefix(&self, transform: &str) -> bool {
        NodeName::parse(transform)
            .is_ok_and(|name| self.prefixes.iter().any(|p| p == name.prefix()))
    }
}

impl Rule for LocatorPrefix {
    type Plan = ();

    fn meta(&self) -> CheckMeta {
        CheckMeta {
            id: ID,
            name: "Locator prefix",
            category: Category::Scene,
            capabilities: self.capabilities(),
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new(true, self.default_prefix.is_some())
    }

    fn evaluate(&self, scene: &dyn SceneGraph) -> Result<Evaluation<()>> {
        let findings = canonical_ls(scene, NodeKind::Locator)
            .into_iter()
            .filter(|shape| {
                shape
                    .parent()
                    .is_some_and(|transform| !self.has_prefix(transform.leaf()))
            })
            .map(|shape| {
                let detail = format!("{} has no known prefix", shape);
                Finding::new(shape, detail)
            })
            .collect();
        Ok(Evaluation::findings(findings))
    }

    fn summary(&self, count: usize) -> String {
        format!("{} locator(s) without prefix", count)
    }

    fn repair(
        &self,
        scene: &mut dyn SceneGraph,
        offenders: &[DagPath],
        _plan: &(),
    ) -> Result<FixTally> {
        let mut tally = FixTally::default();
        let Some(prefix) = &self.default_prefix else {
            return Ok(tally);
        };

        let mut renames: Vec<Rename> = Vec::new();
        for transform in offenders.iter().filter_map(DagPath::parent) {
            if renames.iter().any(|r| r.path == transform) {
                continue;
            }
            let target = format!("{}_{}", prefix, transform.leaf());
            renames.push(Rename::new(transform, target));
        }
        // deepest first keeps queued ancestors valid
        renames.sort_by(|a, b| b.path.depth().cmp(&a.path.depth()));

        apply_renames(scene, ID, renames, &mut tally)?;
        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingConfig;
    use crate::types::ErrorMode;
    use crate::unit::{Check, CheckUnit};
    use scenecheck_core::SceneCheckError;
    use scenecheck_scene::{MemoryScene, SceneNode};

    fn p(raw: &str) -> DagPath {
        DagPath::parse(raw).unwrap()
    }

    fn locator(scene: &mut MemoryScene, name: &str, parent: Option<&DagPath>) -> DagPath {
        let transform = scene
            .add_node(SceneNode::new(name, NodeKind::Transform), parent)
            .unwrap();
        scene
            .add_node(
                SceneNode::new(format!("{}Shape", name), NodeKind::Locator),
                Some(&transform),
            )
            .unwrap();
        transform
    }

    fn rule(default_prefix: Option<&str>) -> LocatorPrefix {
        let naming = NamingConfig::default();
        LocatorPrefix::new(naming.locator_prefixes, default_prefix.map(String::from))
    }

    #[test]
    fn test_flags_unprefixed_locators() {
        let mut scene = MemoryScene::new();
        locator(&mut scene, "PRP_rock", None);
        locator(&mut scene, "rock", None);
        locator(&mut scene, "PRProck", None);

        let mut unit = CheckUnit::new(rule(None), ErrorMode::Error);
        let result = unit.check(&scene).unwrap();
        assert_eq!(
            result.error_nodes(),
            &[p("|rock|rockShape"), p("|PRProck|PRProckShape")]
        );
        assert_eq!(result.message(), "2 locator(s) without prefix");
    }

    #[test]
    fn test_no_fix_without_default_prefix() {
        let mut scene = MemoryScene::new();
        locator(&mut scene, "rock", None);
        let mut unit = CheckUnit::new(rule(None), ErrorMode::Error);
        assert!(!unit.capabilities().fix);
        unit.check(&scene).unwrap();
        assert!(matches!(
            unit.fix(&mut scene),
            Err(SceneCheckError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_fix_with_default_prefix() {
        let mut scene = MemoryScene::new();
        let outer = locator(&mut scene, "grp", None);
        locator(&mut scene, "rock", Some(&outer));
        locator(&mut scene, "SET_rock", None);

        let mut unit = CheckUnit::new(rule(Some("SET")), ErrorMode::Error);
        unit.check(&scene).unwrap();
        let result = unit.fix(&mut scene).unwrap();

        // the collision with the existing SET_rock is only at the root
        assert!(result.is_ok());
        assert!(scene.exists(&p("|SET_grp|SET_rock|rockShape")));
        assert!(scene.exists(&p("|SET_rock")));
    }

    #[test]
    fn test_collision_skips_rename() {
        let mut scene = MemoryScene::new();
        locator(&mut scene, "rock", None);
        scene
            .add_node(SceneNode::new("SET_rock", NodeKind::Transform), None)
            .unwrap();

        let mut unit = CheckUnit::new(rule(Some("SET")), ErrorMode::Error);
        unit.check(&scene).unwrap();
        let result = unit.fix(&mut scene).unwrap();
        assert_eq!(result.error_nodes(), &[p("|rock|rockShape")]);
    }

    #[test]
    fn test_prefix_is_first_name_token() {
        let rule = rule(None);
        assert!(rule.has_prefix("PRP_rock_001"));
        assert!(rule.has_prefix("CHR_007"));
        assert!(rule.has_prefix("SET"));
        assert!(!rule.has_prefix("PRProck"));
        assert!(!rule.has_prefix("prp_rock"));
        assert!(!rule.has_prefix("rock_PRP"));
    }
}
