//! Renaming helpers shared by the naming rules

use crate::unit::FixTally;
use scenecheck_core::{DagPath, NodeName, Result};
use scenecheck_scene::{NodeKind, SceneGraph};
use std::cmp::Ordering;
use tracing::info;

/// Every node of `kind` listed once, through its chain of first parents
pub(crate) fn canonical_ls(scene: &dyn SceneGraph, kind: NodeKind) -> Vec<DagPath> {
    scene
        .ls(kind)
        .into_iter()
        .filter(|path| is_canonical(scene, path))
        .collect()
}

fn is_canonical(scene: &dyn SceneGraph, path: &DagPath) -> bool {
    let mut current = Some(path.clone());
    while let Some(p) = current {
        if !scene.is_primary_instance(&p) {
            return false;
        }
        current = p.parent();
    }
    true
}

/// Stable ordering for sequential renumbering: existing suffix, then
/// nesting depth, then path
pub(crate) fn sequence_order(a: &DagPath, b: &DagPath) -> Ordering {
    let suffix = |p: &DagPath| NodeName::parse(p.leaf()).ok().and_then(|n| n.suffix());
    suffix(a)
        .cmp(&suffix(b))
        .then_with(|| a.depth().cmp(&b.depth()))
        .then_with(|| a.to_string().cmp(&b.to_string()))
}

/// A queued rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rename {
    pub path: DagPath,
    pub target: String,
}

impl Rename {
    pub fn new(path: DagPath, target: impl Into<String>) -> Self {
        Self {
            path,
            target: target.into(),
        }
    }
}

/// Rebase every queued path that lived under `from`
pub(crate) fn rebase_all<'a, I>(paths: I, from: &DagPath, to: &DagPath)
where
    I: IntoIterator<Item = &'a mut DagPath>,
{
    for path in paths {
        if let Some(moved) = path.rebase(from, to) {
            *path = moved;
        }
    }
}

/// Apply renames in order.
///
/// Elements already carrying their target name are left alone. A rename
/// whose target is taken by a sibling is skipped. After each rename the
/// remaining queue is rebased onto the new path.
pub(crate) fn apply_renames(
    scene: &mut dyn SceneGraph,
    check: &str,
    renames: Vec<Rename>,
    tally: &mut FixTally,
) -> Result<()> {
    let mut queue = renames;
    for i in 0..queue.len() {
        let Rename { path, target } = queue[i].clone();
        if !scene.exists(&path) {
            tally.skip(check, &path, "node no longer exists");
            continue;
        }
        if path.leaf() == target {
            continue;
        }
        let target_path = path.with_leaf(&target)?;
        if scene.exists(&target_path) {
            tally.skip(check, &path, &format!("'{}' already exists", target));
            continue;
        }

        match scene.rename(&path, &target) {
            Ok(new_path) => {
                info!(check, from = %path, to = %new_path, "renamed");
                tally.applied();
                rebase_all(queue[i + 1..].iter_mut().map(|r| &mut r.path), &path, &new_path);
            }
            Err(e) => tally.record(check, &path, Err(e))?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenecheck_scene::{MemoryScene, SceneNode};

    fn p(raw: &str) -> DagPath {
        DagPath::parse(raw).unwrap()
    }

    fn add(scene: &mut MemoryScene, name: &str, parent: Option<&str>) -> DagPath {
        let parent = parent.map(p);
        scene
            .add_node(SceneNode::new(name, NodeKind::Transform), parent.as_ref())
            .unwrap()
    }

    #[test]
    fn test_sequence_order() {
        let mut paths = vec![
            p("|a|b|PRP_rock_3"),
            p("|PRP_rock_7"),
            p("|z|PRP_rock_1"),
            p("|a|PRP_rock_3"),
        ];
        paths.sort_by(sequence_order);
        assert_eq!(
            paths,
            vec![
                p("|z|PRP_rock_1"),
                p("|a|PRP_rock_3"),
                p("|a|b|PRP_rock_3"),
                p("|PRP_rock_7"),
            ]
        );
    }

    #[test]
    fn test_canonical_ls_skips_instances() {
        let mut scene = MemoryScene::new();
        add(&mut scene, "a", None);
        add(&mut scene, "b", None);
        add(&mut scene, "tree", Some("|a"));
        add(&mut scene, "leaf", Some("|a|tree"));
        scene.add_instance(&p("|a|tree"), &p("|b")).unwrap();

        assert_eq!(
            canonical_ls(&scene, NodeKind::Transform),
            vec![p("|a"), p("|b"), p("|a|tree"), p("|a|tree|leaf")]
        );
    }

    #[test]
    fn test_apply_renames_rebases_queue() {
        let mut scene = MemoryScene::new();
        add(&mut scene, "grp", None);
        add(&mut scene, "inner", Some("|grp"));

        let mut tally = FixTally::default();
        apply_renames(
            &mut scene,
            "test",
            vec![
                Rename::new(p("|grp"), "GRP"),
                Rename::new(p("|grp|inner"), "INNER"),
            ],
            &mut tally,
        )
        .unwrap();

        assert!(scene.exists(&p("|GRP|INNER")));
        assert_eq!(tally, FixTally { applied: 2, skipped: 0 });
    }

    #[test]
    fn test_apply_renames_skips_taken_target() {
        let mut scene = MemoryScene::new();
        add(&mut scene, "a", None);
        add(&mut scene, "b", None);
        add(&mut scene, "c", None);

        let mut tally = FixTally::default();
        apply_renames(
            &mut scene,
            "test",
            vec![
                Rename::new(p("|a"), "b"),
                Rename::new(p("|c"), "c"),
                Rename::new(p("|c"), "d"),
            ],
            &mut tally,
        )
        .unwrap();

        assert!(scene.exists(&p("|a")));
        assert!(scene.exists(&p("|d")));
        assert_eq!(tally, FixTally { applied: 1, skipped: 1 });
    }
}
