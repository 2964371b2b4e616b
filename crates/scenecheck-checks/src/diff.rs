//! Fix previews as node-level scene diffs

use crate::registry::CheckRegistry;
use crate::report::ValidationReport;
use scenecheck_core::{ContentHash, DagPath, NodeId, Result};
use scenecheck_scene::{MemoryScene, SceneNode};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// One difference between two states of the same scene.
///
/// Nodes are matched by id, so a renamed node is one `Renamed` change
/// rather than a removal plus an addition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "lowercase")]
pub enum SceneChange {
    Added {
        path: DagPath,
    },
    Removed {
        path: DagPath,
    },
    Renamed {
        from: DagPath,
        to: DagPath,
    },
    Reparented {
        from: DagPath,
        to: DagPath,
    },
    Attribute {
        path: DagPath,
        attr: String,
        before: Option<toml::Value>,
        after: Option<toml::Value>,
    },
    Locked {
        path: DagPath,
        locked: bool,
    },
}

fn value(v: &Option<toml::Value>) -> String {
    v.as_ref().map_or_else(|| "unset".to_string(), |v| v.to_string())
}

impl fmt::Display for SceneChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneChange::Added { path } => write!(f, "+ {}", path),
            SceneChange::Removed { path } => write!(f, "- {}", path),
            SceneChange::Renamed { from, to } => write!(f, "~ {} -> {}", from, to),
            SceneChange::Reparented { from, to } => write!(f, "> {} -> {}", from, to),
            SceneChange::Attribute {
                path,
                attr,
                before,
                after,
            } => write!(f, "  {}.{}: {} -> {}", path, attr, value(before), value(after)),
            SceneChange::Locked { path, locked } => {
                write!(f, "  {} {}", path, if *locked { "locked" } else { "unlocked" })
            }
        }
    }
}

/// What `fix_all` would do to a scene, computed on a copy
#[derive(Debug)]
pub struct FixPreview {
    pub report: ValidationReport,
    pub before: ContentHash,
    pub after: ContentHash,
    pub changes: Vec<SceneChange>,
}

impl FixPreview {
    pub fn changes_scene(&self) -> bool {
        self.before != self.after
    }

    /// One line per change
    pub fn render(&self) -> String {
        self.changes
            .iter()
            .map(|change| format!("{}\n", change))
            .collect()
    }
}

/// Run every fix on a clone of `scene` and diff the result.
///
/// The original scene is not touched. The registry's checks are left
/// holding results for the clone.
pub fn preview_fix(registry: &mut CheckRegistry, scene: &MemoryScene) -> Result<FixPreview> {
    let mut copy = scene.clone();
    let report = registry.fix_all(&mut copy);

    Ok(FixPreview {
        report,
        before: scene.fingerprint()?,
        after: copy.fingerprint()?,
        changes: diff_scenes(scene, &copy),
    })
}

fn primary_path(scene: &MemoryScene, id: NodeId) -> Option<DagPath> {
    scene.paths_of(id).into_iter().next()
}

fn node_changes(
    id: NodeId,
    old: &SceneNode,
    new: &SceneNode,
    before: &MemoryScene,
    after: &MemoryScene,
    changes: &mut Vec<SceneChange>,
) {
    let (Some(from), Some(to)) = (primary_path(before, id), primary_path(after, id)) else {
        return;
    };

    if old.name != new.name {
        changes.push(SceneChange::Renamed {
            from,
            to: to.clone(),
        });
    } else if old.parents != new.parents {
        changes.push(SceneChange::Reparented {
            from,
            to: to.clone(),
        });
    }

    let attrs: BTreeSet<&String> = old.attrs.keys().chain(new.attrs.keys()).collect();
    for attr in attrs {
        let was = old.attrs.get(attr);
        let now = new.attrs.get(attr);
        if was != now {
            changes.push(SceneChange::Attribute {
                path: to.clone(),
                attr: attr.clone(),
                before: was.cloned(),
                after: now.cloned(),
            });
        }
    }

    if old.locked != new.locked {
        changes.push(SceneChange::Locked {
            path: to,
            locked: new.locked,
        });
    }
}

/// Node-level differences from `before` to `after`, which must be two
/// states of the same scene (a scene and a modified clone of it).
///
/// Changes are listed in node creation order.
pub fn diff_scenes(before: &MemoryScene, after: &MemoryScene) -> Vec<SceneChange> {
    let mut changes = Vec::new();

    for (id, old) in before.iter() {
        match after.node(id) {
            Some(new) => node_changes(id, old, new, before, after, &mut changes),
            None => {
                if let Some(path) = primary_path(before, id) {
                    changes.push(SceneChange::Removed { path });
                }
            }
        }
    }

    for (id, _) in after.iter() {
        if before.node(id).is_none() {
            if let Some(path) = primary_path(after, id) {
                changes.push(SceneChange::Added { path });
            }
        }
    }

    changes
}
