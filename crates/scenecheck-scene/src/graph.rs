//! The scene query/mutation surface

use scenecheck_core::{DagPath, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Node types the checks know how to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Transform,
    Locator,
    Mesh,
    Camera,
    Audio,
    Reference,
    /// The node holding playback options
    Time,
    #[serde(other)]
    Other,
}

impl NodeKind {
    /// Shapes live under a transform and carry its geometry
    pub fn is_shape(&self) -> bool {
        matches!(self, NodeKind::Locator | NodeKind::Mesh | NodeKind::Camera)
    }

    /// Whether nodes of this kind take part in the hierarchy
    pub fn is_dag(&self) -> bool {
        matches!(
            self,
            NodeKind::Transform | NodeKind::Locator | NodeKind::Mesh | NodeKind::Camera
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Transform => "transform",
            NodeKind::Locator => "locator",
            NodeKind::Mesh => "mesh",
            NodeKind::Camera => "camera",
            NodeKind::Audio => "audio",
            NodeKind::Reference => "reference",
            NodeKind::Time => "time",
            NodeKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Playback and animation ranges of the time slider, in frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackRange {
    pub min: f64,
    pub max: f64,
    pub animation_start: f64,
    pub animation_end: f64,
}

impl PlaybackRange {
    /// A range whose playback and animation bounds coincide
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            min: start,
            max: end,
            animation_start: start,
            animation_end: end,
        }
    }
}

impl Default for PlaybackRange {
    fn default() -> Self {
        Self::new(1.0, 120.0)
    }
}

/// Query and mutation capabilities of a live scene.
///
/// Nodes are addressed by full `DagPath`. Listing methods are
/// deterministic for an unchanged scene, which is what lets two
/// consecutive checks produce identical results.
pub trait SceneGraph {
    /// Every path of every node of `kind`, breadth-first from the roots
    fn ls(&self, kind: NodeKind) -> Vec<DagPath>;

    fn exists(&self, path: &DagPath) -> bool;

    fn node_kind(&self, path: &DagPath) -> Option<NodeKind>;

    /// Number of parents of the node at `path` (at least 1 for an existing node)
    fn instance_count(&self, path: &DagPath) -> usize;

    /// Number of nodes anywhere in the scene with this short name
    fn count_named(&self, name: &str) -> usize;

    /// True when `path` goes through the node's first parent link, i.e. it
    /// is the original rather than an added instance
    fn is_primary_instance(&self, path: &DagPath) -> bool;

    fn children(&self, path: &DagPath) -> Result<Vec<DagPath>>;

    fn get_attr(&self, path: &DagPath, attr: &str) -> Result<Option<toml::Value>>;

    fn set_attr(&mut self, path: &DagPath, attr: &str, value: toml::Value) -> Result<()>;

    /// Rename the node, returning its new path
    fn rename(&mut self, path: &DagPath, new_name: &str) -> Result<DagPath>;

    /// Delete the node at `path`. For an instanced node only this
    /// instance link is removed.
    fn delete(&mut self, path: &DagPath) -> Result<()>;

    /// Deep-copy the subtree at `path` next to it under `new_name`
    fn duplicate(&mut self, path: &DagPath, new_name: &str) -> Result<DagPath>;

    /// Move this instance under `new_parent` (`None` for the root)
    fn reparent(&mut self, path: &DagPath, new_parent: Option<&DagPath>) -> Result<DagPath>;

    fn is_locked(&self, path: &DagPath) -> Result<bool>;

    fn set_locked(&mut self, path: &DagPath, locked: bool) -> Result<()>;

    /// File loaded by a reference node, `None` when it cannot be resolved
    fn reference_file(&self, path: &DagPath) -> Result<Option<String>>;

    fn selection(&self) -> Vec<DagPath>;

    /// Replace the active selection
    fn set_selection(&mut self, paths: &[DagPath]) -> Result<()>;

    fn playback_range(&self) -> Result<PlaybackRange>;

    fn set_playback_range(&mut self, range: PlaybackRange) -> Result<()>;

    /// The node that owns the playback options
    fn playback_node(&self) -> Result<DagPath>;

    /// Sound currently shown on the time slider
    fn active_sound(&self) -> Option<DagPath>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert!(NodeKind::Locator.is_shape());
        assert!(!NodeKind::Transform.is_shape());
        assert!(NodeKind::Transform.is_dag());
        assert!(!NodeKind::Audio.is_dag());
        assert!(!NodeKind::Reference.is_dag());
    }

    #[test]
    fn test_kind_serde() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: NodeKind,
        }
        let w: Wrapper = toml::from_str("kind = \"locator\"").unwrap();
        assert_eq!(w.kind, NodeKind::Locator);
        let w: Wrapper = toml::from_str("kind = \"nurbsCurve\"").unwrap();
        assert_eq!(w.kind, NodeKind::Other);
    }

    #[test]
    fn test_playback_range_new() {
        let range = PlaybackRange::new(1001.0, 1100.0);
        assert_eq!(range.min, range.animation_start);
        assert_eq!(range.max, range.animation_end);
    }
}
