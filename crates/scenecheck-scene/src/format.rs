//! Scene snapshot file format definitions

use crate::graph::{NodeKind, PlaybackRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root structure of a scene snapshot TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    pub scene: SceneMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback: Option<PlaybackDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<SoundDef>,
    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeDef>,
}

/// Scene metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneMetadata {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Playback options; animation bounds default to the playback bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackDef {
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_end: Option<f64>,
}

impl PlaybackDef {
    pub fn to_range(&self) -> PlaybackRange {
        PlaybackRange {
            min: self.min,
            max: self.max,
            animation_start: self.animation_start.unwrap_or(self.min),
            animation_end: self.animation_end.unwrap_or(self.max),
        }
    }
}

impl From<PlaybackRange> for PlaybackDef {
    fn from(range: PlaybackRange) -> Self {
        Self {
            min: range.min,
            max: range.max,
            animation_start: Some(range.animation_start),
            animation_end: Some(range.animation_end),
        }
    }
}

/// The sound shown on the time slider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundDef {
    /// Key of an audio node
    pub active: String,
}

/// Definition of a node in a snapshot.
///
/// Node names need not be unique across the scene, so nodes are keyed by
/// `key` and `parents` refers to keys. `name` defaults to the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDef {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: NodeKind,
    /// Parent keys; more than one instances the node
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_file: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, toml::Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl NodeDef {
    pub fn new(key: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            key: key.into(),
            name: None,
            kind,
            parents: Vec::new(),
            locked: false,
            reference_file: None,
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// The node name, falling back to the key
    pub fn node_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}

impl SceneFile {
    /// Create an empty snapshot
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            scene: SceneMetadata {
                name: name.into(),
                version: default_version(),
                description: None,
            },
            playback: None,
            sound: None,
            nodes: Vec::new(),
        }
    }

    pub fn add_node(&mut self, node: NodeDef) {
        self.nodes.push(node);
    }
}
