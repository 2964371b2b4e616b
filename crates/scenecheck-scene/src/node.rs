//! Node storage for the in-memory scene

use crate::graph::NodeKind;
use scenecheck_core::NodeId;
use std::collections::BTreeMap;

/// One node of a `MemoryScene`.
///
/// Attributes are stored as TOML values so arbitrary numeric and string
/// attributes can be declared in snapshot files without Rust types.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    /// Parent links in instance order; empty for root-level nodes.
    /// More than one entry means the node is instanced.
    pub parents: Vec<NodeId>,
    pub attrs: BTreeMap<String, toml::Value>,
    /// Locked nodes refuse rename, delete and reparent
    pub locked: bool,
    /// File loaded by a reference node
    pub reference_file: Option<String>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parents: Vec::new(),
            attrs: BTreeMap::new(),
            locked: false,
            reference_file: None,
        }
    }

    pub fn with_attr(mut self, attr: impl Into<String>, value: toml::Value) -> Self {
        self.attrs.insert(attr.into(), value);
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn with_reference_file(mut self, file: impl Into<String>) -> Self {
        self.reference_file = Some(file.into());
        self
    }

    pub fn get_attr(&self, attr: &str) -> Option<&toml::Value> {
        self.attrs.get(attr)
    }

    pub fn set_attr(&mut self, attr: impl Into<String>, value: toml::Value) {
        self.attrs.insert(attr.into(), value);
    }

    /// Read a numeric attribute, accepting integers and floats
    pub fn get_number(&self, attr: &str) -> Option<f64> {
        match self.attrs.get(attr)? {
            toml::Value::Integer(i) => Some(*i as f64),
            toml::Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_instanced(&self) -> bool {
        self.parents.len() > 1
    }

    /// A detached copy: same name, kind, attributes and reference, no
    /// parents and unlocked.
    pub fn detached_copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            parents: Vec::new(),
            attrs: self.attrs.clone(),
            locked: false,
            reference_file: self.reference_file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_number() {
        let node = SceneNode::new("audio1", NodeKind::Audio)
            .with_attr("offset", toml::Value::Integer(1001))
            .with_attr("gain", toml::Value::Float(0.5))
            .with_attr("file", toml::Value::String("a.wav".into()));
        assert_eq!(node.get_number("offset"), Some(1001.0));
        assert_eq!(node.get_number("gain"), Some(0.5));
        assert_eq!(node.get_number("file"), None);
        assert_eq!(node.get_number("missing"), None);
    }

    #[test]
    fn test_detached_copy_drops_links_and_lock() {
        let mut node = SceneNode::new("loc", NodeKind::Transform).with_locked(true);
        node.parents.push(NodeId::from_raw(3));
        let copy = node.detached_copy();
        assert!(copy.parents.is_empty());
        assert!(!copy.locked);
        assert_eq!(copy.name, "loc");
    }
}
