//! MemoryScene - in-memory scene graph with instancing

use crate::graph::{NodeKind, PlaybackRange, SceneGraph};
use crate::node::SceneNode;
use crate::saver::save_scene_string;
use scenecheck_core::{ContentHash, DagPath, NodeId, NodeName, Result, SceneCheckError};
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::debug;

/// Name of the node that owns the playback options
pub const TIME_NODE_NAME: &str = "time1";

const ATTR_MIN: &str = "min";
const ATTR_MAX: &str = "max";
const ATTR_ANIMATION_START: &str = "animation_start";
const ATTR_ANIMATION_END: &str = "animation_end";

/// An in-memory scene implementing `SceneGraph`
///
/// Keeps:
/// - nodes keyed by stable `NodeId`, in creation order
/// - multi-parent links for instancing
/// - the active selection, as paths
/// - the playback options on a dedicated time node
/// - the sound shown on the time slider
#[derive(Debug, Clone)]
pub struct MemoryScene {
    name: String,
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: NodeId,
    time_node: NodeId,
    selection: Vec<DagPath>,
    active_sound: Option<NodeId>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    /// Create an empty scene holding only the time node
    pub fn new() -> Self {
        let time_node = NodeId::from_raw(1);
        let mut time = SceneNode::new(TIME_NODE_NAME, NodeKind::Time);
        write_range(&mut time, PlaybackRange::default());

        let mut nodes = BTreeMap::new();
        nodes.insert(time_node, time);

        Self {
            name: "untitled".to_string(),
            nodes,
            next_id: time_node.next(),
            time_node,
            selection: Vec::new(),
            active_sound: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of nodes, the time node included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate nodes in creation order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn time_node_id(&self) -> NodeId {
        self.time_node
    }

    pub fn active_sound_id(&self) -> Option<NodeId> {
        self.active_sound
    }

    /// Add a node under `parent` (or at the root), returning its path
    pub fn add_node(&mut self, node: SceneNode, parent: Option<&DagPath>) -> Result<DagPath> {
        if !NodeName::is_valid(&node.name) {
            return Err(SceneCheckError::InvalidName(node.name));
        }
        let parent_id = match parent {
            Some(path) => {
                if !node.kind.is_dag() {
                    return Err(SceneCheckError::SceneError(format!(
                        "{} node '{}' cannot have a parent",
                        node.kind, node.name
                    )));
                }
                Some(self.require(path)?)
            }
            None => None,
        };
        if self.sibling_conflict(parent_id, &node.name, None) {
            return Err(self.collision(parent_id, &node.name));
        }

        let path = match parent {
            Some(p) => p.child(&node.name)?,
            None => DagPath::root(&node.name)?,
        };

        let mut node = node;
        node.parents = parent_id.into_iter().collect();
        self.alloc(node);
        Ok(path)
    }

    /// Instance the node at `path` under another parent as well
    pub fn add_instance(&mut self, path: &DagPath, new_parent: &DagPath) -> Result<DagPath> {
        let id = self.require(path)?;
        let parent_id = self.require(new_parent)?;
        self.link(id, parent_id)?;
        new_parent.child(path.leaf())
    }

    /// Resolve a path to the node it names
    pub fn resolve(&self, path: &DagPath) -> Option<NodeId> {
        let mut segments = path.segments().iter();
        let first = segments.next()?;
        let mut current = self.find_child(None, first)?;
        for segment in segments {
            current = self.find_child(Some(current), segment)?;
        }
        Some(current)
    }

    /// All paths of a node, one per parent chain
    pub fn paths_of(&self, id: NodeId) -> Vec<DagPath> {
        let Some(node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        if node.parents.is_empty() {
            return DagPath::root(&node.name).into_iter().collect();
        }
        node.parents
            .iter()
            .flat_map(|parent| self.paths_of(*parent))
            .filter_map(|parent_path| parent_path.child(&node.name).ok())
            .collect()
    }

    /// Show an audio node on the time slider (or clear it)
    pub fn set_active_sound(&mut self, path: Option<&DagPath>) -> Result<()> {
        self.active_sound = match path {
            Some(path) => {
                let id = self.require(path)?;
                if self.nodes.get(&id).map(|n| n.kind) != Some(NodeKind::Audio) {
                    return Err(SceneCheckError::SceneError(format!(
                        "{} is not an audio node",
                        path
                    )));
                }
                Some(id)
            }
            None => None,
        };
        Ok(())
    }

    /// Fingerprint of the saved snapshot
    pub fn fingerprint(&self) -> Result<ContentHash> {
        Ok(ContentHash::of(save_scene_string(self)?))
    }

    /// Insert a node exactly as given, without any link or name checks
    pub(crate) fn insert_detached(&mut self, node: SceneNode) -> NodeId {
        self.alloc(node)
    }

    /// Add `parent` to the parent links of `child`
    pub(crate) fn link(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        let (name, kind, already) = match self.nodes.get(&child) {
            Some(node) => (node.name.clone(), node.kind, node.parents.contains(&parent)),
            None => return Err(SceneCheckError::NodeNotFound(child.to_string())),
        };
        let parent_kind = self
            .nodes
            .get(&parent)
            .map(|n| n.kind)
            .ok_or_else(|| SceneCheckError::NodeNotFound(parent.to_string()))?;

        if !kind.is_dag() || !parent_kind.is_dag() {
            return Err(SceneCheckError::SceneError(format!(
                "only DAG nodes can be parented ('{}' under {})",
                name, parent
            )));
        }
        if already {
            return Err(SceneCheckError::SceneError(format!(
                "'{}' is already a child of {}",
                name, parent
            )));
        }
        if parent == child || self.is_descendant(parent, child) {
            return Err(SceneCheckError::SceneError(format!(
                "'{}' cannot be parented under its own descendant",
                name
            )));
        }
        if self.sibling_conflict(Some(parent), &name, Some(child)) {
            return Err(self.collision(Some(parent), &name));
        }

        if let Some(node) = self.nodes.get_mut(&child) {
            node.parents.push(parent);
        }
        Ok(())
    }

    /// Check that no two siblings share a name
    pub(crate) fn validate_sibling_names(&self) -> Result<()> {
        let mut seen: HashSet<(Option<NodeId>, &str)> = HashSet::new();
        for node in self.nodes.values() {
            let slots: Vec<Option<NodeId>> = if node.parents.is_empty() {
                vec![None]
            } else {
                node.parents.iter().copied().map(Some).collect()
            };
            for slot in slots {
                if !seen.insert((slot, node.name.as_str())) {
                    return Err(self.collision(slot, &node.name));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn set_active_sound_id(&mut self, id: Option<NodeId>) {
        self.active_sound = id;
    }

    fn alloc(&mut self, node: SceneNode) -> NodeId {
        let id = self.next_id;
        self.next_id = id.next();
        self.nodes.insert(id, node);
        id
    }

    fn require(&self, path: &DagPath) -> Result<NodeId> {
        self.resolve(path)
            .ok_or_else(|| SceneCheckError::NodeNotFound(path.to_string()))
    }

    fn require_unlocked(&self, path: &DagPath) -> Result<NodeId> {
        let id = self.require(path)?;
        if self.nodes.get(&id).is_some_and(|n| n.locked) {
            return Err(SceneCheckError::NodeLocked(path.to_string()));
        }
        Ok(id)
    }

    /// The parent link `path` goes through (`None` at the root)
    fn slot_of(&self, path: &DagPath) -> Result<Option<NodeId>> {
        match path.parent() {
            Some(parent) => self.require(&parent).map(Some),
            None => Ok(None),
        }
    }

    /// Children of `parent` in creation order; `None` lists root nodes
    fn children_of(&self, parent: Option<NodeId>) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| match parent {
                Some(p) => node.parents.contains(&p),
                None => node.parents.is_empty(),
            })
            .map(|(id, _)| *id)
            .collect()
    }

    fn find_child(&self, parent: Option<NodeId>, name: &str) -> Option<NodeId> {
        self.children_of(parent)
            .into_iter()
            .find(|id| self.nodes.get(id).is_some_and(|n| n.name == name))
    }

    fn sibling_conflict(&self, parent: Option<NodeId>, name: &str, except: Option<NodeId>) -> bool {
        self.children_of(parent)
            .into_iter()
            .any(|id| Some(id) != except && self.nodes.get(&id).is_some_and(|n| n.name == name))
    }

    fn collision(&self, parent: Option<NodeId>, name: &str) -> SceneCheckError {
        let parent = parent
            .and_then(|p| self.paths_of(p).into_iter().next())
            .map(|p| p.to_string())
            .unwrap_or_else(|| "|".to_string());
        SceneCheckError::NameCollision {
            name: name.to_string(),
            parent,
        }
    }

    /// True when `ancestor` is above `node` through any parent chain
    fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|n| {
            n.parents
                .iter()
                .any(|p| *p == ancestor || self.is_descendant(*p, ancestor))
        })
    }

    /// Breadth-first walk over every path in the scene
    fn walk(&self) -> Vec<(DagPath, NodeId)> {
        let mut out = Vec::new();
        let mut queue: VecDeque<(DagPath, NodeId)> = self
            .children_of(None)
            .into_iter()
            .filter_map(|id| {
                let node = self.nodes.get(&id)?;
                DagPath::root(&node.name).ok().map(|p| (p, id))
            })
            .collect();

        while let Some((path, id)) = queue.pop_front() {
            for child in self.children_of(Some(id)) {
                if let Some(child_path) = self
                    .nodes
                    .get(&child)
                    .and_then(|n| path.child(&n.name).ok())
                {
                    queue.push_back((child_path, child));
                }
            }
            out.push((path, id));
        }

        out
    }

    /// Remove a node and every descendant that has no other parent
    fn remove_subtree(&mut self, id: NodeId) {
        for child in self.children_of(Some(id)) {
            let orphaned = match self.nodes.get_mut(&child) {
                Some(node) => {
                    node.parents.retain(|p| *p != id);
                    node.parents.is_empty()
                }
                None => false,
            };
            if orphaned {
                self.remove_subtree(child);
            }
        }
        self.nodes.remove(&id);
        if self.active_sound == Some(id) {
            self.active_sound = None;
        }
    }

    /// Deep-copy `src` and its descendants, attaching the copy under `parent`
    fn copy_subtree(&mut self, src: NodeId, parent: Option<NodeId>) -> Option<NodeId> {
        let mut copy = self.nodes.get(&src)?.detached_copy();
        copy.parents = parent.into_iter().collect();
        let children = self.children_of(Some(src));
        let new_id = self.alloc(copy);
        for child in children {
            self.copy_subtree(child, Some(new_id));
        }
        Some(new_id)
    }

    fn rebase_selection(&mut self, from: &[DagPath], to: &[DagPath]) {
        for entry in &mut self.selection {
            for (old, new) in from.iter().zip(to) {
                if let Some(moved) = entry.rebase(old, new) {
                    *entry = moved;
                    break;
                }
            }
        }
    }

    fn prune_selection(&mut self) {
        let kept: Vec<DagPath> = self
            .selection
            .iter()
            .filter(|p| self.resolve(p).is_some())
            .cloned()
            .collect();
        self.selection = kept;
    }
}

impl SceneGraph for MemoryScene {
    fn ls(&self, kind: NodeKind) -> Vec<DagPath> {
        self.walk()
            .into_iter()
            .filter(|(_, id)| self.nodes.get(id).is_some_and(|n| n.kind == kind))
            .map(|(path, _)| path)
            .collect()
    }

    fn exists(&self, path: &DagPath) -> bool {
        self.resolve(path).is_some()
    }

    fn node_kind(&self, path: &DagPath) -> Option<NodeKind> {
        self.resolve(path)
            .and_then(|id| self.nodes.get(&id))
            .map(|n| n.kind)
    }

    fn instance_count(&self, path: &DagPath) -> usize {
        self.resolve(path)
            .and_then(|id| self.nodes.get(&id))
            .map(|n| n.parents.len().max(1))
            .unwrap_or(0)
    }

    fn count_named(&self, name: &str) -> usize {
        self.nodes.values().filter(|n| n.name == name).count()
    }

    fn is_primary_instance(&self, path: &DagPath) -> bool {
        let (Some(id), Ok(slot)) = (self.resolve(path), self.slot_of(path)) else {
            return false;
        };
        self.nodes
            .get(&id)
            .is_some_and(|n| n.parents.first().copied() == slot)
    }

    fn children(&self, path: &DagPath) -> Result<Vec<DagPath>> {
        let id = self.require(path)?;
        Ok(self
            .children_of(Some(id))
            .into_iter()
            .filter_map(|child| self.nodes.get(&child).and_then(|n| path.child(&n.name).ok()))
            .collect())
    }

    fn get_attr(&self, path: &DagPath, attr: &str) -> Result<Option<toml::Value>> {
        let id = self.require(path)?;
        Ok(self.nodes.get(&id).and_then(|n| n.get_attr(attr).cloned()))
    }

    fn set_attr(&mut self, path: &DagPath, attr: &str, value: toml::Value) -> Result<()> {
        let id = self.require(path)?;
        if let Some(node) = self.nodes.get_mut(&id) {
            debug!(path = %path, attr, value = %value, "set attribute");
            node.set_attr(attr, value);
        }
        Ok(())
    }

    fn rename(&mut self, path: &DagPath, new_name: &str) -> Result<DagPath> {
        if !NodeName::is_valid(new_name) {
            return Err(SceneCheckError::InvalidName(new_name.to_string()));
        }
        let id = self.require(path)?;
        let parents = match self.nodes.get(&id) {
            Some(node) if node.name == new_name => return Ok(path.clone()),
            Some(node) => node.parents.clone(),
            None => return Err(SceneCheckError::NodeNotFound(path.to_string())),
        };
        self.require_unlocked(path)?;
        if id == self.time_node {
            return Err(SceneCheckError::NodeLocked(path.to_string()));
        }

        let slots: Vec<Option<NodeId>> = if parents.is_empty() {
            vec![None]
        } else {
            parents.into_iter().map(Some).collect()
        };
        for slot in slots {
            if self.sibling_conflict(slot, new_name, Some(id)) {
                return Err(self.collision(slot, new_name));
            }
        }

        let old_paths = self.paths_of(id);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.name = new_name.to_string();
        }
        let new_paths = self.paths_of(id);
        self.rebase_selection(&old_paths, &new_paths);

        debug!(from = %path, to = new_name, "renamed node");
        path.with_leaf(new_name)
    }

    fn delete(&mut self, path: &DagPath) -> Result<()> {
        let id = self.require_unlocked(path)?;
        if id == self.time_node {
            return Err(SceneCheckError::SceneError(
                "the time node cannot be deleted".to_string(),
            ));
        }
        let slot = self.slot_of(path)?;

        let instanced = self.nodes.get(&id).is_some_and(|n| n.is_instanced());
        if instanced {
            if let (Some(node), Some(slot)) = (self.nodes.get_mut(&id), slot) {
                node.parents.retain(|p| *p != slot);
            }
            debug!(path = %path, "removed instance link");
        } else {
            self.remove_subtree(id);
            debug!(path = %path, "deleted node");
        }

        self.prune_selection();
        Ok(())
    }

    fn duplicate(&mut self, path: &DagPath, new_name: &str) -> Result<DagPath> {
        if !NodeName::is_valid(new_name) {
            return Err(SceneCheckError::InvalidName(new_name.to_string()));
        }
        let id = self.require(path)?;
        if id == self.time_node {
            return Err(SceneCheckError::SceneError(
                "the time node cannot be duplicated".to_string(),
            ));
        }
        let slot = self.slot_of(path)?;
        if self.sibling_conflict(slot, new_name, None) {
            return Err(self.collision(slot, new_name));
        }

        let copy = self
            .copy_subtree(id, slot)
            .ok_or_else(|| SceneCheckError::NodeNotFound(path.to_string()))?;
        if let Some(node) = self.nodes.get_mut(&copy) {
            node.name = new_name.to_string();
        }

        debug!(from = %path, name = new_name, "duplicated node");
        path.with_leaf(new_name)
    }

    fn reparent(&mut self, path: &DagPath, new_parent: Option<&DagPath>) -> Result<DagPath> {
        let id = self.require_unlocked(path)?;
        let slot = self.slot_of(path)?;
        let target = match new_parent {
            Some(p) => Some(self.require(p)?),
            None => None,
        };
        if slot == target {
            return Ok(path.clone());
        }

        let (name, kind, parent_count) = match self.nodes.get(&id) {
            Some(node) => (node.name.clone(), node.kind, node.parents.len()),
            None => return Err(SceneCheckError::NodeNotFound(path.to_string())),
        };
        if let Some(t) = target {
            let target_is_dag = self.nodes.get(&t).is_some_and(|n| n.kind.is_dag());
            if !kind.is_dag() || !target_is_dag {
                return Err(SceneCheckError::SceneError(format!(
                    "only DAG nodes can be parented ('{}')",
                    name
                )));
            }
            if t == id || self.is_descendant(t, id) {
                return Err(SceneCheckError::SceneError(format!(
                    "'{}' cannot be parented under its own descendant",
                    name
                )));
            }
            if self.nodes.get(&id).is_some_and(|n| n.parents.contains(&t)) {
                return Err(SceneCheckError::SceneError(format!(
                    "'{}' is already instanced under the target",
                    name
                )));
            }
        } else if parent_count > 1 {
            return Err(SceneCheckError::SceneError(format!(
                "an instance of '{}' cannot be moved to the root",
                name
            )));
        }
        if self.sibling_conflict(target, &name, Some(id)) {
            return Err(self.collision(target, &name));
        }

        if let Some(node) = self.nodes.get_mut(&id) {
            match (slot, target) {
                (Some(old), Some(new)) => {
                    for p in node.parents.iter_mut().filter(|p| **p == old) {
                        *p = new;
                    }
                }
                (None, Some(new)) => node.parents.push(new),
                (Some(_), None) => node.parents.clear(),
                (None, None) => {}
            }
        }

        let new_path = match new_parent {
            Some(p) => p.child(&name)?,
            None => DagPath::root(&name)?,
        };
        self.rebase_selection(std::slice::from_ref(path), std::slice::from_ref(&new_path));
        debug!(from = %path, to = %new_path, "reparented node");
        Ok(new_path)
    }

    fn is_locked(&self, path: &DagPath) -> Result<bool> {
        let id = self.require(path)?;
        Ok(self.nodes.get(&id).is_some_and(|n| n.locked))
    }

    fn set_locked(&mut self, path: &DagPath, locked: bool) -> Result<()> {
        let id = self.require(path)?;
        if let Some(node) = self.nodes.get_mut(&id) {
            node.locked = locked;
        }
        Ok(())
    }

    fn reference_file(&self, path: &DagPath) -> Result<Option<String>> {
        let id = self.require(path)?;
        match self.nodes.get(&id) {
            Some(node) if node.kind == NodeKind::Reference => Ok(node.reference_file.clone()),
            _ => Err(SceneCheckError::SceneError(format!(
                "{} is not a reference node",
                path
            ))),
        }
    }

    fn selection(&self) -> Vec<DagPath> {
        self.selection.clone()
    }

    fn set_selection(&mut self, paths: &[DagPath]) -> Result<()> {
        let mut selection: Vec<DagPath> = Vec::with_capacity(paths.len());
        for path in paths {
            self.require(path)?;
            if !selection.contains(path) {
                selection.push(path.clone());
            }
        }
        self.selection = selection;
        Ok(())
    }

    fn playback_range(&self) -> Result<PlaybackRange> {
        let time = self
            .nodes
            .get(&self.time_node)
            .ok_or_else(|| SceneCheckError::NodeNotFound(TIME_NODE_NAME.to_string()))?;
        Ok(read_range(time))
    }

    fn set_playback_range(&mut self, range: PlaybackRange) -> Result<()> {
        let time = self
            .nodes
            .get_mut(&self.time_node)
            .ok_or_else(|| SceneCheckError::NodeNotFound(TIME_NODE_NAME.to_string()))?;
        write_range(time, range);
        debug!(min = range.min, max = range.max, "set playback range");
        Ok(())
    }

    fn playback_node(&self) -> Result<DagPath> {
        DagPath::root(TIME_NODE_NAME)
    }

    fn active_sound(&self) -> Option<DagPath> {
        self.active_sound
            .and_then(|id| self.paths_of(id).into_iter().next())
    }
}

pub(crate) fn read_range(time: &SceneNode) -> PlaybackRange {
    let fallback = PlaybackRange::default();
    PlaybackRange {
        min: time.get_number(ATTR_MIN).unwrap_or(fallback.min),
        max: time.get_number(ATTR_MAX).unwrap_or(fallback.max),
        animation_start: time
            .get_number(ATTR_ANIMATION_START)
            .unwrap_or(fallback.animation_start),
        animation_end: time
            .get_number(ATTR_ANIMATION_END)
            .unwrap_or(fallback.animation_end),
    }
}

pub(crate) fn write_range(time: &mut SceneNode, range: PlaybackRange) {
    time.set_attr(ATTR_MIN, toml::Value::Float(range.min));
    time.set_attr(ATTR_MAX, toml::Value::Float(range.max));
    time.set_attr(ATTR_ANIMATION_START, toml::Value::Float(range.animation_start));
    time.set_attr(ATTR_ANIMATION_END, toml::Value::Float(range.animation_end));
}
