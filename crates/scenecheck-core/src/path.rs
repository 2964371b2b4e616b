//! Structured DAG paths
//!
//! A full path names a node by the chain of names from the scene root,
//! written `|grp|PRP_rock_001|PRP_rock_001Shape`. Instanced nodes have one
//! path per parent chain, so a path identifies one instance, not one node.

use crate::error::{Result, SceneCheckError};
use crate::name::NodeName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = '|';

/// A full path through the scene hierarchy (ordered root-to-leaf segments)
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DagPath {
    segments: Vec<String>,
}

impl DagPath {
    /// Parse a path. The leading separator is optional.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.strip_prefix(SEPARATOR).unwrap_or(raw);
        if trimmed.is_empty() {
            return Err(SceneCheckError::InvalidPath(raw.to_string()));
        }
        Self::from_segments(trimmed.split(SEPARATOR))
            .map_err(|_| SceneCheckError::InvalidPath(raw.to_string()))
    }

    /// Build a path from individual node names
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(SceneCheckError::InvalidPath(String::new()));
        }
        if let Some(bad) = segments.iter().find(|s| !NodeName::is_valid(s)) {
            return Err(SceneCheckError::InvalidName(bad.clone()));
        }
        Ok(Self { segments })
    }

    /// A path to a node directly under the scene root
    pub fn root(name: &str) -> Result<Self> {
        Self::from_segments([name])
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The node's own short name
    pub fn leaf(&self) -> &str {
        // Construction guarantees at least one segment
        &self.segments[self.segments.len() - 1]
    }

    /// Number of segments; root-level nodes have depth 1
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Path of the parent, or `None` at the root
    pub fn parent(&self) -> Option<DagPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Path of a child with the given name
    pub fn child(&self, name: &str) -> Result<DagPath> {
        if !NodeName::is_valid(name) {
            return Err(SceneCheckError::InvalidName(name.to_string()));
        }
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }

    /// Same parent, different leaf name (the path after a rename)
    pub fn with_leaf(&self, name: &str) -> Result<DagPath> {
        match self.parent() {
            Some(parent) => parent.child(name),
            None => Self::root(name),
        }
    }

    /// True when `prefix` is this path or one of its ancestors
    pub fn starts_with(&self, prefix: &DagPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Replace the leading `from` segments with `to`.
    ///
    /// Used to keep queued paths valid after an ancestor was renamed.
    /// Returns `None` when `from` is not a prefix of this path.
    pub fn rebase(&self, from: &DagPath, to: &DagPath) -> Option<DagPath> {
        if !self.starts_with(from) {
            return None;
        }
        let mut segments = to.segments.clone();
        segments.extend_from_slice(&self.segments[from.segments.len()..]);
        Some(Self { segments })
    }
}

impl fmt::Display for DagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{}{}", SEPARATOR, segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DagPath({})", self)
    }
}

impl FromStr for DagPath {
    type Err = SceneCheckError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DagPath {
    type Error = SceneCheckError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<DagPath> for String {
    fn from(path: DagPath) -> Self {
        path.to_string()
    }
}
