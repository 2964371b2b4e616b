//! Metadata source trait and the static in-memory source

use scenecheck_core::{Result, SceneCheckError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Flat mapping of named fields returned for one entity
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Identifies one tracked entity (a shot, an asset...) inside a project
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub project: u64,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub id: u64,
}

impl EntityRef {
    pub fn new(project: u64, entity_type: impl Into<String>, id: u64) -> Self {
        Self {
            project,
            entity_type: entity_type.into(),
            id,
        }
    }

    pub fn shot(project: u64, id: u64) -> Self {
        Self::new(project, "Shot", id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} (project {})", self.entity_type, self.id, self.project)
    }
}

/// A production-tracking lookup.
///
/// Implementations may be slow or network-backed. A missing entity is
/// `Ok(None)`; `Err` is reserved for the lookup itself failing.
pub trait MetadataSource: Send + Sync {
    /// Human-readable source name for logs
    fn name(&self) -> &str;

    /// Fetch `fields` of `entity`. An empty field list requests every field.
    fn find_entity(&self, entity: &EntityRef, fields: &[&str]) -> Result<Option<Fields>>;
}

#[derive(Debug, Deserialize)]
struct SourceFile {
    #[serde(default)]
    entity: Vec<EntityEntry>,
}

#[derive(Debug, Deserialize)]
struct EntityEntry {
    #[serde(flatten)]
    entity: EntityRef,
    #[serde(default)]
    fields: Fields,
}

/// An in-memory source, loadable from a TOML fixture:
///
/// ```toml
/// [[entity]]
/// project = 12
/// type = "Shot"
/// id = 1234
///
/// [entity.fields]
/// sg_head_in = 1001
/// ```
#[derive(Debug, Default)]
pub struct StaticSource {
    entities: HashMap<EntityRef, Fields>,
    lookups: AtomicUsize,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load entities from a TOML fixture file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::load_string(&content)
    }

    /// Load entities from a TOML string
    pub fn load_string(content: &str) -> Result<Self> {
        let file: SourceFile = toml::from_str(content).map_err(|e| {
            SceneCheckError::TrackingError(format!("Failed to parse tracking fixture: {}", e))
        })?;

        let mut source = Self::new();
        for entry in file.entity {
            source.insert(entry.entity, entry.fields);
        }
        Ok(source)
    }

    /// Register or replace an entity
    pub fn insert(&mut self, entity: EntityRef, fields: Fields) {
        self.entities.insert(entity, fields);
    }

    pub fn with_entity(mut self, entity: EntityRef, fields: Fields) -> Self {
        self.insert(entity, fields);
        self
    }

    /// Number of lookups served so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl MetadataSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn find_entity(&self, entity: &EntityRef, fields: &[&str]) -> Result<Option<Fields>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        debug!(entity = %entity, "static lookup");

        let Some(all) = self.entities.get(entity) else {
            return Ok(None);
        };
        if fields.is_empty() {
            return Ok(Some(all.clone()));
        }
        Ok(Some(
            all.iter()
                .filter(|(name, _)| fields.contains(&name.as_str()))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> &'static str {
        r#"
[[entity]]
project = 12
type = "Shot"
id = 1234

[entity.fields]
code = "sq010_sh020"
sg_head_in = 1001
sg_tail_out = 1100
sg_cut_in = 1009

[[entity]]
project = 12
type = "Asset"
id = 7
"#
    }

    #[test]
    fn test_load_fixture() {
        let source = StaticSource::load_string(fixture()).unwrap();
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn test_find_requested_fields() {
        let source = StaticSource::load_string(fixture()).unwrap();
        let fields = source
            .find_entity(&EntityRef::shot(12, 1234), &["sg_head_in", "code"])
            .unwrap()
            .unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["sg_head_in"], json!(1001));
        assert_eq!(fields["code"], json!("sq010_sh020"));
        assert_eq!(source.lookup_count(), 1);
    }

    #[test]
    fn test_empty_field_list_returns_everything() {
        let source = StaticSource::load_string(fixture()).unwrap();
        let fields = source
            .find_entity(&EntityRef::shot(12, 1234), &[])
            .unwrap()
            .unwrap();
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn test_missing_entity_is_none() {
        let source = StaticSource::load_string(fixture()).unwrap();
        assert!(source
            .find_entity(&EntityRef::shot(99, 1234), &[])
            .unwrap()
            .is_none());
        assert!(source
            .find_entity(&EntityRef::new(12, "Asset", 1234), &[])
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_bad_fixture() {
        let err = StaticSource::load_string("[[entity]]\nproject = \"x\"").unwrap_err();
        assert!(matches!(err, SceneCheckError::TrackingError(_)));
    }

    #[test]
    fn test_entity_display() {
        assert_eq!(EntityRef::shot(12, 34).to_string(), "Shot#34 (project 12)");
    }
}
