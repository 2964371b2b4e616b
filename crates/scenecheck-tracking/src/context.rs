//! The read-only context handed to every check

use crate::shot::{ShotInfo, SHOT_FIELDS};
use crate::source::{EntityRef, MetadataSource};
use scenecheck_core::Result;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Outcome of a shot lookup
#[derive(Debug, Clone, PartialEq)]
pub enum ShotLookup {
    Found(ShotInfo),
    /// The source has no such entity
    NotFound,
    /// No metadata source was configured
    NoSource,
}

/// Identifies the shot being worked on and how to look it up.
///
/// Shared between all checks of a session through `Arc`; checks only
/// read from it.
#[derive(Clone)]
pub struct ShotContext {
    entity: EntityRef,
    source: Option<Arc<dyn MetadataSource>>,
}

impl ShotContext {
    pub fn new(entity: EntityRef) -> Self {
        Self {
            entity,
            source: None,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn MetadataSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    pub fn project(&self) -> u64 {
        self.entity.project
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Look up the shot's frame fields. Performs exactly one source call
    /// when a source is configured.
    pub fn fetch_shot(&self) -> Result<ShotLookup> {
        let Some(source) = &self.source else {
            return Ok(ShotLookup::NoSource);
        };

        debug!(source = source.name(), entity = %self.entity, "fetching shot");
        Ok(match source.find_entity(&self.entity, &SHOT_FIELDS)? {
            Some(fields) => ShotLookup::Found(ShotInfo::from_fields(&fields)),
            None => ShotLookup::NotFound,
        })
    }
}

impl fmt::Debug for ShotContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShotContext")
            .field("entity", &self.entity)
            .field("source", &self.source.as_ref().map(|s| s.name()))
            .finish()
    }
}
