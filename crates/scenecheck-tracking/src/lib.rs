//! scenecheck tracking - shot metadata for checks that need it
//!
//! Checks never talk to a tracking service directly. They receive a
//! `ShotContext` at construction, which names the project and entity and
//! optionally carries a `MetadataSource` to look them up with.

mod context;
mod shot;
mod source;

pub use context::{ShotContext, ShotLookup};
pub use shot::{ShotInfo, SHOT_FIELDS};
pub use source::{EntityRef, Fields, MetadataSource, StaticSource};
