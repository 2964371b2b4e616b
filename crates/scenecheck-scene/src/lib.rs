//! scenecheck scene - the scene surface checks run against
//!
//! `SceneGraph` is the query/mutation capability set a host application
//! exposes. `MemoryScene` implements it in memory and round-trips through
//! a TOML snapshot format, which is what tests and fix previews use.

mod format;
mod graph;
mod loader;
mod memory;
mod node;
mod saver;

pub use format::{NodeDef, SceneFile, SceneMetadata, SoundDef};
pub use graph::{NodeKind, PlaybackRange, SceneGraph};
pub use loader::{load_scene, load_scene_string};
pub use memory::MemoryScene;
pub use node::SceneNode;
pub use saver::{save_scene, save_scene_string, scene_to_file};
