//! scenecheck core - foundational types shared by every scenecheck crate
//!
//! - `SceneCheckError` and the `Result` alias
//! - `NodeId` - stable handles for nodes inside a scene implementation
//! - `DagPath` - structured hierarchy paths (`|grp|PRP_rock_001`)
//! - `NodeName` - structured node names (base, numeric suffix, width)
//! - `ContentHash` - SHA-256 fingerprints for scene snapshots

mod error;
mod hash;
mod id;
mod name;
mod path;

pub use error::{Result, SceneCheckError};
pub use hash::ContentHash;
pub use id::NodeId;
pub use name::NodeName;
pub use path::DagPath;
