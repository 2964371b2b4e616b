//! Scene loading from TOML snapshots

use crate::format::SceneFile;
use crate::graph::NodeKind;
use crate::memory::MemoryScene;
use crate::node::SceneNode;
use crate::SceneGraph;
use scenecheck_core::{NodeId, NodeName, Result, SceneCheckError};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Load a scene from a TOML file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<(MemoryScene, SceneFile)> {
    let content = fs::read_to_string(path)?;
    load_scene_string(&content)
}

/// Load a scene from a TOML string
pub fn load_scene_string(content: &str) -> Result<(MemoryScene, SceneFile)> {
    let scene_file: SceneFile = toml::from_str(content)?;
    let mut scene = MemoryScene::new();
    scene.set_name(scene_file.scene.name.clone());

    // First pass: create all nodes
    let mut keys: HashMap<&str, NodeId> = HashMap::new();
    for def in &scene_file.nodes {
        let name = def.node_name();
        if !NodeName::is_valid(name) {
            return Err(SceneCheckError::InvalidName(name.to_string()));
        }
        if keys.contains_key(def.key.as_str()) {
            return Err(SceneCheckError::SceneError(format!(
                "duplicate node key '{}'",
                def.key
            )));
        }

        let mut node = SceneNode::new(name, def.kind).with_locked(def.locked);
        node.attrs = def.attrs.clone();
        node.reference_file = def.reference_file.clone();
        keys.insert(def.key.as_str(), scene.insert_detached(node));
    }

    // Second pass: hierarchy
    for def in &scene_file.nodes {
        let child = keys[def.key.as_str()];
        for parent_key in &def.parents {
            let parent = keys.get(parent_key.as_str()).copied().ok_or_else(|| {
                SceneCheckError::SceneError(format!(
                    "node '{}' has unknown parent '{}'",
                    def.key, parent_key
                ))
            })?;
            scene.link(child, parent)?;
        }
    }
    scene.validate_sibling_names()?;

    if let Some(playback) = &scene_file.playback {
        scene.set_playback_range(playback.to_range())?;
    }

    if let Some(sound) = &scene_file.sound {
        let id = keys.get(sound.active.as_str()).copied().ok_or_else(|| {
            SceneCheckError::SceneError(format!("unknown sound node '{}'", sound.active))
        })?;
        if scene.node(id).map(|n| n.kind) != Some(NodeKind::Audio) {
            return Err(SceneCheckError::SceneError(format!(
                "sound node '{}' is not an audio node",
                sound.active
            )));
        }
        scene.set_active_sound_id(Some(id));
    }

    Ok((scene, scene_file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenecheck_core::DagPath;

    fn p(raw: &str) -> DagPath {
        DagPath::parse(raw).unwrap()
    }

    #[test]
    fn test_load_scene_string() {
        let toml_str = r#"
[scene]
name = "shot_010"

[playback]
min = 1001
max = 1100

[sound]
active = "audio1"

[[node]]
key = "audio1"
kind = "audio"

[node.attrs]
offset = 1001

[[node]]
key = "PRP_rock_1Shape"
kind = "locator"
parents = ["PRP_rock_1"]

[[node]]
key = "PRP_rock_1"
kind = "transform"
parents = ["grp"]

[[node]]
key = "grp"
kind = "transform"
"#;

        let (scene, file) = load_scene_string(toml_str).unwrap();
        assert_eq!(file.scene.name, "shot_010");
        assert_eq!(scene.name(), "shot_010");
        // four nodes plus the time node
        assert_eq!(scene.node_count(), 5);
        assert!(scene.exists(&p("|grp|PRP_rock_1|PRP_rock_1Shape")));
        assert_eq!(scene.playback_range().unwrap().min, 1001.0);
        assert_eq!(scene.active_sound(), Some(p("|audio1")));
        assert_eq!(
            scene.get_attr(&p("|audio1"), "offset").unwrap(),
            Some(toml::Value::Integer(1001))
        );
    }

    #[test]
    fn test_duplicate_names_under_different_parents() {
        let toml_str = r#"
[scene]
name = "dupes"

[[node]]
key = "a"
kind = "transform"

[[node]]
key = "b"
kind = "transform"

[[node]]
key = "rock_in_a"
name = "PRP_rock"
kind = "transform"
parents = ["a"]

[[node]]
key = "rock_in_b"
name = "PRP_rock"
kind = "transform"
parents = ["b"]
"#;

        let (scene, _) = load_scene_string(toml_str).unwrap();
        assert_eq!(scene.count_named("PRP_rock"), 2);
        assert!(scene.exists(&p("|a|PRP_rock")));
        assert!(scene.exists(&p("|b|PRP_rock")));
    }

    #[test]
    fn test_duplicate_sibling_names_rejected() {
        let toml_str = r#"
[scene]
name = "bad"

[[node]]
key = "one"
name = "PRP_rock"
kind = "transform"

[[node]]
key = "two"
name = "PRP_rock"
kind = "transform"
"#;

        assert!(matches!(
            load_scene_string(toml_str),
            Err(SceneCheckError::NameCollision { .. })
        ));
    }

    #[test]
    fn test_instanced_node() {
        let toml_str = r#"
[scene]
name = "instances"

[[node]]
key = "a"
kind = "transform"

[[node]]
key = "b"
kind = "transform"

[[node]]
key = "tree"
kind = "transform"
parents = ["a", "b"]
"#;

        let (scene, _) = load_scene_string(toml_str).unwrap();
        assert_eq!(scene.instance_count(&p("|a|tree")), 2);
        assert_eq!(scene.ls(NodeKind::Transform).len(), 4);
    }

    #[test]
    fn test_unknown_parent_and_bad_sound() {
        let unknown_parent = r#"
[scene]
name = "bad"

[[node]]
key = "a"
kind = "transform"
parents = ["missing"]
"#;
        assert!(load_scene_string(unknown_parent).is_err());

        let bad_sound = r#"
[scene]
name = "bad"

[sound]
active = "a"

[[node]]
key = "a"
kind = "transform"
"#;
        assert!(load_scene_string(bad_sound).is_err());
    }

    #[test]
    fn test_invalid_name_rejected() {
        let toml_str = r#"
[scene]
name = "bad"

[[node]]
key = "a"
name = "has space"
kind = "transform"
"#;
        assert!(matches!(
            load_scene_string(toml_str),
            Err(SceneCheckError::InvalidName(_))
        ));
    }
}
