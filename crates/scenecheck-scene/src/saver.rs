//! Scene saving to TOML snapshots

use crate::format::{NodeDef, PlaybackDef, SceneFile, SoundDef};
use crate::memory::{read_range, MemoryScene};
use crate::SceneGraph;
use scenecheck_core::{NodeId, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Save a scene to a snapshot file
pub fn save_scene<P: AsRef<Path>>(path: P, scene: &MemoryScene) -> Result<()> {
    let content = save_scene_string(scene)?;
    fs::write(path, content)?;
    Ok(())
}

/// Save a scene to a TOML string. Output is deterministic for a given
/// scene state.
pub fn save_scene_string(scene: &MemoryScene) -> Result<String> {
    let scene_file = scene_to_file(scene);
    let content = toml::to_string_pretty(&scene_file)?;
    Ok(content)
}

/// Convert a MemoryScene to a SceneFile.
///
/// Uniquely named nodes are keyed by name; the others get `name@id` keys.
pub fn scene_to_file(scene: &MemoryScene) -> SceneFile {
    let mut file = SceneFile::new(scene.name());

    let keys: HashMap<NodeId, String> = scene
        .iter()
        .map(|(id, node)| {
            let key = if scene.count_named(&node.name) == 1 {
                node.name.clone()
            } else {
                format!("{}@{}", node.name, id)
            };
            (id, key)
        })
        .collect();

    for (id, node) in scene.iter() {
        if id == scene.time_node_id() {
            file.playback = Some(PlaybackDef::from(read_range(node)));
            continue;
        }

        let key = keys[&id].clone();
        file.add_node(NodeDef {
            name: (key != node.name).then(|| node.name.clone()),
            key,
            kind: node.kind,
            parents: node.parents.iter().map(|p| keys[p].clone()).collect(),
            locked: node.locked,
            reference_file: node.reference_file.clone(),
            attrs: node.attrs.clone(),
        });
    }

    file.sound = scene
        .active_sound_id()
        .map(|id| SoundDef {
            active: keys[&id].clone(),
        });

    file
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;
    use crate::loader::load_scene_string;
    use crate::node::SceneNode;
    use scenecheck_core::DagPath;

    #[test]
    fn test_save_scene_string() {
        let mut scene = MemoryScene::new();
        scene.set_name("shot_010");
        scene
            .add_node(SceneNode::new("grp", NodeKind::Transform), None)
            .unwrap();

        let toml_str = save_scene_string(&scene).unwrap();
        assert!(toml_str.contains("shot_010"));
        assert!(toml_str.contains("grp"));
        assert!(toml_str.contains("[playback]"));
        assert!(!toml_str.contains("time1"));
    }

    #[test]
    fn test_roundtrip_with_duplicate_names() {
        let original = r#"
[scene]
name = "Roundtrip"

[[node]]
key = "a"
kind = "transform"

[[node]]
key = "b"
kind = "transform"

[[node]]
key = "rock_a"
name = "PRP_rock"
kind = "transform"
parents = ["a"]

[[node]]
key = "rock_b"
name = "PRP_rock"
kind = "transform"
parents = ["b"]
locked = true
"#;

        let (scene, _) = load_scene_string(original).unwrap();
        let saved = save_scene_string(&scene).unwrap();
        let (reloaded, file) = load_scene_string(&saved).unwrap();

        assert_eq!(file.scene.name, "Roundtrip");
        assert_eq!(reloaded.count_named("PRP_rock"), 2);
        assert!(reloaded
            .is_locked(&DagPath::parse("|b|PRP_rock").unwrap())
            .unwrap());
        assert_eq!(save_scene_string(&reloaded).unwrap(), saved);
    }
}
