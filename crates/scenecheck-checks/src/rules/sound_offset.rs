//! Sound offset against the tracked cut-in

use super::as_number;
use crate::result::Finding;
use crate::types::{Capabilities, Category, CheckMeta};
use crate::unit::{Evaluation, FixTally, Rule};
use scenecheck_core::{DagPath, Result};
use scenecheck_scene::{NodeKind, SceneGraph};
use scenecheck_tracking::{ShotContext, ShotLookup};
use std::sync::Arc;
use tracing::debug;

const META: CheckMeta = CheckMeta {
    id: "sound_offset",
    name: "Sound starts at cut in",
    category: Category::Shots,
    capabilities: Capabilities::new(true, true),
};

const MESSAGE: &str = "Sound does not start at cut in.";

/// Attribute holding the frame a sound starts at
pub const OFFSET_ATTR: &str = "offset";

/// The shot's sound must start at its cut-in frame
pub struct SoundOffset {
    context: Arc<ShotContext>,
}

impl SoundOffset {
    pub fn new(context: Arc<ShotContext>) -> Self {
        Self { context }
    }

    /// The sound on the time slider, else the first audio node
    fn sound_node(scene: &dyn SceneGraph) -> Option<DagPath> {
        scene
            .active_sound()
            .or_else(|| scene.ls(NodeKind::Audio).into_iter().next())
    }
}

impl Rule for SoundOffset {
    /// The cut-in frame
    type Plan = f64;

    fn meta(&self) -> CheckMeta {
        META
    }

    fn evaluate(&self, scene: &dyn SceneGraph) -> Result<Evaluation<f64>> {
        let Some(sound) = Self::sound_node(scene) else {
            return Ok(Evaluation::Degraded("no sound node in the scene".into()));
        };

        let cut_in = match self.context.fetch_shot()? {
            ShotLookup::Found(shot) => shot.cut_in,
            ShotLookup::NotFound => {
                return Ok(Evaluation::Degraded(format!(
                    "{} not found in tracking",
                    self.context.entity()
                )))
            }
            ShotLookup::NoSource => {
                return Ok(Evaluation::Degraded("no tracking source configured".into()))
            }
        };
        let Some(cut_in) = cut_in else {
            return Ok(Evaluation::Degraded("shot has no cut-in in tracking".into()));
        };

        let offset = scene
            .get_attr(&sound, OFFSET_ATTR)?
            .as_ref()
            .and_then(as_number)
            .unwrap_or(0.0);
        debug!(sound = %sound, offset, cut_in, "sound offset");

        if offset == cut_in {
            return Ok(Evaluation::Findings(Vec::new(), cut_in));
        }
        Ok(Evaluation::Findings(
            vec![Finding::new(sound, MESSAGE)],
            cut_in,
        ))
    }

    fn summary(&self, _count: usize) -> String {
        MESSAGE.to_string()
    }

    fn repair(
        &self,
        scene: &mut dyn SceneGraph,
        offenders: &[DagPath],
        plan: &f64,
    ) -> Result<FixTally> {
        let mut tally = FixTally::default();
        for sound in offenders {
            let outcome = scene.set_attr(sound, OFFSET_ATTR, toml::Value::Float(*plan));
            tally.record(META.id, sound, outcome)?;
        }
        Ok(tally)
    }
}
