//! Playback range against the tracked shot range

use crate::result::Finding;
use crate::types::{Capabilities, Category, CheckMeta};
use crate::unit::{Evaluation, FixTally, Rule};
use scenecheck_core::{DagPath, Result};
use scenecheck_scene::{PlaybackRange, SceneGraph};
use scenecheck_tracking::{ShotContext, ShotLookup};
use std::sync::Arc;

const META: CheckMeta = CheckMeta {
    id: "shot_frame_range",
    name: "Shots start end match tracking",
    category: Category::Shots,
    capabilities: Capabilities::new(false, true),
};

const MESSAGE: &str = "Playback range does not match the frame range in tracking.";

/// Playback and animation ranges must both run from the shot's head-in to
/// its tail-out
pub struct ShotFrameRange {
    context: Arc<ShotContext>,
}

impl ShotFrameRange {
    pub fn new(context: Arc<ShotContext>) -> Self {
        Self { context }
    }
}

impl Rule for ShotFrameRange {
    /// The range to apply
    type Plan = PlaybackRange;

    fn meta(&self) -> CheckMeta {
        META
    }

    fn evaluate(&self, scene: &dyn SceneGraph) -> Result<Evaluation<PlaybackRange>> {
        let shot = match self.context.fetch_shot()? {
            ShotLookup::Found(shot) => shot,
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
        let Some((head_in, tail_out)) = shot.frame_range() else {
            return Ok(Evaluation::Degraded(
                "shot has no head-in/tail-out in tracking".into(),
            ));
        };

        let current = scene.playback_range()?;
        let matches = current.min == head_in
            && current.animation_start == current.min
            && current.max == tail_out
            && current.animation_end == current.max;

        let expected = PlaybackRange::new(head_in, tail_out);
        if matches {
            return Ok(Evaluation::Findings(Vec::new(), expected));
        }
        Ok(Evaluation::Findings(
            vec![Finding::new(scene.playback_node()?, MESSAGE)],
            expected,
        ))
    }

    fn summary(&self, _count: usize) -> String {
        MESSAGE.to_string()
    }

    fn repair(
        &self,
        scene: &mut dyn SceneGraph,
        _offenders: &[DagPath],
        plan: &PlaybackRange,
    ) -> Result<FixTally> {
        scene.set_playback_range(*plan)?;
        Ok(FixTally {
            applied: 1,
            skipped: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ErrorMode, Status};
    use crate::unit::{Check, CheckUnit};
    use scenecheck_core::SceneCheckError;
    use scenecheck_scene::MemoryScene;
    use scenecheck_tracking::{EntityRef, StaticSource};
    use serde_json::json;

    fn context(fields: serde_json::Value) -> (Arc<ShotContext>, Arc<StaticSource>) {
        let source = Arc::new(StaticSource::new().with_entity(
            EntityRef::shot(12, 34),
            fields.as_object().cloned().unwrap(),
        ));
        let ctx = ShotContext::new(EntityRef::shot(12, 34)).with_source(source.clone());
        (Arc::new(ctx), source)
    }

    fn unit(ctx: Arc<ShotContext>) -> CheckUnit<ShotFrameRange> {
        CheckUnit::new(ShotFrameRange::new(ctx), ErrorMode::Error)
    }

    #[test]
    fn test_mismatch_then_fix() {
        let (ctx, source) = context(json!({ "sg_head_in": 1001, "sg_tail_out": 1100 }));
        let mut unit = unit(ctx);
        let mut scene = MemoryScene::new();

        let result = unit.check(&scene).unwrap();
        assert_eq!(result.status(), Status::Error(ErrorMode::Error));
        assert_eq!(result.error_nodes(), &[scene.playback_node().unwrap()]);
        assert_eq!(source.lookup_count(), 1);

        let result = unit.fix(&mut scene).unwrap();
        assert!(result.is_ok());
        assert_eq!(scene.playback_range().unwrap(), PlaybackRange::new(1001.0, 1100.0));
        assert_eq!(source.lookup_count(), 2);
    }

    #[test]
    fn test_animation_range_must_follow_playback() {
        let (ctx, _) = context(json!({ "sg_head_in": 1001, "sg_tail_out": 1100 }));
        let mut unit = unit(ctx);
        let mut scene = MemoryScene::new();
        scene
            .set_playback_range(PlaybackRange {
                min: 1001.0,
                max: 1100.0,
                animation_start: 1001.0,
                animation_end: 1200.0,
            })
            .unwrap();
        assert!(!unit.check(&scene).unwrap().is_ok());
    }

    #[test]
    fn test_matching_range_passes() {
        let (ctx, _) = context(json!({ "sg_head_in": 1001, "sg_tail_out": 1100 }));
        let mut unit = unit(ctx);
        let mut scene = MemoryScene::new();
        scene
            .set_playback_range(PlaybackRange::new(1001.0, 1100.0))
            .unwrap();
        let result = unit.check(&scene).unwrap();
        assert!(result.is_ok());
        assert!(!result.is_degraded());
    }

    #[test]
    fn test_degraded_paths() {
        let scene = MemoryScene::new();

        let mut no_source = unit(Arc::new(ShotContext::new(EntityRef::shot(12, 34))));
        assert!(no_source.check(&scene).unwrap().is_degraded());

        let (ctx, _) = context(json!({ "sg_head_in": 1001 }));
        let result = unit(ctx).check(&scene).unwrap();
        assert!(result.is_ok());
        assert!(result.is_degraded());

        let (_, source) = context(json!({}));
        let missing = ShotContext::new(EntityRef::shot(12, 99)).with_source(source);
        assert!(unit(Arc::new(missing)).check(&scene).unwrap().is_degraded());
    }

    #[test]
    fn test_no_selection() {
        let (ctx, _) = context(json!({ "sg_head_in": 1001, "sg_tail_out": 1100 }));
        let mut unit = unit(ctx);
        let mut scene = MemoryScene::new();
        unit.check(&scene).unwrap();
        assert!(matches!(
            unit.select(&mut scene),
            Err(SceneCheckError::Unsupported { .. })
        ));
    }
}
