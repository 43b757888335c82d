/*!
The simulation context: one object per loaded asset, advanced once per frame.

Frame order:
1. pointer events (claim / drag / release) between frames
2. `step(dt, camera)`: collision pass on pre-step positions, then per-part integration
3. `publish` / `poses` for the renderer, `drain_events` for the UI

Everything here is synchronous and only mutates part state, so a fixed sequence of
inputs and `dt`s replays identically for a fixed seed.
*/

use log::{info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::CameraPose;
use crate::collision::resolve_collisions;
use crate::config::ExploderConfig;
use crate::decompose::decompose;
use crate::events::SimEvent;
use crate::explosion::assign_exploded_targets;
use crate::framing::{fit_view, focus_part, pose_bounds};
use crate::interaction::{
    InteractionContext, InteractionController, PointerEvent, PointerOutcome, Release, ReleaseKind,
};
use crate::motion::{StepParams, step_part};
use crate::part::{MotionState, Part, PartPose, Transition};
use crate::scene::SceneNode;
use crate::types::{Aabb, PartId, Vec3, ViewCommand, ViewMode};
use crate::utils::clamp_dt;

/// Receives per-part poses from [`Exploder::publish`].
pub trait PoseSink {
    fn write_pose(&mut self, pose: &PartPose);
}

impl PoseSink for Vec<PartPose> {
    fn write_pose(&mut self, pose: &PartPose) {
        self.push(*pose);
    }
}

pub struct Exploder<R = StdRng> {
    config: ExploderConfig,
    rng: R,
    parts: Vec<Part>,
    object_bounds: Option<Aabb>,
    mode: ViewMode,
    camera: CameraPose,
    controller: InteractionController,
    /// Seconds since load.
    time: f32,
    /// Something moved since the last `Settled` event.
    awaiting_settle: bool,
    events: Vec<SimEvent>,
}

impl Exploder<StdRng> {
    /// Random source seeded from `config.seed`, or from OS entropy when unset.
    pub fn new(config: ExploderConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Exploder<R> {
    pub fn with_rng(config: ExploderConfig, rng: R) -> Self {
        if let Err(e) = config.validate() {
            warn!("exploder config failed validation, continuing anyway: {e}");
        }
        Self {
            config,
            rng,
            parts: Vec::new(),
            object_bounds: None,
            mode: ViewMode::Assembled,
            camera: CameraPose::default(),
            controller: InteractionController::new(),
            time: 0.0,
            awaiting_settle: false,
            events: Vec::new(),
        }
    }

    /// Replace the current asset. All previous parts, transitions and the drag
    /// session are discarded; the new parts start assembled and at rest.
    pub fn load(&mut self, root: &SceneNode) {
        self.controller.cancel(&mut self.parts, &mut self.events);

        let decomposition = decompose(root, &mut self.rng);
        let mut parts = decomposition.parts;
        let center = decomposition
            .object_bounds
            .map(|b| b.center().coords)
            .unwrap_or_else(Vec3::zeros);
        assign_exploded_targets(&mut parts, &center, &self.config.explosion, &mut self.rng);

        self.parts = parts;
        self.object_bounds = decomposition.object_bounds;
        self.mode = ViewMode::Assembled;
        self.time = 0.0;
        self.awaiting_settle = false;

        info!("loaded asset: {} explodable parts", self.parts.len());
        if let Some(bounds) = &self.object_bounds {
            self.events
                .push(SimEvent::FrameView(fit_view(bounds, self.camera.fov_y)));
        }
    }

    /// Drop the current asset.
    pub fn clear(&mut self) {
        self.controller.cancel(&mut self.parts, &mut self.events);
        self.parts.clear();
        self.object_bounds = None;
        self.mode = ViewMode::Assembled;
        self.time = 0.0;
        self.awaiting_settle = false;
    }

    /// Apply a global explode/assemble command. Returns `false` when the object is
    /// already headed for the requested pose.
    pub fn command(&mut self, command: ViewCommand) -> bool {
        let target = match command {
            ViewCommand::Explode => ViewMode::Exploded,
            ViewCommand::Assemble => ViewMode::Assembled,
            ViewCommand::Toggle => self.mode.toggled(),
        };
        if target == self.mode {
            trace!("{command:?} ignored: already {target:?}");
            return false;
        }

        info!("view mode {:?} -> {:?}", self.mode, target);
        self.mode = target;
        self.begin_transition(target);
        self.frame_mode();
        true
    }

    /// Change the base explosion distance and recompute every exploded target.
    /// While exploded, parts move to their new targets.
    pub fn set_explosion_distance(&mut self, distance: f32) {
        let distance = if distance.is_finite() {
            distance.max(0.0)
        } else {
            warn!("ignoring non-finite explosion distance {distance}");
            return;
        };
        self.config.explosion.base_distance = distance;

        let center = self
            .object_bounds
            .map(|b| b.center().coords)
            .unwrap_or_else(Vec3::zeros);
        assign_exploded_targets(
            &mut self.parts,
            &center,
            &self.config.explosion,
            &mut self.rng,
        );

        if self.mode == ViewMode::Exploded {
            self.begin_transition(ViewMode::Exploded);
            self.frame_mode();
        }
    }

    /// Advance the simulation by `dt` seconds as seen from `camera`.
    pub fn step(&mut self, dt: f32, camera: &CameraPose) {
        self.camera = *camera;
        let dt = clamp_dt(dt, self.config.physics.max_dt);
        if dt == 0.0 {
            return;
        }
        self.time += dt;

        resolve_collisions(&mut self.parts, self.mode, &self.config.collision, dt);

        let params = StepParams {
            dt,
            time: self.time,
            mode: self.mode,
            physics: &self.config.physics,
            transition: &self.config.transition,
        };
        for part in &mut self.parts {
            step_part(part, &params);
        }

        let all_settled = self.is_settled();
        if !all_settled {
            self.awaiting_settle = true;
        } else if self.awaiting_settle {
            self.awaiting_settle = false;
            info!("all parts settled ({:?})", self.mode);
            self.events.push(SimEvent::Settled(self.mode));
        }
    }

    /// Use `camera` for picking until the next `step`.
    pub fn set_camera(&mut self, camera: &CameraPose) {
        self.camera = *camera;
    }

    pub fn pointer_down(&mut self, event: PointerEvent) -> PointerOutcome {
        let mut ctx = InteractionContext {
            parts: &mut self.parts,
            camera: &self.camera,
            mode: self.mode,
            config: &self.config.interaction,
        };
        self.controller
            .pointer_down(&mut ctx, event, &mut self.events)
    }

    pub fn pointer_move(&mut self, event: PointerEvent) -> PointerOutcome {
        let mut ctx = InteractionContext {
            parts: &mut self.parts,
            camera: &self.camera,
            mode: self.mode,
            config: &self.config.interaction,
        };
        self.controller.pointer_move(&mut ctx, event)
    }

    pub fn pointer_up(&mut self, event: PointerEvent) -> PointerOutcome {
        let mut ctx = InteractionContext {
            parts: &mut self.parts,
            camera: &self.camera,
            mode: self.mode,
            config: &self.config.interaction,
        };
        let outcome = self.controller.pointer_up(&mut ctx, event, &mut self.events);
        self.after_release(outcome);
        outcome
    }

    pub fn pointer_cancel(&mut self, event: PointerEvent) -> PointerOutcome {
        let mut ctx = InteractionContext {
            parts: &mut self.parts,
            camera: &self.camera,
            mode: self.mode,
            config: &self.config.interaction,
        };
        let outcome = self
            .controller
            .pointer_cancel(&mut ctx, event, &mut self.events);
        self.after_release(outcome);
        outcome
    }

    pub fn clear_selection(&mut self) {
        self.controller.clear_selection(&mut self.events);
    }

    /// Current pose of every part in its node's parent frame.
    pub fn poses(&self) -> impl Iterator<Item = PartPose> + '_ {
        self.parts.iter().map(Part::local_pose)
    }

    pub fn publish(&self, sink: &mut impl PoseSink) {
        for pose in self.poses() {
            sink.write_pose(&pose);
        }
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = SimEvent> + '_ {
        self.events.drain(..)
    }

    #[inline]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part(&self, id: PartId) -> Option<&Part> {
        self.parts.get(id.index())
    }

    #[inline]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Every part is resting in one of the settled states.
    pub fn is_settled(&self) -> bool {
        self.parts.iter().all(|p| p.state.is_settled())
    }

    #[inline]
    pub fn selected(&self) -> Option<PartId> {
        self.controller.selected()
    }

    #[inline]
    pub fn claimed(&self) -> Option<PartId> {
        self.controller.claimed()
    }

    #[inline]
    pub fn config(&self) -> &ExploderConfig {
        &self.config
    }

    #[inline]
    pub fn camera(&self) -> &CameraPose {
        &self.camera
    }

    #[inline]
    pub fn object_bounds(&self) -> Option<Aabb> {
        self.object_bounds
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Restart every non-held part toward `target` from wherever it is now.
    /// Any in-flight transition is replaced, so no part keeps a stale target.
    fn begin_transition(&mut self, target: ViewMode) {
        let stagger = self.config.transition.stagger_secs();
        for (i, part) in self.parts.iter_mut().enumerate() {
            if part.is_dragging() {
                continue;
            }
            part.state = MotionState::Transitioning(Transition {
                target,
                from: part.current_position,
                from_rotation: part.current_rotation,
                elapsed: 0.0,
                delay: i as f32 * stagger,
            });
            part.velocity = Vec3::zeros();
            part.angular_velocity = Vec3::zeros();
        }
        self.awaiting_settle = true;
    }

    fn frame_mode(&mut self) {
        if let Some(bounds) = pose_bounds(&self.parts, self.mode) {
            self.events
                .push(SimEvent::FrameView(fit_view(&bounds, self.camera.fov_y)));
        }
    }

    fn after_release(&mut self, outcome: PointerOutcome) {
        if let PointerOutcome::Released(Release {
            part,
            kind: ReleaseKind::Tap {
                selected: Some(selected),
            },
        }) = outcome
            && part == selected
            && let Some(p) = self.parts.get(part.index())
        {
            self.events
                .push(SimEvent::FocusPart(focus_part(p, &self.camera)));
        }
        // A tap restores the pre-claim state, so only throws and holds leave motion to settle.
        if let PointerOutcome::Released(Release {
            kind: ReleaseKind::Throw { .. } | ReleaseKind::Hold,
            ..
        }) = outcome
        {
            self.awaiting_settle = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeId, Point3, Transform};

    fn unit_box() -> Aabb {
        Aabb::new(Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5))
    }

    fn pair() -> SceneNode {
        SceneNode::scene(NodeId(0))
            .with_child(SceneNode::drawable(
                NodeId(1),
                "left",
                Transform::from_translation(Vec3::new(-1.0, 0.0, 0.0)),
                unit_box(),
            ))
            .with_child(SceneNode::drawable(
                NodeId(2),
                "right",
                Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)),
                unit_box(),
            ))
    }

    fn seeded() -> Exploder {
        let mut cfg = ExploderConfig::default();
        cfg.seed = Some(1);
        cfg.explosion.jitter_range = 0.0;
        Exploder::new(cfg)
    }

    #[test]
    fn load_frames_the_object() {
        let mut ex = seeded();
        ex.load(&pair());
        assert_eq!(ex.parts().len(), 2);
        let events: Vec<_> = ex.drain_events().collect();
        assert!(matches!(events.as_slice(), [SimEvent::FrameView(_)]));
        assert!(ex.is_settled());
    }

    #[test]
    fn explode_twice_is_a_no_op() {
        let mut ex = seeded();
        ex.load(&pair());
        assert!(ex.command(ViewCommand::Explode));
        let cam = CameraPose::default();
        for _ in 0..10 {
            ex.step(1.0 / 60.0, &cam);
        }
        let before: Vec<_> = ex.parts().iter().map(|p| p.state).collect();
        let targets: Vec<_> = ex.parts().iter().map(|p| p.exploded_position).collect();

        assert!(!ex.command(ViewCommand::Explode));
        let after: Vec<_> = ex.parts().iter().map(|p| p.state).collect();
        let targets_after: Vec<_> = ex.parts().iter().map(|p| p.exploded_position).collect();
        assert_eq!(before, after);
        assert_eq!(targets, targets_after);
    }

    #[test]
    fn toggle_mid_transition_retargets_everything() {
        let mut ex = seeded();
        ex.load(&pair());
        ex.command(ViewCommand::Explode);
        let cam = CameraPose::default();
        for _ in 0..20 {
            ex.step(1.0 / 60.0, &cam);
        }
        ex.command(ViewCommand::Toggle);
        assert_eq!(ex.mode(), ViewMode::Assembled);
        for p in ex.parts() {
            let MotionState::Transitioning(tr) = p.state else {
                panic!("part {} not transitioning", p.name);
            };
            assert_eq!(tr.target, ViewMode::Assembled);
            assert_eq!(tr.elapsed, 0.0);
        }
    }

    #[test]
    fn settled_event_fires_once_per_transition() {
        let mut ex = seeded();
        ex.load(&pair());
        ex.drain_events().for_each(drop);
        ex.command(ViewCommand::Explode);
        let cam = CameraPose::default();
        for _ in 0..180 {
            ex.step(1.0 / 60.0, &cam);
        }
        let settled: Vec<_> = ex
            .drain_events()
            .filter(|e| matches!(e, SimEvent::Settled(_)))
            .collect();
        assert_eq!(settled, vec![SimEvent::Settled(ViewMode::Exploded)]);
    }

    #[test]
    fn empty_scene_is_inert() {
        let mut ex = seeded();
        ex.load(&SceneNode::scene(NodeId(0)));
        assert!(ex.parts().is_empty());
        assert!(ex.command(ViewCommand::Explode));
        ex.step(1.0 / 60.0, &CameraPose::default());
        assert_eq!(
            ex.pointer_down(PointerEvent::new(0.0, 0.0, 0.0)),
            PointerOutcome::Ignored
        );
        let mut sink: Vec<PartPose> = Vec::new();
        ex.publish(&mut sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn explosion_distance_change_retargets() {
        let mut ex = seeded();
        ex.load(&pair());
        ex.command(ViewCommand::Explode);
        let before = ex.parts()[0].exploded_position;
        ex.set_explosion_distance(4.0);
        let after = ex.parts()[0].exploded_position;
        assert!((after - before).norm() > 1.0);
        assert!(matches!(ex.parts()[0].state, MotionState::Transitioning(_)));

        // Same distance again: same targets (jitter is off).
        ex.set_explosion_distance(4.0);
        assert!((ex.parts()[0].exploded_position - after).norm() < 1.0e-6);
    }

    #[test]
    fn reload_discards_drag_session() {
        let mut ex = seeded();
        ex.load(&pair());
        ex.command(ViewCommand::Explode);
        let cam = CameraPose::look_at(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::zeros(),
            Vec3::y(),
            1.0,
            1.0,
        );
        for _ in 0..120 {
            ex.step(1.0 / 60.0, &cam);
        }
        // Aim at the left part's live center.
        let target = ex.parts()[0].current_center().coords;
        let ndc_x = (target.x / (10.0 - target.z)) / (0.5f32).tan();
        let ndc_y = (target.y / (10.0 - target.z)) / (0.5f32).tan();
        assert!(matches!(
            ex.pointer_down(PointerEvent::new(ndc_x, ndc_y, 0.0)),
            PointerOutcome::Claimed(_)
        ));

        ex.load(&pair());
        assert_eq!(ex.claimed(), None);
        assert!(ex.parts().iter().all(|p| !p.is_dragging()));
        assert_eq!(ex.mode(), ViewMode::Assembled);
    }

    #[test]
    fn tap_on_resting_part_does_not_report_settled() {
        let mut ex = seeded();
        ex.load(&pair());
        ex.command(ViewCommand::Explode);
        let cam = CameraPose::look_at(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::zeros(),
            Vec3::y(),
            1.0,
            1.0,
        );
        for _ in 0..180 {
            ex.step(1.0 / 60.0, &cam);
        }
        assert!(ex.is_settled());
        ex.drain_events().for_each(drop);

        let target = ex.parts()[1].current_center().coords;
        let ndc_x = (target.x / (10.0 - target.z)) / (0.5f32).tan();
        let ndc_y = (target.y / (10.0 - target.z)) / (0.5f32).tan();
        ex.pointer_down(PointerEvent::new(ndc_x, ndc_y, 0.0));
        let out = ex.pointer_up(PointerEvent::new(ndc_x, ndc_y, 0.05));
        assert!(matches!(
            out,
            PointerOutcome::Released(Release {
                kind: ReleaseKind::Tap { .. },
                ..
            })
        ));
        ex.step(1.0 / 60.0, &cam);
        ex.step(1.0 / 60.0, &cam);

        let events: Vec<_> = ex.drain_events().collect();
        assert!(events.contains(&SimEvent::PartTapped(ex.parts()[1].id)));
        assert!(!events.iter().any(|e| matches!(e, SimEvent::Settled(_))));
    }
}
