/*!
Direct manipulation of parts: pick, drag on a camera-facing plane, throw.

Single-pointer model: at most one part is claimed at a time. A claimed part is in
[`MotionState::Dragging`]; the integrator and the collision pass leave its position
alone until release.

Tap vs. drag:
- a press that never moved further than `drag_epsilon` and was released before
  `hold_threshold` is a tap: it toggles the selection and leaves the part's motion
  exactly as it was before the press
- a press that moved further than `drag_epsilon` at any point is a drag, however
  long it was held; it never selects and releases into free flight with the
  averaged drag velocity
- a long press that never moved does neither and drops the part in place

Losing pointer capture is the same as releasing.
*/

use std::collections::VecDeque;

use log::trace;

use crate::camera::CameraPose;
use crate::config::InteractionConfig;
use crate::events::SimEvent;
use crate::part::{MotionState, Part};
use crate::picking::{DragPlane, pick_part};
use crate::types::{PartId, Quat, Vec2, Vec3, ViewMode};
use crate::utils::clamp_length;

/// Smallest time between two samples that still yields a velocity (seconds).
const MIN_SAMPLE_DT: f32 = 1.0e-4;

/// Pointer position in normalized device coordinates plus a timestamp (seconds).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub ndc: Vec2,
    pub time: f32,
}

impl PointerEvent {
    #[inline]
    pub fn new(x: f32, y: f32, time: f32) -> Self {
        Self {
            ndc: Vec2::new(x, y),
            time,
        }
    }
}

/// Everything a pointer handler may read or write.
pub struct InteractionContext<'a> {
    pub parts: &'a mut [Part],
    pub camera: &'a CameraPose,
    pub mode: ViewMode,
    pub config: &'a InteractionConfig,
}

/// What a pointer event did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerOutcome {
    /// Nothing was hit, interaction is gated off, or another part is already held.
    Ignored,
    Claimed(PartId),
    Dragged(PartId),
    Released(Release),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Release {
    pub part: PartId,
    pub kind: ReleaseKind,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReleaseKind {
    /// Short, still press. Selection is now `selected`.
    Tap { selected: Option<PartId> },
    /// The part was thrown with this velocity.
    Throw { velocity: Vec3 },
    /// Long, still press. Dropped with zero velocity.
    Hold,
}

#[derive(Clone, Copy, Debug)]
struct VelocitySample {
    velocity: Vec3,
    time: f32,
}

/// Motion state of the part at claim time, restored verbatim by a tap.
#[derive(Clone, Copy, Debug)]
struct ClaimSnapshot {
    state: MotionState,
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    angular_velocity: Vec3,
}

#[derive(Clone, Debug)]
struct DragSession {
    part: PartId,
    started_at: f32,
    plane: DragPlane,
    /// Grab point relative to the part's pivot (world axes).
    grab_offset: Vec3,
    last_position: Vec3,
    last_time: f32,
    moved: bool,
    samples: VecDeque<VelocitySample>,
    before: ClaimSnapshot,
}

#[derive(Clone, Debug, Default)]
pub struct InteractionController {
    session: Option<DragSession>,
    selected: Option<PartId>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn selected(&self) -> Option<PartId> {
        self.selected
    }

    /// Part currently held, if any.
    #[inline]
    pub fn claimed(&self) -> Option<PartId> {
        self.session.as_ref().map(|s| s.part)
    }

    #[inline]
    pub fn is_claimed(&self) -> bool {
        self.session.is_some()
    }

    pub fn pointer_down(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        event: PointerEvent,
        events: &mut Vec<SimEvent>,
    ) -> PointerOutcome {
        if !ctx.config.enabled {
            return PointerOutcome::Ignored;
        }
        if ctx.config.exploded_only && ctx.mode != ViewMode::Exploded {
            trace!("pointer down ignored: parts only grabbable while exploded");
            return PointerOutcome::Ignored;
        }
        if let Some(held) = self.claimed() {
            trace!("pointer down ignored: part {held:?} is already held");
            return PointerOutcome::Ignored;
        }
        if !ctx.config.allow_grab_during_free_flight
            && ctx.parts.iter().any(|p| p.state == MotionState::FreeFlight)
        {
            trace!("pointer down ignored: a thrown part is still flying");
            return PointerOutcome::Ignored;
        }

        let ray = ctx.camera.ray_from_ndc(event.ndc);
        let Some(hit) = pick_part(ctx.parts, &ray) else {
            return PointerOutcome::Ignored;
        };
        let Some(part) = ctx.parts.get_mut(hit.part.index()) else {
            return PointerOutcome::Ignored;
        };

        let before = ClaimSnapshot {
            state: part.state,
            position: part.current_position,
            rotation: part.current_rotation,
            velocity: part.velocity,
            angular_velocity: part.angular_velocity,
        };
        // Claiming abandons any transition or flight; the pointer owns the position now.
        part.state = MotionState::Dragging;
        part.velocity = Vec3::zeros();

        let grab_point = hit.point.coords;
        self.session = Some(DragSession {
            part: part.id,
            started_at: event.time,
            plane: DragPlane::facing_camera(grab_point, &ctx.camera.forward()),
            grab_offset: grab_point - part.current_position,
            last_position: part.current_position,
            last_time: event.time,
            moved: false,
            samples: VecDeque::with_capacity(ctx.config.history_len),
            before,
        });

        trace!("claimed part {:?} at {:?}", part.id, grab_point);
        events.push(SimEvent::CameraControl { enabled: false });
        PointerOutcome::Claimed(part.id)
    }

    pub fn pointer_move(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        event: PointerEvent,
    ) -> PointerOutcome {
        let Some(session) = self.session.as_mut() else {
            return PointerOutcome::Ignored;
        };
        let Some(part) = ctx.parts.get_mut(session.part.index()) else {
            return PointerOutcome::Ignored;
        };

        let ray = ctx.camera.ray_from_ndc(event.ndc);
        let Some(hit) = session.plane.intersect(&ray) else {
            return PointerOutcome::Ignored;
        };

        let new_position = hit - session.grab_offset;
        let delta = new_position - session.last_position;
        let dt = event.time - session.last_time;

        part.current_position = new_position;
        if (new_position - session.before.position).norm() > ctx.config.drag_epsilon {
            session.moved = true;
        }

        // Coalesced events: fold the motion into the next sample.
        if dt <= MIN_SAMPLE_DT {
            return PointerOutcome::Dragged(part.id);
        }

        if session.samples.len() >= ctx.config.history_len.max(1) {
            session.samples.pop_front();
        }
        session.samples.push_back(VelocitySample {
            velocity: delta / dt,
            time: event.time,
        });
        session.last_time = event.time;
        session.last_position = new_position;

        // Flick: off-center drags spin the part.
        let torque = session.grab_offset.cross(&delta);
        part.angular_velocity += torque * (ctx.config.torque_gain / part.moment_of_inertia);

        PointerOutcome::Dragged(part.id)
    }

    pub fn pointer_up(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        event: PointerEvent,
        events: &mut Vec<SimEvent>,
    ) -> PointerOutcome {
        let Some(mut session) = self.session.take() else {
            return PointerOutcome::Ignored;
        };
        events.push(SimEvent::CameraControl { enabled: true });

        let Some(part) = ctx.parts.get_mut(session.part.index()) else {
            return PointerOutcome::Ignored;
        };

        let held_for = event.time - session.started_at;
        let kind = if !session.moved && held_for < ctx.config.hold_threshold_secs() {
            restore(part, &session.before, ctx.mode);
            let selected = if self.selected == Some(part.id) {
                None
            } else {
                Some(part.id)
            };
            self.selected = selected;
            events.push(SimEvent::PartTapped(part.id));
            events.push(SimEvent::SelectionChanged(selected));
            ReleaseKind::Tap { selected }
        } else if session.moved {
            if session.samples.is_empty() {
                // Every move was coalesced with the press: one sample over the whole gesture.
                let dt = (event.time - session.started_at).max(MIN_SAMPLE_DT);
                session.samples.push_back(VelocitySample {
                    velocity: (part.current_position - session.before.position) / dt,
                    time: event.time,
                });
            }
            let velocity = throw_velocity(&session.samples, event.time, ctx.config);
            part.velocity = velocity;
            part.state = MotionState::FreeFlight;
            ReleaseKind::Throw { velocity }
        } else {
            part.velocity = Vec3::zeros();
            part.state = MotionState::FreeFlight;
            ReleaseKind::Hold
        };

        trace!("released part {:?}: {kind:?}", part.id);
        PointerOutcome::Released(Release {
            part: part.id,
            kind,
        })
    }

    /// Pointer capture was lost. Same as a release.
    pub fn pointer_cancel(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        event: PointerEvent,
        events: &mut Vec<SimEvent>,
    ) -> PointerOutcome {
        self.pointer_up(ctx, event, events)
    }

    /// Drop the session and the selection, e.g. before the parts are replaced.
    /// A held part is dropped in place with zero velocity.
    pub fn cancel(&mut self, parts: &mut [Part], events: &mut Vec<SimEvent>) {
        if let Some(session) = self.session.take() {
            if let Some(part) = parts.get_mut(session.part.index())
                && part.is_dragging()
            {
                part.velocity = Vec3::zeros();
                part.state = MotionState::FreeFlight;
            }
            events.push(SimEvent::CameraControl { enabled: true });
        }
        self.clear_selection(events);
    }

    pub fn clear_selection(&mut self, events: &mut Vec<SimEvent>) {
        if self.selected.take().is_some() {
            events.push(SimEvent::SelectionChanged(None));
        }
    }
}

/// Put a tapped part back exactly as it was, unless the view mode changed under it.
fn restore(part: &mut Part, before: &ClaimSnapshot, mode: ViewMode) {
    part.current_position = before.position;
    part.current_rotation = before.rotation;
    part.velocity = before.velocity;
    part.angular_velocity = before.angular_velocity;

    let still_valid = match before.state {
        MotionState::SettledAssembled | MotionState::SettledExploded => {
            before.state == MotionState::settled(mode)
        }
        MotionState::FreeFlight => true,
        // Abandoned on claim; the spring takes it from here.
        MotionState::Transitioning(_) | MotionState::Dragging => false,
    };
    part.state = if still_valid {
        before.state
    } else {
        MotionState::FreeFlight
    };
}

/// Average of the recent samples, scaled and clamped.
///
/// Only samples within `sample_window` of the release count. A pointer that stopped
/// before letting go throws nothing.
fn throw_velocity(
    samples: &VecDeque<VelocitySample>,
    released_at: f32,
    cfg: &InteractionConfig,
) -> Vec3 {
    let window = cfg.sample_window_secs();
    let (sum, count) = samples
        .iter()
        .filter(|s| released_at - s.time <= window)
        .fold((Vec3::zeros(), 0usize), |(sum, n), s| (sum + s.velocity, n + 1));
    if count == 0 {
        return Vec3::zeros();
    }
    clamp_length(sum / count as f32 * cfg.throw_scale, cfg.max_throw_speed)
}
