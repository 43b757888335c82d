use crate::config::{PhysicsConfig, TransitionConfig};
use crate::part::{MotionState, Part};
use crate::types::{Vec3, ViewMode};
use crate::utils::{clamp_dt, integrate_rotation, slerp, smoothing_factor};

// NOTE: This module only advances one part at a time. Pairwise effects live in
// `collision`, and ownership changes (claim / release) live in `interaction`.

/// Inputs shared by every part for one integration step.
#[derive(Clone, Copy, Debug)]
pub struct StepParams<'a> {
    /// Frame delta in seconds. Clamped to `physics.max_dt` before use.
    pub dt: f32,
    /// Seconds since the asset was loaded, for the idle bob phase.
    pub time: f32,
    /// Rest pose parts are currently heading for.
    pub mode: ViewMode,
    pub physics: &'a PhysicsConfig,
    pub transition: &'a TransitionConfig,
}

/// What happened to a part during one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepResult {
    /// The part entered a settled state during this step.
    pub settled: bool,
}

/// Velocity multiplier for one step: `1 / (1 + (linear + quadratic * speed) * dt)`.
///
/// Always in `(0, 1]` for non-negative inputs, and decreasing in `speed`, so faster
/// parts lose a larger fraction of their velocity.
#[inline]
pub fn drag_factor(linear: f32, quadratic: f32, speed: f32, dt: f32) -> f32 {
    let k = (linear + quadratic * speed).max(0.0) * dt.max(0.0);
    1.0 / (1.0 + k)
}

/// Advance one part by `params.dt`.
pub fn step_part(part: &mut Part, params: &StepParams<'_>) -> StepResult {
    let dt = clamp_dt(params.dt, params.physics.max_dt);
    if dt == 0.0 {
        return StepResult::default();
    }

    match part.state {
        MotionState::Dragging => {
            // Position is owned by the interaction controller; only spin evolves.
            spin(part, params.physics.angular_drag, params.physics.angular_quadratic_drag, dt);
            StepResult::default()
        }
        MotionState::Transitioning(_) => step_transition(part, params.transition, dt),
        MotionState::FreeFlight => step_free_flight(part, params.mode, params.physics, dt),
        MotionState::SettledExploded => {
            step_idle(part, params.physics, params.time, dt);
            StepResult::default()
        }
        MotionState::SettledAssembled => StepResult::default(),
    }
}

fn step_transition(part: &mut Part, cfg: &TransitionConfig, dt: f32) -> StepResult {
    let MotionState::Transitioning(mut tr) = part.state else {
        return StepResult::default();
    };

    tr.elapsed += dt;
    let active = tr.elapsed - tr.delay;
    if active <= 0.0 {
        part.state = MotionState::Transitioning(tr);
        return StepResult::default();
    }

    let duration = cfg.duration_secs();
    let t = if duration > 0.0 { active / duration } else { 1.0 };
    if t >= 1.0 {
        part.snap_to(tr.target);
        return StepResult { settled: true };
    }

    let eased = cfg.easing.apply(t);
    let target = part.target_position(tr.target);
    part.current_position = tr.from.lerp(&target, eased);
    if tr.target == ViewMode::Assembled {
        part.current_rotation = slerp(&tr.from_rotation, &part.original_rotation, eased);
    }
    part.state = MotionState::Transitioning(tr);
    StepResult::default()
}

fn step_free_flight(
    part: &mut Part,
    mode: ViewMode,
    physics: &PhysicsConfig,
    dt: f32,
) -> StepResult {
    let target = part.target_position(mode);

    // Semi-implicit Euler: spring, drag, then position.
    part.velocity += (target - part.current_position) * physics.spring_stiffness * dt;
    let speed = part.velocity.norm();
    part.velocity *= drag_factor(physics.linear_drag, physics.quadratic_drag, speed, dt);
    part.current_position += part.velocity * dt;

    spin(part, physics.angular_drag, physics.angular_quadratic_drag, dt);
    if mode == ViewMode::Assembled {
        let f = smoothing_factor(physics.rotation_return_rate, dt);
        part.current_rotation = slerp(&part.current_rotation, &part.original_rotation, f);
    }

    let slow = part.velocity.norm() < physics.settle_speed;
    let close = (target - part.current_position).norm() < physics.settle_distance;
    let aligned = mode == ViewMode::Exploded
        || part.current_rotation.angle_to(&part.original_rotation) < physics.settle_angle;

    if slow && close && aligned {
        // Residual spin carries over into the idle animation when exploded.
        let omega = part.angular_velocity;
        part.snap_to(mode);
        if mode == ViewMode::Exploded {
            part.angular_velocity = omega;
        }
        return StepResult { settled: true };
    }
    StepResult::default()
}

/// Idle float for parts resting in the exploded pose.
fn step_idle(part: &mut Part, physics: &PhysicsConfig, time: f32, dt: f32) {
    let phase = time * part.idle.bob_speed + part.idle.float_offset;
    part.current_position.y += phase.sin() * physics.bob_amplitude * dt * physics.bob_scale;

    let [wx, wy, wz] = physics.idle_spin_weights;
    let idle_spin = Vec3::new(wx, wy, wz) * part.idle.rotation_speed;
    let omega = part.angular_velocity + idle_spin;
    part.current_rotation = integrate_rotation(&part.current_rotation, &omega, dt);

    let w = part.angular_velocity.norm();
    part.angular_velocity *= drag_factor(physics.idle_angular_drag, 0.0, w, dt);
}

fn spin(part: &mut Part, linear: f32, quadratic: f32, dt: f32) {
    let w = part.angular_velocity.norm();
    if w == 0.0 {
        return;
    }
    part.current_rotation = integrate_rotation(&part.current_rotation, &part.angular_velocity, dt);
    part.angular_velocity *= drag_factor(linear, quadratic, w, dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::part::{IdleConstants, Transition};
    use crate::types::{Aabb, Iso, NodeId, PartId, Point3, Quat, Transform};

    const DT: f32 = 1.0 / 60.0;

    fn part_at(pos: Vec3) -> Part {
        let b = Aabb::new(
            Point3::from(pos - Vec3::repeat(0.25)),
            Point3::from(pos + Vec3::repeat(0.25)),
        );
        Part::new(
            PartId(0),
            "p".into(),
            NodeId(0),
            Iso::identity(),
            Transform::from_translation(pos),
            b,
            vec![b],
            IdleConstants {
                float_offset: 0.0,
                bob_speed: 0.3,
                rotation_speed: 0.2,
            },
        )
    }

    fn params<'a>(
        mode: ViewMode,
        physics: &'a PhysicsConfig,
        transition: &'a TransitionConfig,
    ) -> StepParams<'a> {
        StepParams {
            dt: DT,
            time: 0.0,
            mode,
            physics,
            transition,
        }
    }

    #[test]
    fn drag_factor_decreases_with_speed() {
        let slow = drag_factor(4.0, 0.5, 1.0, DT);
        let fast = drag_factor(4.0, 0.5, 10.0, DT);
        assert!(slow < 1.0);
        assert!(fast < slow);
        assert_eq!(drag_factor(4.0, 0.5, 10.0, 0.0), 1.0);
    }

    #[test]
    fn free_flight_converges_to_exploded_target() {
        let physics = PhysicsConfig::default();
        let transition = TransitionConfig::default();
        let mut part = part_at(Vec3::zeros());
        part.exploded_position = Vec3::new(2.5, 0.0, 0.0);
        part.state = MotionState::FreeFlight;

        let p = params(ViewMode::Exploded, &physics, &transition);
        let mut settled = false;
        for _ in 0..(60 * 10) {
            if step_part(&mut part, &p).settled {
                settled = true;
                break;
            }
        }
        assert!(settled);
        assert_eq!(part.state, MotionState::SettledExploded);
        assert!((part.current_position - part.exploded_position).norm() < 1.0e-4);
        assert!(part.velocity.norm() < 1.0e-6);
    }

    #[test]
    fn damping_alone_strictly_reduces_speed() {
        let physics = PhysicsConfig {
            spring_stiffness: 0.0,
            ..PhysicsConfig::default()
        };
        let transition = TransitionConfig::default();
        for v0 in [0.05, 1.0, 30.0] {
            let mut part = part_at(Vec3::zeros());
            part.state = MotionState::FreeFlight;
            part.velocity = Vec3::new(v0, -v0, 0.5 * v0);
            let before = part.velocity.norm();
            step_part(&mut part, &params(ViewMode::Assembled, &physics, &transition));
            assert!(part.velocity.norm() < before, "v0 = {v0}");
        }
    }

    #[test]
    fn transition_reaches_target_exactly_at_duration() {
        let physics = PhysicsConfig {
            max_dt: 0.1,
            ..PhysicsConfig::default()
        };
        let transition = TransitionConfig {
            duration_ms: 500,
            easing: Easing::EaseOutQuart,
            stagger_ms: 0,
        };
        let mut part = part_at(Vec3::zeros());
        part.exploded_position = Vec3::new(0.0, 3.0, 0.0);
        part.state = MotionState::Transitioning(Transition {
            target: ViewMode::Exploded,
            from: part.current_position,
            from_rotation: part.current_rotation,
            elapsed: 0.0,
            delay: 0.0,
        });

        // 8 steps of 1/16 s cover the 0.5 s duration exactly.
        let p = StepParams {
            dt: 0.0625,
            ..params(ViewMode::Exploded, &physics, &transition)
        };
        let mut last_y = 0.0;
        for _ in 0..7 {
            assert!(!step_part(&mut part, &p).settled);
            assert!(part.current_position.y >= last_y);
            last_y = part.current_position.y;
        }
        assert!(step_part(&mut part, &p).settled);
        assert_eq!(part.current_position, part.exploded_position);
        assert_eq!(part.state, MotionState::SettledExploded);
    }

    #[test]
    fn delayed_transition_holds_position() {
        let physics = PhysicsConfig::default();
        let transition = TransitionConfig::default();
        let mut part = part_at(Vec3::zeros());
        part.exploded_position = Vec3::new(1.0, 0.0, 0.0);
        part.state = MotionState::Transitioning(Transition {
            target: ViewMode::Exploded,
            from: Vec3::zeros(),
            from_rotation: Quat::identity(),
            elapsed: 0.0,
            delay: 0.1,
        });
        step_part(&mut part, &params(ViewMode::Exploded, &physics, &transition));
        assert_eq!(part.current_position, Vec3::zeros());
    }

    #[test]
    fn assembling_returns_rotation() {
        let physics = PhysicsConfig::default();
        let transition = TransitionConfig::default();
        let mut part = part_at(Vec3::zeros());
        let tilted = Quat::from_axis_angle(&Vec3::z_axis(), 1.0);
        part.current_rotation = tilted;
        part.state = MotionState::Transitioning(Transition {
            target: ViewMode::Assembled,
            from: Vec3::new(1.0, 0.0, 0.0),
            from_rotation: tilted,
            elapsed: 0.0,
            delay: 0.0,
        });
        let p = params(ViewMode::Assembled, &physics, &transition);
        for _ in 0..120 {
            step_part(&mut part, &p);
        }
        assert_eq!(part.state, MotionState::SettledAssembled);
        assert!(part.current_rotation.angle_to(&part.original_rotation) < 1.0e-6);
    }

    #[test]
    fn huge_dt_is_clamped() {
        let physics = PhysicsConfig::default();
        let transition = TransitionConfig::default();
        let mut part = part_at(Vec3::zeros());
        part.state = MotionState::FreeFlight;
        part.velocity = Vec3::new(10.0, 0.0, 0.0);
        let p = StepParams {
            dt: 30.0,
            ..params(ViewMode::Assembled, &physics, &transition)
        };
        step_part(&mut part, &p);
        // At most one max_dt worth of travel.
        assert!(part.current_position.x <= 10.0 * physics.max_dt + 1.0e-5);
    }

    #[test]
    fn dragging_part_keeps_position_but_spins() {
        let physics = PhysicsConfig::default();
        let transition = TransitionConfig::default();
        let mut part = part_at(Vec3::zeros());
        part.state = MotionState::Dragging;
        part.velocity = Vec3::new(5.0, 0.0, 0.0);
        part.angular_velocity = Vec3::new(0.0, 2.0, 0.0);
        step_part(&mut part, &params(ViewMode::Exploded, &physics, &transition));
        assert_eq!(part.current_position, Vec3::zeros());
        assert!(part.current_rotation.angle() > 0.0);
        assert!(part.angular_velocity.norm() < 2.0);
    }

    #[test]
    fn idle_bob_stays_small() {
        let physics = PhysicsConfig::default();
        let transition = TransitionConfig::default();
        let mut part = part_at(Vec3::zeros());
        part.exploded_position = Vec3::new(0.0, 1.0, 0.0);
        part.snap_to(ViewMode::Exploded);

        let mut max_dev: f32 = 0.0;
        for i in 0..(60 * 30) {
            let p = StepParams {
                time: i as f32 * DT,
                ..params(ViewMode::Exploded, &physics, &transition)
            };
            step_part(&mut part, &p);
            max_dev = max_dev.max((part.current_position.y - 1.0).abs());
        }
        // Bob amplitude integrates to amplitude / bob_speed at most.
        assert!(max_dev > 0.0);
        assert!(max_dev <= 2.0 * physics.bob_amplitude / part.idle.bob_speed + 1.0e-3);
        assert_eq!(part.state, MotionState::SettledExploded);
        assert!(part.current_rotation.angle() > 0.0);
    }
}
