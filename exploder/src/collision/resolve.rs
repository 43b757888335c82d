use log::trace;

use super::narrow_phase::{boxes_overlap, sphere_contact};
use crate::config::CollisionConfig;
use crate::part::{MotionState, Part};
use crate::types::{Aabb, Point3, Vec3, ViewMode};
use crate::utils::clamp_length;

/// Corrections below this are treated as no contact for waking settled parts.
const MIN_CORRECTION: f32 = 1.0e-4;

/// Counters from one resolution pass, mostly for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub pairs_tested: usize,
    pub contacts: usize,
    /// Settled parts knocked into free flight.
    pub woken: usize,
}

/// Pre-pass state of one part. Every pair reads these, never the partially updated parts.
struct Snapshot {
    center: Point3,
    bounds: Aabb,
    velocity: Vec3,
    radius: f32,
    inv_mass: f32,
    dragging: bool,
}

/// One stateless relaxation pass over every unordered pair of non-dragging parts.
///
/// - Overlapping pairs are pushed apart by `push_fraction` of the overlap, split by
///   inverse mass. Each part's accumulated push is clamped to `max_push_step`.
///   Parts in free flight take the push as a velocity nudge of `push / dt`; resting
///   and transitioning parts are moved directly.
/// - Approaching pairs get an impulse along the normal with restitution in `[0, 1]`,
///   which never adds kinetic energy.
///
/// Resolves only while exploded unless `when_assembled` is set.
pub fn resolve_collisions(
    parts: &mut [Part],
    mode: ViewMode,
    cfg: &CollisionConfig,
    dt: f32,
) -> CollisionReport {
    let mut report = CollisionReport::default();
    if !cfg.enabled || parts.len() < 2 {
        return report;
    }
    if mode == ViewMode::Assembled && !cfg.when_assembled {
        return report;
    }

    let snaps: Vec<Snapshot> = parts
        .iter()
        .map(|p| Snapshot {
            center: p.current_center(),
            bounds: p.current_bounds(),
            velocity: p.velocity,
            radius: p.collision_radius,
            inv_mass: 1.0 / p.mass,
            dragging: p.is_dragging(),
        })
        .collect();

    let n = parts.len();
    let mut push = vec![Vec3::zeros(); n];
    let mut impulse = vec![Vec3::zeros(); n];
    let restitution = cfg.restitution.clamp(0.0, 1.0);

    for i in 0..n {
        let a = &snaps[i];
        if a.dragging {
            continue;
        }
        for j in (i + 1)..n {
            let b = &snaps[j];
            if b.dragging {
                continue;
            }
            report.pairs_tested += 1;

            let Some(contact) = sphere_contact(&a.center, a.radius, &b.center, b.radius) else {
                continue;
            };
            if cfg.box_confirm && !boxes_overlap(&a.bounds, &b.bounds) {
                continue;
            }
            report.contacts += 1;

            let inv_sum = a.inv_mass + b.inv_mass;
            let wa = a.inv_mass / inv_sum;
            let wb = b.inv_mass / inv_sum;
            let correction = contact.normal * (contact.depth * cfg.push_fraction);
            push[i] -= correction * wa;
            push[j] += correction * wb;

            let vn = (b.velocity - a.velocity).dot(&contact.normal);
            if vn < 0.0 {
                let j_mag = -(1.0 + restitution) * vn / inv_sum;
                impulse[i] -= contact.normal * (j_mag * a.inv_mass);
                impulse[j] += contact.normal * (j_mag * b.inv_mass);
            }
        }
    }

    for (idx, part) in parts.iter_mut().enumerate() {
        let dp = clamp_length(push[idx], cfg.max_push_step);
        let dv = impulse[idx];
        if dp.norm() < MIN_CORRECTION && dv.norm() < MIN_CORRECTION {
            continue;
        }

        match &mut part.state {
            MotionState::Transitioning(tr) => {
                part.current_position += dp;
                // Keep the push: the interpolation restarts from `from` every step.
                tr.from += dp;
            }
            MotionState::FreeFlight if dt > 0.0 => {
                part.velocity += dv + dp / dt;
            }
            MotionState::FreeFlight => {
                part.current_position += dp;
                part.velocity += dv;
            }
            state if state.is_settled() => {
                part.current_position += dp;
                part.velocity += dv;
                *state = MotionState::FreeFlight;
                report.woken += 1;
            }
            _ => {}
        }
    }

    if report.contacts > 0 {
        trace!(
            "collision pass: {} contacts over {} pairs, {} parts woken",
            report.contacts, report.pairs_tested, report.woken
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::IdleConstants;
    use crate::types::{Iso, NodeId, PartId, Transform};

    fn ball(id: u32, pos: Vec3, half: f32) -> Part {
        let b = Aabb::new(
            Point3::from(pos - Vec3::repeat(half)),
            Point3::from(pos + Vec3::repeat(half)),
        );
        let mut p = Part::new(
            PartId(id),
            format!("p{id}"),
            NodeId(id),
            Iso::identity(),
            Transform::from_translation(pos),
            b,
            vec![b],
            IdleConstants {
                float_offset: 0.0,
                bob_speed: 0.3,
                rotation_speed: 0.0,
            },
        );
        p.exploded_position = pos;
        p.state = MotionState::SettledExploded;
        p
    }

    const DT: f32 = 1.0 / 60.0;

    fn kinetic(parts: &[Part]) -> f32 {
        parts
            .iter()
            .map(|p| 0.5 * p.mass * p.velocity.norm_squared())
            .sum()
    }

    #[test]
    fn overlapping_pair_moves_apart() {
        let mut parts = vec![
            ball(0, Vec3::zeros(), 0.5),
            ball(1, Vec3::new(0.5, 0.0, 0.0), 0.5),
        ];
        let before = (parts[1].current_position - parts[0].current_position).norm();
        let report =
            resolve_collisions(&mut parts, ViewMode::Exploded, &CollisionConfig::default(), DT);
        let after = (parts[1].current_position - parts[0].current_position).norm();

        assert_eq!(report.contacts, 1);
        assert!(after > before);
        // Toward, not past, the touching distance.
        assert!(after <= parts[0].collision_radius + parts[1].collision_radius + 1.0e-6);
        assert_eq!(parts[0].state, MotionState::FreeFlight);
    }

    #[test]
    fn assembled_parts_are_left_alone_by_default() {
        let mut parts = vec![ball(0, Vec3::zeros(), 0.5), ball(1, Vec3::zeros(), 0.5)];
        let report = resolve_collisions(
            &mut parts,
            ViewMode::Assembled,
            &CollisionConfig::default(),
            DT,
        );
        assert_eq!(report, CollisionReport::default());

        let cfg = CollisionConfig {
            when_assembled: true,
            ..CollisionConfig::default()
        };
        let report = resolve_collisions(&mut parts, ViewMode::Assembled, &cfg, DT);
        assert_eq!(report.contacts, 1);
        // Coincident centers separate along +X.
        assert!(parts[1].current_position.x > parts[0].current_position.x);
    }

    #[test]
    fn dragged_parts_are_skipped() {
        let mut parts = vec![
            ball(0, Vec3::zeros(), 0.5),
            ball(1, Vec3::new(0.2, 0.0, 0.0), 0.5),
        ];
        parts[0].state = MotionState::Dragging;
        let report =
            resolve_collisions(&mut parts, ViewMode::Exploded, &CollisionConfig::default(), DT);
        assert_eq!(report.pairs_tested, 0);
        assert_eq!(parts[1].current_position, Vec3::new(0.2, 0.0, 0.0));
    }

    #[test]
    fn impulse_never_adds_energy() {
        for e in [0.0, 0.5, 1.0] {
            let mut parts = vec![
                ball(0, Vec3::zeros(), 0.5),
                ball(1, Vec3::new(0.6, 0.0, 0.0), 0.3),
            ];
            parts[0].state = MotionState::FreeFlight;
            parts[1].state = MotionState::FreeFlight;
            parts[0].velocity = Vec3::new(2.0, 0.3, 0.0);
            parts[1].velocity = Vec3::new(-1.0, 0.0, 0.1);
            let before = kinetic(&parts);

            // Only the impulse here; the push nudge is covered separately.
            let cfg = CollisionConfig {
                restitution: e,
                push_fraction: 0.0,
                ..CollisionConfig::default()
            };
            resolve_collisions(&mut parts, ViewMode::Exploded, &cfg, DT);
            assert!(kinetic(&parts) <= before + 1.0e-5, "restitution {e}");

            let vn = (parts[1].velocity - parts[0].velocity).x;
            assert!(vn >= -1.0e-5, "still approaching with restitution {e}");
        }
    }

    #[test]
    fn push_is_clamped_per_pass() {
        let mut parts = vec![ball(0, Vec3::zeros(), 2.0), ball(1, Vec3::zeros(), 2.0)];
        let cfg = CollisionConfig::default();
        resolve_collisions(&mut parts, ViewMode::Exploded, &cfg, DT);
        for p in &parts {
            assert!(p.current_position.norm() <= cfg.max_push_step + 1.0e-6);
        }
    }

    #[test]
    fn transitioning_parts_keep_their_push() {
        let mut parts = vec![
            ball(0, Vec3::zeros(), 0.5),
            ball(1, Vec3::new(0.5, 0.0, 0.0), 0.5),
        ];
        parts[1].state = MotionState::Transitioning(crate::part::Transition {
            target: ViewMode::Exploded,
            from: Vec3::new(0.5, 0.0, 0.0),
            from_rotation: parts[1].current_rotation,
            elapsed: 0.0,
            delay: 0.0,
        });
        resolve_collisions(&mut parts, ViewMode::Exploded, &CollisionConfig::default(), DT);
        let MotionState::Transitioning(tr) = parts[1].state else {
            panic!("transition was abandoned");
        };
        assert!(tr.from.x > 0.5);
        assert_eq!(tr.from, parts[1].current_position);
    }

    #[test]
    fn free_flight_overlap_becomes_a_velocity_nudge() {
        let mut parts = vec![
            ball(0, Vec3::zeros(), 0.5),
            ball(1, Vec3::new(0.5, 0.0, 0.0), 0.5),
        ];
        for p in &mut parts {
            p.state = MotionState::FreeFlight;
        }
        let cfg = CollisionConfig::default();
        resolve_collisions(&mut parts, ViewMode::Exploded, &cfg, DT);

        // No teleport: the separation shows up as velocity along the normal.
        assert_eq!(parts[0].current_position, Vec3::zeros());
        assert_eq!(parts[1].current_position, Vec3::new(0.5, 0.0, 0.0));
        assert!(parts[0].velocity.x < 0.0);
        assert!(parts[1].velocity.x > 0.0);
        for p in &parts {
            assert!(p.velocity.norm() * DT <= cfg.max_push_step + 1.0e-6);
        }
    }
}
