/*!
Exploded target computation.

For each part:
- direction = normalize(part center - object center), falling back to the part's
  local position and finally to a random unit vector
- distance = base + jitter + collision_radius * radius_factor
- exploded = original + direction * distance

Pure apart from the injected random source. Re-running it with jitter disabled
gives identical targets.
*/

use log::debug;
use rand::Rng;

use crate::config::ExplosionConfig;
use crate::constants::DIRECTION_EPS;
use crate::part::Part;
use crate::types::Vec3;

/// Outward direction for a part. Always unit length.
pub fn explosion_direction<R: Rng + ?Sized>(
    part_center: &Vec3,
    object_center: &Vec3,
    local_position: &Vec3,
    rng: &mut R,
) -> Vec3 {
    let radial = part_center - object_center;
    if let Some(dir) = radial.try_normalize(DIRECTION_EPS) {
        return dir;
    }
    if let Some(dir) = local_position.try_normalize(DIRECTION_EPS) {
        return dir;
    }
    random_unit_vector(rng)
}

/// Uniformly distributed unit vector (rejection sampling in the unit ball).
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    const MAX_ATTEMPTS: usize = 64;
    for _ in 0..MAX_ATTEMPTS {
        let v = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        let len_sq = v.norm_squared();
        if len_sq > 1.0e-4 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
    // Practically unreachable; keeps the function total.
    Vec3::x()
}

/// Travel distance for a part of the given collision radius.
pub fn explosion_distance<R: Rng + ?Sized>(
    collision_radius: f32,
    params: &ExplosionConfig,
    rng: &mut R,
) -> f32 {
    let jitter = if params.jitter_range > 0.0 {
        rng.gen_range(0.0..params.jitter_range)
    } else {
        0.0
    };
    params.base_distance + jitter + collision_radius * params.radius_factor
}

/// Compute `exploded_position` for every part. Does not touch live state.
pub fn assign_exploded_targets<R: Rng + ?Sized>(
    parts: &mut [Part],
    object_center: &Vec3,
    params: &ExplosionConfig,
    rng: &mut R,
) {
    for part in parts.iter_mut() {
        let dir = explosion_direction(
            &part.rest_center(),
            object_center,
            &part.local_position,
            rng,
        );
        let distance = explosion_distance(part.collision_radius, params, rng);
        part.exploded_position = part.original_position + dir * distance;
    }
    debug!(
        "assigned exploded targets for {} parts (base {:.2}, jitter {:.2})",
        parts.len(),
        params.base_distance,
        params.jitter_range
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn no_jitter(base: f32) -> ExplosionConfig {
        ExplosionConfig {
            base_distance: base,
            jitter_range: 0.0,
            radius_factor: 1.2,
        }
    }

    #[test]
    fn radial_direction_when_off_center() {
        let mut rng = StdRng::seed_from_u64(0);
        let d = explosion_direction(
            &Vec3::new(3.0, 0.0, 0.0),
            &Vec3::new(1.0, 0.0, 0.0),
            &Vec3::zeros(),
            &mut rng,
        );
        assert!((d - Vec3::x()).norm() < 1.0e-6);
    }

    #[test]
    fn falls_back_to_local_position() {
        let mut rng = StdRng::seed_from_u64(0);
        let d = explosion_direction(
            &Vec3::zeros(),
            &Vec3::new(0.01, 0.0, 0.0),
            &Vec3::new(0.0, 0.0, -4.0),
            &mut rng,
        );
        assert!((d - Vec3::new(0.0, 0.0, -1.0)).norm() < 1.0e-6);
    }

    #[test]
    fn degenerate_direction_is_random_unit() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let d = explosion_direction(&Vec3::zeros(), &Vec3::zeros(), &Vec3::zeros(), &mut rng);
            assert!((d.norm() - 1.0).abs() < 1.0e-5);
        }
    }

    #[test]
    fn bigger_parts_travel_further() {
        let mut rng = StdRng::seed_from_u64(5);
        let params = no_jitter(1.0);
        let small = explosion_distance(0.2, &params, &mut rng);
        let big = explosion_distance(0.8, &params, &mut rng);
        assert!(big >= small);
        assert!((small - (1.0 + 0.2 * 1.2)).abs() < 1.0e-6);
    }

    #[test]
    fn jitter_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(5);
        let params = ExplosionConfig {
            base_distance: 1.0,
            jitter_range: 0.5,
            radius_factor: 0.0,
        };
        for _ in 0..100 {
            let d = explosion_distance(0.3, &params, &mut rng);
            assert!((1.0..1.5).contains(&d));
        }
    }
}
