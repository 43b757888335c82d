//! Camera framing requests. The core only computes where the camera should go;
//! animating it there is the renderer's job.

use crate::camera::CameraPose;
use crate::constants::{FIT_VIEW_ELEVATION, FIT_VIEW_PADDING, FOCUS_DISTANCE_FACTOR};
use crate::part::Part;
use crate::types::{Aabb, BoundingVolume, Vec3, ViewMode, translate_aabb};

/// Smallest framed dimension, so empty or flat bounds still give a usable distance.
const MIN_FRAMED_SIZE: f32 = 0.1;

/// Where the camera should end up: eye position and look-at target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFocus {
    pub eye: Vec3,
    pub target: Vec3,
}

/// Move the camera toward a part, keeping its current viewing direction.
pub fn focus_part(part: &Part, camera: &CameraPose) -> CameraFocus {
    let bounds = part.current_bounds();
    let target = bounds.center().coords;
    let max_dim = bounds.extents().max().max(MIN_FRAMED_SIZE);

    let dir = (camera.position - target)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(|| -camera.forward());
    CameraFocus {
        eye: target + dir * (max_dim * FOCUS_DISTANCE_FACTOR),
        target,
    }
}

/// Fit `bounds` in a vertical field of view, looking from the (+X, +Y, +Z) octant.
pub fn fit_view(bounds: &Aabb, fov_y: f32) -> CameraFocus {
    let target = bounds.center().coords;
    let max_dim = bounds.extents().max().max(MIN_FRAMED_SIZE);
    let half_tan = (fov_y * 0.5).tan().max(1.0e-3);
    let d = max_dim / (2.0 * half_tan) * FIT_VIEW_PADDING;

    CameraFocus {
        eye: target + Vec3::new(d, d * FIT_VIEW_ELEVATION, d),
        target,
    }
}

/// Bounds of every part placed at its rest pose for `mode`.
pub fn pose_bounds(parts: &[Part], mode: ViewMode) -> Option<Aabb> {
    parts
        .iter()
        .map(|p| translate_aabb(&p.bounding_box, &(p.target_position(mode) - p.original_position)))
        .reduce(|acc, b| acc.merged(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::IdleConstants;
    use crate::types::{Iso, NodeId, PartId, Point3, Transform};

    fn cube(at: Vec3, half: f32) -> Part {
        let b = Aabb::new(
            Point3::from(at - Vec3::repeat(half)),
            Point3::from(at + Vec3::repeat(half)),
        );
        Part::new(
            PartId(0),
            "c".into(),
            NodeId(0),
            Iso::identity(),
            Transform::from_translation(at),
            b,
            vec![b],
            IdleConstants {
                float_offset: 0.0,
                bob_speed: 0.2,
                rotation_speed: 0.0,
            },
        )
    }

    #[test]
    fn focus_keeps_viewing_direction() {
        let part = cube(Vec3::new(1.0, 0.0, 0.0), 0.5);
        let cam = CameraPose::look_at(
            Vec3::new(1.0, 0.0, 10.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::y(),
            1.0,
            1.0,
        );
        let f = focus_part(&part, &cam);
        assert!((f.target - Vec3::new(1.0, 0.0, 0.0)).norm() < 1.0e-6);
        assert!((f.eye - Vec3::new(1.0, 0.0, 2.5)).norm() < 1.0e-5);
    }

    #[test]
    fn fit_view_distance_matches_fov() {
        let b = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let fov = std::f32::consts::FRAC_PI_2;
        let f = fit_view(&b, fov);
        // tan(45deg) = 1, so d = 2 / 2 * 1.8.
        assert!((f.eye - Vec3::new(1.8, 1.26, 1.8)).norm() < 1.0e-4);
        assert_eq!(f.target, Vec3::zeros());
    }

    #[test]
    fn pose_bounds_follow_targets() {
        let mut p = cube(Vec3::zeros(), 0.5);
        p.exploded_position = Vec3::new(4.0, 0.0, 0.0);
        let parts = vec![p];
        let assembled = pose_bounds(&parts, ViewMode::Assembled).unwrap();
        let exploded = pose_bounds(&parts, ViewMode::Exploded).unwrap();
        assert!((assembled.center().x).abs() < 1.0e-6);
        assert!((exploded.center().x - 4.0).abs() < 1.0e-6);
        assert!(pose_bounds(&[], ViewMode::Exploded).is_none());
    }
}
