use rapier3d::parry::query::RayCast;

use crate::constants::{MAX_PICK_DISTANCE, PLANE_PARALLEL_EPS};
use crate::part::Part;
use crate::types::{PartId, Point3, Ray, Vec3, translate_aabb};

/// Nearest part hit by `ray`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickHit {
    pub part: PartId,
    /// Distance along the (unit) ray.
    pub toi: f32,
    pub point: Point3,
}

/// Cast `ray` against every drawable of every part, moved along with the part.
///
/// Boxes are rest bounds translated by the part's displacement; rotation is ignored.
pub fn pick_part(parts: &[Part], ray: &Ray) -> Option<PickHit> {
    let mut best: Option<PickHit> = None;
    for part in parts {
        let offset = part.displacement();
        for bounds in &part.pick_bounds {
            let moved = translate_aabb(bounds, &offset);
            let Some(toi) = moved.cast_local_ray(ray, MAX_PICK_DISTANCE, true) else {
                continue;
            };
            if best.is_none_or(|b| toi < b.toi) {
                best = Some(PickHit {
                    part: part.id,
                    toi,
                    point: ray.point_at(toi),
                });
            }
        }
    }
    best
}

/// Plane through the grabbed point, facing the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragPlane {
    pub point: Vec3,
    /// Unit normal, pointing back toward the camera.
    pub normal: Vec3,
}

impl DragPlane {
    pub fn facing_camera(point: Vec3, camera_forward: &Vec3) -> Self {
        let normal = (-camera_forward).try_normalize(f32::EPSILON).unwrap_or(Vec3::z());
        Self { point, normal }
    }

    /// Intersection of `ray` with the plane, or `None` when parallel or behind the origin.
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let denom = self.normal.dot(&ray.dir);
        if denom.abs() <= PLANE_PARALLEL_EPS {
            return None;
        }
        let t = self.normal.dot(&(self.point - ray.origin.coords)) / denom;
        if t < 0.0 || !t.is_finite() {
            return None;
        }
        Some(ray.point_at(t).coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::IdleConstants;
    use crate::types::{Aabb, Iso, NodeId, Transform};

    fn cube(id: u32, at: Vec3) -> Part {
        let b = Aabb::new(
            Point3::from(at - Vec3::repeat(0.5)),
            Point3::from(at + Vec3::repeat(0.5)),
        );
        Part::new(
            PartId(id),
            format!("c{id}"),
            NodeId(id),
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
    fn picks_nearest_along_ray() {
        let parts = vec![cube(0, Vec3::new(0.0, 0.0, -5.0)), cube(1, Vec3::new(0.0, 0.0, -2.0))];
        let ray = Ray::new(Point3::origin(), -Vec3::z());
        let hit = pick_part(&parts, &ray).unwrap();
        assert_eq!(hit.part, PartId(1));
        assert!((hit.toi - 1.5).abs() < 1.0e-5);
    }

    #[test]
    fn moved_part_is_picked_where_it_is() {
        let mut parts = vec![cube(0, Vec3::zeros())];
        parts[0].current_position = Vec3::new(10.0, 0.0, 0.0);
        let at_rest = Ray::new(Point3::new(0.0, 0.0, 5.0), -Vec3::z());
        assert!(pick_part(&parts, &at_rest).is_none());
        let at_live = Ray::new(Point3::new(10.0, 0.0, 5.0), -Vec3::z());
        assert_eq!(pick_part(&parts, &at_live).map(|h| h.part), Some(PartId(0)));
    }

    #[test]
    fn miss_returns_none() {
        let parts = vec![cube(0, Vec3::zeros())];
        let ray = Ray::new(Point3::new(0.0, 5.0, 5.0), -Vec3::z());
        assert!(pick_part(&parts, &ray).is_none());
        assert!(pick_part(&[], &ray).is_none());
    }

    #[test]
    fn drag_plane_intersection() {
        let plane = DragPlane::facing_camera(Vec3::new(0.0, 0.0, -3.0), &-Vec3::z());
        let ray = Ray::new(Point3::origin(), Vec3::new(1.0, 0.0, -1.0).normalize());
        let hit = plane.intersect(&ray).unwrap();
        assert!((hit - Vec3::new(3.0, 0.0, -3.0)).norm() < 1.0e-5);

        let parallel = Ray::new(Point3::origin(), Vec3::x());
        assert!(plane.intersect(&parallel).is_none());
        let away = Ray::new(Point3::origin(), Vec3::z());
        assert!(plane.intersect(&away).is_none());
    }
}
