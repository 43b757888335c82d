use crate::constants::COINCIDENT_EPS;
use crate::types::{Aabb, BoundingVolume, Point3, Vec3};

/// Overlap between two bounding spheres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereContact {
    /// Unit separating normal, pointing from the first sphere toward the second.
    pub normal: Vec3,
    /// Penetration depth (meters), always > 0.
    pub depth: f32,
}

/// Sphere-vs-sphere overlap test.
///
/// Returns `None` when the spheres merely touch or are apart. Coincident centers
/// have no separating direction; they get a stable +X normal and full depth.
pub fn sphere_contact(
    center_a: &Point3,
    radius_a: f32,
    center_b: &Point3,
    radius_b: f32,
) -> Option<SphereContact> {
    let delta = center_b - center_a;
    let min_dist = radius_a + radius_b;
    let dist_sq = delta.norm_squared();
    if dist_sq >= min_dist * min_dist {
        return None;
    }

    if dist_sq <= COINCIDENT_EPS * COINCIDENT_EPS {
        return Some(SphereContact {
            normal: Vec3::x(),
            depth: min_dist,
        });
    }

    let dist = dist_sq.sqrt();
    Some(SphereContact {
        normal: delta / dist,
        depth: min_dist - dist,
    })
}

/// Axis-aligned box overlap, used to confirm sphere hits for elongated parts.
#[inline]
pub fn boxes_overlap(a: &Aabb, b: &Aabb) -> bool {
    a.intersects(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separated_spheres_have_no_contact() {
        let c = sphere_contact(&Point3::origin(), 0.5, &Point3::new(1.5, 0.0, 0.0), 0.5);
        assert!(c.is_none());
    }

    #[test]
    fn overlapping_spheres_report_depth_and_normal() {
        let c = sphere_contact(&Point3::origin(), 0.5, &Point3::new(0.0, 0.8, 0.0), 0.5).unwrap();
        assert!((c.depth - 0.2).abs() < 1.0e-6);
        assert!((c.normal - Vec3::y()).norm() < 1.0e-6);
    }

    #[test]
    fn coincident_centers_push_along_x() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let c = sphere_contact(&p, 0.25, &p, 0.5).unwrap();
        assert_eq!(c.normal, Vec3::x());
        assert!((c.depth - 0.75).abs() < 1.0e-6);
    }

    #[test]
    fn box_confirmation_rejects_diagonal_sphere_hits() {
        // Thin slabs whose spheres overlap diagonally while the boxes don't.
        let a = Aabb::new(Point3::new(-1.0, -0.05, -1.0), Point3::new(1.0, 0.05, 1.0));
        let b = Aabb::new(Point3::new(-1.0, 0.2, -1.0), Point3::new(1.0, 0.3, 1.0));
        assert!(sphere_contact(&a.center(), 0.9, &b.center(), 0.9).is_some());
        assert!(!boxes_overlap(&a, &b));
    }
}
