use crate::constants::DEFAULT_FOV_Y;
use crate::types::{Point3, Quat, Ray, Vec2, Vec3};

/// Camera pose supplied by the renderer each frame.
///
/// Right-handed, looking down local -Z with +Y up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view (radians).
    pub fov_y: f32,
    /// Viewport width / height.
    pub aspect: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::look_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::zeros(),
            Vec3::y(),
            DEFAULT_FOV_Y,
            1.0,
        )
    }
}

impl CameraPose {
    /// Camera at `eye` looking at `target`. Degenerate inputs keep an identity rotation.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3, fov_y: f32, aspect: f32) -> Self {
        // `face_towards` aligns +Z; the camera looks down -Z.
        let back = eye - target;
        let rotation = if back.norm_squared() <= f32::EPSILON {
            Quat::identity()
        } else if back.cross(&up).norm_squared() <= f32::EPSILON * back.norm_squared() {
            Quat::face_towards(&back, &Vec3::z())
        } else {
            Quat::face_towards(&back, &up)
        };

        Self {
            position: eye,
            rotation,
            fov_y,
            aspect: if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 },
        }
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::z()
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::y()
    }

    /// World-space ray through a point given in normalized device coordinates
    /// (`[-1, 1]` on both axes, +Y up).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let tan_half = (self.fov_y * 0.5).tan();
        let local = Vec3::new(ndc.x * tan_half * self.aspect, ndc.y * tan_half, -1.0);
        let dir = (self.rotation * local).normalize();
        Ray::new(Point3::from(self.position), dir)
    }
}
