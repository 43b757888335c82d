use crate::types::{Quat, Vec3};

/// Clamp a frame delta into `[0, max_dt]`. Non-finite and negative deltas become 0.
///
/// A stalled frame (backgrounded tab, breakpoint) is never caught up: the extra
/// time is dropped, so parts can't jump across the scene in one step.
#[inline]
pub fn clamp_dt(dt: f32, max_dt: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(max_dt.max(0.0))
}

/// Rotate `rotation` by angular velocity `omega` (rad/s, world axes) over `dt`.
#[inline]
pub fn integrate_rotation(rotation: &Quat, omega: &Vec3, dt: f32) -> Quat {
    let step = omega * dt;
    if step.norm_squared() <= f32::EPSILON * f32::EPSILON {
        return *rotation;
    }
    Quat::from_scaled_axis(step) * rotation
}

/// Spherical interpolation that tolerates opposite rotations.
#[inline]
pub fn slerp(from: &Quat, to: &Quat, t: f32) -> Quat {
    from.try_slerp(to, t, 1.0e-6)
        .unwrap_or(if t < 0.5 { *from } else { *to })
}

/// Frame-rate independent blend factor for exponential smoothing at `rate` (1/s).
#[inline]
pub fn smoothing_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}

/// Clamp a vector's length to `max_len`.
#[inline]
pub fn clamp_length(v: Vec3, max_len: f32) -> Vec3 {
    let len = v.norm();
    if len > max_len && len > 0.0 {
        v * (max_len / len)
    } else {
        v
    }
}
