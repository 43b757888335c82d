/*!
Default tunables for decomposition, motion, collision and interaction.

Keeping them together makes tuning easier and keeps the per-frame step deterministic.
The runtime values live in [`crate::config::ExploderConfig`]; these are its defaults.

Notes
- Distances are in meters, time in seconds unless the name ends in `_MS`.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
*/

use std::f32::consts::TAU;

// -----------------------------------------------------------------------------
// Decomposition
// -----------------------------------------------------------------------------

/// Collision radius = max half-extent of the part's bounds times this factor.
/// Slightly below 1.0 so neighbouring parts don't collide on contact.
pub const COLLISION_RADIUS_FACTOR: f32 = 0.9;

/// Floor for collision radii derived from degenerate (flat or empty) bounds.
pub const MIN_COLLISION_RADIUS: f32 = 0.01;

/// Mass per cubic meter of bounding volume.
pub const PART_DENSITY: f32 = 1.0;

/// Floor for part masses, so zero-volume parts still respond to impulses.
pub const MIN_MASS: f32 = 1.0e-3;

/// Floor for the scalar moment of inertia.
pub const MIN_MOMENT_OF_INERTIA: f32 = 1.0e-4;

/// Idle animation constants are drawn from these ranges once per part.
pub const FLOAT_OFFSET_RANGE: f32 = TAU;
pub const ROTATION_SPEED_RANGE: f32 = 0.5;
pub const BOB_SPEED_MIN: f32 = 0.2;
pub const BOB_SPEED_RANGE: f32 = 0.2;

// -----------------------------------------------------------------------------
// Explosion targets
// -----------------------------------------------------------------------------

/// Distance every part travels before jitter and size terms are added (meters).
pub const DEFAULT_EXPLOSION_DISTANCE: f32 = 1.5;

/// Upper bound of the random jitter added to the travel distance (meters).
pub const DEFAULT_JITTER_RANGE: f32 = 0.8;

/// Travel added per meter of collision radius, so big parts clear their neighbours.
pub const DEFAULT_RADIUS_FACTOR: f32 = 1.2;

/// Below this length a candidate explosion direction is considered degenerate (meters).
pub const DIRECTION_EPS: f32 = 0.1;

// -----------------------------------------------------------------------------
// Transitions
// -----------------------------------------------------------------------------

pub const DEFAULT_TRANSITION_MS: u32 = 900;

/// Transitions shorter than this are legal but look like a jump cut.
pub const MIN_SMOOTH_TRANSITION_MS: u32 = 100;

// -----------------------------------------------------------------------------
// Motion integrator
// -----------------------------------------------------------------------------

/// Largest frame delta the integrator will consume (seconds).
/// Anything longer (backgrounded tab, debugger pause) is clamped, never caught up.
pub const MAX_FRAME_DT: f32 = 1.0 / 20.0;

/// Spring pulling free-flying parts back to their target (1/s^2).
pub const SPRING_STIFFNESS: f32 = 9.0;

/// Velocity drag: `factor = 1 / (1 + (linear + quadratic * speed) * dt)`.
/// The quadratic term is the "more air resistance at higher speed" policy.
pub const LINEAR_DRAG: f32 = 4.0;
pub const QUADRATIC_DRAG: f32 = 0.5;

/// Same policy for spin (rad/s).
pub const ANGULAR_DRAG: f32 = 3.0;
pub const ANGULAR_QUADRATIC_DRAG: f32 = 0.2;

/// Spin damping while settled in the exploded pose (idle spin keeps going).
pub const IDLE_ANGULAR_DRAG: f32 = 1.2;

/// Rate at which rotations ease back to rest while free flying toward the assembled pose (1/s).
pub const ROTATION_RETURN_RATE: f32 = 6.0;

/// A free-flying part settles once both thresholds hold.
pub const SETTLE_SPEED: f32 = 0.01;
pub const SETTLE_DISTANCE: f32 = 0.01;

/// Max angle to rest rotation (radians) for a part to settle in the assembled pose.
pub const SETTLE_ANGLE: f32 = 0.01;

/// Idle bob: `y += sin(t * bob_speed + float_offset) * BOB_AMPLITUDE * dt * BOB_SCALE`.
pub const BOB_AMPLITUDE: f32 = 0.03;
pub const BOB_SCALE: f32 = 1.0;

/// Per-axis weights applied to a part's idle rotation speed (x, y, z).
pub const IDLE_SPIN_WEIGHTS: [f32; 3] = [0.3, 1.0, 0.2];

// -----------------------------------------------------------------------------
// Collision
// -----------------------------------------------------------------------------

/// Fraction of the overlap corrected per pass.
pub const PUSH_FRACTION: f32 = 0.5;

/// Max positional correction applied to one part per pass (meters).
pub const MAX_PUSH_STEP: f32 = 0.05;

/// Coefficient of restitution for approaching pairs, in `[0, 1]`.
pub const RESTITUTION: f32 = 0.5;

/// Used when two centers coincide and no separating normal exists.
pub const COINCIDENT_EPS: f32 = 1.0e-6;

// -----------------------------------------------------------------------------
// Interaction
// -----------------------------------------------------------------------------

/// Pointer holds shorter than this that never moved are taps.
pub const HOLD_THRESHOLD_MS: u32 = 150;

/// World-space displacement that turns a press into a drag (meters).
pub const DRAG_EPSILON: f32 = 0.01;

/// Rolling velocity samples kept for the throw.
pub const DRAG_HISTORY_LEN: usize = 5;

/// Only samples this recent (relative to release) feed the throw.
pub const THROW_SAMPLE_WINDOW_MS: u32 = 150;

pub const THROW_SCALE: f32 = 1.0;
pub const MAX_THROW_SPEED: f32 = 12.0;

/// Spin gained per unit of torque / moment of inertia.
pub const TORQUE_GAIN: f32 = 2.0;

/// Rays nearly parallel to the drag plane don't intersect it.
pub const PLANE_PARALLEL_EPS: f32 = 1.0e-6;

/// Maximum pick distance along the camera ray (meters).
pub const MAX_PICK_DISTANCE: f32 = 1.0e4;

// -----------------------------------------------------------------------------
// Camera framing
// -----------------------------------------------------------------------------

/// Focus distance as a multiple of the selected part's largest dimension.
pub const FOCUS_DISTANCE_FACTOR: f32 = 2.5;

/// Padding applied to the distance that exactly fits the view bounds.
pub const FIT_VIEW_PADDING: f32 = 1.8;

/// Elevation of the fitted eye relative to its horizontal offset.
pub const FIT_VIEW_ELEVATION: f32 = 0.7;

/// Default vertical field of view (radians) when the renderer doesn't report one.
pub const DEFAULT_FOV_Y: f32 = 50.0 * std::f32::consts::PI / 180.0;
