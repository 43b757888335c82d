/*!
Collision root module.

Approximate, stateless, per-frame overlap relaxation between parts. This is not a
rigid-body solver: there is no broad phase, no contact persistence and no
continuous detection. A pass may leave residual interpenetration for a frame or
two; the next pass keeps pushing.

- narrow_phase: bounding-sphere contacts and AABB confirmation
- resolve:      the pairwise push + impulse pass over all parts
*/

pub mod narrow_phase;
pub mod resolve;

pub use narrow_phase::{SphereContact, boxes_overlap, sphere_contact};
pub use resolve::{CollisionReport, resolve_collisions};
