/*!
Core math aliases and small value types shared by every exploder module.

This module intentionally contains no algorithms. It defines the data types
exchanged between:
- the scene graph and the part decomposer
- the motion integrator and the collision resolver
- the interaction controller and the render adapter

All positions are world-space meters unless a field name says otherwise.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Vec2 = na::Vector2<f32>;
pub type Point3 = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

pub use rapier3d::parry::bounding_volume::{Aabb, BoundingVolume};
pub use rapier3d::parry::query::Ray;

/// A rigid transform (translation + rotation), local to the parent node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    #[inline]
    pub fn identity() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }

    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::identity(),
        }
    }

    /// Convert to nalgebra `Isometry3` for composition and parry queries.
    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(na::Translation3::from(self.translation), self.rotation)
    }

    #[inline]
    pub fn from_iso(iso: &Iso) -> Self {
        Self {
            translation: iso.translation.vector,
            rotation: iso.rotation,
        }
    }
}

/// Opaque handle to a node of the renderer's scene graph.
///
/// The core never dereferences it; the render adapter resolves it through its own lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Index of a part inside the current decomposition.
///
/// Parts are created in one batch per asset and never individually removed, so the
/// index stays valid until the next load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(pub u32);

impl PartId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The two named rest poses of the object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Assembled,
    Exploded,
}

impl ViewMode {
    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Assembled => ViewMode::Exploded,
            ViewMode::Exploded => ViewMode::Assembled,
        }
    }
}

/// Global explode/assemble command coming from the UI layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewCommand {
    Explode,
    Assemble,
    Toggle,
}

/// Translate an AABB without recomputing geometry.
#[inline]
pub fn translate_aabb(aabb: &Aabb, offset: &Vec3) -> Aabb {
    Aabb::new(aabb.mins + offset, aabb.maxs + offset)
}
