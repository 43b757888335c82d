use crate::constants::{
    COLLISION_RADIUS_FACTOR, MIN_COLLISION_RADIUS, MIN_MASS, MIN_MOMENT_OF_INERTIA, PART_DENSITY,
};
use crate::types::{
    Aabb, Iso, NodeId, PartId, Point3, Quat, Transform, Vec3, ViewMode, translate_aabb,
};

/// An in-flight timed interpolation toward one of the rest poses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub target: ViewMode,
    /// Position the interpolation starts from (world space).
    pub from: Vec3,
    pub from_rotation: Quat,
    /// Seconds since the transition was issued, including the delay.
    pub elapsed: f32,
    /// Seconds to wait before this part starts moving (stagger).
    pub delay: f32,
}

/// Per-part motion state machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionState {
    SettledAssembled,
    SettledExploded,
    Transitioning(Transition),
    /// Velocity-driven motion with spring pull-back toward `target`.
    FreeFlight,
    /// Owned by the interaction controller.
    Dragging,
}

impl MotionState {
    #[inline]
    pub fn settled(mode: ViewMode) -> Self {
        match mode {
            ViewMode::Assembled => MotionState::SettledAssembled,
            ViewMode::Exploded => MotionState::SettledExploded,
        }
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            MotionState::SettledAssembled | MotionState::SettledExploded
        )
    }
}

/// Per-part randomized constants driving the idle animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdleConstants {
    /// Phase offset of the bob (radians).
    pub float_offset: f32,
    /// Angular frequency of the bob (rad/s).
    pub bob_speed: f32,
    /// Idle spin rate (rad/s), weighted per axis.
    pub rotation_speed: f32,
}

/// An independently movable unit derived from the scene graph.
///
/// Positions are world space. The render adapter converts back to the node's
/// parent frame through [`Part::local_pose`].
#[derive(Clone, Debug)]
pub struct Part {
    pub id: PartId,
    pub name: String,
    /// Non-owning handle to the scene node this part drives.
    pub node: NodeId,

    /// World transform of the node's parent at decomposition time.
    pub parent_transform: Iso,
    /// Node translation relative to its parent at rest.
    pub local_position: Vec3,

    // Rest pose, captured once at decomposition.
    pub original_position: Vec3,
    pub original_rotation: Quat,

    pub exploded_position: Vec3,

    // Live state.
    pub current_position: Vec3,
    pub current_rotation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,

    pub mass: f32,
    /// Scalar approximation of the inertia tensor.
    pub moment_of_inertia: f32,
    pub collision_radius: f32,

    /// World bounds of the whole subtree at rest.
    pub bounding_box: Aabb,
    /// World bounds of each drawable in the subtree at rest, for picking.
    pub pick_bounds: Vec<Aabb>,

    pub idle: IdleConstants,
    pub state: MotionState,
}

/// Per-frame output for the render adapter, expressed in the node's parent frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartPose {
    pub part: PartId,
    pub node: NodeId,
    pub local: Transform,
}

impl Part {
    /// Build a part at rest from its node's world pose and subtree bounds.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PartId,
        name: String,
        node: NodeId,
        parent_transform: Iso,
        local: Transform,
        bounding_box: Aabb,
        pick_bounds: Vec<Aabb>,
        idle: IdleConstants,
    ) -> Self {
        let world = parent_transform * local.iso();
        let position = world.translation.vector;
        let rotation = world.rotation;
        let (mass, radius, inertia) = derive_physical(&bounding_box);

        Self {
            id,
            name,
            node,
            parent_transform,
            local_position: local.translation,
            original_position: position,
            original_rotation: rotation,
            exploded_position: position,
            current_position: position,
            current_rotation: rotation,
            velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            mass,
            moment_of_inertia: inertia,
            collision_radius: radius,
            bounding_box,
            pick_bounds,
            idle,
            state: MotionState::SettledAssembled,
        }
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, MotionState::Dragging)
    }

    /// Center of the part's rest bounds (world space).
    #[inline]
    pub fn rest_center(&self) -> Vec3 {
        self.bounding_box.center().coords
    }

    /// Offset between the live and the rest position.
    #[inline]
    pub fn displacement(&self) -> Vec3 {
        self.current_position - self.original_position
    }

    /// Rest bounds moved along with the part. Rotation is ignored.
    #[inline]
    pub fn current_bounds(&self) -> Aabb {
        translate_aabb(&self.bounding_box, &self.displacement())
    }

    /// Center of the moving bounds, used as the collision sphere center.
    #[inline]
    pub fn current_center(&self) -> Point3 {
        self.bounding_box.center() + self.displacement()
    }

    #[inline]
    pub fn target_position(&self, mode: ViewMode) -> Vec3 {
        match mode {
            ViewMode::Assembled => self.original_position,
            ViewMode::Exploded => self.exploded_position,
        }
    }

    /// Drop any velocity and snap onto the rest pose of `mode`.
    pub fn snap_to(&mut self, mode: ViewMode) {
        self.current_position = self.target_position(mode);
        if mode == ViewMode::Assembled {
            self.current_rotation = self.original_rotation;
        }
        self.velocity = Vec3::zeros();
        self.angular_velocity = Vec3::zeros();
        self.state = MotionState::settled(mode);
    }

    /// Live pose in the node's parent frame.
    pub fn local_pose(&self) -> PartPose {
        let world = Iso::from_parts(self.current_position.into(), self.current_rotation);
        let local = self.parent_transform.inverse() * world;
        PartPose {
            part: self.id,
            node: self.node,
            local: Transform::from_iso(&local),
        }
    }
}

/// Mass, collision radius and moment of inertia from a bounding box, all floored.
fn derive_physical(bounds: &Aabb) -> (f32, f32, f32) {
    let extents = bounds.extents();
    let volume = (extents.x * extents.y * extents.z).abs();
    let mass = sanitize(volume * PART_DENSITY, MIN_MASS);

    let max_half = bounds.half_extents().max();
    let radius = sanitize(max_half * COLLISION_RADIUS_FACTOR, MIN_COLLISION_RADIUS);

    // Solid sphere: I = 2/5 m r^2.
    let inertia = sanitize(0.4 * mass * radius * radius, MIN_MOMENT_OF_INERTIA);
    (mass, radius, inertia)
}

#[inline]
fn sanitize(value: f32, floor: f32) -> f32 {
    if value.is_finite() { value.max(floor) } else { floor }
}
