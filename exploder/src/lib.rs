pub mod camera;
pub mod collision;
pub mod config;
pub mod constants;
pub mod decompose;
pub mod easing;
pub mod error;
pub mod events;
pub mod explosion;
pub mod framing;
pub mod interaction;
pub mod motion;
pub mod part;
pub mod picking;
pub mod scene;
pub mod simulation;
pub mod types;
pub mod utils;

pub use camera::CameraPose;
pub use config::{
    AnimationPreset, CollisionConfig, ExploderConfig, ExplosionConfig, InteractionConfig,
    PhysicsConfig, TransitionConfig,
};
pub use decompose::{Decomposition, decompose};
pub use easing::Easing;
pub use error::{ConfigError, Result};
pub use events::SimEvent;
pub use framing::CameraFocus;
pub use interaction::{PointerEvent, PointerOutcome, Release, ReleaseKind};
pub use part::{MotionState, Part, PartPose};
pub use scene::{NodeKind, SceneNode};
pub use simulation::{Exploder, PoseSink};
pub use types::{
    Aabb, Iso, NodeId, PartId, Point3, Quat, Transform, Vec2, Vec3, ViewCommand, ViewMode,
};
