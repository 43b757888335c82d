//! Glue between the exploder core and the ECS: feeds it input and the camera,
//! steps it once per frame and writes part poses back onto node entities.

use std::collections::HashMap;
use std::path::Path;

use bevy::{prelude::*, window::PrimaryWindow};
use exploder::{
    CameraPose, Exploder, ExploderConfig, NodeId, PartPose, PoseSink, PointerEvent, SimEvent,
    ViewCommand,
};
use leafwing_input_manager::prelude::ActionState;

use crate::input::InputAction;

/// Optional config file, read from the working directory at startup.
const CONFIG_PATH: &str = "exploder.toml";

#[derive(Resource)]
pub struct Simulation(pub Exploder);

/// Node handle -> entity carrying that node's `Transform`.
#[derive(Resource, Default)]
pub struct NodeEntities(pub HashMap<NodeId, Entity>);

/// Marks entities whose `Transform` is driven by the simulation.
#[derive(Component)]
pub struct ExplodableNode;

/// Simulation notifications, re-broadcast for the camera and cursor plugins.
#[derive(Message, Clone, Copy, Debug)]
pub struct ExploderMessage(pub SimEvent);

#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Input,
    Step,
    Publish,
}

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(Simulation(Exploder::new(load_config())));
    app.init_resource::<NodeEntities>();
    app.add_message::<ExploderMessage>();

    app.configure_sets(
        Update,
        (SimulationSet::Input, SimulationSet::Step, SimulationSet::Publish).chain(),
    );
    app.add_systems(
        Update,
        (
            (handle_commands, handle_pointer).in_set(SimulationSet::Input),
            step_simulation.in_set(SimulationSet::Step),
            (apply_poses, forward_events).in_set(SimulationSet::Publish),
        ),
    );
}

fn load_config() -> ExploderConfig {
    let path = Path::new(CONFIG_PATH);
    if !path.exists() {
        info!("no {CONFIG_PATH} found, using default exploder config");
        return ExploderConfig::default();
    }
    match ExploderConfig::load(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("failed to load {CONFIG_PATH}: {e}; using defaults");
            ExploderConfig::default()
        }
    }
}

pub fn to_na_vec3(v: Vec3) -> exploder::Vec3 {
    exploder::Vec3::new(v.x, v.y, v.z)
}

pub fn from_na_vec3(v: &exploder::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn to_na_quat(q: Quat) -> exploder::Quat {
    exploder::Quat::new_normalize(nalgebra::Quaternion::new(q.w, q.x, q.y, q.z))
}

pub fn from_na_quat(q: &exploder::Quat) -> Quat {
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

/// Camera pose as the simulation sees it.
pub fn camera_pose(transform: &GlobalTransform, projection: &Projection) -> CameraPose {
    let (fov_y, aspect) = match projection {
        Projection::Perspective(p) => (p.fov, p.aspect_ratio),
        _ => (std::f32::consts::FRAC_PI_4, 1.0),
    };
    let (_, rotation, translation) = transform.to_scale_rotation_translation();
    CameraPose {
        position: to_na_vec3(translation),
        rotation: to_na_quat(rotation),
        fov_y,
        aspect,
    }
}

fn handle_commands(actions: Res<ActionState<InputAction>>, mut sim: ResMut<Simulation>) {
    let command = if actions.just_pressed(&InputAction::Explode) {
        Some(ViewCommand::Explode)
    } else if actions.just_pressed(&InputAction::Assemble) {
        Some(ViewCommand::Assemble)
    } else if actions.just_pressed(&InputAction::Toggle) {
        Some(ViewCommand::Toggle)
    } else {
        None
    };
    if let Some(command) = command {
        sim.0.command(command);
    }
    if actions.just_pressed(&InputAction::ClearSelection) {
        sim.0.clear_selection();
    }
}

fn handle_pointer(
    actions: Res<ActionState<InputAction>>,
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<(&GlobalTransform, &Projection), With<Camera3d>>,
    time: Res<Time>,
    mut sim: ResMut<Simulation>,
) {
    let (cam_tf, projection) = *camera;
    sim.0.set_camera(&camera_pose(cam_tf, projection));

    let now = time.elapsed_secs();
    let Some(cursor) = window.cursor_position() else {
        // Pointer left the window mid-drag: treat it as lost capture.
        if sim.0.claimed().is_some() {
            sim.0.pointer_cancel(PointerEvent::new(0.0, 0.0, now));
        }
        return;
    };
    let size = window.size();
    if size.x <= 0.0 || size.y <= 0.0 {
        return;
    }
    let ndc_x = cursor.x / size.x * 2.0 - 1.0;
    let ndc_y = 1.0 - cursor.y / size.y * 2.0;
    let event = PointerEvent::new(ndc_x, ndc_y, now);

    if actions.just_pressed(&InputAction::Grab) {
        sim.0.pointer_down(event);
    } else if actions.just_released(&InputAction::Grab) {
        sim.0.pointer_up(event);
    } else if actions.pressed(&InputAction::Grab) && sim.0.claimed().is_some() {
        sim.0.pointer_move(event);
    }
}

fn step_simulation(
    time: Res<Time>,
    camera: Single<(&GlobalTransform, &Projection), With<Camera3d>>,
    mut sim: ResMut<Simulation>,
) {
    let (cam_tf, projection) = *camera;
    sim.0.step(time.delta_secs(), &camera_pose(cam_tf, projection));
}

struct TransformSink<'a, 'w, 's> {
    nodes: &'a NodeEntities,
    transforms: &'a mut Query<'w, 's, &'static mut Transform, With<ExplodableNode>>,
}

impl PoseSink for TransformSink<'_, '_, '_> {
    fn write_pose(&mut self, pose: &PartPose) {
        let Some(&entity) = self.nodes.0.get(&pose.node) else {
            return;
        };
        let Ok(mut transform) = self.transforms.get_mut(entity) else {
            return;
        };
        transform.translation = from_na_vec3(&pose.local.translation);
        transform.rotation = from_na_quat(&pose.local.rotation);
    }
}

fn apply_poses(
    sim: Res<Simulation>,
    nodes: Res<NodeEntities>,
    mut transforms: Query<&mut Transform, With<ExplodableNode>>,
) {
    let mut sink = TransformSink {
        nodes: &nodes,
        transforms: &mut transforms,
    };
    sim.0.publish(&mut sink);
}

fn forward_events(mut sim: ResMut<Simulation>, mut writer: MessageWriter<ExploderMessage>) {
    for event in sim.0.drain_events() {
        debug!("{event:?}");
        writer.write(ExploderMessage(event));
    }
}
