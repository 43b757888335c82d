use bevy::{core_pipeline::tonemapping::Tonemapping, prelude::*};
use exploder::{
    CameraFocus, SimEvent,
    framing::{fit_view, pose_bounds},
};
use leafwing_input_manager::prelude::ActionState;

use crate::input::InputAction;
use crate::parts::{ExploderMessage, Simulation, SimulationSet, from_na_vec3};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
    app.add_systems(
        Update,
        (react_to_simulation, reset_camera, orbit, fly)
            .chain()
            .after(SimulationSet::Publish),
    );
}

const START_EYE: Vec3 = Vec3::new(3.0, 2.5, 3.0);
const ORBIT_SENSITIVITY: f32 = 0.005;
const ZOOM_SENSITIVITY: f32 = 0.1;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 100.0;
const PITCH_LIMIT: f32 = 1.5;
const FLIGHT_SECS: f32 = 0.6;

/// Spherical orbit around `target`.
#[derive(Component)]
struct OrbitCamera {
    target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
    /// Cleared while a part is held.
    enabled: bool,
}

impl OrbitCamera {
    fn looking(eye: Vec3, target: Vec3) -> Self {
        let mut orbit = Self {
            target,
            yaw: 0.0,
            pitch: 0.0,
            distance: 1.0,
            enabled: true,
        };
        orbit.set_eye(eye);
        orbit
    }

    fn set_eye(&mut self, eye: Vec3) {
        let offset = eye - self.target;
        self.distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.yaw = offset.x.atan2(offset.z);
        self.pitch = (offset.y / offset.length().max(f32::EPSILON))
            .clamp(-1.0, 1.0)
            .asin();
    }

    fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(sy * cp, sp, cy * cp) * self.distance
    }
}

/// Animated move toward a framing request.
#[derive(Component)]
struct CameraFlight {
    from_eye: Vec3,
    from_target: Vec3,
    to_eye: Vec3,
    to_target: Vec3,
    elapsed: f32,
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t.clamp(0.0, 1.0)).powi(3)
}

fn add_camera(mut commands: Commands) {
    commands.spawn((
        Tonemapping::AcesFitted,
        Camera3d::default(),
        Transform::from_translation(START_EYE).looking_at(Vec3::ZERO, Vec3::Y),
        OrbitCamera::looking(START_EYE, Vec3::ZERO),
    ));
}

fn start_flight(
    commands: &mut Commands,
    entity: Entity,
    tf: &Transform,
    orbit: &OrbitCamera,
    focus: &CameraFocus,
) {
    commands.entity(entity).insert(CameraFlight {
        from_eye: tf.translation,
        from_target: orbit.target,
        to_eye: from_na_vec3(&focus.eye),
        to_target: from_na_vec3(&focus.target),
        elapsed: 0.0,
    });
}

fn react_to_simulation(
    mut commands: Commands,
    mut messages: MessageReader<ExploderMessage>,
    camera: Single<(Entity, &Transform, &mut OrbitCamera)>,
) {
    let (entity, tf, mut orbit) = camera.into_inner();
    for ExploderMessage(event) in messages.read() {
        match event {
            SimEvent::CameraControl { enabled } => orbit.enabled = *enabled,
            SimEvent::FocusPart(focus) | SimEvent::FrameView(focus) => {
                start_flight(&mut commands, entity, tf, &orbit, focus);
            }
            _ => {}
        }
    }
}

fn reset_camera(
    mut commands: Commands,
    actions: Res<ActionState<InputAction>>,
    sim: Res<Simulation>,
    camera: Single<(Entity, &Transform, &OrbitCamera, &Projection)>,
) {
    if !actions.just_pressed(&InputAction::ResetCamera) {
        return;
    }
    let (entity, tf, orbit, projection) = *camera;
    let Some(bounds) = pose_bounds(sim.0.parts(), sim.0.mode()) else {
        return;
    };
    let fov = match projection {
        Projection::Perspective(p) => p.fov,
        _ => std::f32::consts::FRAC_PI_4,
    };
    start_flight(&mut commands, entity, tf, orbit, &fit_view(&bounds, fov));
}

fn orbit(
    actions: Res<ActionState<InputAction>>,
    camera: Single<(&mut Transform, &mut OrbitCamera), Without<CameraFlight>>,
) {
    let (mut tf, mut orbit) = camera.into_inner();
    if !orbit.enabled {
        return;
    }

    if actions.pressed(&InputAction::OrbitHold) {
        let delta = actions.axis_pair(&InputAction::Orbit);
        orbit.yaw -= delta.x * ORBIT_SENSITIVITY;
        orbit.pitch =
            (orbit.pitch + delta.y * ORBIT_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
    let zoom = actions.value(&InputAction::Zoom);
    if zoom != 0.0 {
        orbit.distance =
            (orbit.distance * (1.0 - zoom * ZOOM_SENSITIVITY)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    *tf = Transform::from_translation(orbit.eye()).looking_at(orbit.target, Vec3::Y);
}

fn fly(
    mut commands: Commands,
    time: Res<Time>,
    camera: Single<(Entity, &mut Transform, &mut OrbitCamera, &mut CameraFlight)>,
) {
    let (entity, mut tf, mut orbit, mut flight) = camera.into_inner();
    flight.elapsed += time.delta_secs();
    let t = ease_out_cubic(flight.elapsed / FLIGHT_SECS);

    let eye = flight.from_eye.lerp(flight.to_eye, t);
    let target = flight.from_target.lerp(flight.to_target, t);
    *tf = Transform::from_translation(eye).looking_at(target, Vec3::Y);

    if flight.elapsed >= FLIGHT_SECS {
        orbit.target = flight.to_target;
        orbit.set_eye(flight.to_eye);
        commands.entity(entity).remove::<CameraFlight>();
    }
}
