use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Grab / tap a part.
    Grab,
    Toggle,
    Explode,
    Assemble,
    ResetCamera,
    ClearSelection,
    /// Hold to orbit the camera.
    OrbitHold,
    #[actionlike(DualAxis)]
    Orbit,
    #[actionlike(Axis)]
    Zoom,
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let input_map = InputMap::<InputAction>::default()
        .with(InputAction::Grab, MouseButton::Left)
        .with(InputAction::Toggle, KeyCode::KeyE)
        .with(InputAction::Toggle, KeyCode::Space)
        .with(InputAction::Explode, KeyCode::KeyX)
        .with(InputAction::Assemble, KeyCode::KeyC)
        .with(InputAction::ResetCamera, KeyCode::KeyR)
        .with(InputAction::ClearSelection, KeyCode::Escape)
        .with(InputAction::OrbitHold, MouseButton::Right)
        .with_dual_axis(InputAction::Orbit, MouseMove::default())
        .with_axis(InputAction::Zoom, MouseScrollAxis::Y);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());
}
