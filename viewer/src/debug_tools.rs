//! Debug/performance tooling for native dev builds: the perf overlay plus
//! gizmos for each part's collision sphere and live bounds.
//!
//! Compiled only behind `dev_native`.

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, SystemInformationDiagnosticsPlugin,
};
use bevy::prelude::*;
use bevy::render::diagnostic::RenderDiagnosticsPlugin;
use iyes_perf_ui::prelude::*;

use crate::parts::{Simulation, from_na_vec3};

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        RenderDiagnosticsPlugin,
        PerfUiPlugin,
    ));

    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(Update, draw_part_gizmos);
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

fn draw_part_gizmos(sim: Res<Simulation>, mut gizmos: Gizmos) {
    let selected = sim.0.selected();
    for part in sim.0.parts() {
        let color = if Some(part.id) == selected {
            Color::srgb(1.0, 0.8, 0.2)
        } else if part.state.is_settled() {
            Color::srgba(0.4, 0.8, 1.0, 0.4)
        } else {
            Color::srgb(1.0, 0.3, 0.3)
        };
        let center = from_na_vec3(&part.current_center().coords);
        gizmos.sphere(Isometry3d::from_translation(center), part.collision_radius, color);

        let bounds = part.current_bounds();
        gizmos.cuboid(
            Transform::from_translation(from_na_vec3(&bounds.center().coords))
                .with_scale(from_na_vec3(&bounds.extents())),
            color,
        );
    }
}
