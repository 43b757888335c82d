use bevy::{
    prelude::*,
    window::{CursorEntered, CursorIcon, PrimaryWindow, SystemCursorIcon, WindowFocused},
};
use exploder::ViewMode;

use crate::parts::{Simulation, SimulationSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CursorKind {
    Default,
    /// Parts can be grabbed.
    Grab,
    /// A part is held.
    Grabbing,
}

#[derive(Resource)]
struct CurrentCursor(CursorKind);

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(CurrentCursor(CursorKind::Default));

    app.add_systems(Update, pick_cursor.after(SimulationSet::Publish));
    // Apply when our desired cursor changes
    app.add_systems(
        Update,
        apply_cursor
            .after(pick_cursor)
            .run_if(resource_changed::<CurrentCursor>),
    );
    // Re-apply on focus/enter to avoid OS/browser resets
    app.add_systems(Update, (reapply_on_focus, reapply_on_enter));
}

fn pick_cursor(sim: Res<Simulation>, mut current: ResMut<CurrentCursor>) {
    let sim = &sim.0;
    let interaction = &sim.config().interaction;
    let kind = if sim.claimed().is_some() {
        CursorKind::Grabbing
    } else if interaction.enabled
        && (!interaction.exploded_only || sim.mode() == ViewMode::Exploded)
        && !sim.parts().is_empty()
    {
        CursorKind::Grab
    } else {
        CursorKind::Default
    };
    // Only touch the resource on change so `resource_changed` stays meaningful.
    if current.0 != kind {
        current.0 = kind;
    }
}

fn icon(kind: CursorKind) -> CursorIcon {
    CursorIcon::System(match kind {
        CursorKind::Default => SystemCursorIcon::Default,
        CursorKind::Grab => SystemCursorIcon::Grab,
        CursorKind::Grabbing => SystemCursorIcon::Grabbing,
    })
}

fn apply_cursor(
    mut commands: Commands,
    window: Single<Entity, With<PrimaryWindow>>,
    current: Res<CurrentCursor>,
) {
    commands.entity(*window).insert(icon(current.0));
}

fn reapply_on_focus(
    mut commands: Commands,
    mut messages: MessageReader<WindowFocused>,
    window: Single<Entity, With<PrimaryWindow>>,
    current: Res<CurrentCursor>,
) {
    for message in messages.read() {
        if message.focused {
            commands.entity(*window).insert(icon(current.0));
        }
    }
}

fn reapply_on_enter(
    mut commands: Commands,
    mut messages: MessageReader<CursorEntered>,
    window: Single<Entity, With<PrimaryWindow>>,
    current: Res<CurrentCursor>,
) {
    for _ in messages.read() {
        commands.entity(*window).insert(icon(current.0));
    }
}
