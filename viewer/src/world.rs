use bevy::prelude::*;
use exploder::{Aabb, NodeId, NodeKind, Point3, SceneNode};

use crate::parts::{ExplodableNode, NodeEntities, Simulation, from_na_quat, from_na_vec3, to_na_vec3};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, (setup, spawn_asset));
}

fn setup(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        PointLight {
            intensity: 600_000.0,
            ..default()
        },
        Transform::from_xyz(-3.0, 4.0, 3.0),
    ));
}

fn node_transform(x: f32, y: f32, z: f32) -> exploder::Transform {
    exploder::Transform::from_translation(to_na_vec3(Vec3::new(x, y, z)))
}

fn boxed(size: Vec3) -> Aabb {
    let half = to_na_vec3(size * 0.5);
    Aabb::new(Point3::from(-half), Point3::from(half))
}

/// A small chair: a seat group, a back group and four named legs.
fn chair() -> SceneNode {
    let mut next = 0u32;
    let mut id = || {
        next += 1;
        NodeId(next)
    };

    let seat = SceneNode::group(id(), "seat", node_transform(0.0, 0.5, 0.0))
        .with_child(SceneNode::drawable(
            id(),
            "",
            node_transform(0.0, 0.0, 0.0),
            boxed(Vec3::new(1.0, 0.1, 1.0)),
        ))
        .with_child(SceneNode::drawable(
            id(),
            "",
            node_transform(0.0, 0.07, 0.0),
            boxed(Vec3::new(0.9, 0.04, 0.9)),
        ));

    let back = SceneNode::group(id(), "back", node_transform(0.0, 1.0, -0.45))
        .with_children((0..3).map(|i| {
            SceneNode::drawable(
                id(),
                "",
                node_transform(-0.3 + 0.3 * i as f32, 0.0, 0.0),
                boxed(Vec3::new(0.08, 0.9, 0.08)),
            )
        }))
        .with_child(SceneNode::drawable(
            id(),
            "",
            node_transform(0.0, 0.45, 0.0),
            boxed(Vec3::new(1.0, 0.12, 0.1)),
        ));

    let legs = [(-0.45, -0.45), (0.45, -0.45), (-0.45, 0.45), (0.45, 0.45)];
    let mut root = SceneNode::scene(id()).with_children([seat, back]);
    for (i, (x, z)) in legs.into_iter().enumerate() {
        root = root.with_child(SceneNode::drawable(
            id(),
            format!("leg-{i}"),
            node_transform(x, 0.225, z),
            boxed(Vec3::new(0.08, 0.45, 0.08)),
        ));
    }
    root
}

fn spawn_asset(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut nodes: ResMut<NodeEntities>,
    mut sim: ResMut<Simulation>,
) {
    let scene = chair();
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(196, 152, 110),
        perceptual_roughness: 0.8,
        ..default()
    });

    nodes.0.clear();
    spawn_node(&scene, None, &mut commands, &mut meshes, &material, &mut nodes);
    info!("spawned {} scene nodes", nodes.0.len());

    sim.0.load(&scene);
}

fn spawn_node(
    node: &SceneNode,
    parent: Option<Entity>,
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    material: &Handle<StandardMaterial>,
    nodes: &mut NodeEntities,
) {
    let transform = Transform {
        translation: from_na_vec3(&node.transform.translation),
        rotation: from_na_quat(&node.transform.rotation),
        ..default()
    };
    let mut entity = commands.spawn((Name::new(node.name.clone()), transform, ExplodableNode));
    if let Some(parent) = parent {
        entity.insert(ChildOf(parent));
    }
    if let NodeKind::Drawable { local_bounds } = &node.kind {
        let size = from_na_vec3(&local_bounds.extents());
        let center = from_na_vec3(&local_bounds.center().coords);
        let mesh = Cuboid::from_size(size).mesh().build().translated_by(center);
        entity.insert((Mesh3d(meshes.add(mesh)), MeshMaterial3d(material.clone())));
    }

    let id = entity.id();
    nodes.0.insert(node.id, id);
    for child in &node.children {
        spawn_node(child, Some(id), commands, meshes, material, nodes);
    }
}
