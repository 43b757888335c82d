/*!
Part decomposition: turn an arbitrary scene graph into a flat list of movable parts.

Heuristic (depth-first, author groupings win over geometry):
- A group whose direct children include drawables becomes one part, owning its whole subtree.
- A named drawable outside such a group becomes its own part, owning its subtree.
- Groups with only sub-groups recurse without becoming a part.
- Unnamed nodes without drawable children are skipped; their children are visited.

A scene without candidates yields no parts. That is a valid result, not an error.
*/

use log::debug;
use rand::Rng;

use crate::constants::{BOB_SPEED_MIN, BOB_SPEED_RANGE, FLOAT_OFFSET_RANGE, ROTATION_SPEED_RANGE};
use crate::part::{IdleConstants, Part};
use crate::scene::{NodeKind, SceneNode};
use crate::types::{Aabb, Iso, PartId};

/// Output of [`decompose`].
#[derive(Clone, Debug, Default)]
pub struct Decomposition {
    pub parts: Vec<Part>,
    /// World bounds of the whole asset in its assembled pose.
    pub object_bounds: Option<Aabb>,
}

/// Walk `root` and build one [`Part`] per explodable unit.
///
/// `rng` only seeds each part's idle animation constants; the traversal itself is
/// deterministic, so the same graph always yields the same names and node handles.
pub fn decompose<R: Rng + ?Sized>(root: &SceneNode, rng: &mut R) -> Decomposition {
    let mut parts = Vec::new();
    visit(root, &Iso::identity(), rng, &mut parts);

    let object_bounds = root.world_bounds(&Iso::identity());
    debug!(
        "decomposed {} nodes into {} parts (bounds: {:?})",
        root.node_count(),
        parts.len(),
        object_bounds.map(|b| b.extents())
    );

    Decomposition {
        parts,
        object_bounds,
    }
}

fn visit<R: Rng + ?Sized>(node: &SceneNode, parent: &Iso, rng: &mut R, out: &mut Vec<Part>) {
    let becomes_part = match node.kind {
        NodeKind::Scene => false,
        NodeKind::Group => node.has_drawable_child(),
        NodeKind::Drawable { .. } => !node.name.trim().is_empty(),
    };

    if becomes_part && let Some(part) = build_part(node, parent, rng, out.len()) {
        out.push(part);
        return;
    }

    let world = parent * node.transform.iso();
    for child in &node.children {
        visit(child, &world, rng, out);
    }
}

fn build_part<R: Rng + ?Sized>(
    node: &SceneNode,
    parent: &Iso,
    rng: &mut R,
    index: usize,
) -> Option<Part> {
    let bounding_box = node.world_bounds(parent)?;

    let mut pick_bounds = Vec::new();
    node.visit_drawables(parent, &mut |_, b| pick_bounds.push(b));

    let name = if node.name.trim().is_empty() {
        format!("part-{index}")
    } else {
        node.name.clone()
    };

    Some(Part::new(
        PartId(index as u32),
        name,
        node.id,
        *parent,
        node.transform,
        bounding_box,
        pick_bounds,
        idle_constants(rng),
    ))
}

fn idle_constants<R: Rng + ?Sized>(rng: &mut R) -> IdleConstants {
    IdleConstants {
        float_offset: rng.r#gen::<f32>() * FLOAT_OFFSET_RANGE,
        rotation_speed: (rng.r#gen::<f32>() - 0.5) * ROTATION_SPEED_RANGE,
        bob_speed: BOB_SPEED_MIN + rng.r#gen::<f32>() * BOB_SPEED_RANGE,
    }
}
