/*!
In-memory scene graph consumed by the decomposer.

The asset loader (external) produces this tree once per asset. The core only
reads it: node kind, name, local transform and, for drawables, local-space
bounds. Nodes are referenced from parts through their [`NodeId`] handle.
*/

use crate::types::{Aabb, BoundingVolume, Iso, NodeId, Transform};

/// Closed set of node kinds the traversal understands.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Root of a loaded asset. Never becomes a part.
    Scene,
    /// Pure container.
    Group,
    /// A mesh with geometry. `local_bounds` is expressed in the node's own frame.
    Drawable { local_bounds: Aabb },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    /// Author-given name, possibly empty.
    pub name: String,
    pub kind: NodeKind,
    /// Transform relative to the parent node.
    pub transform: Transform,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn scene(id: NodeId) -> Self {
        Self {
            id,
            name: String::new(),
            kind: NodeKind::Scene,
            transform: Transform::identity(),
            children: Vec::new(),
        }
    }

    pub fn group(id: NodeId, name: impl Into<String>, transform: Transform) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Group,
            transform,
            children: Vec::new(),
        }
    }

    pub fn drawable(
        id: NodeId,
        name: impl Into<String>,
        transform: Transform,
        local_bounds: Aabb,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Drawable { local_bounds },
            transform,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = SceneNode>) -> Self {
        self.children.extend(children);
        self
    }

    #[inline]
    pub fn is_drawable(&self) -> bool {
        matches!(self.kind, NodeKind::Drawable { .. })
    }

    #[inline]
    pub fn has_drawable_child(&self) -> bool {
        self.children.iter().any(SceneNode::is_drawable)
    }

    /// World-space bounds of this node's own geometry (not its children).
    pub fn own_world_bounds(&self, parent: &Iso) -> Option<Aabb> {
        match &self.kind {
            NodeKind::Drawable { local_bounds } => {
                let world = parent * self.transform.iso();
                Some(local_bounds.transform_by(&world))
            }
            NodeKind::Scene | NodeKind::Group => None,
        }
    }

    /// World-space bounds of every drawable in this subtree, or `None` if it holds no geometry.
    pub fn world_bounds(&self, parent: &Iso) -> Option<Aabb> {
        let mut out = None;
        self.visit_drawables(parent, &mut |_, bounds| {
            out = Some(match out {
                Some(acc) => bounds.merged(&acc),
                None => bounds,
            });
        });
        out
    }

    /// Call `f` for every drawable in this subtree with its world-space bounds.
    pub fn visit_drawables(&self, parent: &Iso, f: &mut impl FnMut(&SceneNode, Aabb)) {
        let world = parent * self.transform.iso();
        if let Some(bounds) = self.own_world_bounds(parent) {
            f(self, bounds);
        }
        for child in &self.children {
            child.visit_drawables(&world, f);
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }

    /// Find a node by handle anywhere in this subtree.
    pub fn find(&self, id: NodeId) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point3, Vec3};

    fn unit_box() -> Aabb {
        Aabb::new(Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn world_bounds_merges_nested_drawables() {
        let root = SceneNode::scene(NodeId(0)).with_child(
            SceneNode::group(
                NodeId(1),
                "g",
                Transform::from_translation(Vec3::new(2.0, 0.0, 0.0)),
            )
            .with_child(SceneNode::drawable(
                NodeId(2),
                "a",
                Transform::identity(),
                unit_box(),
            ))
            .with_child(SceneNode::drawable(
                NodeId(3),
                "b",
                Transform::from_translation(Vec3::new(0.0, 3.0, 0.0)),
                unit_box(),
            )),
        );

        let bounds = root.world_bounds(&Iso::identity()).unwrap();
        assert!((bounds.mins - Point3::new(1.5, -0.5, -0.5)).norm() < 1.0e-5);
        assert!((bounds.maxs - Point3::new(2.5, 3.5, 0.5)).norm() < 1.0e-5);
    }

    #[test]
    fn groups_without_geometry_have_no_bounds() {
        let root = SceneNode::scene(NodeId(0))
            .with_child(SceneNode::group(NodeId(1), "empty", Transform::identity()));
        assert!(root.world_bounds(&Iso::identity()).is_none());
        assert_eq!(root.node_count(), 2);
        assert!(root.find(NodeId(1)).is_some());
        assert!(root.find(NodeId(9)).is_none());
    }
}
