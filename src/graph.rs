//! The scene-graph contract consumed by the resolver.
//!
//! The resolver never owns scene data. It reads nodes through
//! [`SceneGraph`], which any scene representation can implement: an ECS
//! world, an arena of nodes, or an adapter over a scene-description library.

use crate::op::TransformOp;
use std::fmt;
use std::hash::Hash;

/// Read-only access to a hierarchy of transformable nodes.
///
/// # Example
///
/// A minimal arena-backed graph:
///
/// ```
/// use worldxform::{SceneGraph, TransformOp, TimeCode, DVec3, resolve_world_position};
///
/// struct Arena {
///     parents: Vec<Option<usize>>,
///     ops: Vec<Vec<TransformOp>>,
/// }
///
/// impl SceneGraph for Arena {
///     type NodeId = usize;
///     type Ops<'a> = &'a [TransformOp];
///
///     fn contains(&self, node: usize) -> bool {
///         node < self.parents.len()
///     }
///
///     fn parent(&self, node: usize) -> Option<usize> {
///         self.parents[node]
///     }
///
///     fn local_ops(&self, node: usize) -> Option<Self::Ops<'_>> {
///         Some(self.ops[node].as_slice())
///     }
/// }
///
/// let arena = Arena {
///     parents: vec![None, Some(0)],
///     ops: vec![
///         vec![TransformOp::translate(DVec3::new(100.0, 0.0, 0.0))],
///         vec![TransformOp::translate(DVec3::new(0.0, 50.0, 0.0))],
///     ],
/// };
///
/// let position = resolve_world_position(&arena, 1, TimeCode::Default, None).unwrap();
/// assert_eq!(position, DVec3::new(100.0, 50.0, 0.0));
/// ```
pub trait SceneGraph {
    /// Stable identity of a node. Also used as the cache key.
    type NodeId: Copy + Eq + Hash + fmt::Debug;

    /// Borrowed view of a node's op list.
    type Ops<'a>: AsRef<[TransformOp]>
    where
        Self: 'a;

    /// Returns true if `node` exists in the graph.
    fn contains(&self, node: Self::NodeId) -> bool;

    /// Returns the parent of `node`, or `None` for a root.
    fn parent(&self, node: Self::NodeId) -> Option<Self::NodeId>;

    /// Returns the ordered transform ops of `node`.
    ///
    /// `None` means the node is not transformable (it has no op stack at
    /// all), which differs from an empty op list.
    fn local_ops(&self, node: Self::NodeId) -> Option<Self::Ops<'_>>;

    /// Returns true if `node` can carry transform ops.
    fn is_transformable(&self, node: Self::NodeId) -> bool {
        self.local_ops(node).is_some()
    }

    /// Returns true if `node` discards its ancestors' transforms.
    fn resets_xform_stack(&self, _node: Self::NodeId) -> bool {
        false
    }

    /// Human-readable name of `node`, used in error messages.
    fn describe(&self, node: Self::NodeId) -> String {
        format!("{:?}", node)
    }
}
