//! Error types for transform resolution.
//!
//! Node identities are generic over the scene graph, so errors carry a
//! rendered description of the offending node (from `SceneGraph::describe`)
//! rather than the identity itself.

use std::fmt;

/// The ancestor chain of a node is malformed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StructuralError {
    /// A node appeared twice while walking up the parent chain.
    Cycle {
        /// The node that closed the cycle.
        node: String,
    },
    /// The parent chain is longer than the configured maximum depth.
    DepthExceeded {
        /// The node whose chain was being walked.
        node: String,
        /// The configured limit.
        max_depth: usize,
    },
    /// The node (or a parent it references) does not exist in the graph.
    UnknownNode {
        /// The missing node.
        node: String,
    },
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralError::Cycle { node } => {
                write!(f, "Cyclic parent chain through node {}", node)
            }
            StructuralError::DepthExceeded { node, max_depth } => write!(
                f,
                "Parent chain of node {} exceeds maximum depth {}",
                node, max_depth
            ),
            StructuralError::UnknownNode { node } => write!(f, "Unknown node {}", node),
        }
    }
}

impl std::error::Error for StructuralError {}

/// Time samples could not be accepted.
#[derive(Clone, Debug, PartialEq)]
pub enum TimeSampleError {
    /// A sample was authored at a NaN or infinite time.
    NonFiniteTime(f64),
}

impl fmt::Display for TimeSampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSampleError::NonFiniteTime(time) => {
                write!(f, "Time sample at non-finite time {}", time)
            }
        }
    }
}

impl std::error::Error for TimeSampleError {}

/// A matrix could not be split into translation, rotation and scale.
#[derive(Clone, Debug, PartialEq)]
pub enum DecompositionError {
    /// The matrix contains NaN or infinite components.
    NonFinite,
    /// The bottom row is not `0 0 0 1`.
    NotAffine,
    /// A basis column of the linear block has (near) zero length.
    DegenerateScale {
        /// Index of the collapsed axis (0 = X, 1 = Y, 2 = Z).
        axis: usize,
    },
    /// The basis columns are linearly dependent.
    Singular,
}

impl fmt::Display for DecompositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecompositionError::NonFinite => write!(f, "Matrix has non-finite components"),
            DecompositionError::NotAffine => write!(f, "Matrix is not an affine transform"),
            DecompositionError::DegenerateScale { axis } => write!(
                f,
                "Matrix has zero scale on the {} axis",
                ["X", "Y", "Z"].get(*axis).copied().unwrap_or("?")
            ),
            DecompositionError::Singular => write!(f, "Matrix has a singular linear block"),
        }
    }
}

impl std::error::Error for DecompositionError {}

/// Errors that can occur when resolving a node's transform.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolveError {
    /// The ancestor chain is malformed.
    Structural(StructuralError),
    /// The queried node has no transform op stack.
    NotTransformable {
        /// The queried node.
        node: String,
    },
    /// An inverted op has a singular matrix.
    SingularOp {
        /// The node owning the op.
        node: String,
        /// Position of the op in the node's op list.
        index: usize,
    },
    /// The world transform could not be decomposed.
    Decomposition(DecompositionError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Structural(e) => write!(f, "Structural error: {}", e),
            ResolveError::NotTransformable { node } => write!(
                f,
                "Node {} is not transformable. It must carry a transform op stack.",
                node
            ),
            ResolveError::SingularOp { node, index } => {
                write!(f, "Inverted op {} on node {} is singular", index, node)
            }
            ResolveError::Decomposition(e) => write!(f, "Decomposition error: {}", e),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Structural(e) => Some(e),
            ResolveError::Decomposition(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StructuralError> for ResolveError {
    fn from(e: StructuralError) -> Self {
        ResolveError::Structural(e)
    }
}

impl From<DecompositionError> for ResolveError {
    fn from(e: DecompositionError) -> Self {
        ResolveError::Decomposition(e)
    }
}

/// Errors raised while building a [`Stage`](crate::Stage).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageError {
    /// The path is not absolute or has empty segments.
    InvalidPath(String),
    /// No node exists for the given identity.
    NoSuchPrim(String),
    /// The node cannot carry transform ops.
    NotTransformable(String),
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::InvalidPath(path) => write!(f, "Invalid prim path: '{}'", path),
            StageError::NoSuchPrim(prim) => write!(f, "No such prim: {}", prim),
            StageError::NotTransformable(prim) => {
                write!(f, "Prim {} is not transformable", prim)
            }
        }
    }
}

impl std::error::Error for StageError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn resolve_error_chains_source() {
        let err: ResolveError = StructuralError::Cycle {
            node: "/World".into(),
        }
        .into();
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/World"));
    }

    #[test]
    fn degenerate_axis_is_named() {
        let err = DecompositionError::DegenerateScale { axis: 1 };
        assert_eq!(err.to_string(), "Matrix has zero scale on the Y axis");
    }
}
