//! # worldxform
//!
//! **World-space transforms for hierarchical scene graphs.**
//!
//! Every node in a scene graph carries an ordered list of transform ops
//! (translate, rotate, scale, orient, raw matrix). A node's world transform
//! is its local transform composed onto every ancestor's, root first. This
//! crate resolves that chain at any time code, reuses already-resolved
//! ancestors through a cache, and splits the result back into translation,
//! rotation and scale.
//!
//! ## Quick Start
//!
//! ```
//! use worldxform::*;
//!
//! let mut stage = Stage::new();
//!
//! let world = stage.define_xform("/World").unwrap();
//! stage.add_op(world, TransformOp::translate(DVec3::new(100.0, 0.0, 0.0))).unwrap();
//!
//! let cube = stage.define_xform("/World/Cube").unwrap();
//! stage.add_op(cube, TransformOp::rotate_z(45.0)).unwrap();
//! stage.add_op(cube, TransformOp::translate(DVec3::new(10.0, 5.0, 0.0))).unwrap();
//!
//! let position = resolve_world_position(&stage, cube, TimeCode::Default, None).unwrap();
//! assert_eq!(position, DVec3::new(110.0, 5.0, 0.0));
//!
//! let parts = resolve_world_components(&stage, cube, TimeCode::Default, None).unwrap();
//! assert!(parts.euler_degrees().abs_diff_eq(DVec3::new(0.0, 0.0, 45.0), 1e-9));
//! ```
//!
//! ## Conventions
//!
//! - **Column vectors** — `world = parent_world * local`, points transform as `M * p`.
//! - **Ops apply in list order** — the first op in a node's list acts on the point first.
//! - **Degrees** — every authored rotation angle is in degrees.
//! - **Bring your own graph** — implement [`SceneGraph`] for your storage, or use [`Stage`].
//!
//! Structural problems (cycles, dangling parents, runaway depth) are reported
//! as errors, never silently papered over.

mod batch;
mod cache;
mod config;
mod decompose;
mod error;
mod graph;
mod matrix;
mod op;
mod resolver;
mod samples;
pub mod stage;
mod time;

pub use batch::{BatchResolver, resolve_batch, resolve_positions_batch};
pub use cache::{CacheStats, TransformCache};
pub use config::ResolverConfig;
pub use decompose::{DEFAULT_EPSILON, Decomposition, decompose, decompose_with_epsilon};
pub use error::{DecompositionError, ResolveError, StageError, StructuralError, TimeSampleError};
pub use graph::SceneGraph;
pub use matrix::Matrix4;
pub use op::{Axis, OpKind, RotationOrder, TransformOp, local_transform};
pub use resolver::{
    TransformResolver, resolve_world_components, resolve_world_position, resolve_world_transform,
};
pub use samples::{Animated, Interpolate, TimeSamples};
pub use stage::Stage;
pub use time::TimeCode;

// Re-export glam math types for convenience
pub use glam::{DMat3, DMat4, DQuat, DVec3};
