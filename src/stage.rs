//! An in-memory scene graph backed by a `hecs` world.
//!
//! [`Stage`] stores each prim as an entity with a path, an optional parent
//! and, for transformable prims, an [`XformStack`] component. It implements
//! [`SceneGraph`], so it can be handed straight to the resolver.
//!
//! # Example
//!
//! ```
//! use worldxform::{Stage, TransformOp, TimeCode, DVec3, resolve_world_position};
//!
//! let mut stage = Stage::new();
//! let world = stage.define_xform("/World").unwrap();
//! stage.add_op(world, TransformOp::translate(DVec3::new(100.0, 0.0, 0.0))).unwrap();
//!
//! let cube = stage.define_xform("/World/Cube").unwrap();
//! stage.add_op(cube, TransformOp::translate(DVec3::new(10.0, 5.0, 0.0))).unwrap();
//!
//! let position = resolve_world_position(&stage, cube, TimeCode::Default, None).unwrap();
//! assert_eq!(position, DVec3::new(110.0, 5.0, 0.0));
//! ```

use crate::error::StageError;
use crate::graph::SceneGraph;
use crate::op::TransformOp;
use hecs::{Entity, World};
use std::collections::HashMap;

/// Absolute path of a prim, e.g. `/World/Group/Cube`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrimPath(pub String);

/// Parent link of a non-root prim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parent(pub Entity);

/// Ordered transform ops of a transformable prim.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct XformStack {
    /// Ops in application order.
    pub ops: Vec<TransformOp>,
    /// Ignore ancestor transforms.
    pub reset_xform_stack: bool,
}

/// Borrow of a prim's [`XformStack`] ops.
pub struct OpsRef<'a>(hecs::Ref<'a, XformStack>);

impl AsRef<[TransformOp]> for OpsRef<'_> {
    fn as_ref(&self) -> &[TransformOp] {
        &self.0.ops
    }
}

/// A hierarchy of prims addressed by path.
#[derive(Default)]
pub struct Stage {
    world: World,
    by_path: HashMap<String, Entity>,
}

impl Stage {
    /// Creates an empty stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a transformable prim at `path`.
    ///
    /// Missing ancestors are defined as plain (non-transformable) prims. If
    /// a prim already exists at `path` it becomes transformable and keeps
    /// its ops.
    pub fn define_xform(&mut self, path: &str) -> Result<Entity, StageError> {
        let entity = self.define(path)?;
        if self.world.get::<&XformStack>(entity).is_err() {
            self.world
                .insert_one(entity, XformStack::default())
                .map_err(|_| StageError::NoSuchPrim(path.to_string()))?;
        }
        Ok(entity)
    }

    /// Defines a non-transformable prim (a grouping scope) at `path`.
    ///
    /// An existing prim at `path` is returned unchanged.
    pub fn define_prim(&mut self, path: &str) -> Result<Entity, StageError> {
        self.define(path)
    }

    fn define(&mut self, path: &str) -> Result<Entity, StageError> {
        let segments = parse_path(path)?;

        let mut current = String::new();
        let mut parent = None;
        for segment in segments {
            current.push('/');
            current.push_str(segment);

            let entity = match self.by_path.get(&current) {
                Some(&entity) => entity,
                None => {
                    let name = PrimPath(current.clone());
                    let entity = match parent {
                        Some(p) => self.world.spawn((name, Parent(p))),
                        None => self.world.spawn((name,)),
                    };
                    self.by_path.insert(current.clone(), entity);
                    entity
                }
            };
            parent = Some(entity);
        }

        parent.ok_or_else(|| StageError::InvalidPath(path.to_string()))
    }

    /// Looks up the prim at `path`.
    pub fn prim(&self, path: &str) -> Option<Entity> {
        self.by_path.get(path).copied()
    }

    /// Returns the path of `prim`.
    pub fn path(&self, prim: Entity) -> Option<String> {
        self.world.get::<&PrimPath>(prim).ok().map(|p| p.0.clone())
    }

    /// Number of prims on the stage.
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Returns true if the stage has no prims.
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Appends an op to a transformable prim. Returns the op's index.
    pub fn add_op(&mut self, prim: Entity, op: TransformOp) -> Result<usize, StageError> {
        let mut stack = self.xform_stack_mut(prim)?;
        stack.ops.push(op);
        Ok(stack.ops.len() - 1)
    }

    /// Replaces the op list of a transformable prim.
    pub fn set_ops(&mut self, prim: Entity, ops: Vec<TransformOp>) -> Result<(), StageError> {
        self.xform_stack_mut(prim)?.ops = ops;
        Ok(())
    }

    /// Sets whether `prim` ignores its ancestors' transforms.
    pub fn set_reset_xform_stack(&mut self, prim: Entity, reset: bool) -> Result<(), StageError> {
        self.xform_stack_mut(prim)?.reset_xform_stack = reset;
        Ok(())
    }

    /// Re-links `prim` under `parent` (or makes it a root).
    ///
    /// Paths are not updated and no cycle check is made: this exists to
    /// model graphs assembled from external data, malformed ones included.
    pub fn reparent(&mut self, prim: Entity, parent: Option<Entity>) -> Result<(), StageError> {
        let missing = || StageError::NoSuchPrim(format!("{:?}", prim));
        match parent {
            Some(p) => self.world.insert_one(prim, Parent(p)).map_err(|_| missing()),
            None => match self.world.remove_one::<Parent>(prim) {
                // Already a root.
                Ok(_) | Err(hecs::ComponentError::MissingComponent(_)) => Ok(()),
                Err(_) => Err(missing()),
            },
        }
    }

    fn xform_stack_mut(&self, prim: Entity) -> Result<hecs::RefMut<'_, XformStack>, StageError> {
        self.world.get::<&mut XformStack>(prim).map_err(|e| match e {
            hecs::ComponentError::MissingComponent(_) => {
                StageError::NotTransformable(self.describe(prim))
            }
            _ => StageError::NoSuchPrim(format!("{:?}", prim)),
        })
    }
}

impl SceneGraph for Stage {
    type NodeId = Entity;
    type Ops<'a> = OpsRef<'a>;

    fn contains(&self, node: Entity) -> bool {
        self.world.contains(node)
    }

    fn parent(&self, node: Entity) -> Option<Entity> {
        self.world.get::<&Parent>(node).ok().map(|p| p.0)
    }

    fn local_ops(&self, node: Entity) -> Option<OpsRef<'_>> {
        self.world.get::<&XformStack>(node).ok().map(OpsRef)
    }

    fn resets_xform_stack(&self, node: Entity) -> bool {
        self.world
            .get::<&XformStack>(node)
            .map(|stack| stack.reset_xform_stack)
            .unwrap_or(false)
    }

    fn describe(&self, node: Entity) -> String {
        self.path(node).unwrap_or_else(|| format!("{:?}", node))
    }
}

fn parse_path(path: &str) -> Result<Vec<&str>, StageError> {
    let invalid = || StageError::InvalidPath(path.to_string());
    let rest = path.strip_prefix('/').ok_or_else(invalid)?;
    let segments: Vec<&str> = rest.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(invalid());
    }
    Ok(segments)
}
