//! Single-node world transform resolution.
//!
//! The resolver walks from a node up through its parents, then composes the
//! collected local transforms from the top down:
//!
//! ```text
//! world = local_root * local_child * ... * local_node
//! ```
//!
//! When a [`TransformCache`] is supplied, the walk stops at the first
//! ancestor whose world transform is already cached, and every newly resolved
//! node along the way is written back. Resolving siblings one after another
//! therefore only composes their shared ancestry once.

use crate::cache::TransformCache;
use crate::config::ResolverConfig;
use crate::decompose::{Decomposition, decompose_with_epsilon};
use crate::error::{ResolveError, StructuralError};
use crate::graph::SceneGraph;
use crate::matrix::Matrix4;
use crate::op::local_transform;
use crate::time::TimeCode;
use glam::DVec3;
use std::collections::HashSet;

/// Resolves world transforms of nodes in a [`SceneGraph`].
///
/// The resolver only borrows the graph. Caches are owned by the caller and
/// passed into each query.
///
/// # Example
///
/// ```
/// use worldxform::{Stage, TransformOp, TransformResolver, TransformCache, TimeCode, DVec3};
///
/// let mut stage = Stage::new();
/// let parent = stage.define_xform("/World/Parent").unwrap();
/// stage.add_op(parent, TransformOp::rotate_z(90.0)).unwrap();
/// let child = stage.define_xform("/World/Parent/Child").unwrap();
/// stage.add_op(child, TransformOp::translate(DVec3::new(10.0, 0.0, 0.0))).unwrap();
///
/// let resolver = TransformResolver::new(&stage);
/// let mut cache = TransformCache::new();
/// let position = resolver
///     .world_position(child, TimeCode::Default, Some(&mut cache))
///     .unwrap();
///
/// assert!(position.abs_diff_eq(DVec3::new(0.0, 10.0, 0.0), 1e-9));
/// // The child and both of its ancestors are now cached.
/// assert_eq!(cache.len(), 3);
/// ```
pub struct TransformResolver<'g, G: SceneGraph> {
    graph: &'g G,
    config: ResolverConfig,
}

impl<'g, G: SceneGraph> TransformResolver<'g, G> {
    /// Creates a resolver with the default [`ResolverConfig`].
    pub fn new(graph: &'g G) -> Self {
        Self::with_config(graph, ResolverConfig::default())
    }

    /// Creates a resolver with a custom configuration.
    pub fn with_config(graph: &'g G, config: ResolverConfig) -> Self {
        Self { graph, config }
    }

    /// The graph being resolved.
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    /// The active configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns the local transform of `node`, excluding its ancestors.
    pub fn local_transform(
        &self,
        node: G::NodeId,
        time: TimeCode,
    ) -> Result<Matrix4, ResolveError> {
        self.check_queryable(node)?;
        self.node_local(node, time)
    }

    /// Returns the world transform of `node` at `time`.
    ///
    /// Fails immediately on a malformed ancestor chain or if `node` is not
    /// transformable.
    pub fn world_transform(
        &self,
        node: G::NodeId,
        time: TimeCode,
        cache: Option<&mut TransformCache<G::NodeId>>,
    ) -> Result<Matrix4, ResolveError> {
        self.check_queryable(node)?;
        self.compose_chain(node, time, cache)
    }

    /// Returns the world-space position of `node`'s origin.
    pub fn world_position(
        &self,
        node: G::NodeId,
        time: TimeCode,
        cache: Option<&mut TransformCache<G::NodeId>>,
    ) -> Result<DVec3, ResolveError> {
        Ok(self.world_transform(node, time, cache)?.translation())
    }

    /// Returns the world translation, rotation and scale of `node`.
    pub fn world_components(
        &self,
        node: G::NodeId,
        time: TimeCode,
        cache: Option<&mut TransformCache<G::NodeId>>,
    ) -> Result<Decomposition, ResolveError> {
        let world = self.world_transform(node, time, cache)?;
        Ok(decompose_with_epsilon(&world, self.config.decompose_epsilon)?)
    }

    /// Returns the world transform `node` composes its local transform onto.
    ///
    /// Identity for roots and for nodes that reset the xform stack.
    pub fn parent_to_world_transform(
        &self,
        node: G::NodeId,
        time: TimeCode,
        cache: Option<&mut TransformCache<G::NodeId>>,
    ) -> Result<Matrix4, ResolveError> {
        self.check_queryable(node)?;
        if self.graph.resets_xform_stack(node) {
            return Ok(Matrix4::IDENTITY);
        }
        match self.graph.parent(node) {
            None => Ok(Matrix4::IDENTITY),
            Some(parent) if parent == node => Err(StructuralError::Cycle {
                node: self.graph.describe(node),
            }
            .into()),
            Some(parent) => self.compose_chain(parent, time, cache),
        }
    }

    /// Number of ancestors above `node` that contribute to its transform.
    pub fn depth(&self, node: G::NodeId) -> Result<usize, ResolveError> {
        Ok(self.collect_chain(node, TimeCode::Default, None)?.0.len() - 1)
    }

    fn check_queryable(&self, node: G::NodeId) -> Result<(), ResolveError> {
        if !self.graph.contains(node) {
            return Err(StructuralError::UnknownNode {
                node: self.graph.describe(node),
            }
            .into());
        }
        if !self.graph.is_transformable(node) {
            return Err(ResolveError::NotTransformable {
                node: self.graph.describe(node),
            });
        }
        Ok(())
    }

    // Non-transformable ancestors contribute identity.
    fn node_local(&self, node: G::NodeId, time: TimeCode) -> Result<Matrix4, ResolveError> {
        match self.graph.local_ops(node) {
            None => Ok(Matrix4::IDENTITY),
            Some(ops) => local_transform(ops.as_ref(), time).map_err(|index| {
                ResolveError::SingularOp {
                    node: self.graph.describe(node),
                    index,
                }
            }),
        }
    }

    fn compose_chain(
        &self,
        node: G::NodeId,
        time: TimeCode,
        mut cache: Option<&mut TransformCache<G::NodeId>>,
    ) -> Result<Matrix4, ResolveError> {
        let (chain, mut world) = self.collect_chain(node, time, cache.as_deref())?;

        for &id in chain.iter().rev() {
            world = world * self.node_local(id, time)?;
            if let Some(cache) = cache.as_deref_mut() {
                cache.put(id, time, world);
            }
        }

        log::trace!(
            "Resolved {} at {} composing {} node(s)",
            self.graph.describe(node),
            time,
            chain.len()
        );
        Ok(world)
    }

    /// Walks up from `node`, returning the nodes to compose (target first)
    /// and the world transform the topmost of them composes onto.
    fn collect_chain(
        &self,
        node: G::NodeId,
        time: TimeCode,
        cache: Option<&TransformCache<G::NodeId>>,
    ) -> Result<(Vec<G::NodeId>, Matrix4), ResolveError> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(node);

        while let Some(id) = current {
            if let Some(world) = cache.and_then(|c| c.get(id, time)) {
                log::trace!("Cache hit for {} at {}", self.graph.describe(id), time);
                return Ok((chain, world));
            }
            if !visited.insert(id) {
                return Err(StructuralError::Cycle {
                    node: self.graph.describe(id),
                }
                .into());
            }
            if chain.len() >= self.config.max_depth {
                return Err(StructuralError::DepthExceeded {
                    node: self.graph.describe(node),
                    max_depth: self.config.max_depth,
                }
                .into());
            }
            if !self.graph.contains(id) {
                return Err(StructuralError::UnknownNode {
                    node: self.graph.describe(id),
                }
                .into());
            }

            chain.push(id);
            if self.graph.resets_xform_stack(id) {
                break;
            }
            current = self.graph.parent(id);
        }

        Ok((chain, Matrix4::IDENTITY))
    }
}

/// Returns the world transform of `node`. See [`TransformResolver::world_transform`].
pub fn resolve_world_transform<G: SceneGraph>(
    graph: &G,
    node: G::NodeId,
    time: TimeCode,
    cache: Option<&mut TransformCache<G::NodeId>>,
) -> Result<Matrix4, ResolveError> {
    TransformResolver::new(graph).world_transform(node, time, cache)
}

/// Returns the world position of `node`. See [`TransformResolver::world_position`].
pub fn resolve_world_position<G: SceneGraph>(
    graph: &G,
    node: G::NodeId,
    time: TimeCode,
    cache: Option<&mut TransformCache<G::NodeId>>,
) -> Result<DVec3, ResolveError> {
    TransformResolver::new(graph).world_position(node, time, cache)
}

/// Returns the decomposed world transform of `node`. See
/// [`TransformResolver::world_components`].
pub fn resolve_world_components<G: SceneGraph>(
    graph: &G,
    node: G::NodeId,
    time: TimeCode,
    cache: Option<&mut TransformCache<G::NodeId>>,
) -> Result<Decomposition, ResolveError> {
    TransformResolver::new(graph).world_components(node, time, cache)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecompositionError;
    use crate::op::{OpKind, RotationOrder, TransformOp};
    use crate::samples::{Animated, TimeSamples};
    use crate::stage::Stage;
    use glam::DQuat;

    const EPS: f64 = 1e-9;

    fn xform(stage: &mut Stage, path: &str, ops: Vec<TransformOp>) -> hecs::Entity {
        let prim = stage.define_xform(path).unwrap();
        stage.set_ops(prim, ops).unwrap();
        prim
    }

    fn translated(stage: &mut Stage, path: &str, translation: DVec3) -> hecs::Entity {
        xform(stage, path, vec![TransformOp::translate(translation)])
    }

    fn position(stage: &Stage, prim: hecs::Entity) -> DVec3 {
        resolve_world_position(stage, prim, TimeCode::Default, None).unwrap()
    }

    #[test]
    fn simple_translation() {
        let mut stage = Stage::new();
        let cube = translated(&mut stage, "/World/Cube", DVec3::new(-5.0, -10.0, -15.0));
        assert_eq!(position(&stage, cube), DVec3::new(-5.0, -10.0, -15.0));
    }

    #[test]
    fn node_without_ops_inherits_parent() {
        let mut stage = Stage::new();
        let parent = xform(&mut stage, "/World", vec![
            TransformOp::translate(DVec3::new(1.0, 2.0, 3.0)),
            TransformOp::rotate_y(30.0),
        ]);
        let child = xform(&mut stage, "/World/Empty", vec![]);

        let resolver = TransformResolver::new(&stage);
        let p = resolver.world_transform(parent, TimeCode::Default, None).unwrap();
        let c = resolver.world_transform(child, TimeCode::Default, None).unwrap();
        assert_eq!(p, c);
    }

    #[test]
    fn root_without_ops_is_identity() {
        let mut stage = Stage::new();
        let root = xform(&mut stage, "/World", vec![]);
        assert_eq!(
            resolve_world_transform(&stage, root, TimeCode::at(4.0), None),
            Ok(Matrix4::IDENTITY)
        );
    }

    #[test]
    fn translate_then_scale_on_one_node() {
        let mut stage = Stage::new();
        let node = xform(&mut stage, "/Node", vec![
            TransformOp::translate(DVec3::new(1.0, 0.0, 0.0)),
            TransformOp::scale(DVec3::splat(2.0)),
        ]);
        assert_eq!(position(&stage, node), DVec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn multi_level_hierarchy() {
        let mut stage = Stage::new();
        xform(&mut stage, "/World", vec![]);
        translated(&mut stage, "/World/L1", DVec3::new(10.0, 0.0, 0.0));
        translated(&mut stage, "/World/L1/L2", DVec3::new(0.0, 20.0, 0.0));
        translated(&mut stage, "/World/L1/L2/L3", DVec3::new(0.0, 0.0, 30.0));
        let child = translated(&mut stage, "/World/L1/L2/L3/Cube", DVec3::new(1.0, 2.0, 3.0));

        assert_eq!(position(&stage, child), DVec3::new(11.0, 22.0, 33.0));
    }

    #[test]
    fn parent_rotation_moves_child() {
        let mut stage = Stage::new();
        xform(&mut stage, "/World/Parent", vec![TransformOp::rotate_z(90.0)]);
        let child = translated(&mut stage, "/World/Parent/Child", DVec3::new(10.0, 0.0, 0.0));

        assert!(position(&stage, child).abs_diff_eq(DVec3::new(0.0, 10.0, 0.0), EPS));
    }

    #[test]
    fn parent_scale_moves_child() {
        let mut stage = Stage::new();
        xform(&mut stage, "/World/Parent", vec![
            TransformOp::scale(DVec3::splat(2.0)),
            TransformOp::translate(DVec3::new(10.0, 0.0, 0.0)),
        ]);
        let child = translated(&mut stage, "/World/Parent/Child", DVec3::new(5.0, 0.0, 0.0));

        assert!(position(&stage, child).abs_diff_eq(DVec3::new(20.0, 0.0, 0.0), EPS));
    }

    #[test]
    fn cached_and_uncached_agree() {
        let mut stage = Stage::new();
        xform(&mut stage, "/World", vec![
            TransformOp::translate(DVec3::new(100.0, 0.0, 0.0)),
            TransformOp::rotate_z(45.0),
            TransformOp::scale(DVec3::splat(2.0)),
        ]);
        let child = translated(&mut stage, "/World/Child", DVec3::new(10.0, 10.0, 0.0));

        let resolver = TransformResolver::new(&stage);
        let fresh = resolver.world_transform(child, TimeCode::Default, None).unwrap();

        let mut cache = TransformCache::new();
        let world = stage.prim("/World").unwrap();
        resolver.world_transform(world, TimeCode::Default, Some(&mut cache)).unwrap();
        let warmed = resolver.world_transform(child, TimeCode::Default, Some(&mut cache)).unwrap();

        assert!(fresh.abs_diff_eq(&warmed, EPS));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn cache_entry_short_circuits_walk() {
        let mut stage = Stage::new();
        let parent = xform(&mut stage, "/World", vec![TransformOp::translate(DVec3::X)]);
        let child = xform(&mut stage, "/World/Child", vec![TransformOp::translate(DVec3::Y)]);

        // A planted ancestor entry is trusted as-is.
        let mut cache = TransformCache::new();
        cache.put(parent, TimeCode::Default, Matrix4::from_translation(DVec3::new(50.0, 0.0, 0.0)));

        let p = resolve_world_position(&stage, child, TimeCode::Default, Some(&mut cache)).unwrap();
        assert_eq!(p, DVec3::new(50.0, 1.0, 0.0));
        assert!(cache.contains(child, TimeCode::Default));
    }

    #[test]
    fn cache_is_keyed_by_time() {
        let mut stage = Stage::new();
        let translate = Animated::sampled(
            TimeSamples::from_samples([(0.0, DVec3::ZERO), (10.0, DVec3::new(10.0, 0.0, 0.0))])
                .unwrap(),
        );
        xform(&mut stage, "/World", vec![TransformOp::new(OpKind::Translate(translate))]);
        let child = xform(&mut stage, "/World/Child", vec![]);

        let resolver = TransformResolver::new(&stage);
        let mut cache = TransformCache::new();
        let a = resolver.world_position(child, TimeCode::at(0.0), Some(&mut cache)).unwrap();
        let b = resolver.world_position(child, TimeCode::at(5.0), Some(&mut cache)).unwrap();

        assert_eq!(a, DVec3::ZERO);
        assert_eq!(b, DVec3::new(5.0, 0.0, 0.0));
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn cycle_is_a_structural_error() {
        let mut stage = Stage::new();
        let a = xform(&mut stage, "/A", vec![]);
        let b = xform(&mut stage, "/A/B", vec![]);
        stage.reparent(a, Some(b)).unwrap();

        let err = resolve_world_transform(&stage, b, TimeCode::Default, None).unwrap_err();
        assert!(matches!(err, ResolveError::Structural(StructuralError::Cycle { .. })));

        let mut cache = TransformCache::new();
        let err =
            resolve_world_transform(&stage, a, TimeCode::Default, Some(&mut cache)).unwrap_err();
        assert!(matches!(err, ResolveError::Structural(StructuralError::Cycle { .. })));
        assert!(cache.is_empty());
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let mut stage = Stage::new();
        let a = xform(&mut stage, "/A", vec![]);
        stage.reparent(a, Some(a)).unwrap();

        let resolver = TransformResolver::new(&stage);
        assert!(matches!(
            resolver.world_transform(a, TimeCode::Default, None),
            Err(ResolveError::Structural(StructuralError::Cycle { .. }))
        ));
        assert!(matches!(
            resolver.parent_to_world_transform(a, TimeCode::Default, None),
            Err(ResolveError::Structural(StructuralError::Cycle { .. }))
        ));
    }

    #[test]
    fn depth_limit() {
        let mut stage = Stage::new();
        let leaf = xform(&mut stage, "/A/B/C/D", vec![]);
        let config = ResolverConfig::new().max_depth(3);
        let resolver = TransformResolver::with_config(&stage, config);

        assert_eq!(
            resolver.world_transform(leaf, TimeCode::Default, None),
            Err(ResolveError::Structural(StructuralError::DepthExceeded {
                node: "/A/B/C/D".to_string(),
                max_depth: 3,
            }))
        );
        assert_eq!(TransformResolver::new(&stage).depth(leaf), Ok(3));
    }

    #[test]
    fn unknown_node() {
        let mut other = Stage::new();
        let foreign = other.define_xform("/Elsewhere").unwrap();
        let stage = Stage::new();

        assert!(matches!(
            resolve_world_transform(&stage, foreign, TimeCode::Default, None),
            Err(ResolveError::Structural(StructuralError::UnknownNode { .. }))
        ));
    }

    #[test]
    fn dangling_parent_is_unknown() {
        let mut stage = Stage::new();
        let mut other = Stage::new();
        // Deep enough that the ghost's entity id is never allocated in `stage`.
        let ghost = other.define_xform("/G1/G2/G3/Ghost").unwrap();
        let a = xform(&mut stage, "/A", vec![]);
        stage.reparent(a, Some(ghost)).unwrap();

        assert!(matches!(
            resolve_world_transform(&stage, a, TimeCode::Default, None),
            Err(ResolveError::Structural(StructuralError::UnknownNode { .. }))
        ));
    }

    #[test]
    fn non_transformable_target_fails() {
        let mut stage = Stage::new();
        let scope = stage.define_prim("/World/Materials").unwrap();
        assert_eq!(
            resolve_world_position(&stage, scope, TimeCode::Default, None),
            Err(ResolveError::NotTransformable {
                node: "/World/Materials".to_string()
            })
        );
    }

    #[test]
    fn non_transformable_ancestor_is_identity() {
        let mut stage = Stage::new();
        translated(&mut stage, "/World", DVec3::new(1.0, 0.0, 0.0));
        stage.define_prim("/World/Scope").unwrap();
        let cube = translated(&mut stage, "/World/Scope/Cube", DVec3::new(0.0, 1.0, 0.0));

        assert_eq!(position(&stage, cube), DVec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn reset_xform_stack_ignores_ancestors() {
        let mut stage = Stage::new();
        translated(&mut stage, "/World", DVec3::new(100.0, 0.0, 0.0));
        let pinned = translated(&mut stage, "/World/Pinned", DVec3::new(0.0, 1.0, 0.0));
        stage.set_reset_xform_stack(pinned, true).unwrap();
        let child = translated(&mut stage, "/World/Pinned/Child", DVec3::new(0.0, 0.0, 1.0));

        let resolver = TransformResolver::new(&stage);
        assert_eq!(position(&stage, pinned), DVec3::new(0.0, 1.0, 0.0));
        assert_eq!(position(&stage, child), DVec3::new(0.0, 1.0, 1.0));
        assert_eq!(
            resolver.parent_to_world_transform(pinned, TimeCode::Default, None),
            Ok(Matrix4::IDENTITY)
        );
    }

    #[test]
    fn parent_to_world() {
        let mut stage = Stage::new();
        let root = translated(&mut stage, "/World", DVec3::new(3.0, 0.0, 0.0));
        let child = translated(&mut stage, "/World/Child", DVec3::new(0.0, 4.0, 0.0));

        let resolver = TransformResolver::new(&stage);
        let p2w = resolver.parent_to_world_transform(child, TimeCode::Default, None).unwrap();
        assert_eq!(p2w.translation(), DVec3::new(3.0, 0.0, 0.0));
        assert_eq!(
            resolver.parent_to_world_transform(root, TimeCode::Default, None),
            Ok(Matrix4::IDENTITY)
        );

        let local = resolver.local_transform(child, TimeCode::Default).unwrap();
        let world = resolver.world_transform(child, TimeCode::Default, None).unwrap();
        assert!((p2w * local).abs_diff_eq(&world, EPS));
    }

    #[test]
    fn interpolated_position() {
        let mut stage = Stage::new();
        let samples = TimeSamples::from_samples([
            (0.0, DVec3::ZERO),
            (50.0, DVec3::new(50.0, 0.0, 0.0)),
            (100.0, DVec3::new(100.0, 0.0, 0.0)),
        ])
        .unwrap();
        let translate = OpKind::Translate(Animated::sampled(samples));
        let cube = xform(&mut stage, "/World/Cube", vec![TransformOp::new(translate)]);

        let at = |t: f64| resolve_world_position(&stage, cube, TimeCode::at(t), None).unwrap();
        assert_eq!(at(0.0), DVec3::ZERO);
        assert_eq!(at(50.0), DVec3::new(50.0, 0.0, 0.0));
        assert_eq!(at(25.0), DVec3::new(25.0, 0.0, 0.0));
        assert_eq!(at(100.0), DVec3::new(100.0, 0.0, 0.0));
        assert_eq!(at(150.0), DVec3::new(100.0, 0.0, 0.0));
    }

    #[test]
    fn default_time_vs_numeric_time() {
        let mut stage = Stage::new();
        let translate = Animated::constant(DVec3::new(10.0, 0.0, 0.0))
            .with_sample(100.0, DVec3::new(50.0, 0.0, 0.0))
            .unwrap();
        let cube = xform(
            &mut stage,
            "/World/Cube",
            vec![TransformOp::new(OpKind::Translate(translate))],
        );

        assert_eq!(position(&stage, cube), DVec3::new(10.0, 0.0, 0.0));
        assert_eq!(
            resolve_world_position(&stage, cube, TimeCode::at(100.0), None),
            Ok(DVec3::new(50.0, 0.0, 0.0))
        );
    }

    #[test]
    fn world_components() {
        let mut stage = Stage::new();
        let cube = xform(&mut stage, "/World/Cube", vec![
            TransformOp::scale(DVec3::new(2.0, 3.0, 4.0)),
            TransformOp::rotate_euler(RotationOrder::XYZ, DVec3::new(0.0, 45.0, 0.0)),
            TransformOp::translate(DVec3::new(10.0, 20.0, 30.0)),
        ]);

        let parts = resolve_world_components(&stage, cube, TimeCode::Default, None).unwrap();
        assert!(parts.translation.abs_diff_eq(DVec3::new(10.0, 20.0, 30.0), EPS));
        assert!(parts.scale.abs_diff_eq(DVec3::new(2.0, 3.0, 4.0), EPS));
        let expected = DQuat::from_rotation_y(45f64.to_radians());
        assert!((parts.rotation.dot(expected).abs() - 1.0).abs() < EPS);
    }

    #[test]
    fn collapsed_scale_fails_decomposition() {
        let mut stage = Stage::new();
        let flat = xform(&mut stage, "/Flat", vec![TransformOp::scale(DVec3::new(1.0, 1.0, 0.0))]);

        assert_eq!(
            resolve_world_components(&stage, flat, TimeCode::Default, None),
            Err(ResolveError::Decomposition(DecompositionError::DegenerateScale { axis: 2 }))
        );
    }

    #[test]
    fn singular_inverse_is_reported() {
        let mut stage = Stage::new();
        let node = xform(&mut stage, "/Bad", vec![
            TransformOp::rotate_x(10.0),
            TransformOp::scale(DVec3::ZERO).inverted(),
        ]);

        assert_eq!(
            resolve_world_transform(&stage, node, TimeCode::Default, None),
            Err(ResolveError::SingularOp {
                node: "/Bad".to_string(),
                index: 1
            })
        );
    }
}
