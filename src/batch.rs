//! Resolving many nodes against one shared cache.
//!
//! Nodes that share ancestors only pay for those ancestors once: the first
//! query writes every ancestor's world transform into the cache and later
//! queries stop walking as soon as they reach a cached node.
//!
//! Every node gets its own `Result`. A malformed chain under one node never
//! prevents the rest of the batch from resolving.

use crate::cache::TransformCache;
use crate::config::ResolverConfig;
use crate::decompose::{Decomposition, decompose_with_epsilon};
use crate::error::ResolveError;
use crate::graph::SceneGraph;
use crate::matrix::Matrix4;
use crate::resolver::TransformResolver;
use crate::time::TimeCode;
use glam::DVec3;

/// Drives a [`TransformResolver`] over a collection of nodes.
///
/// # Example
///
/// ```
/// use worldxform::{BatchResolver, Stage, TransformOp, TimeCode, DVec3};
///
/// let mut stage = Stage::new();
/// let parent = stage.define_xform("/World/Parent").unwrap();
/// stage.add_op(parent, TransformOp::translate(DVec3::new(100.0, 0.0, 0.0))).unwrap();
///
/// let cubes: Vec<_> = (0..5)
///     .map(|i| {
///         let cube = stage.define_xform(&format!("/World/Parent/Cube{i}")).unwrap();
///         stage.add_op(cube, TransformOp::translate(DVec3::new(i as f64, 0.0, 0.0))).unwrap();
///         cube
///     })
///     .collect();
///
/// let positions = BatchResolver::new(&stage).resolve_positions(&cubes, TimeCode::Default);
/// for (i, position) in positions.into_iter().enumerate() {
///     assert_eq!(position.unwrap(), DVec3::new(100.0 + i as f64, 0.0, 0.0));
/// }
/// ```
pub struct BatchResolver<'g, G: SceneGraph> {
    resolver: TransformResolver<'g, G>,
}

impl<'g, G: SceneGraph> BatchResolver<'g, G> {
    /// Creates a batch resolver with the default [`ResolverConfig`].
    pub fn new(graph: &'g G) -> Self {
        Self::with_config(graph, ResolverConfig::default())
    }

    /// Creates a batch resolver with a custom configuration.
    pub fn with_config(graph: &'g G, config: ResolverConfig) -> Self {
        Self {
            resolver: TransformResolver::with_config(graph, config),
        }
    }

    /// The underlying single-node resolver.
    pub fn resolver(&self) -> &TransformResolver<'g, G> {
        &self.resolver
    }

    /// Resolves world transforms of `nodes` at `time` with a fresh cache.
    ///
    /// Results are in input order.
    pub fn resolve(
        &self,
        nodes: &[G::NodeId],
        time: TimeCode,
    ) -> Vec<Result<Matrix4, ResolveError>> {
        let mut cache = TransformCache::new();
        self.resolve_with_cache(nodes, time, &mut cache)
    }

    /// Resolves world transforms of `nodes` at `time`, reusing and filling
    /// `cache`.
    pub fn resolve_with_cache(
        &self,
        nodes: &[G::NodeId],
        time: TimeCode,
        cache: &mut TransformCache<G::NodeId>,
    ) -> Vec<Result<Matrix4, ResolveError>> {
        let mut results: Vec<Option<Result<Matrix4, ResolveError>>> = vec![None; nodes.len()];

        for index in self.resolution_order(nodes) {
            let node = nodes[index];
            let result = self.resolver.world_transform(node, time, Some(&mut *cache));
            if let Err(e) = &result {
                log::warn!("Skipping {}: {}", self.resolver.graph().describe(node), e);
            }
            results[index] = Some(result);
        }

        let stats = cache.stats();
        log::debug!(
            "Resolved batch of {} node(s) at {} ({} cache hits, {} misses, {} entries)",
            nodes.len(),
            time,
            stats.hits,
            stats.misses,
            cache.len()
        );

        // resolution_order is a permutation of 0..nodes.len()
        results.into_iter().flatten().collect()
    }

    /// Resolves world positions of `nodes` at `time`.
    pub fn resolve_positions(
        &self,
        nodes: &[G::NodeId],
        time: TimeCode,
    ) -> Vec<Result<DVec3, ResolveError>> {
        self.resolve(nodes, time)
            .into_iter()
            .map(|result| result.map(|world| world.translation()))
            .collect()
    }

    /// Resolves decomposed world transforms of `nodes` at `time`.
    pub fn resolve_components(
        &self,
        nodes: &[G::NodeId],
        time: TimeCode,
    ) -> Vec<Result<Decomposition, ResolveError>> {
        let epsilon = self.resolver.config().decompose_epsilon;
        self.resolve(nodes, time)
            .into_iter()
            .map(|result| Ok(decompose_with_epsilon(&result?, epsilon)?))
            .collect()
    }

    // Depth sorting costs one extra uncached walk per node.
    fn resolution_order(&self, nodes: &[G::NodeId]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..nodes.len()).collect();
        if self.resolver.config().sort_batch_by_depth {
            // Broken chains sort last; they fail again when resolved.
            let depths: Vec<usize> = nodes
                .iter()
                .map(|&node| self.resolver.depth(node).unwrap_or(usize::MAX))
                .collect();
            order.sort_by_key(|&index| depths[index]);
        }
        order
    }
}

/// Resolves world transforms of `nodes` with a fresh shared cache.
pub fn resolve_batch<G: SceneGraph>(
    graph: &G,
    nodes: &[G::NodeId],
    time: TimeCode,
) -> Vec<Result<Matrix4, ResolveError>> {
    BatchResolver::new(graph).resolve(nodes, time)
}

/// Resolves world positions of `nodes` with a fresh shared cache.
pub fn resolve_positions_batch<G: SceneGraph>(
    graph: &G,
    nodes: &[G::NodeId],
    time: TimeCode,
) -> Vec<Result<DVec3, ResolveError>> {
    BatchResolver::new(graph).resolve_positions(nodes, time)
}
