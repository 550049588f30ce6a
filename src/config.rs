//! Resolver configuration.

use crate::decompose::DEFAULT_EPSILON;

/// Tunables for transform resolution.
///
/// # Example
///
/// ```
/// use worldxform::ResolverConfig;
///
/// let config = ResolverConfig::new()
///     .max_depth(64)
///     .sort_batch_by_depth(true);
/// assert_eq!(config.max_depth, 64);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolverConfig {
    /// Longest parent chain accepted before failing with
    /// [`StructuralError::DepthExceeded`](crate::StructuralError::DepthExceeded).
    pub max_depth: usize,
    /// Resolve batch nodes shallowest first. Results keep input order.
    ///
    /// Ordering walks every node's parent chain once more, uncached, before
    /// resolution starts.
    pub sort_batch_by_depth: bool,
    /// Tolerance used by decomposition for zero scale and the affine check.
    pub decompose_epsilon: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 1024,
            sort_batch_by_depth: false,
            decompose_epsilon: DEFAULT_EPSILON,
        }
    }
}

impl ResolverConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the longest accepted parent chain.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets whether batches resolve shallowest nodes first.
    pub fn sort_batch_by_depth(mut self, sort: bool) -> Self {
        self.sort_batch_by_depth = sort;
        self
    }

    /// Sets the decomposition tolerance.
    pub fn decompose_epsilon(mut self, epsilon: f64) -> Self {
        self.decompose_epsilon = epsilon;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_epsilon_matches_decomposition() {
        assert_eq!(ResolverConfig::default().decompose_epsilon, DEFAULT_EPSILON);
        assert_eq!(ResolverConfig::new(), ResolverConfig::default());
    }

    #[test]
    fn setters_chain() {
        let config = ResolverConfig::new()
            .max_depth(8)
            .sort_batch_by_depth(true)
            .decompose_epsilon(1e-6);
        assert_eq!(config.max_depth, 8);
        assert!(config.sort_batch_by_depth);
        assert_eq!(config.decompose_epsilon, 1e-6);
    }
}
