//! Core layout trait for tree positioning

use super::Direction;

/// Core trait for layout algorithms
///
/// A layout algorithm turns a graph into positioned output. Implementations
/// are pure: they must not fail on malformed graphs and must return the same
/// output for the same input.
///
/// # Example
/// ```
/// use skillmap::core::LayoutAlgorithm;
/// use skillmap::tree::{RankedLayout, SkillGraph};
///
/// let graph = SkillGraph::new();
/// let layout = RankedLayout::new();
/// let positioned = layout.layout(&graph);
/// assert!(positioned.nodes.is_empty());
/// ```
pub trait LayoutAlgorithm<G>: Send + Sync {
    /// The output type of this layout algorithm
    type Output;

    /// Arrange the graph's nodes
    fn layout(&self, graph: &G) -> Self::Output;

    /// Get the name of this layout algorithm
    fn name(&self) -> &'static str;

    /// Get the version of this layout algorithm
    fn version(&self) -> &'static str;

    /// Get the configured flow direction
    fn direction(&self) -> Direction;
}
