//! Iterative barycenter positioning
//!
//! Places one tree's nodes on rank rows. Rows start in a fixed order, then
//! alternating sweeps pull each node toward the mean x of its neighbors in
//! the adjacent rows. After every row update overlapping nodes are pushed
//! apart so no two nodes in a row end up closer than the configured spacing.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, span, trace, warn, Level};

use super::expand::{expand, Expansion, LayoutNode};
use super::graph::{SkillEdge, SkillGraph};
use crate::core::{AttachmentSides, DetailRecord, Direction, LayoutAlgorithm, SkillMapError};

/// Horizontal distance between neighbors in a row
pub const DEFAULT_SPACING: f64 = 250.0;
/// Vertical distance between consecutive ranks
pub const DEFAULT_ROW_SPACING: f64 = 160.0;
/// Number of down/up sweep pairs
pub const DEFAULT_ITERATIONS: usize = 4;
/// Horizontal gap between packed trees
pub const DEFAULT_TREE_GAP: f64 = 400.0;

/// Configuration for tree layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub spacing: f64,
    pub row_spacing: f64,
    pub iterations: usize,
    pub tree_gap: f64,
    pub direction: Direction,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_SPACING,
            row_spacing: DEFAULT_ROW_SPACING,
            iterations: DEFAULT_ITERATIONS,
            tree_gap: DEFAULT_TREE_GAP,
            direction: Direction::default(),
        }
    }
}

impl LayoutConfig {
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Reject values the positioner cannot work with
    pub fn validate(&self) -> Result<(), SkillMapError> {
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(SkillMapError::config(format!(
                "spacing must be a positive number, got {}",
                self.spacing
            )));
        }
        if !(self.row_spacing.is_finite() && self.row_spacing > 0.0) {
            return Err(SkillMapError::config(format!(
                "row spacing must be a positive number, got {}",
                self.row_spacing
            )));
        }
        if !(self.tree_gap.is_finite() && self.tree_gap >= 0.0) {
            return Err(SkillMapError::config(format!(
                "tree gap must be zero or more, got {}",
                self.tree_gap
            )));
        }
        Ok(())
    }

    /// Copy with every invalid field replaced by its default
    ///
    /// The layout runs on sanitized configs so zero or non-finite spacing
    /// cannot break the minimum-spacing guarantee.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            warn!(spacing = self.spacing, "Invalid spacing, using default");
            self.spacing = defaults.spacing;
        }
        if !(self.row_spacing.is_finite() && self.row_spacing > 0.0) {
            warn!(row_spacing = self.row_spacing, "Invalid row spacing, using default");
            self.row_spacing = defaults.row_spacing;
        }
        if !(self.tree_gap.is_finite() && self.tree_gap >= 0.0) {
            warn!(tree_gap = self.tree_gap, "Invalid tree gap, using default");
            self.tree_gap = defaults.tree_gap;
        }
        self
    }

    /// Screen y of a rank given the tree's rank span
    pub fn row_y(&self, rank: i64, min_rank: i64, max_rank: i64) -> f64 {
        let steps = match self.direction {
            Direction::BottomToTop => max_rank.saturating_sub(rank),
            Direction::TopToBottom => rank.saturating_sub(min_rank),
        };
        steps.max(0) as f64 * self.row_spacing
    }
}

/// A laid out tree node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub rank: i64,
    pub attachment: AttachmentSides,
    pub payload: DetailRecord,
}

/// Layout output for one tree
///
/// Edges are passed through untouched, dangling ones included.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedGraph {
    pub direction: Direction,
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<SkillEdge>,
}

impl PositionedGraph {
    pub fn get(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Smallest and largest node x, `None` when empty
    pub fn x_range(&self) -> Option<(f64, f64)> {
        self.nodes.iter().fold(None, |range, n| match range {
            None => Some((n.x, n.x)),
            Some((lo, hi)) => Some((f64::min(lo, n.x), f64::max(hi, n.x))),
        })
    }

    /// Horizontal extent of the nodes, 0 when empty
    pub fn width(&self) -> f64 {
        self.x_range().map(|(lo, hi)| hi - lo).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    /// Highest rank first, following upper neighbors
    Downward,
    /// Lowest rank first, following lower neighbors
    Upward,
}

/// Initial row order: real nodes before dummies, then by id
pub fn initialize(expansion: &mut Expansion, spacing: f64) {
    let Expansion { arena, rows, .. } = expansion;
    for row in rows.values_mut() {
        row.sort_by(|&a, &b| {
            arena[a]
                .is_dummy()
                .cmp(&arena[b].is_dummy())
                .then_with(|| arena[a].id.cmp(&arena[b].id))
        });
        for (i, &slot) in row.iter().enumerate() {
            arena[slot].x = i as f64 * spacing;
        }
    }
}

/// Push apart nodes in one row
///
/// The row is stably sorted by x, then every node closer than `spacing` to
/// its left neighbor moves to exactly `left.x + spacing`.
pub fn resolve_overlaps(arena: &mut [LayoutNode], row: &mut [usize], spacing: f64) {
    row.sort_by(|&a, &b| arena[a].x.total_cmp(&arena[b].x));
    for i in 1..row.len() {
        let min_x = arena[row[i - 1]].x + spacing;
        if arena[row[i]].x < min_x {
            arena[row[i]].x = min_x;
        }
    }
}

fn sweep(expansion: &mut Expansion, direction: Sweep, spacing: f64) {
    let Expansion { arena, rows, .. } = expansion;
    let ranks: Vec<i64> = match direction {
        Sweep::Downward => rows.keys().rev().copied().collect(),
        Sweep::Upward => rows.keys().copied().collect(),
    };

    for rank in ranks {
        let Some(row) = rows.get_mut(&rank) else {
            continue;
        };
        for &slot in row.iter() {
            let barycenter = {
                let neighbors = match direction {
                    Sweep::Downward => &arena[slot].upper,
                    Sweep::Upward => &arena[slot].lower,
                };
                if neighbors.is_empty() {
                    None
                } else {
                    let sum: f64 = neighbors.iter().map(|&n| arena[n].x).sum();
                    Some(sum / neighbors.len() as f64)
                }
            };
            if let Some(x) = barycenter {
                arena[slot].x = x;
            }
        }
        resolve_overlaps(arena, row, spacing);
    }
}

/// Shift every slot so the global x range is centered on 0
pub fn center(arena: &mut [LayoutNode]) {
    let Some((min_x, max_x)) = arena.iter().fold(None, |range, n| match range {
        None => Some((n.x, n.x)),
        Some((lo, hi)) => Some((f64::min(lo, n.x), f64::max(hi, n.x))),
    }) else {
        return;
    };
    let mid = (min_x + max_x) / 2.0;
    for node in arena.iter_mut() {
        node.x -= mid;
    }
}

/// Compute x for every slot of an expansion
pub fn position(expansion: &mut Expansion, config: &LayoutConfig) {
    initialize(expansion, config.spacing);
    for iteration in 0..config.iterations {
        sweep(expansion, Sweep::Downward, config.spacing);
        sweep(expansion, Sweep::Upward, config.spacing);
        trace!(iteration, "Barycenter iteration completed");
    }
    center(&mut expansion.arena);
}

/// Layered layout with barycenter positioning
#[derive(Debug, Clone, Default)]
pub struct RankedLayout {
    config: LayoutConfig,
}

impl RankedLayout {
    /// Create a layout with default spacing, bottom-to-top
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layout from a config, replacing invalid fields by defaults
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }
}

impl LayoutAlgorithm<SkillGraph> for RankedLayout {
    type Output = PositionedGraph;

    fn layout(&self, graph: &SkillGraph) -> Self::Output {
        let direction = self.config.direction;
        let layout_span = span!(
            Level::INFO,
            "layout_tree",
            node_count = graph.node_count(),
            edge_count = graph.edge_count(),
            direction = %direction
        );
        let _enter = layout_span.enter();

        let edges: Vec<SkillEdge> = graph.edges().cloned().collect();
        let Some((min_rank, max_rank)) = graph.rank_range() else {
            debug!("Empty graph, returning empty layout");
            return PositionedGraph {
                direction,
                nodes: Vec::new(),
                edges,
            };
        };

        let expand_span = span!(Level::DEBUG, "expand");
        let expand_enter = expand_span.enter();
        let mut expansion = expand(graph);
        drop(expand_enter);

        let position_span = span!(Level::DEBUG, "position", iterations = self.config.iterations);
        let position_enter = position_span.enter();
        position(&mut expansion, &self.config);
        drop(position_enter);

        let attachment = direction.attachment();
        let nodes: Vec<PositionedNode> = graph
            .nodes()
            .zip(expansion.arena.iter())
            .map(|(node, slot)| PositionedNode {
                id: node.id.clone(),
                x: slot.x,
                y: self.config.row_y(slot.rank, min_rank, max_rank),
                rank: slot.rank,
                attachment,
                payload: node.payload.clone(),
            })
            .collect();

        info!(
            node_count = nodes.len(),
            dummy_count = expansion.dummy_count(),
            min_rank,
            max_rank,
            "Layout completed"
        );

        PositionedGraph {
            direction,
            nodes,
            edges,
        }
    }

    fn name(&self) -> &'static str {
        "barycenter"
    }

    fn version(&self) -> &'static str {
        "0.3.0"
    }

    fn direction(&self) -> Direction {
        self.config.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnchorSide, ExerciseRecord};
    use crate::tree::graph::SkillNode;
    use crate::tree::rank::{MAX_RANK, MIN_RANK};

    const EPS: f64 = 1e-9;

    fn graph(nodes: &[(&str, i64)], edges: &[(&str, &str)]) -> SkillGraph {
        SkillGraph::from_parts(
            nodes
                .iter()
                .map(|&(id, rank)| SkillNode::new(ExerciseRecord::new(id, id, rank).into()))
                .collect(),
            edges.iter().map(|&(s, t)| SkillEdge::new(s, t)).collect(),
        )
    }

    fn layout(graph: &SkillGraph, direction: Direction) -> PositionedGraph {
        RankedLayout::with_config(LayoutConfig::default().with_direction(direction)).layout(graph)
    }

    #[test]
    fn test_single_isolated_node() {
        let out = layout(&graph(&[("x", 7)], &[]), Direction::BottomToTop);
        assert_eq!(out.nodes.len(), 1);
        assert_eq!(out.nodes[0].x, 0.0);
        assert_eq!(out.nodes[0].y, 0.0);
        assert_eq!(out.nodes[0].rank, 7);
    }

    #[test]
    fn test_empty_graph() {
        let out = RankedLayout::new().layout(&SkillGraph::new());
        assert!(out.nodes.is_empty());
        assert!(out.edges.is_empty());
        assert_eq!(out.width(), 0.0);
    }

    #[test]
    fn test_row_initialization_orders_real_before_dummy_then_id() {
        let g = graph(&[("b", 1), ("a", 1), ("c", 1)], &[]);
        let mut exp = expand(&g);
        initialize(&mut exp, 250.0);
        let row: Vec<_> = exp.rows[&1].iter().map(|&s| exp.arena[s].id.as_str()).collect();
        assert_eq!(row, vec!["a", "b", "c"]);
        assert_eq!(exp.arena[1].x, 0.0);
        assert_eq!(exp.arena[0].x, 250.0);
        assert_eq!(exp.arena[2].x, 500.0);
    }

    #[test]
    fn test_resolve_overlaps_pushes_to_exact_spacing() {
        let g = graph(&[("a", 1), ("b", 1), ("c", 1)], &[]);
        let mut exp = expand(&g);
        exp.arena[0].x = 10.0;
        exp.arena[1].x = 0.0;
        exp.arena[2].x = 600.0;
        let mut row = exp.rows[&1].clone();
        resolve_overlaps(&mut exp.arena, &mut row, 250.0);
        assert_eq!(row, vec![1, 0, 2]);
        assert_eq!(exp.arena[1].x, 0.0);
        assert_eq!(exp.arena[0].x, 250.0);
        assert_eq!(exp.arena[2].x, 600.0);
    }

    #[test]
    fn test_long_edge_scenario() {
        let g = graph(
            &[("a", 1), ("b", 2), ("c", 5)],
            &[("a", "b"), ("b", "c"), ("a", "c")],
        );
        let mut exp = expand(&g);
        position(&mut exp, &LayoutConfig::default());

        // a sits between b and the rank-2 dummy of a -> c
        let b = exp.arena[1].x;
        let dummy = exp.arena[exp.chain(2)[0]].x;
        let a = exp.arena[0].x;
        assert!(a >= b.min(dummy) - EPS && a <= b.max(dummy) + EPS);
        assert!((b - dummy).abs() >= 250.0 - EPS);

        let out = layout(&g, Direction::BottomToTop);
        assert!(out.nodes.iter().all(|n| !n.id.starts_with("__dummy_")));
        assert_eq!(out.nodes.len(), 3);
        assert_eq!(out.edges.len(), 3);
    }

    #[test]
    fn test_centering_over_all_slots() {
        let g = graph(
            &[("a", 1), ("b", 2), ("c", 5)],
            &[("a", "b"), ("b", "c"), ("a", "c")],
        );
        let mut exp = expand(&g);
        position(&mut exp, &LayoutConfig::default());
        let min = exp.arena.iter().map(|n| n.x).fold(f64::INFINITY, f64::min);
        let max = exp.arena.iter().map(|n| n.x).fold(f64::NEG_INFINITY, f64::max);
        assert!(((min + max) / 2.0).abs() < EPS);
    }

    #[test]
    fn test_rank_to_y() {
        let g = graph(&[("a", 1), ("b", 3), ("c", 4)], &[("a", "b"), ("b", "c")]);

        let up = layout(&g, Direction::BottomToTop);
        assert_eq!(up.get("a").unwrap().y, 480.0);
        assert_eq!(up.get("b").unwrap().y, 160.0);
        assert_eq!(up.get("c").unwrap().y, 0.0);

        let down = layout(&g, Direction::TopToBottom);
        assert_eq!(down.get("a").unwrap().y, 0.0);
        assert_eq!(down.get("b").unwrap().y, 320.0);
        assert_eq!(down.get("c").unwrap().y, 480.0);
    }

    #[test]
    fn test_x_is_direction_invariant() {
        let g = graph(
            &[("a", 1), ("b", 1), ("c", 2), ("d", 4)],
            &[("a", "c"), ("b", "c"), ("c", "d"), ("a", "d")],
        );
        let up = layout(&g, Direction::BottomToTop);
        let down = layout(&g, Direction::TopToBottom);
        for (u, d) in up.nodes.iter().zip(down.nodes.iter()) {
            assert_eq!(u.id, d.id);
            assert_eq!(u.x, d.x);
        }
    }

    #[test]
    fn test_attachment_sides() {
        let g = graph(&[("a", 1)], &[]);
        let up = layout(&g, Direction::BottomToTop);
        assert_eq!(up.nodes[0].attachment.source, AnchorSide::Top);
        assert_eq!(up.nodes[0].attachment.target, AnchorSide::Bottom);
        let down = layout(&g, Direction::TopToBottom);
        assert_eq!(down.nodes[0].attachment.source, AnchorSide::Bottom);
        assert_eq!(down.nodes[0].attachment.target, AnchorSide::Top);
    }

    #[test]
    fn test_dangling_edges_pass_through() {
        let g = graph(&[("a", 1)], &[("a", "ghost")]);
        let out = RankedLayout::new().layout(&g);
        assert_eq!(out.nodes.len(), 1);
        assert_eq!(out.edges.len(), 1);
        assert_eq!(out.edges[0].target, "ghost");
    }

    #[test]
    fn test_config_validation() {
        assert!(LayoutConfig::default().validate().is_ok());
        let bad = LayoutConfig {
            spacing: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = LayoutConfig {
            tree_gap: -1.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_extreme_ranks_do_not_overflow() {
        for edges in [&[][..], &[("a", "b")][..]] {
            let mut g = graph(&[("a", 1), ("b", 1)], edges);
            let mut low = g.get_node("a").unwrap().clone();
            let mut high = g.get_node("b").unwrap().clone();
            low.rank = i64::MIN;
            high.rank = i64::MAX;
            g = SkillGraph::from_parts(vec![low, high], g.edges().cloned().collect());

            let out = layout(&g, Direction::BottomToTop);
            let a = out.get("a").unwrap();
            let b = out.get("b").unwrap();
            assert_eq!(a.rank, MIN_RANK);
            assert_eq!(b.rank, MAX_RANK);
            assert_eq!(a.y, (MAX_RANK - MIN_RANK) as f64 * 160.0);
            assert_eq!(b.y, 0.0);
        }
    }

    #[test]
    fn test_huge_rank_span_lays_out() {
        let g = graph(&[("a", 1), ("b", 2_000_000_000)], &[("a", "b")]);
        let out = layout(&g, Direction::TopToBottom);
        assert_eq!(out.nodes.len(), 2);
        assert_eq!(out.get("a").unwrap().y, 0.0);
        assert_eq!(out.get("b").unwrap().y, (MAX_RANK - 1) as f64 * 160.0);
        assert!(out.nodes.iter().all(|n| n.x.is_finite()));
    }

    #[test]
    fn test_row_y_saturates() {
        let config = LayoutConfig::default();
        assert_eq!(config.row_y(i64::MIN, i64::MIN, i64::MAX), i64::MAX as f64 * 160.0);
        assert_eq!(config.row_y(5, 1, 3), 0.0);
    }

    #[test]
    fn test_invalid_config_is_sanitized() {
        let config = LayoutConfig {
            spacing: f64::NAN,
            row_spacing: 0.0,
            tree_gap: -5.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config, LayoutConfig::default());

        let layout = RankedLayout::with_config(LayoutConfig {
            spacing: 0.0,
            ..Default::default()
        });
        assert_eq!(layout.config().spacing, DEFAULT_SPACING);
        let out = layout.layout(&graph(&[("a", 1), ("b", 1)], &[]));
        assert!((out.nodes[0].x - out.nodes[1].x).abs() >= DEFAULT_SPACING - EPS);
    }

    #[test]
    fn test_algorithm_metadata() {
        let layout = RankedLayout::new();
        assert_eq!(layout.name(), "barycenter");
        assert_eq!(layout.direction(), Direction::BottomToTop);
    }
}
