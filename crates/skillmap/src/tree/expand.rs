//! Dummy-node expansion
//!
//! Edges that skip ranks are split into chains through placeholder nodes,
//! one per skipped rank, so long edges reserve horizontal room in every row
//! they cross. The result is an arena of layout slots plus per-rank index
//! lists; slots never move, only their `x` changes.

use std::collections::BTreeMap;
use tracing::{debug, trace};

use super::graph::SkillGraph;
use super::rank::clamp_rank;

/// Prefix of synthetic node ids. Real ids never reach the arena with it.
pub const DUMMY_PREFIX: &str = "__dummy_";

/// Where an arena slot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A graph node, by insertion index
    Real(usize),
    /// A placeholder on the chain of the edge with this index
    Dummy { edge: usize },
}

/// A node being positioned
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub id: String,
    pub rank: i64,
    pub x: f64,
    pub origin: Origin,
    /// Slots linked on the higher-rank side (targets of same-rank edges too)
    pub upper: Vec<usize>,
    /// Slots linked on the lower-rank side (sources of same-rank edges too)
    pub lower: Vec<usize>,
}

impl LayoutNode {
    fn new(id: String, rank: i64, origin: Origin) -> Self {
        Self {
            id,
            rank,
            x: 0.0,
            origin,
            upper: Vec::new(),
            lower: Vec::new(),
        }
    }

    pub fn is_dummy(&self) -> bool {
        matches!(self.origin, Origin::Dummy { .. })
    }
}

/// Arena of layout slots grouped into rank rows
///
/// Slot `i` for `i < real_count` is graph node `i`; dummies follow.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub arena: Vec<LayoutNode>,
    pub rows: BTreeMap<i64, Vec<usize>>,
    /// Links between adjacent slots as `(lower, upper)`
    pub effective_edges: Vec<(usize, usize)>,
    pub real_count: usize,
}

impl Expansion {
    pub fn dummy_count(&self) -> usize {
        self.arena.len() - self.real_count
    }

    /// Dummy slots created for one edge, lowest rank first
    pub fn chain(&self, edge: usize) -> Vec<usize> {
        self.arena
            .iter()
            .enumerate()
            .filter(|(_, n)| n.origin == Origin::Dummy { edge })
            .map(|(slot, _)| slot)
            .collect()
    }

    fn link(&mut self, lower: usize, upper: usize) {
        self.arena[lower].upper.push(upper);
        self.arena[upper].lower.push(lower);
        self.effective_edges.push((lower, upper));
    }

    fn push_dummy(&mut self, edge: usize, rank: i64) -> usize {
        let slot = self.arena.len();
        self.arena.push(LayoutNode::new(
            format!("{}{}_{}", DUMMY_PREFIX, edge, rank),
            rank,
            Origin::Dummy { edge },
        ));
        slot
    }
}

/// Build the layout arena for a graph
///
/// Edges naming unknown nodes and self-loops add no links. An edge spanning
/// at most one rank links its endpoints directly, lower rank below; for
/// equal ranks the source sits below the target. Longer edges, in either
/// orientation, are replaced by a dummy chain from the lower-ranked endpoint
/// up to the higher-ranked one and never link their endpoints directly.
/// Node ranks are clamped first, which bounds every chain.
pub fn expand(graph: &SkillGraph) -> Expansion {
    let mut expansion = Expansion {
        arena: graph
            .nodes()
            .enumerate()
            .map(|(i, n)| LayoutNode::new(n.id.clone(), clamp_rank(n.rank), Origin::Real(i)))
            .collect(),
        real_count: graph.node_count(),
        ..Default::default()
    };

    for (edge_idx, edge) in graph.edges().enumerate() {
        let (Some(source), Some(target)) = (graph.index_of(&edge.source), graph.index_of(&edge.target))
        else {
            trace!(edge_id = %edge.id, "Edge with unknown endpoint ignored");
            continue;
        };
        if source == target {
            trace!(edge_id = %edge.id, "Self-loop ignored");
            continue;
        }

        let source_rank = expansion.arena[source].rank;
        let target_rank = expansion.arena[target].rank;
        let (low, high) = if source_rank <= target_rank {
            (source, target)
        } else {
            (target, source)
        };

        if source_rank.abs_diff(target_rank) <= 1 {
            expansion.link(low, high);
            continue;
        }

        let low_rank = expansion.arena[low].rank;
        let high_rank = expansion.arena[high].rank;
        let mut previous = low;
        for rank in (low_rank + 1)..high_rank {
            let dummy = expansion.push_dummy(edge_idx, rank);
            expansion.link(previous, dummy);
            previous = dummy;
        }
        expansion.link(previous, high);
        trace!(
            edge_id = %edge.id,
            span = high_rank - low_rank,
            "Expanded long edge into dummy chain"
        );
    }

    for (slot, node) in expansion.arena.iter().enumerate() {
        expansion.rows.entry(node.rank).or_default().push(slot);
    }

    debug!(
        real_count = expansion.real_count,
        dummy_count = expansion.dummy_count(),
        row_count = expansion.rows.len(),
        "Dummy-node expansion completed"
    );
    expansion
}
