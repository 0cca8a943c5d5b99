//! Multi-tree composition
//!
//! Lays out several trees independently and packs them left to right into
//! one skill map. Ids are namespaced per tree so the same exercise can
//! appear in several trees without colliding.

use serde::Serialize;
use tracing::{debug, info, span, Level};

use super::graph::SkillGraph;
use super::position::{LayoutConfig, RankedLayout};
use super::status::StatusRule;
use crate::core::{
    AnchorSide, AttachmentSides, ConnectionKind, DetailRecord, LayoutAlgorithm, NodeStatus,
};

/// Separator between tree id and node id in namespaced ids
pub const NAMESPACE_SEPARATOR: &str = "__";

/// Namespaced id of an item inside a tree
pub fn namespaced(tree_id: &str, id: &str) -> String {
    format!("{}{}{}", tree_id, NAMESPACE_SEPARATOR, id)
}

/// One tree to be composed
#[derive(Debug, Clone)]
pub struct TreeGraph {
    pub tree_id: String,
    pub title: String,
    pub graph: SkillGraph,
}

impl TreeGraph {
    pub fn new(tree_id: impl Into<String>, title: impl Into<String>, graph: SkillGraph) -> Self {
        Self {
            tree_id: tree_id.into(),
            title: title.into(),
            graph,
        }
    }
}

/// How an edge is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeEmphasis {
    /// Target is locked
    Dimmed,
    Emphasized,
}

impl EdgeEmphasis {
    /// Stroke color used by the web client
    pub fn stroke(&self) -> &'static str {
        match self {
            EdgeEmphasis::Dimmed => "#52525b",
            EdgeEmphasis::Emphasized => "#f59e0b",
        }
    }
}

/// A node of the composed map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapNode {
    /// `{tree_id}__{exercise_ref}`
    pub id: String,
    pub tree_id: String,
    pub exercise_ref: String,
    pub x: f64,
    pub y: f64,
    pub rank: i64,
    pub status: NodeStatus,
    pub attachment: AttachmentSides,
    pub payload: DetailRecord,
}

/// An edge of the composed map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapEdge {
    pub id: String,
    pub tree_id: String,
    pub source: String,
    pub target: String,
    pub kind: ConnectionKind,
    pub source_anchor: AnchorSide,
    pub target_anchor: AnchorSide,
    pub animated: bool,
    pub emphasis: EdgeEmphasis,
}

/// Horizontal extent of one tree in the composed map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeBounds {
    pub tree_id: String,
    pub title: String,
    pub min_x: f64,
    pub max_x: f64,
    pub node_count: usize,
}

/// All published trees laid out side by side
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMap {
    pub nodes: Vec<MapNode>,
    pub edges: Vec<MapEdge>,
    pub trees: Vec<TreeBounds>,
}

impl SkillMap {
    pub fn get(&self, id: &str) -> Option<&MapNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn tree(&self, tree_id: &str) -> Option<&TreeBounds> {
        self.trees.iter().find(|t| t.tree_id == tree_id)
    }
}

/// Lay out and pack trees left to right
///
/// Each tree keeps only connections between its own nodes and is laid out
/// alone. Its nodes are shifted so its leftmost node lands on the running
/// offset, which then grows by the tree's width plus the configured gap.
/// Empty trees take no room. Edge style follows the target node's status.
/// Invalid config fields fall back to their defaults.
pub fn compose_all(trees: Vec<TreeGraph>, rule: &dyn StatusRule, config: &LayoutConfig) -> SkillMap {
    let compose_span = span!(
        Level::INFO,
        "compose_all",
        tree_count = trees.len(),
        direction = %config.direction
    );
    let _enter = compose_span.enter();

    let layout = RankedLayout::with_config(*config);
    let tree_gap = layout.config().tree_gap;
    let mut map = SkillMap::default();
    let mut offset = 0.0;

    for TreeGraph {
        tree_id,
        title,
        mut graph,
    } in trees
    {
        graph.retain_internal_edges();
        let positioned = layout.layout(&graph);

        let Some((min_x, max_x)) = positioned.x_range() else {
            debug!(tree_id = %tree_id, "Empty tree skipped");
            map.trees.push(TreeBounds {
                tree_id,
                title,
                min_x: offset,
                max_x: offset,
                node_count: 0,
            });
            continue;
        };
        let shift = offset - min_x;

        for (node, laid_out) in graph.nodes().zip(positioned.nodes) {
            map.nodes.push(MapNode {
                id: namespaced(&tree_id, &laid_out.id),
                tree_id: tree_id.clone(),
                exercise_ref: laid_out.id,
                x: laid_out.x + shift,
                y: laid_out.y,
                rank: laid_out.rank,
                status: rule.status_of(node),
                attachment: laid_out.attachment,
                payload: laid_out.payload,
            });
        }

        for edge in positioned.edges {
            let target_status = graph
                .get_node(&edge.target)
                .map(|n| rule.status_of(n))
                .unwrap_or(NodeStatus::Locked);
            let emphasis = if target_status.is_locked() {
                EdgeEmphasis::Dimmed
            } else {
                EdgeEmphasis::Emphasized
            };
            map.edges.push(MapEdge {
                id: namespaced(&tree_id, &edge.id),
                tree_id: tree_id.clone(),
                source: namespaced(&tree_id, &edge.source),
                target: namespaced(&tree_id, &edge.target),
                kind: edge.kind,
                source_anchor: edge.source_anchor,
                target_anchor: edge.target_anchor,
                animated: !target_status.is_locked(),
                emphasis,
            });
        }

        let width = max_x - min_x;
        debug!(tree_id = %tree_id, width, offset, "Placed tree");
        map.trees.push(TreeBounds {
            tree_id,
            title,
            min_x: offset,
            max_x: offset + width,
            node_count: graph.node_count(),
        });
        offset += width + tree_gap;
    }

    info!(
        node_count = map.nodes.len(),
        edge_count = map.edges.len(),
        "Composition completed"
    );
    map
}
