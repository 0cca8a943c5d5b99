//! Skill graph storage
//!
//! Holds one tree's nodes (ranked exercise payloads) and edges in insertion
//! order. Lookups go through an id index so iteration stays deterministic.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

use super::rank::{clamp_rank, rank_of, rank_span};
use crate::core::{
    lenient_difficulty, AnchorSide, ConnectionKind, DetailRecord, ExerciseRecord, Point,
};

/// A node in a skill tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillNode {
    /// The exercise reference this node stands for
    pub id: String,
    pub rank: i64,
    pub payload: DetailRecord,
    /// Last position saved by the tree editor
    pub saved_position: Point,
}

impl SkillNode {
    /// Create a node from its payload, ranked by difficulty
    pub fn new(payload: DetailRecord) -> Self {
        Self {
            id: payload.id().to_string(),
            rank: rank_of(&payload),
            payload,
            saved_position: Point::default(),
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.saved_position = position;
        self
    }
}

/// Identifier used for an edge between two node references
pub fn edge_id(source: &str, target: &str) -> String {
    format!("e-{}-{}", source, target)
}

/// A directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: ConnectionKind,
    pub source_anchor: AnchorSide,
    pub target_anchor: AnchorSide,
}

impl SkillEdge {
    /// Create a required edge with default anchors
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(&source, &target),
            source,
            target,
            kind: ConnectionKind::Required,
            source_anchor: AnchorSide::Bottom,
            target_anchor: AnchorSide::Top,
        }
    }

    pub fn with_kind(mut self, kind: ConnectionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// One tree's nodes and edges
#[derive(Debug, Clone, Default)]
pub struct SkillGraph {
    /// Nodes in insertion order
    nodes: Vec<SkillNode>,
    /// Node id to position in `nodes`
    index: HashMap<String, usize>,
    /// Edges in insertion order
    edges: Vec<SkillEdge>,
}

impl SkillGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from nodes and edges
    pub fn from_parts(nodes: Vec<SkillNode>, edges: Vec<SkillEdge>) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node);
        }
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    /// Add a node. Returns false and keeps the existing node if the id is
    /// already present.
    pub fn add_node(&mut self, node: SkillNode) -> bool {
        if self.index.contains_key(&node.id) {
            trace!(node_id = %node.id, "Duplicate node ignored");
            return false;
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Add an edge. Endpoints are not checked here.
    pub fn add_edge(&mut self, edge: SkillEdge) {
        self.edges.push(edge);
    }

    pub fn get_node(&self, id: &str) -> Option<&SkillNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Position of a node in insertion order
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SkillNode> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &SkillEdge> {
        self.edges.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edges pointing into a node
    pub fn prerequisites(&self, id: &str) -> Vec<&SkillEdge> {
        self.edges.iter().filter(|e| e.target == id).collect()
    }

    /// Edges with at least one endpoint missing from the graph
    pub fn dangling_edges(&self) -> Vec<&SkillEdge> {
        self.edges
            .iter()
            .filter(|e| !self.has_node(&e.source) || !self.has_node(&e.target))
            .collect()
    }

    /// Drop edges whose endpoints are not both in this graph
    pub fn retain_internal_edges(&mut self) -> usize {
        let before = self.edges.len();
        let index = &self.index;
        self.edges
            .retain(|e| index.contains_key(&e.source) && index.contains_key(&e.target));
        let dropped = before - self.edges.len();
        if dropped > 0 {
            trace!(dropped, "Dropped edges leaving the tree");
        }
        dropped
    }

    /// Lowest and highest rank among nodes, after clamping
    pub fn rank_range(&self) -> Option<(i64, i64)> {
        rank_span(self.nodes.iter().map(|n| clamp_rank(n.rank)))
    }
}

/// Type-agnostic graph input: ids with a rank, and edges between ids
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGraph {
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: String,
    #[serde(
        default,
        alias = "rankAttribute",
        deserialize_with = "lenient_difficulty"
    )]
    pub rank: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEdge {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(alias = "sourceId")]
    pub source: String,
    #[serde(alias = "targetId")]
    pub target: String,
}

impl From<RawGraph> for SkillGraph {
    fn from(raw: RawGraph) -> Self {
        let nodes = raw
            .nodes
            .into_iter()
            .map(|n| {
                let exercise = ExerciseRecord {
                    name: n.id.clone(),
                    id: n.id,
                    difficulty: n.rank,
                    category: None,
                    muscles: Vec::new(),
                };
                SkillNode::new(exercise.into())
            })
            .collect();
        let edges = raw
            .edges
            .into_iter()
            .map(|e| {
                let edge = SkillEdge::new(e.source, e.target);
                match e.id {
                    Some(id) => edge.with_id(id),
                    None => edge,
                }
            })
            .collect();
        SkillGraph::from_parts(nodes, edges)
    }
}
