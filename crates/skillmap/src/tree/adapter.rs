//! Tree data adapter
//!
//! Converts persisted tree records into a [`SkillGraph`] and back. Records
//! that point at exercises missing from the catalog are dropped, never
//! reported as errors.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

use super::graph::{SkillEdge, SkillGraph, SkillNode};
use crate::core::{
    ConnectionRecord, DetailRecord, ExerciseRecord, Placement, Point, ProgressRecord, TreeRecord,
};

/// Index detail records by exercise reference
pub fn detail_lookup(details: &[DetailRecord]) -> HashMap<&str, &DetailRecord> {
    details.iter().map(|d| (d.id(), d)).collect()
}

/// Turn placements into nodes, skipping references with no detail record
///
/// A reference placed twice keeps its first placement.
pub fn build_nodes(placements: &[Placement], details: &[DetailRecord]) -> Vec<SkillNode> {
    let lookup = detail_lookup(details);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut nodes = Vec::with_capacity(placements.len());

    for placement in placements {
        let Some(&detail) = lookup.get(placement.exercise_ref.as_str()) else {
            trace!(exercise_ref = %placement.exercise_ref, "Placement without exercise dropped");
            continue;
        };
        if !seen.insert(placement.exercise_ref.as_str()) {
            trace!(exercise_ref = %placement.exercise_ref, "Repeated placement dropped");
            continue;
        }
        nodes.push(
            SkillNode::new(detail.clone()).with_position(Point::new(placement.x, placement.y)),
        );
    }
    nodes
}

/// Map persisted connections 1:1 onto edges
pub fn build_edges(connections: &[ConnectionRecord]) -> Vec<SkillEdge> {
    connections
        .iter()
        .map(|c| SkillEdge {
            source_anchor: c.source_anchor,
            target_anchor: c.target_anchor,
            kind: c.kind,
            ..SkillEdge::new(c.from_ref.clone(), c.to_ref.clone())
        })
        .collect()
}

/// Map edges back onto drawable, persistable connections
pub fn to_connections<'a>(edges: impl IntoIterator<Item = &'a SkillEdge>) -> Vec<ConnectionRecord> {
    edges
        .into_iter()
        .map(|e| ConnectionRecord {
            from_ref: e.source.clone(),
            to_ref: e.target.clone(),
            kind: e.kind,
            source_anchor: e.source_anchor,
            target_anchor: e.target_anchor,
        })
        .collect()
}

/// Join exercise records with one user's progress
pub fn attach_progress(
    exercises: Vec<ExerciseRecord>,
    progress: &[ProgressRecord],
) -> Vec<DetailRecord> {
    let by_ref: HashMap<&str, &ProgressRecord> = progress
        .iter()
        .map(|p| (p.exercise_ref.as_str(), p))
        .collect();

    exercises
        .into_iter()
        .map(|exercise| match by_ref.get(exercise.id.as_str()) {
            Some(record) => DetailRecord::WithProgress {
                progress: record.status,
                exercise,
            },
            None => DetailRecord::Exercise(exercise),
        })
        .collect()
}

/// Build the graph for one persisted tree
pub fn build_graph(tree: &TreeRecord, details: &[DetailRecord]) -> SkillGraph {
    let graph = SkillGraph::from_parts(
        build_nodes(&tree.nodes, details),
        build_edges(&tree.connections),
    );
    debug!(
        tree_id = %tree.id,
        node_count = graph.node_count(),
        edge_count = graph.edge_count(),
        dropped_placements = tree.nodes.len().saturating_sub(graph.node_count()),
        "Built tree graph"
    );
    graph
}

/// Records of a tree that the adapter could not use
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDiagnostics {
    pub tree_id: String,
    /// Placements whose exercise does not exist
    pub missing_exercises: Vec<String>,
    /// Placements repeating an already placed exercise
    pub duplicate_placements: Vec<String>,
    /// Connections with an endpoint outside the tree
    pub dangling_connections: Vec<ConnectionRecord>,
}

impl GraphDiagnostics {
    /// Inspect a tree against the detail records it will be built from
    pub fn inspect(tree: &TreeRecord, details: &[DetailRecord]) -> Self {
        let lookup = detail_lookup(details);
        let mut placed: HashSet<&str> = HashSet::new();
        let mut diagnostics = GraphDiagnostics {
            tree_id: tree.id.clone(),
            ..Default::default()
        };

        for placement in &tree.nodes {
            let exercise_ref = placement.exercise_ref.as_str();
            if !lookup.contains_key(exercise_ref) {
                diagnostics.missing_exercises.push(exercise_ref.to_string());
            } else if !placed.insert(exercise_ref) {
                diagnostics.duplicate_placements.push(exercise_ref.to_string());
            }
        }

        diagnostics.dangling_connections = tree
            .connections
            .iter()
            .filter(|c| {
                !placed.contains(c.from_ref.as_str()) || !placed.contains(c.to_ref.as_str())
            })
            .cloned()
            .collect();

        diagnostics
    }

    pub fn is_clean(&self) -> bool {
        self.missing_exercises.is_empty()
            && self.duplicate_placements.is_empty()
            && self.dangling_connections.is_empty()
    }
}
