//! Derived node status
//!
//! A status rule maps a node to locked, unlocked or mastered. Rules are pure
//! and never look at layout output.

use std::collections::{HashMap, HashSet};

use super::graph::{SkillGraph, SkillNode};
use crate::core::{ConnectionKind, NodeStatus, ProgressRecord, ProgressState};

/// Core trait for status rules
pub trait StatusRule: Send + Sync {
    /// Status of one node
    fn status_of(&self, node: &SkillNode) -> NodeStatus;
}

impl<F> StatusRule for F
where
    F: Fn(&SkillNode) -> NodeStatus + Send + Sync,
{
    fn status_of(&self, node: &SkillNode) -> NodeStatus {
        self(node)
    }
}

/// Highest rank shown as mastered by the heuristic
pub const MASTERED_MAX_RANK: i64 = 2;
/// Highest rank shown as unlocked by the heuristic
pub const UNLOCKED_MAX_RANK: i64 = 4;

/// Status from rank alone, used when no user progress is available
#[derive(Debug, Clone, Copy, Default)]
pub struct DifficultyHeuristic;

impl StatusRule for DifficultyHeuristic {
    fn status_of(&self, node: &SkillNode) -> NodeStatus {
        if node.rank <= MASTERED_MAX_RANK {
            NodeStatus::Mastered
        } else if node.rank <= UNLOCKED_MAX_RANK {
            NodeStatus::Unlocked
        } else {
            NodeStatus::Locked
        }
    }
}

/// Status from one user's progress and the prerequisite edges
///
/// A node is mastered when the user mastered it, unlocked when every
/// required prerequisite is mastered, locked otherwise. Prerequisites are
/// collected across all graphs given, so a skill gated in two trees needs
/// both gates. Nodes never seen during construction are locked.
#[derive(Debug, Clone, Default)]
pub struct ProgressRule {
    statuses: HashMap<String, NodeStatus>,
}

impl ProgressRule {
    pub fn new<'a>(
        graphs: impl IntoIterator<Item = &'a SkillGraph>,
        progress: &[ProgressRecord],
    ) -> Self {
        let mastered: HashSet<&str> = progress
            .iter()
            .filter(|p| p.status == ProgressState::Mastered)
            .map(|p| p.exercise_ref.as_str())
            .collect();

        let mut prerequisites: HashMap<String, Vec<String>> = HashMap::new();
        for graph in graphs {
            for node in graph.nodes() {
                prerequisites.entry(node.id.clone()).or_default();
            }
            for edge in graph.edges() {
                // Edges into unknown or from unknown nodes gate nothing
                if edge.kind != ConnectionKind::Required
                    || edge.source == edge.target
                    || !graph.has_node(&edge.source)
                    || !graph.has_node(&edge.target)
                {
                    continue;
                }
                prerequisites
                    .entry(edge.target.clone())
                    .or_default()
                    .push(edge.source.clone());
            }
        }

        let statuses = prerequisites
            .into_iter()
            .map(|(id, required)| {
                let status = if mastered.contains(id.as_str()) {
                    NodeStatus::Mastered
                } else if required.iter().all(|r| mastered.contains(r.as_str())) {
                    NodeStatus::Unlocked
                } else {
                    NodeStatus::Locked
                };
                (id, status)
            })
            .collect();

        Self { statuses }
    }

    /// Precomputed status by node id
    pub fn get(&self, id: &str) -> Option<NodeStatus> {
        self.statuses.get(id).copied()
    }
}

impl StatusRule for ProgressRule {
    fn status_of(&self, node: &SkillNode) -> NodeStatus {
        self.get(&node.id).unwrap_or(NodeStatus::Locked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExerciseRecord;
    use crate::tree::graph::SkillEdge;

    fn node(id: &str, rank: i64) -> SkillNode {
        SkillNode::new(ExerciseRecord::new(id, id, rank).into())
    }

    #[test]
    fn test_heuristic_thresholds() {
        let rule = DifficultyHeuristic;
        assert_eq!(rule.status_of(&node("a", 1)), NodeStatus::Mastered);
        assert_eq!(rule.status_of(&node("a", 2)), NodeStatus::Mastered);
        assert_eq!(rule.status_of(&node("a", 3)), NodeStatus::Unlocked);
        assert_eq!(rule.status_of(&node("a", 4)), NodeStatus::Unlocked);
        assert_eq!(rule.status_of(&node("a", 5)), NodeStatus::Locked);
        assert_eq!(rule.status_of(&node("a", 12)), NodeStatus::Locked);
    }

    #[test]
    fn test_closure_rule() {
        let rule = |_: &SkillNode| NodeStatus::Unlocked;
        assert_eq!(rule.status_of(&node("a", 9)), NodeStatus::Unlocked);
    }

    #[test]
    fn test_progress_rule() {
        let graph = SkillGraph::from_parts(
            vec![node("pushup", 2), node("dip", 4), node("muscleup", 8), node("pullup", 4)],
            vec![
                SkillEdge::new("pushup", "dip"),
                SkillEdge::new("dip", "muscleup"),
                SkillEdge::new("pullup", "muscleup"),
                SkillEdge::new("ghost", "pullup"),
            ],
        );
        let progress = vec![
            ProgressRecord::new("u1", "pushup", ProgressState::Mastered),
            ProgressRecord::new("u1", "dip", ProgressState::InProgress),
        ];
        let rule = ProgressRule::new([&graph], &progress);

        assert_eq!(rule.status_of(&node("pushup", 2)), NodeStatus::Mastered);
        assert_eq!(rule.status_of(&node("dip", 4)), NodeStatus::Unlocked);
        assert_eq!(rule.status_of(&node("muscleup", 8)), NodeStatus::Locked);
        assert_eq!(rule.status_of(&node("pullup", 4)), NodeStatus::Unlocked);
        assert_eq!(rule.status_of(&node("unknown", 1)), NodeStatus::Locked);
    }

    #[test]
    fn test_optional_prerequisites_do_not_gate() {
        let graph = SkillGraph::from_parts(
            vec![node("a", 1), node("b", 2)],
            vec![SkillEdge::new("a", "b").with_kind(ConnectionKind::Optional)],
        );
        let rule = ProgressRule::new([&graph], &[]);
        assert_eq!(rule.get("a"), Some(NodeStatus::Unlocked));
        assert_eq!(rule.get("b"), Some(NodeStatus::Unlocked));
    }

    #[test]
    fn test_prerequisites_span_trees() {
        let push = SkillGraph::from_parts(
            vec![node("pushup", 2), node("handstand", 6)],
            vec![SkillEdge::new("pushup", "handstand")],
        );
        let core = SkillGraph::from_parts(
            vec![node("plank", 1), node("handstand", 6)],
            vec![SkillEdge::new("plank", "handstand")],
        );
        let progress = vec![ProgressRecord::new("u1", "pushup", ProgressState::Mastered)];
        let rule = ProgressRule::new([&push, &core], &progress);
        assert_eq!(rule.get("handstand"), Some(NodeStatus::Locked));
    }
}
