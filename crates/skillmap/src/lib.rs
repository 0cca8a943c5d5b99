//! Skillmap - Layout and status engine for skill progression trees
//!
//! Turns exercise progression trees (placements plus prerequisite
//! connections) into positioned graphs: nodes are ranked by difficulty,
//! long edges are routed through dummy nodes, and rows are ordered with
//! iterative barycenter sweeps. Several trees can be packed side by side
//! into one skill map with a derived locked/unlocked/mastered status per
//! node.
//!
//! # Quick Start
//!
//! ```rust
//! use skillmap::{layout_json, Direction};
//!
//! let input = r#"{
//!     "nodes": [{"id": "pushup", "rank": 2}, {"id": "dip", "rank": 4}],
//!     "edges": [{"source": "pushup", "target": "dip"}]
//! }"#;
//! let positioned = layout_json(input, Direction::BottomToTop).unwrap();
//! assert_eq!(positioned.nodes.len(), 2);
//! assert!(positioned.get("dip").unwrap().y < positioned.get("pushup").unwrap().y);
//! ```
//!
//! # Store-backed usage
//!
//! ```rust
//! use skillmap::prelude::*;
//!
//! let mut tree = TreeRecord::new("push", "Push");
//! tree.status = TreeStatus::Published;
//! tree.nodes = vec![Placement::new("pushup", 0.0, 0.0), Placement::new("dip", 0.0, 0.0)];
//! tree.connections = vec![ConnectionRecord::new("pushup", "dip")];
//!
//! let store = MemoryStore::new()
//!     .with_exercise(ExerciseRecord::new("pushup", "Push-up", 2))
//!     .with_exercise(ExerciseRecord::new("dip", "Dip", 4))
//!     .with_tree(tree);
//!
//! let service = SkillMapService::new(store);
//! let map = service.skill_map(None).unwrap();
//! assert_eq!(map.get("push__dip").unwrap().status, NodeStatus::Unlocked);
//! ```

pub mod core;
pub mod service;
pub mod store;
pub mod tree;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        ConnectionKind, ConnectionRecord, DetailRecord, Direction, ExerciseRecord,
        LayoutAlgorithm, NodeStatus, Placement, ProgressRecord, ProgressState, SkillMapError,
        TreeRecord, TreeStatus, TreeStore,
    };
    pub use crate::service::SkillMapService;
    pub use crate::store::{MemoryStore, TreeEditor};
    pub use crate::tree::{
        compose_all, DifficultyHeuristic, LayoutConfig, PositionedGraph, ProgressRule,
        RankedLayout, RawGraph, SkillEdge, SkillGraph, SkillMap, SkillNode, StatusRule,
        TreeGraph,
    };
}

/// Lay out one graph with default spacing
///
/// # Example
/// ```rust
/// use skillmap::{layout, Direction};
/// use skillmap::tree::SkillGraph;
///
/// let positioned = layout(&SkillGraph::new(), Direction::TopToBottom);
/// assert!(positioned.nodes.is_empty());
/// ```
pub fn layout(graph: &tree::SkillGraph, direction: Direction) -> tree::PositionedGraph {
    let config = tree::LayoutConfig::default().with_direction(direction);
    tree::RankedLayout::with_config(config).layout(graph)
}

/// Parse a raw graph from JSON and lay it out
///
/// The input is `{nodes: [{id, rank}], edges: [{id?, source, target}]}`.
/// Non-numeric ranks fall back to rank 1.
pub fn layout_json(input: &str, direction: Direction) -> anyhow::Result<tree::PositionedGraph> {
    let raw: tree::RawGraph = serde_json::from_str(input).map_err(SkillMapError::from)?;
    Ok(layout(&raw.into(), direction))
}

/// Build the skill map of a JSON store document
///
/// With `user_id`, statuses follow that user's progress; otherwise the
/// difficulty heuristic is used.
pub fn skill_map_json(store: &str, user_id: Option<&str>) -> anyhow::Result<tree::SkillMap> {
    let store = store::MemoryStore::from_json(store)?;
    service::SkillMapService::new(store).skill_map(user_id)
}
