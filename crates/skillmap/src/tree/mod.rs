//! Skill-tree layout engine
//!
//! Records go through the adapter into a [`SkillGraph`], get ranked by
//! difficulty, expanded with dummy nodes, and positioned row by row.
//! [`compose_all`] packs several trees into one [`SkillMap`].

pub mod adapter;
pub mod compose;
pub mod expand;
pub mod graph;
pub mod position;
pub mod rank;
pub mod status;

pub use adapter::{
    attach_progress, build_edges, build_graph, build_nodes, to_connections, GraphDiagnostics,
};
pub use compose::{compose_all, namespaced, EdgeEmphasis, MapEdge, MapNode, SkillMap, TreeBounds, TreeGraph};
pub use expand::{expand, Expansion, LayoutNode};
pub use graph::{edge_id, RawEdge, RawGraph, RawNode, SkillEdge, SkillGraph, SkillNode};
pub use position::{LayoutConfig, PositionedGraph, PositionedNode, RankedLayout};
pub use rank::{clamp_rank, rank_of, DEFAULT_RANK, MAX_RANK, MIN_RANK};
pub use status::{DifficultyHeuristic, ProgressRule, StatusRule};
