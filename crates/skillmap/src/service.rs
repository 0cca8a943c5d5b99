//! Read flows over a tree store
//!
//! Ties the store to the layout engine: the editor view of one tree (saved
//! coordinates), the computed layout of one tree, and the aggregate skill
//! map of all published trees.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::core::{
    DetailRecord, LayoutAlgorithm, Point, ProgressRecord, SkillMapError, TreeRecord, TreeStatus,
    TreeStore,
};
use crate::tree::{
    attach_progress, build_graph, compose_all, DifficultyHeuristic, GraphDiagnostics,
    LayoutConfig, PositionedGraph, ProgressRule, RankedLayout, SkillEdge, SkillGraph, SkillMap,
    StatusRule, TreeGraph,
};

/// A node as the tree editor shows it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewNode {
    pub id: String,
    pub position: Point,
    pub rank: i64,
    pub payload: DetailRecord,
}

/// One tree with its saved placements
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeView {
    pub tree_id: String,
    pub title: String,
    pub status: TreeStatus,
    pub nodes: Vec<ViewNode>,
    pub edges: Vec<SkillEdge>,
    /// Placements dropped for lack of an exercise
    pub dropped: usize,
}

/// Skill-tree reads for one store
pub struct SkillMapService<S: TreeStore> {
    store: S,
    config: LayoutConfig,
}

impl<S: TreeStore> SkillMapService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: LayoutConfig::default(),
        }
    }

    /// Create a service with a custom layout config
    ///
    /// Fails with a config error when spacing, row spacing or tree gap is
    /// out of range.
    pub fn with_config(store: S, config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn require_tree(&self, tree_id: &str) -> Result<TreeRecord> {
        Ok(self
            .store
            .get_tree(tree_id)
            .map_err(|e| SkillMapError::tree_load(tree_id, e.to_string()))?
            .ok_or_else(|| SkillMapError::tree_not_found(tree_id))?)
    }

    fn load_graph(&self, tree: &TreeRecord, progress: &[ProgressRecord]) -> Result<SkillGraph> {
        let exercises = self
            .store
            .exercise_details(&tree.exercise_refs())
            .map_err(|e| SkillMapError::tree_load(&tree.id, e.to_string()))?;
        let details = attach_progress(exercises, progress);
        Ok(build_graph(tree, &details))
    }

    /// One tree as saved, for the editor canvas
    pub fn tree_view(&self, tree_id: &str) -> Result<TreeView> {
        let tree = self.require_tree(tree_id)?;
        let graph = self.load_graph(&tree, &[])?;
        let nodes: Vec<ViewNode> = graph
            .nodes()
            .map(|n| ViewNode {
                id: n.id.clone(),
                position: n.saved_position,
                rank: n.rank,
                payload: n.payload.clone(),
            })
            .collect();
        Ok(TreeView {
            dropped: tree.nodes.len() - nodes.len(),
            tree_id: tree.id,
            title: tree.title,
            status: tree.status,
            nodes,
            edges: graph.edges().cloned().collect(),
        })
    }

    /// One tree laid out from scratch
    pub fn tree_layout(&self, tree_id: &str) -> Result<PositionedGraph> {
        let tree = self.require_tree(tree_id)?;
        let graph = self.load_graph(&tree, &[])?;
        Ok(RankedLayout::with_config(self.config).layout(&graph))
    }

    /// Every published tree composed into one map
    ///
    /// With a user, statuses come from that user's progress and the
    /// prerequisite edges; without one, from difficulty alone.
    pub fn skill_map(&self, user_id: Option<&str>) -> Result<SkillMap> {
        let progress = match user_id {
            Some(user) => self.store.user_progress(user)?,
            None => Vec::new(),
        };

        let trees = self.store.published_trees()?;
        let mut graphs = Vec::with_capacity(trees.len());
        for tree in trees {
            let graph = self.load_graph(&tree, &progress)?;
            graphs.push(TreeGraph::new(tree.id, tree.title, graph));
        }
        debug!(tree_count = graphs.len(), user = ?user_id, "Loaded published trees");

        let rule: Box<dyn StatusRule> = match user_id {
            Some(_) => Box::new(ProgressRule::new(graphs.iter().map(|t| &t.graph), &progress)),
            None => Box::new(DifficultyHeuristic),
        };
        let map = compose_all(graphs, rule.as_ref(), &self.config);
        info!(node_count = map.nodes.len(), tree_count = map.trees.len(), "Skill map built");
        Ok(map)
    }

    /// Dropped placements and dangling connections for every tree
    pub fn diagnostics(&self) -> Result<Vec<GraphDiagnostics>> {
        self.store
            .list_trees()?
            .iter()
            .map(|tree| -> Result<GraphDiagnostics> {
                let details: Vec<DetailRecord> = self
                    .store
                    .exercise_details(&tree.exercise_refs())
                    .map_err(|e| SkillMapError::tree_load(&tree.id, e.to_string()))?
                    .into_iter()
                    .map(Into::into)
                    .collect();
                Ok(GraphDiagnostics::inspect(tree, &details))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        ConnectionRecord, ExerciseRecord, NewTree, NodeStatus, Placement, ProgressState,
    };
    use crate::store::MemoryStore;

    fn store() -> MemoryStore {
        let mut push = TreeRecord::new("push", "Push");
        push.status = TreeStatus::Published;
        push.nodes = vec![
            Placement::new("pushup", 0.0, 320.0),
            Placement::new("dip", 0.0, 0.0),
            Placement::new("retired", 0.0, 0.0),
        ];
        push.connections = vec![ConnectionRecord::new("pushup", "dip")];

        let mut draft = TreeRecord::new("draft", "Draft");
        draft.nodes = vec![Placement::new("pushup", 0.0, 0.0)];

        MemoryStore::new()
            .with_exercise(ExerciseRecord::new("pushup", "Push-up", 2))
            .with_exercise(ExerciseRecord::new("dip", "Dip", 5))
            .with_tree(push)
            .with_tree(draft)
            .with_progress(ProgressRecord::new("u1", "pushup", ProgressState::Mastered))
    }

    #[test]
    fn test_tree_view_keeps_saved_positions() {
        let service = SkillMapService::new(store());
        let view = service.tree_view("push").unwrap();
        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.dropped, 1);
        assert_eq!(view.nodes[0].position, Point::new(0.0, 320.0));
        assert_eq!(view.edges.len(), 1);
    }

    #[test]
    fn test_unknown_tree() {
        let service = SkillMapService::new(store());
        let err = service.tree_layout("nope").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SkillMapError>(),
            Some(SkillMapError::TreeNotFound { .. })
        ));
    }

    #[test]
    fn test_tree_layout_is_computed() {
        let service = SkillMapService::new(store());
        let layout = service.tree_layout("push").unwrap();
        assert_eq!(layout.get("dip").unwrap().y, 0.0);
        assert_eq!(layout.get("pushup").unwrap().y, 480.0);
    }

    #[test]
    fn test_skill_map_only_published() {
        let service = SkillMapService::new(store());
        let map = service.skill_map(None).unwrap();
        assert_eq!(map.trees.len(), 1);
        assert!(map.nodes.iter().all(|n| n.tree_id == "push"));
        assert_eq!(map.get("push__dip").unwrap().status, NodeStatus::Locked);
    }

    #[test]
    fn test_skill_map_with_progress() {
        let service = SkillMapService::new(store());
        let map = service.skill_map(Some("u1")).unwrap();
        assert_eq!(map.get("push__pushup").unwrap().status, NodeStatus::Mastered);
        assert_eq!(map.get("push__dip").unwrap().status, NodeStatus::Unlocked);
        assert_eq!(map.get("push__pushup").unwrap().payload.progress(), Some(ProgressState::Mastered));
        assert!(map.edges[0].animated);
    }

    #[test]
    fn test_diagnostics() {
        let service = SkillMapService::new(store());
        let diagnostics = service.diagnostics().unwrap();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].missing_exercises, vec!["retired".to_string()]);
        assert!(diagnostics[1].is_clean());
    }

    #[test]
    fn test_with_config_rejects_invalid_spacing() {
        let bad = LayoutConfig {
            spacing: f64::NAN,
            ..Default::default()
        };
        let err = SkillMapService::with_config(store(), bad).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<SkillMapError>(),
            Some(SkillMapError::Config { .. })
        ));

        let wide = LayoutConfig {
            spacing: 300.0,
            ..Default::default()
        };
        let service = SkillMapService::with_config(store(), wide).unwrap();
        assert_eq!(service.config().spacing, 300.0);
    }

    #[test]
    fn test_store_access() {
        let mut service = SkillMapService::new(store());
        service
            .store_mut()
            .create_tree(NewTree {
                title: "Legs".to_string(),
                description: None,
            })
            .unwrap();
        assert_eq!(service.store().list_trees().unwrap().len(), 3);
    }
}
