//! Admin-gated tree editing
//!
//! Every write checks the caller's edit capability before reaching the
//! store. How that capability is resolved (sessions, roles) is up to the
//! caller; the editor only sees a boolean.

use anyhow::Result;
use std::collections::HashMap;
use tracing::info;

use crate::core::{
    ConnectionRecord, DetailRecord, LayoutAlgorithm, NewTree, Placement, SkillMapError,
    TreeStore,
};
use crate::tree::{build_graph, LayoutConfig, PositionedGraph, RankedLayout};

/// Write access to a store for one caller
pub struct TreeEditor<'a, S: TreeStore> {
    store: &'a mut S,
    can_edit: bool,
}

impl<'a, S: TreeStore> TreeEditor<'a, S> {
    pub fn new(store: &'a mut S, can_edit: bool) -> Self {
        Self { store, can_edit }
    }

    pub fn can_edit(&self) -> bool {
        self.can_edit
    }

    fn check(&self, action: &str) -> Result<()> {
        if self.can_edit {
            Ok(())
        } else {
            Err(SkillMapError::forbidden(action).into())
        }
    }

    pub fn create_tree(&mut self, tree: NewTree) -> Result<String> {
        self.check("create_tree")?;
        let id = self.store.create_tree(tree)?;
        info!(tree_id = %id, "Tree created");
        Ok(id)
    }

    pub fn update_tree(
        &mut self,
        id: &str,
        nodes: Vec<Placement>,
        connections: Vec<ConnectionRecord>,
    ) -> Result<()> {
        self.check("update_tree")?;
        self.store.update_tree(id, nodes, connections)?;
        info!(tree_id = %id, "Tree updated");
        Ok(())
    }

    pub fn publish_tree(&mut self, id: &str) -> Result<()> {
        self.check("publish_tree")?;
        self.store.publish_tree(id)?;
        info!(tree_id = %id, "Tree published");
        Ok(())
    }

    pub fn delete_tree(&mut self, id: &str) -> Result<()> {
        self.check("delete_tree")?;
        self.store.delete_tree(id)?;
        info!(tree_id = %id, "Tree deleted");
        Ok(())
    }

    /// Replace a tree's saved placements with a computed layout
    ///
    /// Placements whose exercise no longer exists keep their saved
    /// coordinates. Connections are written back unchanged.
    pub fn auto_arrange(&mut self, id: &str, config: &LayoutConfig) -> Result<PositionedGraph> {
        self.check("auto_arrange")?;
        let tree = self
            .store
            .get_tree(id)?
            .ok_or_else(|| SkillMapError::tree_not_found(id))?;
        let details: Vec<DetailRecord> = self
            .store
            .exercise_details(&tree.exercise_refs())
            .map_err(|e| SkillMapError::tree_load(id, e.to_string()))?
            .into_iter()
            .map(Into::into)
            .collect();

        let positioned = RankedLayout::with_config(*config).layout(&build_graph(&tree, &details));
        let computed: HashMap<&str, (f64, f64)> = positioned
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), (n.x, n.y)))
            .collect();

        let placements = tree
            .nodes
            .iter()
            .map(|p| match computed.get(p.exercise_ref.as_str()) {
                Some(&(x, y)) => Placement::new(p.exercise_ref.clone(), x, y),
                None => p.clone(),
            })
            .collect();
        self.store.update_tree(id, placements, tree.connections)?;
        info!(tree_id = %id, node_count = positioned.nodes.len(), "Tree auto-arranged");
        Ok(positioned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ExerciseRecord, TreeRecord};
    use crate::store::MemoryStore;

    fn store() -> MemoryStore {
        let mut tree = TreeRecord::new("push", "Push");
        tree.nodes = vec![
            Placement::new("pushup", 11.0, 22.0),
            Placement::new("dip", 33.0, 44.0),
            Placement::new("retired", 55.0, 66.0),
        ];
        tree.connections = vec![ConnectionRecord::new("pushup", "dip")];
        MemoryStore::new()
            .with_exercise(ExerciseRecord::new("pushup", "Push-up", 2))
            .with_exercise(ExerciseRecord::new("dip", "Dip", 4))
            .with_tree(tree)
    }

    fn is_forbidden(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<SkillMapError>(),
            Some(SkillMapError::Forbidden { .. })
        )
    }

    #[test]
    fn test_writes_without_capability_are_rejected() {
        let mut store = store();
        let mut editor = TreeEditor::new(&mut store, false);
        assert!(!editor.can_edit());

        let err = editor
            .create_tree(NewTree {
                title: "Pull".to_string(),
                description: None,
            })
            .unwrap_err();
        assert!(is_forbidden(&err));
        assert!(is_forbidden(&editor.publish_tree("push").unwrap_err()));
        assert!(is_forbidden(&editor.delete_tree("push").unwrap_err()));
        assert!(is_forbidden(
            &editor.update_tree("push", Vec::new(), Vec::new()).unwrap_err()
        ));
        assert!(is_forbidden(
            &editor.auto_arrange("push", &LayoutConfig::default()).unwrap_err()
        ));

        assert_eq!(store.list_trees().unwrap().len(), 1);
        assert!(!store.get_tree("push").unwrap().unwrap().is_published());
    }

    #[test]
    fn test_writes_with_capability() {
        let mut store = store();
        let mut editor = TreeEditor::new(&mut store, true);
        let id = editor
            .create_tree(NewTree {
                title: "Pull".to_string(),
                description: Some("Rows and pull-ups".to_string()),
            })
            .unwrap();
        editor.publish_tree(&id).unwrap();
        editor.delete_tree("push").unwrap();

        let trees = store.list_trees().unwrap();
        assert_eq!(trees.len(), 1);
        assert!(trees[0].is_published());
        assert_eq!(trees[0].description.as_deref(), Some("Rows and pull-ups"));
    }

    #[test]
    fn test_auto_arrange_persists_computed_positions() {
        let mut store = store();
        let positioned = TreeEditor::new(&mut store, true)
            .auto_arrange("push", &LayoutConfig::default())
            .unwrap();
        assert_eq!(positioned.nodes.len(), 2);

        let tree = store.get_tree("push").unwrap().unwrap();
        let dip = positioned.get("dip").unwrap();
        assert_eq!(tree.nodes[1], Placement::new("dip", dip.x, dip.y));
        assert_eq!(tree.nodes[2], Placement::new("retired", 55.0, 66.0));
        assert_eq!(tree.connections, vec![ConnectionRecord::new("pushup", "dip")]);
    }

    #[test]
    fn test_auto_arrange_unknown_tree() {
        let mut store = store();
        let err = TreeEditor::new(&mut store, true)
            .auto_arrange("nope", &LayoutConfig::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SkillMapError>(),
            Some(SkillMapError::TreeNotFound { .. })
        ));
    }
}
