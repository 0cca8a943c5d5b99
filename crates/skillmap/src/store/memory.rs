//! In-memory store backed by a JSON document

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, trace};

use crate::core::{
    ConnectionRecord, ExerciseRecord, NewTree, Placement, ProgressRecord, SkillMapError,
    TreeRecord, TreeStatus, TreeStore,
};

/// Serialized form of a [`MemoryStore`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreDocument {
    pub exercises: Vec<ExerciseRecord>,
    pub trees: Vec<TreeRecord>,
    pub progress: Vec<ProgressRecord>,
}

/// A store holding everything in memory
///
/// Trees keep insertion order. Created trees get `tree_<n>` ids.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: StoreDocument,
    next_id: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: StoreDocument) -> Self {
        Self {
            document,
            next_id: 0,
        }
    }

    /// Parse a store from its JSON document
    pub fn from_json(input: &str) -> Result<Self> {
        let document: StoreDocument =
            serde_json::from_str(input).map_err(SkillMapError::from)?;
        debug!(
            exercise_count = document.exercises.len(),
            tree_count = document.trees.len(),
            progress_count = document.progress.len(),
            "Loaded store document"
        );
        Ok(Self::from_document(document))
    }

    /// Read a store from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(SkillMapError::from)
            .with_context(|| format!("Failed to read store: {}", path.display()))?;
        Self::from_json(&input).with_context(|| format!("Invalid store: {}", path.display()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.document).map_err(SkillMapError::from)?)
    }

    pub fn document(&self) -> &StoreDocument {
        &self.document
    }

    pub fn with_exercise(mut self, exercise: ExerciseRecord) -> Self {
        self.document.exercises.push(exercise);
        self
    }

    pub fn with_tree(mut self, tree: TreeRecord) -> Self {
        self.document.trees.push(tree);
        self
    }

    pub fn with_progress(mut self, progress: ProgressRecord) -> Self {
        self.document.progress.push(progress);
        self
    }

    fn tree_mut(&mut self, id: &str) -> Result<&mut TreeRecord> {
        self.document
            .trees
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| SkillMapError::tree_not_found(id).into())
    }

    fn fresh_id(&mut self) -> String {
        self.next_id = self.next_id.max(self.document.trees.len() + 1);
        loop {
            let id = format!("tree_{}", self.next_id);
            self.next_id += 1;
            if !self.document.trees.iter().any(|t| t.id == id) {
                return id;
            }
        }
    }
}

impl TreeStore for MemoryStore {
    fn get_tree(&self, id: &str) -> Result<Option<TreeRecord>> {
        Ok(self.document.trees.iter().find(|t| t.id == id).cloned())
    }

    fn list_trees(&self) -> Result<Vec<TreeRecord>> {
        Ok(self.document.trees.clone())
    }

    fn exercise_details(&self, refs: &[String]) -> Result<Vec<ExerciseRecord>> {
        Ok(self
            .document
            .exercises
            .iter()
            .filter(|e| refs.contains(&e.id))
            .cloned()
            .collect())
    }

    fn all_exercises(&self) -> Result<Vec<ExerciseRecord>> {
        Ok(self.document.exercises.clone())
    }

    fn user_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>> {
        Ok(self
            .document
            .progress
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    fn create_tree(&mut self, tree: NewTree) -> Result<String> {
        let id = self.fresh_id();
        let mut record = TreeRecord::new(id.clone(), tree.title);
        record.description = tree.description;
        self.document.trees.push(record);
        trace!(tree_id = %id, "Created tree");
        Ok(id)
    }

    fn update_tree(
        &mut self,
        id: &str,
        nodes: Vec<Placement>,
        connections: Vec<ConnectionRecord>,
    ) -> Result<()> {
        let tree = self.tree_mut(id)?;
        tree.nodes = nodes;
        tree.connections = connections;
        trace!(tree_id = %id, "Updated tree");
        Ok(())
    }

    fn publish_tree(&mut self, id: &str) -> Result<()> {
        self.tree_mut(id)?.status = TreeStatus::Published;
        trace!(tree_id = %id, "Published tree");
        Ok(())
    }

    fn delete_tree(&mut self, id: &str) -> Result<()> {
        let before = self.document.trees.len();
        self.document.trees.retain(|t| t.id != id);
        if self.document.trees.len() == before {
            return Err(SkillMapError::tree_not_found(id).into());
        }
        trace!(tree_id = %id, "Deleted tree");
        Ok(())
    }
}
