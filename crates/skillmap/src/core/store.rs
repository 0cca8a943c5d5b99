//! Core store trait for persisted skill-tree data
//!
//! This trait is the interface the engine needs from the backing store.
//! The store itself (indexing, consistency, transactions) lives elsewhere;
//! the crate ships an in-memory implementation for the CLI and tests.

use anyhow::Result;

use super::{ConnectionRecord, ExerciseRecord, NewTree, Placement, ProgressRecord, TreeRecord};

/// Core trait for skill-tree stores
///
/// Reads are used by the layout flows. Writes are admin operations and are
/// reached through [`crate::store::TreeEditor`], which checks capability
/// before delegating here.
pub trait TreeStore: Send + Sync {
    /// Fetch one tree by ID
    fn get_tree(&self, id: &str) -> Result<Option<TreeRecord>>;

    /// Fetch every tree, drafts included, in a stable order
    fn list_trees(&self) -> Result<Vec<TreeRecord>>;

    /// Fetch exercise records for the given references
    ///
    /// Unknown references are skipped rather than reported.
    fn exercise_details(&self, refs: &[String]) -> Result<Vec<ExerciseRecord>>;

    /// Fetch the whole exercise catalog
    fn all_exercises(&self) -> Result<Vec<ExerciseRecord>>;

    /// Fetch one user's progress records
    fn user_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>>;

    /// Create an empty draft tree, returning its ID
    fn create_tree(&mut self, tree: NewTree) -> Result<String>;

    /// Replace a tree's placements and connections
    fn update_tree(
        &mut self,
        id: &str,
        nodes: Vec<Placement>,
        connections: Vec<ConnectionRecord>,
    ) -> Result<()>;

    /// Mark a tree as published
    fn publish_tree(&mut self, id: &str) -> Result<()>;

    /// Remove a tree
    fn delete_tree(&mut self, id: &str) -> Result<()>;

    /// Fetch only published trees
    fn published_trees(&self) -> Result<Vec<TreeRecord>> {
        Ok(self
            .list_trees()?
            .into_iter()
            .filter(|t| t.is_published())
            .collect())
    }
}
