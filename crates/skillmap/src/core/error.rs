//! Core error types for skill-tree processing
//!
//! The layout engine itself never fails on malformed graphs. These errors
//! belong to the layers around it: loading trees from a store, gated writes,
//! and configuration.

use thiserror::Error;

/// Core error types for skill-tree processing
#[derive(Error, Debug)]
pub enum SkillMapError {
    #[error("Tree not found: {tree_id}")]
    TreeNotFound { tree_id: String },

    #[error("Failed to load tree {tree_id}: {message}")]
    TreeLoad { tree_id: String, message: String },

    #[error("Forbidden: {action} requires tree edit capability")]
    Forbidden { action: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Config error: {message}")]
    Config { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl SkillMapError {
    /// Create a new tree-not-found error
    pub fn tree_not_found(tree_id: impl Into<String>) -> Self {
        Self::TreeNotFound {
            tree_id: tree_id.into(),
        }
    }

    /// Create a new tree load error
    pub fn tree_load(tree_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TreeLoad {
            tree_id: tree_id.into(),
            message: message.into(),
        }
    }

    /// Create a new forbidden error for a write action
    pub fn forbidden(action: impl Into<String>) -> Self {
        Self::Forbidden {
            action: action.into(),
        }
    }

    /// Create a new store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a new config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_not_found() {
        let error = SkillMapError::tree_not_found("push");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Tree not found"));
        assert!(error_msg.contains("push"));
    }

    #[test]
    fn test_tree_load() {
        let error = SkillMapError::tree_load("pull", "exercise record malformed");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Failed to load tree pull"));
        assert!(error_msg.contains("exercise record malformed"));
    }

    #[test]
    fn test_forbidden() {
        let error = SkillMapError::forbidden("delete_tree");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Forbidden"));
        assert!(error_msg.contains("delete_tree"));
    }

    #[test]
    fn test_store_and_config() {
        assert!(SkillMapError::store("backend down")
            .to_string()
            .contains("Store error: backend down"));
        assert!(SkillMapError::config("spacing must be positive")
            .to_string()
            .contains("Config error"));
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: SkillMapError = io_err.into();
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("IO error"));
        assert!(error_msg.contains("File not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: SkillMapError = json_err.into();
        assert!(error.to_string().contains("JSON error"));
    }
}
