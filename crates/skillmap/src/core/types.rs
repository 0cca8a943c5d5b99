//! Core type definitions for skill-tree processing
//!
//! Layout direction, anchor sides, connection kinds and the status enums
//! shared by the engine, the store and the renderers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vertical flow direction of a tree layout
///
/// Direction only decides how ranks map to screen y and which sides edges
/// attach to. Horizontal positions are identical for both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Rank 1 at the top, harder skills further down
    TopToBottom,
    /// Rank 1 at the bottom, harder skills further up (skill map default)
    #[default]
    BottomToTop,
}

impl Direction {
    /// Returns true if higher ranks are drawn higher on screen
    pub fn is_reversed(&self) -> bool {
        matches!(self, Direction::BottomToTop)
    }

    /// Handle sides an edge attaches to for this direction
    pub fn attachment(&self) -> AttachmentSides {
        match self {
            Direction::TopToBottom => AttachmentSides {
                source: AnchorSide::Bottom,
                target: AnchorSide::Top,
            },
            Direction::BottomToTop => AttachmentSides {
                source: AnchorSide::Top,
                target: AnchorSide::Bottom,
            },
        }
    }

    /// Get all valid direction names
    pub fn variants() -> &'static [&'static str] {
        &["top-to-bottom", "bottom-to-top"]
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top-to-bottom" | "tb" | "td" => Ok(Direction::TopToBottom),
            "bottom-to-top" | "bt" => Ok(Direction::BottomToTop),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::TopToBottom => write!(f, "top-to-bottom"),
            Direction::BottomToTop => write!(f, "bottom-to-top"),
        }
    }
}

/// Compass side of a node an edge attaches to
///
/// Used for rendering only; the layout math never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorSide {
    Top,
    Right,
    #[default]
    Bottom,
    Left,
}

impl fmt::Display for AnchorSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorSide::Top => write!(f, "top"),
            AnchorSide::Right => write!(f, "right"),
            AnchorSide::Bottom => write!(f, "bottom"),
            AnchorSide::Left => write!(f, "left"),
        }
    }
}

/// Source and target handle sides for a laid out node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentSides {
    pub source: AnchorSide,
    pub target: AnchorSide,
}

/// How strongly one skill depends on another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    /// Must be mastered before the target unlocks
    #[default]
    Required,
    /// Helpful but not gating
    Optional,
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionKind::Required => write!(f, "required"),
            ConnectionKind::Optional => write!(f, "optional"),
        }
    }
}

/// Derived per-node status used by rendering and edge styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Locked,
    Unlocked,
    Mastered,
}

impl NodeStatus {
    pub fn is_locked(&self) -> bool {
        matches!(self, NodeStatus::Locked)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Locked => write!(f, "locked"),
            NodeStatus::Unlocked => write!(f, "unlocked"),
            NodeStatus::Mastered => write!(f, "mastered"),
        }
    }
}

/// Publication state of a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeStatus {
    #[default]
    Draft,
    Published,
}

impl fmt::Display for TreeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeStatus::Draft => write!(f, "draft"),
            TreeStatus::Published => write!(f, "published"),
        }
    }
}

/// A user's recorded progress on one exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    #[default]
    NotStarted,
    InProgress,
    Mastered,
}

/// A 2D point in layout units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing() {
        assert_eq!("top-to-bottom".parse::<Direction>().unwrap(), Direction::TopToBottom);
        assert_eq!("TB".parse::<Direction>().unwrap(), Direction::TopToBottom);
        assert_eq!("td".parse::<Direction>().unwrap(), Direction::TopToBottom);
        assert_eq!("bottom-to-top".parse::<Direction>().unwrap(), Direction::BottomToTop);
        assert_eq!("BT".parse::<Direction>().unwrap(), Direction::BottomToTop);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_direction_default_and_display() {
        assert_eq!(Direction::default(), Direction::BottomToTop);
        assert_eq!(Direction::TopToBottom.to_string(), "top-to-bottom");
        assert_eq!(Direction::BottomToTop.to_string(), "bottom-to-top");
        assert!(Direction::BottomToTop.is_reversed());
        assert!(!Direction::TopToBottom.is_reversed());
    }

    #[test]
    fn test_attachment_sides_follow_direction() {
        let td = Direction::TopToBottom.attachment();
        assert_eq!(td.source, AnchorSide::Bottom);
        assert_eq!(td.target, AnchorSide::Top);

        let bt = Direction::BottomToTop.attachment();
        assert_eq!(bt.source, AnchorSide::Top);
        assert_eq!(bt.target, AnchorSide::Bottom);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&Direction::BottomToTop).unwrap(),
            "\"bottom-to-top\""
        );
        assert_eq!(serde_json::to_string(&AnchorSide::Left).unwrap(), "\"left\"");
        assert_eq!(
            serde_json::to_string(&ProgressState::InProgress).unwrap(),
            "\"in_progress\""
        );
        let kind: ConnectionKind = serde_json::from_str("\"optional\"").unwrap();
        assert_eq!(kind, ConnectionKind::Optional);
    }

    #[test]
    fn test_node_status() {
        assert!(NodeStatus::Locked.is_locked());
        assert!(!NodeStatus::Mastered.is_locked());
        assert_eq!(NodeStatus::Unlocked.to_string(), "unlocked");
    }

    #[test]
    fn test_display_impls() {
        assert_eq!(AnchorSide::Top.to_string(), "top");
        assert_eq!(ConnectionKind::Required.to_string(), "required");
        assert_eq!(TreeStatus::Published.to_string(), "published");
    }
}
