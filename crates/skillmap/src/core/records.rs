//! Store-facing records
//!
//! These mirror the documents the backing store hands out: exercises,
//! trees with their saved node placements and connections, and per-user
//! progress. Field names are camelCase on the wire.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{AnchorSide, ConnectionKind, ProgressState, TreeStatus};

/// An exercise or skill in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    pub id: String,
    pub name: String,
    /// Difficulty level, usually 1-12. Non-numeric values read as absent.
    #[serde(
        default,
        deserialize_with = "lenient_difficulty",
        skip_serializing_if = "Option::is_none"
    )]
    pub difficulty: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub muscles: Vec<String>,
}

impl ExerciseRecord {
    /// Create a new exercise with a difficulty
    pub fn new(id: impl Into<String>, name: impl Into<String>, difficulty: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            difficulty: Some(difficulty),
            category: None,
            muscles: Vec::new(),
        }
    }

    /// Create a new exercise without a difficulty
    pub fn unrated(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            difficulty: None,
            category: None,
            muscles: Vec::new(),
        }
    }
}

/// Read a difficulty out of an arbitrary JSON value
///
/// Integers are taken as-is and finite floats are truncated. Anything else
/// (strings, booleans, null, objects) yields `None`.
pub fn difficulty_from_value(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}

pub(crate) fn lenient_difficulty<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(difficulty_from_value))
}

/// A saved node placement inside a tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub exercise_ref: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Placement {
    pub fn new(exercise_ref: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            exercise_ref: exercise_ref.into(),
            x,
            y,
        }
    }
}

fn default_target_anchor() -> AnchorSide {
    AnchorSide::Top
}

/// A saved connection between two placements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub from_ref: String,
    pub to_ref: String,
    #[serde(default)]
    pub kind: ConnectionKind,
    #[serde(default)]
    pub source_anchor: AnchorSide,
    #[serde(default = "default_target_anchor")]
    pub target_anchor: AnchorSide,
}

impl ConnectionRecord {
    /// A required connection using the default bottom-to-top anchors
    pub fn new(from_ref: impl Into<String>, to_ref: impl Into<String>) -> Self {
        Self {
            from_ref: from_ref.into(),
            to_ref: to_ref.into(),
            kind: ConnectionKind::Required,
            source_anchor: AnchorSide::Bottom,
            target_anchor: AnchorSide::Top,
        }
    }

    pub fn with_kind(mut self, kind: ConnectionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_anchors(mut self, source: AnchorSide, target: AnchorSide) -> Self {
        self.source_anchor = source;
        self.target_anchor = target;
        self
    }
}

/// A progression tree as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRecord {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TreeStatus,
    #[serde(default)]
    pub nodes: Vec<Placement>,
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
}

impl TreeRecord {
    /// Create an empty draft tree
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: TreeStatus::Draft,
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == TreeStatus::Published
    }

    /// References of every placed exercise, in placement order
    pub fn exercise_refs(&self) -> Vec<String> {
        self.nodes.iter().map(|p| p.exercise_ref.clone()).collect()
    }
}

/// Fields needed to create a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTree {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One user's progress on one exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub user_id: String,
    pub exercise_ref: String,
    pub status: ProgressState,
}

impl ProgressRecord {
    pub fn new(
        user_id: impl Into<String>,
        exercise_ref: impl Into<String>,
        status: ProgressState,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            exercise_ref: exercise_ref.into(),
            status,
        }
    }
}

/// Payload attached to a tree node
///
/// Either a bare catalog record, or a record joined with the viewing user's
/// progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DetailRecord {
    Exercise(ExerciseRecord),
    WithProgress {
        exercise: ExerciseRecord,
        progress: ProgressState,
    },
}

impl DetailRecord {
    pub fn exercise(&self) -> &ExerciseRecord {
        match self {
            DetailRecord::Exercise(exercise) => exercise,
            DetailRecord::WithProgress { exercise, .. } => exercise,
        }
    }

    pub fn id(&self) -> &str {
        &self.exercise().id
    }

    pub fn name(&self) -> &str {
        &self.exercise().name
    }

    pub fn difficulty(&self) -> Option<i64> {
        self.exercise().difficulty
    }

    pub fn progress(&self) -> Option<ProgressState> {
        match self {
            DetailRecord::Exercise(_) => None,
            DetailRecord::WithProgress { progress, .. } => Some(*progress),
        }
    }
}

impl From<ExerciseRecord> for DetailRecord {
    fn from(exercise: ExerciseRecord) -> Self {
        DetailRecord::Exercise(exercise)
    }
}
