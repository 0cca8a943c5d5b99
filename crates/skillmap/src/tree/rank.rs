//! Rank assignment
//!
//! A node's rank is its difficulty. Ranks are the vertical axis of the
//! layout; they need not be contiguous. Ranks are clamped to
//! `MIN_RANK..=MAX_RANK` so rank arithmetic cannot overflow and dummy
//! chains stay bounded.

use crate::core::DetailRecord;

/// Rank used when a record has no usable difficulty
pub const DEFAULT_RANK: i64 = 1;

/// Highest rank a node can take
pub const MAX_RANK: i64 = 1_000;
/// Lowest rank a node can take
pub const MIN_RANK: i64 = -MAX_RANK;

/// Pull an arbitrary rank into the supported range
pub fn clamp_rank(rank: i64) -> i64 {
    rank.clamp(MIN_RANK, MAX_RANK)
}

/// Rank of a node payload
pub fn rank_of(payload: &DetailRecord) -> i64 {
    clamp_rank(payload.difficulty().unwrap_or(DEFAULT_RANK))
}

/// Inclusive rank span of a set of ranks, `None` when empty
pub fn rank_span(ranks: impl IntoIterator<Item = i64>) -> Option<(i64, i64)> {
    ranks.into_iter().fold(None, |span, rank| match span {
        None => Some((rank, rank)),
        Some((lo, hi)) => Some((lo.min(rank), hi.max(rank))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ExerciseRecord, ProgressState};

    #[test]
    fn test_rank_is_difficulty() {
        let payload = DetailRecord::from(ExerciseRecord::new("handstand", "Handstand", 7));
        assert_eq!(rank_of(&payload), 7);

        let joined = DetailRecord::WithProgress {
            exercise: ExerciseRecord::new("planche", "Planche", 11),
            progress: ProgressState::NotStarted,
        };
        assert_eq!(rank_of(&joined), 11);
    }

    #[test]
    fn test_missing_difficulty_defaults_to_one() {
        let payload = DetailRecord::from(ExerciseRecord::unrated("hang", "Dead hang"));
        assert_eq!(rank_of(&payload), DEFAULT_RANK);
    }

    #[test]
    fn test_extreme_difficulties_are_clamped() {
        let huge = DetailRecord::from(ExerciseRecord::new("a", "A", i64::MAX));
        let tiny = DetailRecord::from(ExerciseRecord::new("b", "B", i64::MIN));
        assert_eq!(rank_of(&huge), MAX_RANK);
        assert_eq!(rank_of(&tiny), MIN_RANK);
        assert_eq!(clamp_rank(2_000_000_000), MAX_RANK);
        assert_eq!(clamp_rank(0), 0);
        assert_eq!(clamp_rank(-3), -3);
    }

    #[test]
    fn test_rank_span() {
        assert_eq!(rank_span(Vec::<i64>::new()), None);
        assert_eq!(rank_span([3]), Some((3, 3)));
        assert_eq!(rank_span([7, 1, 3]), Some((1, 7)));
    }
}
