use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::error::StoreError;
use crate::models::{TimeOfDay, TimetableBlock};

use super::interval::{
    BREAK_THRESHOLD_SECS, Interval, MAX_CONSECUTIVE_SECS, MEAL_PERIODS, first_run_exceeding,
    intervals_overlap,
};
use super::store::ScheduleStore;

/// Why a block cannot be placed. The `Display` text is shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Conflict {
    #[error("Room {room} is already booked between {start} and {end}")]
    RoomOverlap {
        room: String,
        start: TimeOfDay,
        end: TimeOfDay,
    },

    #[error("Professor {professor} is already teaching between {start} and {end}")]
    ProfessorOverlap {
        professor: String,
        start: TimeOfDay,
        end: TimeOfDay,
    },

    #[error("Professor {professor} would exceed the limit of {limit_hours} consecutive teaching hours")]
    ConsecutiveHours { professor: String, limit_hours: i64 },

    #[error(
        "The block covers the {meal} period ({start_hour}:00-{end_hour}:00); one hour must be kept free for the meal"
    )]
    MealBreak {
        meal: &'static str,
        start_hour: u32,
        end_hour: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Rejected(Conflict),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    /// Empty when valid.
    pub fn reason(&self) -> String {
        match self {
            Verdict::Valid => String::new(),
            Verdict::Rejected(conflict) => conflict.to_string(),
        }
    }
}

/// Wire shape of a verdict: `{ "valid": bool, "reason": string }`.
#[derive(Debug, Clone, Serialize)]
pub struct VerdictResponse {
    pub valid: bool,
    pub reason: String,
}

impl From<&Verdict> for VerdictResponse {
    fn from(v: &Verdict) -> Self {
        Self {
            valid: v.is_valid(),
            reason: v.reason(),
        }
    }
}

/// Decides whether a candidate block may be stored next to the existing ones.
///
/// Rules run in a fixed order and the first failure wins:
/// room overlap, professor overlap, consecutive teaching hours, meal break.
/// Nothing is written.
#[derive(Clone)]
pub struct ScheduleValidator {
    store: Arc<dyn ScheduleStore>,
}

impl ScheduleValidator {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    pub async fn validate_block(
        &self,
        candidate: &TimetableBlock,
        exclude_id: Option<i64>,
    ) -> Result<Verdict, StoreError> {
        if let Some(conflict) = self.check_room(candidate, exclude_id).await? {
            return Ok(reject(conflict));
        }
        if let Some(conflict) = self.check_professor(candidate, exclude_id).await? {
            return Ok(reject(conflict));
        }
        if let Some(conflict) = self.check_consecutive_hours(candidate).await? {
            return Ok(reject(conflict));
        }
        if let Some(conflict) = check_meal_breaks(candidate) {
            return Ok(reject(conflict));
        }
        Ok(Verdict::Valid)
    }

    async fn check_room(
        &self,
        candidate: &TimetableBlock,
        exclude_id: Option<i64>,
    ) -> Result<Option<Conflict>, StoreError> {
        let same_room = self
            .store
            .blocks_in_room_on(candidate.room_id, candidate.day, exclude_id)
            .await?;

        match first_overlapping(candidate, &same_room) {
            Some(other) => Ok(Some(Conflict::RoomOverlap {
                room: self.store.room_name(candidate.room_id).await?,
                start: other.start_time,
                end: other.end_time,
            })),
            None => Ok(None),
        }
    }

    async fn check_professor(
        &self,
        candidate: &TimetableBlock,
        exclude_id: Option<i64>,
    ) -> Result<Option<Conflict>, StoreError> {
        let same_professor = self
            .store
            .blocks_for_professor_on(candidate.professor_id, candidate.day, exclude_id)
            .await?;

        match first_overlapping(candidate, &same_professor) {
            Some(other) => Ok(Some(Conflict::ProfessorOverlap {
                professor: self.store.professor_name(candidate.professor_id).await?,
                start: other.start_time,
                end: other.end_time,
            })),
            None => Ok(None),
        }
    }

    /// Scans the professor's whole day, so a run already too long in stored
    /// data fails any candidate on that day.
    ///
    /// When the candidate is already stored (an edit), the sweep uses the
    /// stored times, not the edited ones, so an edit can lengthen a run past
    /// the limit that a new block with the same times would hit.
    async fn check_consecutive_hours(
        &self,
        candidate: &TimetableBlock,
    ) -> Result<Option<Conflict>, StoreError> {
        let day_blocks = self
            .store
            .blocks_for_professor_on(candidate.professor_id, candidate.day, None)
            .await?;

        let already_stored = candidate.id.is_some()
            && day_blocks.iter().any(|b| b.id == candidate.id);

        let mut intervals: Vec<Interval> = day_blocks.iter().map(Interval::from).collect();
        if !already_stored {
            intervals.push(Interval::from(candidate));
        }

        if first_run_exceeding(intervals, BREAK_THRESHOLD_SECS, MAX_CONSECUTIVE_SECS).is_some() {
            return Ok(Some(Conflict::ConsecutiveHours {
                professor: self.store.professor_name(candidate.professor_id).await?,
                limit_hours: MAX_CONSECUTIVE_SECS / 3600,
            }));
        }
        Ok(None)
    }
}

fn first_overlapping<'a>(
    candidate: &TimetableBlock,
    others: &'a [TimetableBlock],
) -> Option<&'a TimetableBlock> {
    let wanted = Interval::from(candidate);
    others
        .iter()
        .find(|other| intervals_overlap(wanted, Interval::from(*other)))
}

fn check_meal_breaks(candidate: &TimetableBlock) -> Option<Conflict> {
    let wanted = Interval::from(candidate);
    MEAL_PERIODS
        .iter()
        .find(|meal| meal.is_covered_by(wanted))
        .map(|meal| Conflict::MealBreak {
            meal: meal.name,
            start_hour: meal.start_hour(),
            end_hour: meal.end_hour(),
        })
}

fn reject(conflict: Conflict) -> Verdict {
    debug!("block rejected: {}", conflict);
    Verdict::Rejected(conflict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Day;
    use crate::scheduling::store::InMemoryScheduleStore;

    const ROOM: i64 = 1;
    const OTHER_ROOM: i64 = 2;
    const PROF: i64 = 10;
    const OTHER_PROF: i64 = 11;

    fn day() -> Day {
        Day::from_ymd(2025, 5, 12).unwrap()
    }

    fn block(id: Option<i64>, room: i64, prof: i64, start: (u32, u32), end: (u32, u32)) -> TimetableBlock {
        TimetableBlock {
            id,
            start_time: TimeOfDay::from_hm(start.0, start.1).unwrap(),
            end_time: TimeOfDay::from_hm(end.0, end.1).unwrap(),
            day: day(),
            professor_id: prof,
            room_id: room,
            course_unit_id: 1,
            class_group_id: 1,
        }
    }

    fn base_store() -> InMemoryScheduleStore {
        InMemoryScheduleStore::new()
            .with_room(ROOM, "Sala 01")
            .with_room(OTHER_ROOM, "Sala 02")
            .with_professor(PROF, "Maria Santos")
            .with_professor(OTHER_PROF, "João Silva")
    }

    fn validator(store: InMemoryScheduleStore) -> ScheduleValidator {
        ScheduleValidator::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_empty_schedule_accepts_block() {
        let v = validator(base_store());
        let verdict = v
            .validate_block(&block(None, ROOM, PROF, (10, 0), (11, 0)), None)
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Valid);
        assert_eq!(verdict.reason(), "");
    }

    #[tokio::test]
    async fn test_back_to_back_in_same_room_is_valid() {
        let store = base_store().with_block(block(Some(1), ROOM, OTHER_PROF, (11, 0), (12, 0)));
        let verdict = validator(store)
            .validate_block(&block(None, ROOM, PROF, (10, 0), (11, 0)), None)
            .await
            .unwrap();
        assert!(verdict.is_valid());
    }

    #[tokio::test]
    async fn test_exact_duplicate_is_room_conflict() {
        let store = base_store().with_block(block(Some(1), ROOM, OTHER_PROF, (10, 0), (11, 0)));
        let verdict = validator(store)
            .validate_block(&block(None, ROOM, PROF, (10, 0), (11, 0)), None)
            .await
            .unwrap();
        match verdict {
            Verdict::Rejected(Conflict::RoomOverlap { room, start, end }) => {
                assert_eq!(room, "Sala 01");
                assert_eq!(start.to_string(), "10:00");
                assert_eq!(end.to_string(), "11:00");
            }
            other => panic!("expected room conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_room_checked_before_professor() {
        let store = base_store().with_block(block(Some(1), ROOM, PROF, (10, 0), (11, 0)));
        let verdict = validator(store)
            .validate_block(&block(None, ROOM, PROF, (10, 30), (11, 30)), None)
            .await
            .unwrap();
        assert!(matches!(verdict, Verdict::Rejected(Conflict::RoomOverlap { .. })));
    }

    #[tokio::test]
    async fn test_professor_cannot_be_in_two_rooms() {
        let store = base_store().with_block(block(Some(1), OTHER_ROOM, PROF, (9, 0), (12, 0)));
        let verdict = validator(store)
            .validate_block(&block(None, ROOM, PROF, (10, 0), (11, 0)), None)
            .await
            .unwrap();
        assert!(matches!(verdict, Verdict::Rejected(Conflict::ProfessorOverlap { .. })));
        assert!(verdict.reason().contains("Maria Santos"));
    }

    #[tokio::test]
    async fn test_other_day_does_not_conflict() {
        let mut elsewhere = block(Some(1), ROOM, PROF, (10, 0), (11, 0));
        elsewhere.day = Day::from_ymd(2025, 5, 13).unwrap();
        let verdict = validator(base_store().with_block(elsewhere))
            .validate_block(&block(None, ROOM, PROF, (10, 0), (11, 0)), None)
            .await
            .unwrap();
        assert!(verdict.is_valid());
    }

    #[tokio::test]
    async fn test_consecutive_hours_run_exceeds_limit() {
        let store = base_store()
            .with_block(block(Some(1), ROOM, PROF, (8, 0), (11, 0)))
            .with_block(block(Some(2), ROOM, PROF, (11, 15), (14, 15)));
        let verdict = validator(store)
            .validate_block(&block(None, OTHER_ROOM, PROF, (14, 30), (15, 0)), None)
            .await
            .unwrap();
        match verdict {
            Verdict::Rejected(Conflict::ConsecutiveHours { professor, limit_hours }) => {
                assert_eq!(professor, "Maria Santos");
                assert_eq!(limit_hours, 6);
            }
            other => panic!("expected consecutive hours conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_long_break_splits_runs() {
        let store = base_store().with_block(block(Some(1), ROOM, PROF, (8, 0), (11, 0)));
        let verdict = validator(store)
            .validate_block(&block(None, ROOM, PROF, (14, 0), (17, 0)), None)
            .await
            .unwrap();
        assert!(verdict.is_valid());
    }

    #[tokio::test]
    async fn test_preexisting_violation_fails_new_candidate() {
        let store = base_store()
            .with_block(block(Some(1), ROOM, PROF, (8, 0), (11, 0)))
            .with_block(block(Some(2), ROOM, PROF, (11, 15), (14, 15)));
        let verdict = validator(store)
            .validate_block(&block(None, ROOM, PROF, (18, 0), (19, 0)), None)
            .await
            .unwrap();
        assert!(matches!(verdict, Verdict::Rejected(Conflict::ConsecutiveHours { .. })));
    }

    #[tokio::test]
    async fn test_store_order_does_not_change_verdict() {
        let blocks = [
            block(Some(1), ROOM, PROF, (8, 0), (10, 0)),
            block(Some(2), ROOM, PROF, (10, 15), (12, 0)),
        ];
        let forward = blocks
            .iter()
            .cloned()
            .fold(base_store(), |s, b| s.with_block(b));
        let backward = blocks
            .iter()
            .rev()
            .cloned()
            .fold(base_store(), |s, b| s.with_block(b));

        let candidate = block(None, OTHER_ROOM, PROF, (12, 20), (14, 20));
        let a = validator(forward).validate_block(&candidate, None).await.unwrap();
        let b = validator(backward).validate_block(&candidate, None).await.unwrap();
        assert_eq!(a, b);
        assert!(matches!(a, Verdict::Rejected(Conflict::ConsecutiveHours { .. })));
    }

    #[tokio::test]
    async fn test_lunch_fully_covered_is_rejected() {
        let verdict = validator(base_store())
            .validate_block(&block(None, ROOM, PROF, (12, 30), (14, 30)), None)
            .await
            .unwrap();
        match verdict {
            Verdict::Rejected(Conflict::MealBreak { meal, .. }) => assert_eq!(meal, "lunch"),
            other => panic!("expected meal conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_partial_lunch_overlap_is_valid() {
        let verdict = validator(base_store())
            .validate_block(&block(None, ROOM, PROF, (13, 30), (14, 30)), None)
            .await
            .unwrap();
        assert!(verdict.is_valid());
    }

    #[tokio::test]
    async fn test_dinner_fully_covered_is_rejected() {
        let verdict = validator(base_store())
            .validate_block(&block(None, ROOM, PROF, (19, 30), (21, 0)), None)
            .await
            .unwrap();
        assert!(verdict.reason().contains("dinner"));
    }

    #[tokio::test]
    async fn test_block_never_conflicts_with_itself() {
        let stored = block(Some(7), ROOM, PROF, (9, 0), (11, 0));
        let store = base_store()
            .with_block(stored.clone())
            .with_block(block(Some(8), ROOM, OTHER_PROF, (11, 0), (12, 0)));
        let verdict = validator(store).validate_block(&stored, Some(7)).await.unwrap();
        assert!(verdict.is_valid());
    }

    #[tokio::test]
    async fn test_edit_sweeps_stored_times_not_edited_ones() {
        let stored = block(Some(8), ROOM, PROF, (10, 15), (11, 0));
        let store = base_store()
            .with_block(block(Some(7), ROOM, PROF, (7, 0), (10, 0)))
            .with_block(stored);
        let v = validator(store);

        let lengthened = block(Some(8), ROOM, PROF, (10, 15), (13, 15));
        let verdict = v.validate_block(&lengthened, Some(8)).await.unwrap();
        assert!(verdict.is_valid());

        let fresh = block(None, OTHER_ROOM, PROF, (11, 0), (13, 15));
        let verdict = v.validate_block(&fresh, None).await.unwrap();
        assert!(matches!(verdict, Verdict::Rejected(Conflict::ConsecutiveHours { .. })));
    }

    #[tokio::test]
    async fn test_edit_still_conflicts_with_other_blocks() {
        let store = base_store()
            .with_block(block(Some(7), ROOM, PROF, (9, 0), (10, 0)))
            .with_block(block(Some(8), ROOM, OTHER_PROF, (10, 0), (11, 0)));
        let moved = block(Some(7), ROOM, PROF, (9, 30), (10, 30));
        let verdict = validator(store).validate_block(&moved, Some(7)).await.unwrap();
        assert!(matches!(verdict, Verdict::Rejected(Conflict::RoomOverlap { .. })));
    }

    #[tokio::test]
    async fn test_missing_room_name_is_store_error() {
        let store = InMemoryScheduleStore::new()
            .with_professor(PROF, "Maria Santos")
            .with_block(block(Some(1), 99, OTHER_PROF, (10, 0), (11, 0)));
        let err = validator(store)
            .validate_block(&block(None, 99, PROF, (10, 0), (11, 0)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { entity: "room", id: 99 }));
    }

    #[test]
    fn test_verdict_response_shape() {
        let rejected = Verdict::Rejected(Conflict::ConsecutiveHours {
            professor: "Ana Costa".to_string(),
            limit_hours: 6,
        });
        let json = serde_json::to_value(VerdictResponse::from(&rejected)).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(
            json["reason"],
            "Professor Ana Costa would exceed the limit of 6 consecutive teaching hours"
        );
    }
}
