use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::time::{Day, TimeOfDay};
use crate::error::AppError;

/// A teaching session: a professor with a class group, in a room, on a day.
///
/// `id` is `None` for a block that has not been stored yet. Callers must
/// populate the professor and room references before validating, and
/// `start_time` must be strictly before `end_time`
/// (see [`NewBlockRequest::validate`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TimetableBlock {
    pub id: Option<i64>,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub day: Day,
    pub professor_id: i64,
    pub room_id: i64,
    pub course_unit_id: i64,
    pub class_group_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBlockRequest {
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub day: Day,
    pub professor_id: i64,
    pub room_id: i64,
    pub course_unit_id: i64,
    pub class_group_id: i64,
}

impl NewBlockRequest {
    /// Rejects an empty or reversed time span.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.start_time >= self.end_time {
            return Err(AppError::BadRequest(format!(
                "A block must end after it starts (got {} - {})",
                self.start_time, self.end_time
            )));
        }
        Ok(())
    }

    pub fn into_block(self, id: Option<i64>) -> TimetableBlock {
        TimetableBlock {
            id,
            start_time: self.start_time,
            end_time: self.end_time,
            day: self.day,
            professor_id: self.professor_id,
            room_id: self.room_id,
            course_unit_id: self.course_unit_id,
            class_group_id: self.class_group_id,
        }
    }
}

/// Block joined with the names clients display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BlockView {
    pub id: i64,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub day: Day,
    pub professor_id: i64,
    pub professor_name: String,
    pub room_id: i64,
    pub room_name: String,
    pub course_unit_id: i64,
    pub course_unit_name: String,
    pub class_group_id: i64,
    pub class_group_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockFilter {
    pub day: Option<Day>,
    pub room_id: Option<i64>,
    pub professor_id: Option<i64>,
}
