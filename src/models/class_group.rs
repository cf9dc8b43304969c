use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClassGroup {
    pub id: i64,
    pub name: String,
    pub course_unit_id: i64,
    pub course_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClassGroupRequest {
    pub name: String,
    pub course_unit_id: i64,
    pub course_id: i64,
}
