use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Degree programme offered by a school.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub degree: String,
    pub school_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub name: String,
    #[serde(default)]
    pub degree: String,
    pub school_id: i64,
}
