use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Curricular unit taught within a course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseUnit {
    pub id: i64,
    pub name: String,
    pub unit_type: String,
    pub degree: String,
    pub typology: String,
    pub semester: String,
    pub year: Option<i64>,
    pub course_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseUnitRequest {
    pub name: String,
    #[serde(default)]
    pub unit_type: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub typology: String,
    #[serde(default)]
    pub semester: String,
    pub year: Option<i64>,
    pub course_id: i64,
}
