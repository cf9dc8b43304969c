use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub capacity: i64,
    pub room_type: String,
    pub location: String,
    pub school_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoomRequest {
    pub name: String,
    #[serde(default)]
    pub capacity: i64,
    #[serde(default)]
    pub room_type: String,
    #[serde(default)]
    pub location: String,
    pub school_id: i64,
}
