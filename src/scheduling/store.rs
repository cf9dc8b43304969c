use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db::repository;
use crate::error::StoreError;
use crate::models::{Day, TimetableBlock};

/// Read-only view of stored timetable blocks used by the validator.
///
/// `exclude_id` drops the block with that id from the result, so an edited
/// block is never compared against its own stored copy.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn blocks_in_room_on(
        &self,
        room_id: i64,
        day: Day,
        exclude_id: Option<i64>,
    ) -> Result<Vec<TimetableBlock>, StoreError>;

    async fn blocks_for_professor_on(
        &self,
        professor_id: i64,
        day: Day,
        exclude_id: Option<i64>,
    ) -> Result<Vec<TimetableBlock>, StoreError>;

    async fn room_name(&self, room_id: i64) -> Result<String, StoreError>;

    async fn professor_name(&self, professor_id: i64) -> Result<String, StoreError>;
}

#[derive(Clone)]
pub struct SqliteScheduleStore {
    db: SqlitePool,
}

impl SqliteScheduleStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScheduleStore for SqliteScheduleStore {
    async fn blocks_in_room_on(
        &self,
        room_id: i64,
        day: Day,
        exclude_id: Option<i64>,
    ) -> Result<Vec<TimetableBlock>, StoreError> {
        Ok(repository::fetch_blocks_in_room_on(&self.db, room_id, day, exclude_id).await?)
    }

    async fn blocks_for_professor_on(
        &self,
        professor_id: i64,
        day: Day,
        exclude_id: Option<i64>,
    ) -> Result<Vec<TimetableBlock>, StoreError> {
        Ok(repository::fetch_blocks_for_professor_on(&self.db, professor_id, day, exclude_id).await?)
    }

    async fn room_name(&self, room_id: i64) -> Result<String, StoreError> {
        repository::find_room_by_id(&self.db, room_id)
            .await?
            .map(|r| r.name)
            .ok_or(StoreError::MissingReference { entity: "room", id: room_id })
    }

    async fn professor_name(&self, professor_id: i64) -> Result<String, StoreError> {
        repository::find_user_by_id(&self.db, professor_id)
            .await?
            .map(|u| u.name)
            .ok_or(StoreError::MissingReference { entity: "professor", id: professor_id })
    }
}

/// In-memory store for tests and dry runs. Blocks are returned in the order
/// they were added.
#[derive(Debug, Default, Clone)]
pub struct InMemoryScheduleStore {
    blocks: Vec<TimetableBlock>,
    rooms: HashMap<i64, String>,
    professors: HashMap<i64, String>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_room(mut self, id: i64, name: impl Into<String>) -> Self {
        self.rooms.insert(id, name.into());
        self
    }

    pub fn with_professor(mut self, id: i64, name: impl Into<String>) -> Self {
        self.professors.insert(id, name.into());
        self
    }

    pub fn with_block(mut self, block: TimetableBlock) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn blocks(&self) -> &[TimetableBlock] {
        &self.blocks
    }

    fn matching<F>(&self, day: Day, exclude_id: Option<i64>, pred: F) -> Vec<TimetableBlock>
    where
        F: Fn(&TimetableBlock) -> bool,
    {
        self.blocks
            .iter()
            .filter(|b| b.day == day)
            .filter(|b| exclude_id.is_none() || b.id != exclude_id)
            .filter(|b| pred(b))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn blocks_in_room_on(
        &self,
        room_id: i64,
        day: Day,
        exclude_id: Option<i64>,
    ) -> Result<Vec<TimetableBlock>, StoreError> {
        Ok(self.matching(day, exclude_id, |b| b.room_id == room_id))
    }

    async fn blocks_for_professor_on(
        &self,
        professor_id: i64,
        day: Day,
        exclude_id: Option<i64>,
    ) -> Result<Vec<TimetableBlock>, StoreError> {
        Ok(self.matching(day, exclude_id, |b| b.professor_id == professor_id))
    }

    async fn room_name(&self, room_id: i64) -> Result<String, StoreError> {
        self.rooms
            .get(&room_id)
            .cloned()
            .ok_or(StoreError::MissingReference { entity: "room", id: room_id })
    }

    async fn professor_name(&self, professor_id: i64) -> Result<String, StoreError> {
        self.professors
            .get(&professor_id)
            .cloned()
            .ok_or(StoreError::MissingReference { entity: "professor", id: professor_id })
    }
}
