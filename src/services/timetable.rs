use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::models::{BlockView, NewBlockRequest, TimetableBlock};
use crate::scheduling::{ScheduleValidator, SqliteScheduleStore, Verdict};
use crate::services::notifier::{ScheduleEventKind, ScheduleNotifier};

/// Writes timetable blocks only after the validator accepts them.
///
/// All block writes in the process share one gate, held from the validator's
/// reads until the row is written, so two overlapping requests cannot both
/// pass against the same snapshot.
#[derive(Clone)]
pub struct TimetableService {
    db: SqlitePool,
    validator: ScheduleValidator,
    notifier: ScheduleNotifier,
    write_gate: Arc<Mutex<()>>,
}

impl TimetableService {
    pub fn new(db: SqlitePool, notifier: ScheduleNotifier) -> Self {
        let store = Arc::new(SqliteScheduleStore::new(db.clone()));
        Self {
            db,
            validator: ScheduleValidator::new(store),
            notifier,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Runs the validator without writing anything.
    pub async fn check(
        &self,
        req: NewBlockRequest,
        exclude_id: Option<i64>,
    ) -> Result<Verdict, AppError> {
        req.validate()?;
        let candidate = req.into_block(exclude_id);
        Ok(self.validator.validate_block(&candidate, exclude_id).await?)
    }

    pub async fn create_block(&self, req: NewBlockRequest) -> Result<BlockView, AppError> {
        req.validate()?;
        let candidate = req.into_block(None);

        let id = {
            let _gate = self.write_gate.lock().await;
            self.ensure_valid(&candidate, None).await?;
            repository::insert_block(&self.db, &candidate).await?
        };

        let view = self.load_view(id).await?;
        info!(
            "block {} created: room {} professor {} on {} {}-{}",
            id, view.room_name, view.professor_name, view.day, view.start_time, view.end_time
        );
        self.notifier.publish(ScheduleEventKind::BlockAdded(view.clone()));
        Ok(view)
    }

    pub async fn update_block(&self, id: i64, req: NewBlockRequest) -> Result<BlockView, AppError> {
        req.validate()?;
        let candidate = req.into_block(Some(id));

        {
            let _gate = self.write_gate.lock().await;
            if repository::find_block_by_id(&self.db, id).await?.is_none() {
                return Err(AppError::NotFound);
            }
            self.ensure_valid(&candidate, Some(id)).await?;
            if !repository::update_block(&self.db, id, &candidate).await? {
                return Err(AppError::NotFound);
            }
        }

        let view = self.load_view(id).await?;
        info!("block {} updated", id);
        self.notifier.publish(ScheduleEventKind::BlockUpdated(view.clone()));
        Ok(view)
    }

    pub async fn delete_block(&self, id: i64) -> Result<(), AppError> {
        let deleted = {
            let _gate = self.write_gate.lock().await;
            repository::delete_block(&self.db, id).await?
        };
        if !deleted {
            return Err(AppError::NotFound);
        }

        info!("block {} deleted", id);
        self.notifier.publish(ScheduleEventKind::BlockDeleted { id });
        Ok(())
    }

    async fn ensure_valid(
        &self,
        candidate: &TimetableBlock,
        exclude_id: Option<i64>,
    ) -> Result<(), AppError> {
        match self.validator.validate_block(candidate, exclude_id).await? {
            Verdict::Valid => Ok(()),
            Verdict::Rejected(conflict) => {
                warn!("block rejected on {}: {}", candidate.day, conflict);
                Err(AppError::Conflict(conflict.to_string()))
            }
        }
    }

    async fn load_view(&self, id: i64) -> Result<BlockView, AppError> {
        repository::find_block_view(&self.db, id)
            .await?
            .ok_or(AppError::InternalServerError)
    }
}
