use sqlx::SqlitePool;

use crate::services::{ScheduleNotifier, TimetableService};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub timetable: TimetableService,
    pub notifier: ScheduleNotifier,
}

impl AppState {
    pub fn new(db: SqlitePool, notify_capacity: usize) -> Self {
        let notifier = ScheduleNotifier::new(notify_capacity);
        let timetable = TimetableService::new(db.clone(), notifier.clone());
        Self {
            db,
            timetable,
            notifier,
        }
    }
}
