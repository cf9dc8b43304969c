pub mod interval;
pub mod store;
pub mod validator;

pub use store::{InMemoryScheduleStore, ScheduleStore, SqliteScheduleStore};
pub use validator::{Conflict, ScheduleValidator, Verdict, VerdictResponse};
