pub mod notifier;
pub mod seed;
pub mod timetable;

pub use notifier::{ScheduleEvent, ScheduleEventKind, ScheduleNotifier};
pub use seed::{SeedReport, load_demo_data};
pub use timetable::TimetableService;
