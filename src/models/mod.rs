pub mod class_group;
pub mod course;
pub mod course_unit;
pub mod room;
pub mod school;
pub mod time;
pub mod timetable_block;
pub mod user;

pub use class_group::{ClassGroup, NewClassGroupRequest};
pub use course::{Course, NewCourseRequest};
pub use course_unit::{CourseUnit, NewCourseUnitRequest};
pub use room::{NewRoomRequest, Room};
pub use school::{NewSchoolRequest, School};
pub use time::{Day, TimeOfDay};
pub use timetable_block::{BlockFilter, BlockView, NewBlockRequest, TimetableBlock};
pub use user::{NewUserRequest, Role, User};
