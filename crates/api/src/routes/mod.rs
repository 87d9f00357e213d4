pub mod health;
pub mod timetable;
