mod middleware_test;
mod timetable_test;
