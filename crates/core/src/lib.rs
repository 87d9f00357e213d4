//! # Timetable Core
//!
//! Domain types and scheduling rules for timetable slots. A slot places a
//! subject, teacher, class group and room on a weekday and time range within
//! one academic year and semester.
//!
//! The scheduling invariant lives here: within each of the teacher, group and
//! room partitions, active slots on the same day, academic year and semester
//! never overlap. [`checker::ConflictChecker`] detects violations and
//! [`service::SlotService`] is the single entry point that validates, checks
//! and persists inside one store transaction.

pub mod checker;
pub mod errors;
pub mod models;
pub mod service;
pub mod store;
