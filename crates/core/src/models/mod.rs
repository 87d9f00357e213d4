pub mod conflict;
pub mod interval;
pub mod slot;
pub mod weekly;
