use thiserror::Error;

use crate::models::conflict::ConflictReport;

#[derive(Error, Debug)]
pub enum TimetableError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    #[error("Scheduling conflict: {0}")]
    Conflict(ConflictReport),

    #[error("Persistence error: {0}")]
    Persistence(#[from] eyre::Report),
}

impl TimetableError {
    /// Only storage-layer failures may be retried, and only by idempotent reads.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TimetableError::Persistence(_))
    }

    pub fn slot_not_found(id: impl std::fmt::Display) -> Self {
        TimetableError::NotFound(format!("Timetable slot with ID {} not found", id))
    }
}

pub type TimetableResult<T> = Result<T, TimetableError>;
