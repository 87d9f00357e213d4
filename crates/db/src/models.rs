use chrono::{DateTime, NaiveTime, Utc};
use eyre::eyre;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use timetable_core::errors::TimetableError;
use timetable_core::models::interval::TimeInterval;
use timetable_core::models::slot::TimetableSlot;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTimetableSlot {
    pub id: Uuid,
    pub subject_id: i64,
    pub teacher_id: i64,
    pub group_id: i64,
    pub room_id: i64,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub academic_year: String,
    pub semester: i16,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbTimetableSlot> for TimetableSlot {
    type Error = TimetableError;

    fn try_from(row: DbTimetableSlot) -> Result<Self, Self::Error> {
        // The table's CHECK constraint makes this unreachable for rows it wrote.
        let interval = TimeInterval::new(row.start_time, row.end_time)
            .map_err(|err| eyre!("Stored slot {} has an invalid range: {}", row.id, err))?;

        Ok(TimetableSlot {
            id: row.id,
            subject_id: row.subject_id,
            teacher_id: row.teacher_id,
            group_id: row.group_id,
            room_id: row.room_id,
            day_of_week: row.day_of_week,
            interval,
            academic_year: row.academic_year,
            semester: row.semester,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
