use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{TimetableError, TimetableResult};
use crate::models::conflict::{ConflictQuery, Dimension};
use crate::models::interval::TimeInterval;

/// Monday in this system's weekday numbering.
pub const FIRST_DAY_OF_WEEK: i16 = 1;
/// Sunday in this system's weekday numbering.
pub const LAST_DAY_OF_WEEK: i16 = 7;
/// Longest academic year label storage accepts.
pub const MAX_ACADEMIC_YEAR_LEN: usize = 32;

/// A persisted timetable slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableSlot {
    pub id: Uuid,
    pub subject_id: i64,
    pub teacher_id: i64,
    pub group_id: i64,
    pub room_id: i64,
    pub day_of_week: i16,
    #[serde(flatten)]
    pub interval: TimeInterval,
    pub academic_year: String,
    pub semester: i16,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimetableSlot {
    pub fn resource_id(&self, dimension: Dimension) -> i64 {
        match dimension {
            Dimension::Teacher => self.teacher_id,
            Dimension::Group => self.group_id,
            Dimension::Room => self.room_id,
        }
    }
}

/// A validated slot candidate, ready to be checked and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSlot {
    pub subject_id: i64,
    pub teacher_id: i64,
    pub group_id: i64,
    pub room_id: i64,
    pub day_of_week: i16,
    pub interval: TimeInterval,
    pub academic_year: String,
    pub semester: i16,
}

impl NewSlot {
    pub fn resource_id(&self, dimension: Dimension) -> i64 {
        match dimension {
            Dimension::Teacher => self.teacher_id,
            Dimension::Group => self.group_id,
            Dimension::Room => self.room_id,
        }
    }

    /// Builds the store lookup for overlapping active slots along `dimension`.
    pub fn conflict_query(&self, dimension: Dimension, exclude_id: Option<Uuid>) -> ConflictQuery {
        ConflictQuery {
            dimension,
            resource_id: self.resource_id(dimension),
            day_of_week: self.day_of_week,
            academic_year: self.academic_year.clone(),
            semester: self.semester,
            interval: self.interval,
            exclude_id,
        }
    }
}

/// Slot fields as supplied by a caller. Every field is optional so that the
/// same shape serves creation (all required) and partial updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotFields {
    pub subject_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub group_id: Option<i64>,
    pub room_id: Option<i64>,
    pub day_of_week: Option<i16>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub academic_year: Option<String>,
    pub semester: Option<i16>,
}

impl SlotFields {
    /// Fills every field left unset from `existing`.
    pub fn merged_over(self, existing: &TimetableSlot) -> SlotFields {
        SlotFields {
            subject_id: self.subject_id.or(Some(existing.subject_id)),
            teacher_id: self.teacher_id.or(Some(existing.teacher_id)),
            group_id: self.group_id.or(Some(existing.group_id)),
            room_id: self.room_id.or(Some(existing.room_id)),
            day_of_week: self.day_of_week.or(Some(existing.day_of_week)),
            start_time: self.start_time.or(Some(existing.interval.start())),
            end_time: self.end_time.or(Some(existing.interval.end())),
            academic_year: self
                .academic_year
                .or_else(|| Some(existing.academic_year.clone())),
            semester: self.semester.or(Some(existing.semester)),
        }
    }

    /// Checks presence and shape of every field and produces a candidate.
    ///
    /// Missing or malformed fields yield `Validation`; a well-formed but
    /// empty or inverted time range yields `InvalidRange`.
    pub fn validate(self) -> TimetableResult<NewSlot> {
        let missing: Vec<&str> = [
            ("subject_id", self.subject_id.is_none()),
            ("teacher_id", self.teacher_id.is_none()),
            ("group_id", self.group_id.is_none()),
            ("room_id", self.room_id.is_none()),
            ("day_of_week", self.day_of_week.is_none()),
            ("start_time", self.start_time.is_none()),
            ("end_time", self.end_time.is_none()),
            ("academic_year", self.academic_year.is_none()),
            ("semester", self.semester.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        if !missing.is_empty() {
            return Err(TimetableError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        // Presence was checked above.
        let (
            Some(subject_id),
            Some(teacher_id),
            Some(group_id),
            Some(room_id),
            Some(day_of_week),
            Some(start_time),
            Some(end_time),
            Some(academic_year),
            Some(semester),
        ) = (
            self.subject_id,
            self.teacher_id,
            self.group_id,
            self.room_id,
            self.day_of_week,
            self.start_time,
            self.end_time,
            self.academic_year,
            self.semester,
        )
        else {
            return Err(TimetableError::Validation("missing required fields".to_string()));
        };

        for (name, id) in [
            ("subject_id", subject_id),
            ("teacher_id", teacher_id),
            ("group_id", group_id),
            ("room_id", room_id),
        ] {
            if id <= 0 {
                return Err(TimetableError::Validation(format!(
                    "{} must be a positive reference, got {}",
                    name, id
                )));
            }
        }

        if !(FIRST_DAY_OF_WEEK..=LAST_DAY_OF_WEEK).contains(&day_of_week) {
            return Err(TimetableError::Validation(format!(
                "day_of_week must be between {} and {}, got {}",
                FIRST_DAY_OF_WEEK, LAST_DAY_OF_WEEK, day_of_week
            )));
        }

        if semester != 1 && semester != 2 {
            return Err(TimetableError::Validation(format!(
                "semester must be 1 or 2, got {}",
                semester
            )));
        }

        let academic_year = academic_year.trim().to_string();
        if academic_year.is_empty() {
            return Err(TimetableError::Validation(
                "academic_year must not be blank".to_string(),
            ));
        }
        if academic_year.chars().count() > MAX_ACADEMIC_YEAR_LEN {
            return Err(TimetableError::Validation(format!(
                "academic_year must be at most {} characters, got {}",
                MAX_ACADEMIC_YEAR_LEN,
                academic_year.chars().count()
            )));
        }

        let interval = TimeInterval::new(start_time, end_time)?;

        Ok(NewSlot {
            subject_id,
            teacher_id,
            group_id,
            room_id,
            day_of_week,
            interval,
            academic_year,
            semester,
        })
    }
}

/// Read-side filter. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotFilter {
    pub teacher_id: Option<i64>,
    pub group_id: Option<i64>,
    pub room_id: Option<i64>,
    pub academic_year: Option<String>,
    pub semester: Option<i16>,
}

impl SlotFilter {
    pub fn matches(&self, slot: &TimetableSlot) -> bool {
        self.teacher_id.is_none_or(|id| slot.teacher_id == id)
            && self.group_id.is_none_or(|id| slot.group_id == id)
            && self.room_id.is_none_or(|id| slot.room_id == id)
            && self
                .academic_year
                .as_deref()
                .is_none_or(|year| slot.academic_year == year)
            && self.semester.is_none_or(|semester| slot.semester == semester)
    }
}
