use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::interval::TimeInterval;
use crate::models::slot::{SlotFields, TimetableSlot};

/// A resource whose bookings must never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Teacher,
    Group,
    Room,
}

impl Dimension {
    /// Order in which dimensions are checked and reported.
    pub const ALL: [Dimension; 3] = [Dimension::Teacher, Dimension::Group, Dimension::Room];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Teacher => "teacher",
            Dimension::Group => "group",
            Dimension::Room => "room",
        }
    }

    /// Slot column holding this dimension's resource id.
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::Teacher => "teacher_id",
            Dimension::Group => "group_id",
            Dimension::Room => "room_id",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup for active slots that would collide with a candidate along one
/// dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictQuery {
    pub dimension: Dimension,
    pub resource_id: i64,
    pub day_of_week: i16,
    pub academic_year: String,
    pub semester: i16,
    pub interval: TimeInterval,
    pub exclude_id: Option<Uuid>,
}

impl ConflictQuery {
    pub fn matches(&self, slot: &TimetableSlot) -> bool {
        slot.is_active
            && self.exclude_id != Some(slot.id)
            && slot.resource_id(self.dimension) == self.resource_id
            && slot.day_of_week == self.day_of_week
            && slot.academic_year == self.academic_year
            && slot.semester == self.semester
            && slot.interval.overlaps(&self.interval)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionConflict {
    pub dimension: Dimension,
    pub conflicting_slots: Vec<TimetableSlot>,
}

/// Outcome of a conflict check: one entry per dimension that has at least
/// one overlapping active slot. An empty report means the placement is free.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub conflicts: Vec<DimensionConflict>,
}

impl ConflictReport {
    /// A rejection raised by storage, known only by the violated dimension.
    pub fn rejected(dimension: Dimension) -> Self {
        Self {
            conflicts: vec![DimensionConflict {
                dimension,
                conflicting_slots: Vec::new(),
            }],
        }
    }

    pub fn push(&mut self, dimension: Dimension, conflicting_slots: Vec<TimetableSlot>) {
        self.conflicts.push(DimensionConflict {
            dimension,
            conflicting_slots,
        });
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn dimensions(&self) -> Vec<Dimension> {
        self.conflicts.iter().map(|c| c.dimension).collect()
    }

    pub fn get(&self, dimension: Dimension) -> Option<&DimensionConflict> {
        self.conflicts.iter().find(|c| c.dimension == dimension)
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return f.write_str("no conflicts");
        }

        for (i, conflict) in self.conflicts.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            match conflict.dimension {
                Dimension::Teacher => f.write_str("teacher already has a class")?,
                Dimension::Group => f.write_str("group already has a class")?,
                Dimension::Room => f.write_str("room is already booked")?,
            }
            if !conflict.conflicting_slots.is_empty() {
                let times: Vec<String> = conflict
                    .conflicting_slots
                    .iter()
                    .map(|slot| slot.interval.to_string())
                    .collect();
                write!(f, " at {}", times.join(", "))?;
            }
        }

        Ok(())
    }
}

/// Pre-flight check request: a full candidate plus the slot to ignore when
/// the candidate is an edit of an existing slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictCheckRequest {
    #[serde(flatten)]
    pub fields: SlotFields,
    pub exclude_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictCheckResponse {
    pub has_conflicts: bool,
    pub conflicts: Vec<DimensionConflict>,
}

impl From<ConflictReport> for ConflictCheckResponse {
    fn from(report: ConflictReport) -> Self {
        Self {
            has_conflicts: report.has_conflicts(),
            conflicts: report.conflicts,
        }
    }
}
