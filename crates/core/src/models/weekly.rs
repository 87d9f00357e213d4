use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::slot::{FIRST_DAY_OF_WEEK, LAST_DAY_OF_WEEK, TimetableSlot};

/// Slots laid out by weekday, as consumed by timetable views and the
/// printable weekly grid. Every day from Monday to Sunday is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTimetable {
    pub days: BTreeMap<i16, Vec<TimetableSlot>>,
}

impl WeeklyTimetable {
    pub fn from_slots(slots: impl IntoIterator<Item = TimetableSlot>) -> Self {
        let mut days: BTreeMap<i16, Vec<TimetableSlot>> = (FIRST_DAY_OF_WEEK..=LAST_DAY_OF_WEEK)
            .map(|day| (day, Vec::new()))
            .collect();

        for slot in slots {
            // Validated on the way in; anything else is not displayable.
            if let Some(day) = days.get_mut(&slot.day_of_week) {
                day.push(slot);
            }
        }

        for day in days.values_mut() {
            day.sort_by(|a, b| {
                a.interval
                    .start()
                    .cmp(&b.interval.start())
                    .then_with(|| a.id.cmp(&b.id))
            });
        }

        Self { days }
    }

    pub fn day(&self, day_of_week: i16) -> &[TimetableSlot] {
        self.days
            .get(&day_of_week)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
