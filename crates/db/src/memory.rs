//! In-process slot store with the same contract as the PostgreSQL one.
//!
//! A transaction holds the store's lock for its whole lifetime and works on a
//! staged copy of the table, so transactions are fully serialized and a
//! dropped transaction leaves no trace. Inserts and updates enforce the
//! per-dimension non-overlap rule the same way the database's exclusion
//! constraints do.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use timetable_core::errors::{TimetableError, TimetableResult};
use timetable_core::models::conflict::{ConflictQuery, ConflictReport, Dimension};
use timetable_core::models::slot::{NewSlot, SlotFilter, TimetableSlot};
use timetable_core::store::{SlotStore, SlotTransaction};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

type SlotTable = BTreeMap<Uuid, TimetableSlot>;

#[derive(Debug, Clone, Default)]
pub struct MemorySlotStore {
    slots: Arc<Mutex<SlotTable>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows, active or not.
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SlotStore for MemorySlotStore {
    async fn begin(&self) -> TimetableResult<Box<dyn SlotTransaction>> {
        let guard = Arc::clone(&self.slots).lock_owned().await;
        let staged = guard.clone();

        Ok(Box::new(MemorySlotTransaction { guard, staged }))
    }
}

struct MemorySlotTransaction {
    guard: OwnedMutexGuard<SlotTable>,
    staged: SlotTable,
}

impl MemorySlotTransaction {
    fn active(&self, id: Uuid) -> TimetableResult<&TimetableSlot> {
        self.staged
            .get(&id)
            .filter(|slot| slot.is_active)
            .ok_or_else(|| TimetableError::slot_not_found(id))
    }

    /// First dimension along which `slot` would overlap an active row.
    fn violated_dimension(&self, slot: &NewSlot, exclude_id: Option<Uuid>) -> Option<Dimension> {
        Dimension::ALL.into_iter().find(|&dimension| {
            let query = slot.conflict_query(dimension, exclude_id);
            self.staged.values().any(|existing| query.matches(existing))
        })
    }

    fn enforce_exclusion(&self, slot: &NewSlot, exclude_id: Option<Uuid>) -> TimetableResult<()> {
        match self.violated_dimension(slot, exclude_id) {
            Some(dimension) => Err(TimetableError::Conflict(ConflictReport::rejected(dimension))),
            None => Ok(()),
        }
    }
}

fn sorted(mut slots: Vec<TimetableSlot>) -> Vec<TimetableSlot> {
    slots.sort_by(|a, b| {
        a.day_of_week
            .cmp(&b.day_of_week)
            .then_with(|| a.interval.start().cmp(&b.interval.start()))
            .then_with(|| a.id.cmp(&b.id))
    });
    slots
}

#[async_trait]
impl SlotTransaction for MemorySlotTransaction {
    async fn get(&mut self, id: Uuid) -> TimetableResult<Option<TimetableSlot>> {
        Ok(self.staged.get(&id).cloned())
    }

    // Transactions are already serialized, so there is nothing extra to lock.
    async fn get_for_update(&mut self, id: Uuid) -> TimetableResult<Option<TimetableSlot>> {
        self.get(id).await
    }

    async fn find_active_conflicts(
        &mut self,
        query: &ConflictQuery,
    ) -> TimetableResult<Vec<TimetableSlot>> {
        let matches = self
            .staged
            .values()
            .filter(|slot| query.matches(slot))
            .cloned()
            .collect();

        Ok(sorted(matches))
    }

    async fn list_active(&mut self, filter: &SlotFilter) -> TimetableResult<Vec<TimetableSlot>> {
        let matches = self
            .staged
            .values()
            .filter(|slot| slot.is_active && filter.matches(slot))
            .cloned()
            .collect();

        Ok(sorted(matches))
    }

    async fn insert(&mut self, slot: &NewSlot) -> TimetableResult<TimetableSlot> {
        self.enforce_exclusion(slot, None)?;

        let now = Utc::now();
        let stored = TimetableSlot {
            id: Uuid::new_v4(),
            subject_id: slot.subject_id,
            teacher_id: slot.teacher_id,
            group_id: slot.group_id,
            room_id: slot.room_id,
            day_of_week: slot.day_of_week,
            interval: slot.interval,
            academic_year: slot.academic_year.clone(),
            semester: slot.semester,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.staged.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn update(&mut self, id: Uuid, slot: &NewSlot) -> TimetableResult<TimetableSlot> {
        let existing = self.active(id)?.clone();
        self.enforce_exclusion(slot, Some(id))?;

        let updated = TimetableSlot {
            subject_id: slot.subject_id,
            teacher_id: slot.teacher_id,
            group_id: slot.group_id,
            room_id: slot.room_id,
            day_of_week: slot.day_of_week,
            interval: slot.interval,
            academic_year: slot.academic_year.clone(),
            semester: slot.semester,
            updated_at: Utc::now(),
            ..existing
        };
        self.staged.insert(id, updated.clone());

        Ok(updated)
    }

    async fn deactivate(&mut self, id: Uuid) -> TimetableResult<TimetableSlot> {
        let mut slot = self.active(id)?.clone();
        slot.is_active = false;
        slot.updated_at = Utc::now();
        self.staged.insert(id, slot.clone());

        Ok(slot)
    }

    async fn delete(&mut self, id: Uuid) -> TimetableResult<()> {
        match self.staged.remove(&id) {
            Some(_) => Ok(()),
            None => Err(TimetableError::slot_not_found(id)),
        }
    }

    async fn commit(self: Box<Self>) -> TimetableResult<()> {
        let MemorySlotTransaction { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}
