//! # Slot Store
//!
//! The persistence boundary for timetable slots. All reads and writes go
//! through a [`SlotTransaction`] opened by [`SlotStore::begin`], so a conflict
//! check and the write that depends on it observe and change the same state.
//!
//! Implementations must also enforce the non-overlap rule themselves when a
//! slot is inserted or moved, reporting a violation as
//! [`TimetableError::Conflict`](crate::errors::TimetableError::Conflict) with
//! the violated dimension. That is what rejects the second of two concurrent
//! writers that both passed the application-level check.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::TimetableResult;
use crate::models::conflict::ConflictQuery;
use crate::models::slot::{NewSlot, SlotFilter, TimetableSlot};

#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn begin(&self) -> TimetableResult<Box<dyn SlotTransaction>>;
}

/// A unit of work against the slot table. Dropping it without calling
/// [`commit`](SlotTransaction::commit) discards every change.
#[async_trait]
pub trait SlotTransaction: Send {
    /// Fetches a slot by id, active or not, without locking it.
    async fn get(&mut self, id: Uuid) -> TimetableResult<Option<TimetableSlot>>;

    /// Like [`get`](SlotTransaction::get), but holds the row against
    /// concurrent writers until the transaction ends.
    async fn get_for_update(&mut self, id: Uuid) -> TimetableResult<Option<TimetableSlot>>;

    /// Every active slot matching the query's resource, day, year and
    /// semester whose interval overlaps the query interval.
    async fn find_active_conflicts(
        &mut self,
        query: &ConflictQuery,
    ) -> TimetableResult<Vec<TimetableSlot>>;

    /// Active slots matching `filter`, ordered by day, start time and id.
    async fn list_active(&mut self, filter: &SlotFilter) -> TimetableResult<Vec<TimetableSlot>>;

    async fn insert(&mut self, slot: &NewSlot) -> TimetableResult<TimetableSlot>;

    /// Replaces every field of an active slot. `NotFound` when the slot is
    /// missing or inactive.
    async fn update(&mut self, id: Uuid, slot: &NewSlot) -> TimetableResult<TimetableSlot>;

    /// Active -> Inactive. `NotFound` when the slot is missing or already
    /// inactive.
    async fn deactivate(&mut self, id: Uuid) -> TimetableResult<TimetableSlot>;

    /// Removes the row permanently. `NotFound` when absent.
    async fn delete(&mut self, id: Uuid) -> TimetableResult<()>;

    async fn commit(self: Box<Self>) -> TimetableResult<()>;
}
