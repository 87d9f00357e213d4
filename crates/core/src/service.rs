//! # Slot Service
//!
//! The sole entry point adapters use for timetable slots. Mutations validate
//! the candidate, run the conflict check and persist inside one store
//! transaction. When the store itself rejects a write for overlapping an
//! active slot (a concurrent writer won the race), the rejection is reported
//! as the same structured [`TimetableError::Conflict`] the pre-check produces.
//!
//! Only the idempotent reads (`query`, `weekly`, `check_only`) retry, and only
//! once, after a persistence failure.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::checker::ConflictChecker;
use crate::errors::{TimetableError, TimetableResult};
use crate::models::conflict::ConflictReport;
use crate::models::slot::{NewSlot, SlotFields, SlotFilter, TimetableSlot};
use crate::models::weekly::WeeklyTimetable;
use crate::store::{SlotStore, SlotTransaction};

#[derive(Clone)]
pub struct SlotService {
    store: Arc<dyn SlotStore>,
    checker: ConflictChecker,
}

impl SlotService {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self {
            store,
            checker: ConflictChecker::new(),
        }
    }

    pub async fn create(&self, fields: SlotFields) -> TimetableResult<TimetableSlot> {
        let candidate = fields.validate()?;

        let mut tx = self.store.begin().await?;
        let report = self.checker.check(tx.as_mut(), &candidate, None).await?;
        if report.has_conflicts() {
            info!(conflicts = %report, "Rejected timetable slot creation");
            return Err(TimetableError::Conflict(report));
        }

        let slot = match tx.insert(&candidate).await {
            Ok(slot) => slot,
            Err(err) => {
                drop(tx);
                return Err(self.explain_rejection(err, &candidate, None).await);
            }
        };
        if let Err(err) = tx.commit().await {
            return Err(self.explain_rejection(err, &candidate, None).await);
        }

        info!(
            slot_id = %slot.id,
            teacher_id = slot.teacher_id,
            group_id = slot.group_id,
            room_id = slot.room_id,
            day_of_week = slot.day_of_week,
            interval = %slot.interval,
            "Created timetable slot"
        );
        Ok(slot)
    }

    /// Merges `fields` over the stored slot and moves it, re-checking every
    /// dimension with the slot itself excluded. A rejected update leaves the
    /// stored slot untouched.
    pub async fn update(&self, id: Uuid, fields: SlotFields) -> TimetableResult<TimetableSlot> {
        let mut tx = self.store.begin().await?;
        let existing = active_or_not_found(tx.get_for_update(id).await?, id)?;
        let candidate = fields.merged_over(&existing).validate()?;

        let report = self
            .checker
            .check(tx.as_mut(), &candidate, Some(id))
            .await?;
        if report.has_conflicts() {
            info!(slot_id = %id, conflicts = %report, "Rejected timetable slot update");
            return Err(TimetableError::Conflict(report));
        }

        let slot = match tx.update(id, &candidate).await {
            Ok(slot) => slot,
            Err(err) => {
                drop(tx);
                return Err(self.explain_rejection(err, &candidate, Some(id)).await);
            }
        };
        if let Err(err) = tx.commit().await {
            return Err(self.explain_rejection(err, &candidate, Some(id)).await);
        }

        info!(slot_id = %slot.id, interval = %slot.interval, "Updated timetable slot");
        Ok(slot)
    }

    /// Soft delete: the slot stops taking part in conflict checks and
    /// listings but is kept as history.
    pub async fn deactivate(&self, id: Uuid) -> TimetableResult<TimetableSlot> {
        let mut tx = self.store.begin().await?;
        let slot = tx.deactivate(id).await?;
        tx.commit().await?;

        info!(slot_id = %id, "Deactivated timetable slot");
        Ok(slot)
    }

    pub async fn delete(&self, id: Uuid) -> TimetableResult<()> {
        let mut tx = self.store.begin().await?;
        tx.delete(id).await?;
        tx.commit().await?;

        info!(slot_id = %id, "Deleted timetable slot");
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> TimetableResult<TimetableSlot> {
        let mut tx = self.store.begin().await?;
        active_or_not_found(tx.get(id).await?, id)
    }

    pub async fn query(&self, filter: &SlotFilter) -> TimetableResult<Vec<TimetableSlot>> {
        self.read_with_retry("query", move || self.try_query(filter))
            .await
    }

    pub async fn weekly(&self, filter: &SlotFilter) -> TimetableResult<WeeklyTimetable> {
        let slots = self.query(filter).await?;
        Ok(WeeklyTimetable::from_slots(slots))
    }

    /// Runs the conflict check without changing anything, for pre-flight
    /// validation of a create or edit form.
    pub async fn check_only(
        &self,
        fields: SlotFields,
        exclude_id: Option<Uuid>,
    ) -> TimetableResult<ConflictReport> {
        let candidate = fields.validate()?;
        self.read_with_retry("check_only", || self.check_fresh(&candidate, exclude_id))
            .await
    }

    async fn try_query(&self, filter: &SlotFilter) -> TimetableResult<Vec<TimetableSlot>> {
        let mut tx = self.store.begin().await?;
        tx.list_active(filter).await
    }

    async fn check_fresh(
        &self,
        candidate: &NewSlot,
        exclude_id: Option<Uuid>,
    ) -> TimetableResult<ConflictReport> {
        let mut tx = self.store.begin().await?;
        self.checker.check(tx.as_mut(), candidate, exclude_id).await
    }

    async fn read_with_retry<T, F, Fut>(&self, operation: &str, mut attempt: F) -> TimetableResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TimetableResult<T>>,
    {
        match attempt().await {
            Err(err) if err.is_retryable() => {
                warn!(operation, error = %err, "Retrying read after persistence failure");
                attempt().await
            }
            result => result,
        }
    }

    /// Turns a storage-level overlap rejection into a full conflict report by
    /// re-running the check against committed state. Any other error passes
    /// through unchanged.
    async fn explain_rejection(
        &self,
        err: TimetableError,
        candidate: &NewSlot,
        exclude_id: Option<Uuid>,
    ) -> TimetableError {
        let TimetableError::Conflict(rejected) = err else {
            return err;
        };

        info!(conflicts = %rejected, "Store rejected overlapping slot");
        match self.check_fresh(candidate, exclude_id).await {
            Ok(report) if report.has_conflicts() => TimetableError::Conflict(report),
            Ok(_) => TimetableError::Conflict(rejected),
            Err(recheck) => {
                warn!(error = %recheck, "Could not re-check rejected slot");
                TimetableError::Conflict(rejected)
            }
        }
    }
}

fn active_or_not_found(slot: Option<TimetableSlot>, id: Uuid) -> TimetableResult<TimetableSlot> {
    match slot {
        Some(slot) if slot.is_active => Ok(slot),
        _ => Err(TimetableError::slot_not_found(id)),
    }
}
