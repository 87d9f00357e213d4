use tracing::debug;
use uuid::Uuid;

use crate::errors::TimetableResult;
use crate::models::conflict::{ConflictReport, Dimension};
use crate::models::slot::NewSlot;
use crate::store::SlotTransaction;

/// Decides whether a candidate slot may occupy its proposed coordinates.
///
/// Every dimension is checked, teacher then group then room, and each one
/// with at least one overlapping active slot is reported. A caller learns
/// all the reasons a placement is invalid from a single check.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictChecker;

impl ConflictChecker {
    pub fn new() -> Self {
        Self
    }

    /// Runs the check inside `tx`. `exclude_id` names the slot being moved,
    /// which must not collide with itself.
    pub async fn check(
        &self,
        tx: &mut dyn SlotTransaction,
        candidate: &NewSlot,
        exclude_id: Option<Uuid>,
    ) -> TimetableResult<ConflictReport> {
        let mut report = ConflictReport::default();

        for dimension in Dimension::ALL {
            let query = candidate.conflict_query(dimension, exclude_id);
            let conflicting = tx.find_active_conflicts(&query).await?;

            if !conflicting.is_empty() {
                debug!(
                    dimension = %dimension,
                    resource_id = query.resource_id,
                    day_of_week = query.day_of_week,
                    interval = %query.interval,
                    count = conflicting.len(),
                    "Found overlapping slots"
                );
                report.push(dimension, conflicting);
            }
        }

        Ok(report)
    }
}
