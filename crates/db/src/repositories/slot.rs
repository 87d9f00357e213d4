//! PostgreSQL implementation of the slot store.
//!
//! Each transaction runs at READ COMMITTED. The application-level conflict
//! check reads inside the transaction; the per-dimension exclusion
//! constraints created by [`crate::schema`] are what make the invariant hold
//! for concurrent writers. A violated constraint surfaces as
//! [`TimetableError::Conflict`] naming its dimension.

use async_trait::async_trait;
use chrono::Utc;
use eyre::eyre;
use sqlx::{Postgres, QueryBuilder, Transaction};
use timetable_core::errors::{TimetableError, TimetableResult};
use timetable_core::models::conflict::{ConflictQuery, ConflictReport};
use timetable_core::models::slot::{NewSlot, SlotFilter, TimetableSlot};
use timetable_core::store::{SlotStore, SlotTransaction};
use tracing::debug;
use uuid::Uuid;

use crate::DbPool;
use crate::models::DbTimetableSlot;
use crate::schema::constraint_dimension;

/// SQLSTATE for `exclusion_violation`.
const EXCLUSION_VIOLATION: &str = "23P01";

const SELECT_SLOTS: &str = r#"
    SELECT id, subject_id, teacher_id, group_id, room_id, day_of_week,
           start_time, end_time, academic_year, semester, is_active,
           created_at, updated_at
    FROM timetable_slots
"#;

#[derive(Debug, Clone)]
pub struct PgSlotStore {
    pool: DbPool,
}

impl PgSlotStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlotStore for PgSlotStore {
    async fn begin(&self) -> TimetableResult<Box<dyn SlotTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|err| persistence(err, "Failed to begin transaction"))?;

        Ok(Box::new(PgSlotTransaction { tx }))
    }
}

pub struct PgSlotTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PgSlotTransaction {
    async fn fetch_by_id(&mut self, id: Uuid, lock: bool) -> TimetableResult<Option<TimetableSlot>> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_SLOTS);
        builder.push(" WHERE id = ").push_bind(id);
        if lock {
            builder.push(" FOR UPDATE");
        }

        let row = builder
            .build_query_as::<DbTimetableSlot>()
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|err| persistence(err, "Failed to load timetable slot"))?;

        row.map(TimetableSlot::try_from).transpose()
    }
}

#[async_trait]
impl SlotTransaction for PgSlotTransaction {
    async fn get(&mut self, id: Uuid) -> TimetableResult<Option<TimetableSlot>> {
        self.fetch_by_id(id, false).await
    }

    async fn get_for_update(&mut self, id: Uuid) -> TimetableResult<Option<TimetableSlot>> {
        self.fetch_by_id(id, true).await
    }

    async fn find_active_conflicts(
        &mut self,
        query: &ConflictQuery,
    ) -> TimetableResult<Vec<TimetableSlot>> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_SLOTS);
        builder
            .push(" WHERE is_active AND ")
            .push(query.dimension.column())
            .push(" = ")
            .push_bind(query.resource_id)
            .push(" AND day_of_week = ")
            .push_bind(query.day_of_week)
            .push(" AND academic_year = ")
            .push_bind(query.academic_year.as_str())
            .push(" AND semester = ")
            .push_bind(query.semester)
            .push(" AND start_time < ")
            .push_bind(query.interval.end())
            .push(" AND end_time > ")
            .push_bind(query.interval.start());
        if let Some(exclude_id) = query.exclude_id {
            builder.push(" AND id <> ").push_bind(exclude_id);
        }
        builder.push(" ORDER BY start_time, id");

        let rows = builder
            .build_query_as::<DbTimetableSlot>()
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|err| persistence(err, "Failed to query overlapping slots"))?;

        debug!(
            dimension = %query.dimension,
            resource_id = query.resource_id,
            matches = rows.len(),
            "Queried overlapping slots"
        );
        rows.into_iter().map(TimetableSlot::try_from).collect()
    }

    async fn list_active(&mut self, filter: &SlotFilter) -> TimetableResult<Vec<TimetableSlot>> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_SLOTS);
        builder.push(" WHERE is_active");
        if let Some(teacher_id) = filter.teacher_id {
            builder.push(" AND teacher_id = ").push_bind(teacher_id);
        }
        if let Some(group_id) = filter.group_id {
            builder.push(" AND group_id = ").push_bind(group_id);
        }
        if let Some(room_id) = filter.room_id {
            builder.push(" AND room_id = ").push_bind(room_id);
        }
        if let Some(academic_year) = filter.academic_year.as_deref() {
            builder.push(" AND academic_year = ").push_bind(academic_year);
        }
        if let Some(semester) = filter.semester {
            builder.push(" AND semester = ").push_bind(semester);
        }
        builder.push(" ORDER BY day_of_week, start_time, id");

        let rows = builder
            .build_query_as::<DbTimetableSlot>()
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|err| persistence(err, "Failed to list timetable slots"))?;

        rows.into_iter().map(TimetableSlot::try_from).collect()
    }

    async fn insert(&mut self, slot: &NewSlot) -> TimetableResult<TimetableSlot> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let row = sqlx::query_as::<_, DbTimetableSlot>(
            r#"
            INSERT INTO timetable_slots
                (id, subject_id, teacher_id, group_id, room_id, day_of_week,
                 start_time, end_time, academic_year, semester, is_active,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE, $11, $11)
            RETURNING id, subject_id, teacher_id, group_id, room_id, day_of_week,
                      start_time, end_time, academic_year, semester, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(slot.subject_id)
        .bind(slot.teacher_id)
        .bind(slot.group_id)
        .bind(slot.room_id)
        .bind(slot.day_of_week)
        .bind(slot.interval.start())
        .bind(slot.interval.end())
        .bind(&slot.academic_year)
        .bind(slot.semester)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|err| write_error(err, "Failed to insert timetable slot"))?;

        TimetableSlot::try_from(row)
    }

    async fn update(&mut self, id: Uuid, slot: &NewSlot) -> TimetableResult<TimetableSlot> {
        let row = sqlx::query_as::<_, DbTimetableSlot>(
            r#"
            UPDATE timetable_slots
            SET subject_id = $2, teacher_id = $3, group_id = $4, room_id = $5,
                day_of_week = $6, start_time = $7, end_time = $8,
                academic_year = $9, semester = $10, updated_at = $11
            WHERE id = $1 AND is_active
            RETURNING id, subject_id, teacher_id, group_id, room_id, day_of_week,
                      start_time, end_time, academic_year, semester, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(slot.subject_id)
        .bind(slot.teacher_id)
        .bind(slot.group_id)
        .bind(slot.room_id)
        .bind(slot.day_of_week)
        .bind(slot.interval.start())
        .bind(slot.interval.end())
        .bind(&slot.academic_year)
        .bind(slot.semester)
        .bind(Utc::now())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|err| write_error(err, "Failed to update timetable slot"))?
        .ok_or_else(|| TimetableError::slot_not_found(id))?;

        TimetableSlot::try_from(row)
    }

    async fn deactivate(&mut self, id: Uuid) -> TimetableResult<TimetableSlot> {
        let row = sqlx::query_as::<_, DbTimetableSlot>(
            r#"
            UPDATE timetable_slots
            SET is_active = FALSE, updated_at = $2
            WHERE id = $1 AND is_active
            RETURNING id, subject_id, teacher_id, group_id, room_id, day_of_week,
                      start_time, end_time, academic_year, semester, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|err| persistence(err, "Failed to deactivate timetable slot"))?
        .ok_or_else(|| TimetableError::slot_not_found(id))?;

        TimetableSlot::try_from(row)
    }

    async fn delete(&mut self, id: Uuid) -> TimetableResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM timetable_slots
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *self.tx)
        .await
        .map_err(|err| persistence(err, "Failed to delete timetable slot"))?;

        if result.rows_affected() == 0 {
            return Err(TimetableError::slot_not_found(id));
        }

        Ok(())
    }

    async fn commit(self: Box<Self>) -> TimetableResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|err| write_error(err, "Failed to commit transaction"))
    }
}

fn persistence(err: sqlx::Error, context: &'static str) -> TimetableError {
    TimetableError::Persistence(eyre::Report::new(err).wrap_err(context))
}

/// Like [`persistence`], but recognises a violated overlap constraint.
fn write_error(err: sqlx::Error, context: &'static str) -> TimetableError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(EXCLUSION_VIOLATION) {
            return match db_err.constraint().and_then(constraint_dimension) {
                Some(dimension) => TimetableError::Conflict(ConflictReport::rejected(dimension)),
                None => TimetableError::Persistence(eyre!(
                    "Unexpected exclusion constraint violation: {}",
                    db_err.message()
                )),
            };
        }
    }

    persistence(err, context)
}
