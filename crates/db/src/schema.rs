use eyre::{Result, WrapErr};
use sqlx::{Pool, Postgres};
use timetable_core::models::conflict::Dimension;
use timetable_core::models::slot::MAX_ACADEMIC_YEAR_LEN;
use tracing::info;

pub const TEACHER_OVERLAP_CONSTRAINT: &str = "timetable_slots_teacher_no_overlap";
pub const GROUP_OVERLAP_CONSTRAINT: &str = "timetable_slots_group_no_overlap";
pub const ROOM_OVERLAP_CONSTRAINT: &str = "timetable_slots_room_no_overlap";

/// Maps an exclusion constraint name back to the dimension it protects.
pub fn constraint_dimension(constraint: &str) -> Option<Dimension> {
    match constraint {
        TEACHER_OVERLAP_CONSTRAINT => Some(Dimension::Teacher),
        GROUP_OVERLAP_CONSTRAINT => Some(Dimension::Group),
        ROOM_OVERLAP_CONSTRAINT => Some(Dimension::Room),
        _ => None,
    }
}

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Equality on scalar columns inside a GiST exclusion constraint
    sqlx::query("CREATE EXTENSION IF NOT EXISTS btree_gist")
        .execute(pool)
        .await
        .wrap_err("Failed to enable btree_gist")?;

    // Half-open time-of-day range, '[)' by default
    sqlx::query(
        r#"
        DO $$
        BEGIN
            CREATE TYPE timerange AS RANGE (subtype = time);
        EXCEPTION
            WHEN duplicate_object THEN NULL;
        END
        $$;
        "#,
    )
    .execute(pool)
    .await
    .wrap_err("Failed to create timerange type")?;

    // Create timetable_slots table
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS timetable_slots (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            subject_id BIGINT NOT NULL,
            teacher_id BIGINT NOT NULL,
            group_id BIGINT NOT NULL,
            room_id BIGINT NOT NULL,
            day_of_week SMALLINT NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            academic_year VARCHAR({max_year}) NOT NULL,
            semester SMALLINT NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_time_range CHECK (end_time > start_time),
            CONSTRAINT valid_day_of_week CHECK (day_of_week BETWEEN 1 AND 7),
            CONSTRAINT valid_semester CHECK (semester IN (1, 2)),
            CONSTRAINT {teacher} EXCLUDE USING gist (
                teacher_id WITH =,
                day_of_week WITH =,
                academic_year WITH =,
                semester WITH =,
                timerange(start_time, end_time) WITH &&
            ) WHERE (is_active),
            CONSTRAINT {group} EXCLUDE USING gist (
                group_id WITH =,
                day_of_week WITH =,
                academic_year WITH =,
                semester WITH =,
                timerange(start_time, end_time) WITH &&
            ) WHERE (is_active),
            CONSTRAINT {room} EXCLUDE USING gist (
                room_id WITH =,
                day_of_week WITH =,
                academic_year WITH =,
                semester WITH =,
                timerange(start_time, end_time) WITH &&
            ) WHERE (is_active)
        );
        "#,
        teacher = TEACHER_OVERLAP_CONSTRAINT,
        group = GROUP_OVERLAP_CONSTRAINT,
        room = ROOM_OVERLAP_CONSTRAINT,
        max_year = MAX_ACADEMIC_YEAR_LEN,
    ))
    .execute(pool)
    .await
    .wrap_err("Failed to create timetable_slots table")?;

    // Create indexes for the read paths
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_timetable_slots_period ON timetable_slots(academic_year, semester, day_of_week)",
        "CREATE INDEX IF NOT EXISTS idx_timetable_slots_teacher_id ON timetable_slots(teacher_id)",
        "CREATE INDEX IF NOT EXISTS idx_timetable_slots_group_id ON timetable_slots(group_id)",
        "CREATE INDEX IF NOT EXISTS idx_timetable_slots_room_id ON timetable_slots(room_id)",
    ] {
        sqlx::query(statement)
            .execute(pool)
            .await
            .wrap_err_with(|| format!("Failed to run: {}", statement))?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
