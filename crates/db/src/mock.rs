use async_trait::async_trait;
use mockall::mock;
use timetable_core::errors::TimetableResult;
use timetable_core::store::SlotTransaction;

use crate::DbPool;

// Mock store for exercising service behaviour around storage failures
mock! {
    pub SlotStore {}

    #[async_trait]
    impl timetable_core::store::SlotStore for SlotStore {
        async fn begin(&self) -> TimetableResult<Box<dyn SlotTransaction>>;
    }
}

/// Connects to the database named by `TEST_DATABASE_URL` and bootstraps the
/// schema, or returns `None` when the variable is unset.
pub async fn connect_test_pool() -> Option<DbPool> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(4)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    crate::schema::initialize_database(&pool)
        .await
        .expect("Failed to initialize test database schema");

    Some(pool)
}
