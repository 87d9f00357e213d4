use std::sync::Arc;

use axum_test::TestServer;
use fake::Fake;
use serde_json::{Value, json};
use timetable_api::{ApiState, router};
use timetable_db::memory::MemorySlotStore;

pub struct TestContext {
    pub store: MemorySlotStore,
    pub server: TestServer,
}

impl TestContext {
    /// Router backed by a fresh in-memory store.
    pub fn new() -> Self {
        let store = MemorySlotStore::new();
        let state = Arc::new(ApiState::new(Arc::new(store.clone())));
        let server = TestServer::new(router(state)).expect("Failed to start test server");

        Self { store, server }
    }
}

/// Random but valid resource id.
pub fn any_id() -> i64 {
    (1..100_000i64).fake()
}

/// A complete slot payload on Monday of semester 1, 2024-2025.
pub fn slot_payload(teacher_id: i64, group_id: i64, room_id: i64, start: &str, end: &str) -> Value {
    json!({
        "subject_id": any_id(),
        "teacher_id": teacher_id,
        "group_id": group_id,
        "room_id": room_id,
        "day_of_week": 1,
        "start_time": start,
        "end_time": end,
        "academic_year": "2024-2025",
        "semester": 1
    })
}
