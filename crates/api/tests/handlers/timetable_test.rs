use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{TestContext, any_id, slot_payload};

async fn create(ctx: &TestContext, payload: &Value) -> Value {
    let response = ctx.server.post("/api/timetable").json(payload).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn test_health_and_version() {
    let ctx = TestContext::new();

    let health = ctx.server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["status"], "ok");

    let version = ctx.server.get("/version").await;
    version.assert_status_ok();
    assert_eq!(version.json::<Value>()["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_create_returns_flat_slot() {
    let ctx = TestContext::new();
    let teacher_id = any_id();

    let slot = create(&ctx, &slot_payload(teacher_id, 2, 3, "09:00:00", "10:30:00")).await;

    assert_eq!(slot["teacher_id"], teacher_id);
    assert_eq!(slot["start_time"], "09:00:00");
    assert_eq!(slot["end_time"], "10:30:00");
    assert_eq!(slot["is_active"], true);
    assert!(Uuid::parse_str(slot["id"].as_str().unwrap()).is_ok());
    assert_eq!(ctx.store.len().await, 1);
}

#[tokio::test]
async fn test_create_conflict_returns_409_with_details() {
    let ctx = TestContext::new();
    let existing = create(&ctx, &slot_payload(1, 1, 1, "09:00:00", "10:30:00")).await;

    let response = ctx
        .server
        .post("/api/timetable")
        .json(&slot_payload(1, 2, 2, "10:00:00", "11:00:00"))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["conflicts"][0]["dimension"], "teacher");
    assert_eq!(body["conflicts"][0]["conflicting_slots"][0]["id"], existing["id"]);
    assert!(body["error"].as_str().unwrap().contains("teacher"));
    assert_eq!(ctx.store.len().await, 1);
}

#[tokio::test]
async fn test_touching_slots_are_accepted() {
    let ctx = TestContext::new();
    create(&ctx, &slot_payload(1, 1, 1, "09:00:00", "10:00:00")).await;

    create(&ctx, &slot_payload(1, 1, 1, "10:00:00", "11:00:00")).await;

    assert_eq!(ctx.store.len().await, 2);
}

#[rstest]
#[case::inverted_range(json!({"start_time": "11:00:00", "end_time": "10:00:00"}))]
#[case::empty_range(json!({"start_time": "10:00:00", "end_time": "10:00:00"}))]
#[case::bad_day(json!({"day_of_week": 8}))]
#[case::bad_semester(json!({"semester": 3}))]
#[case::non_positive_id(json!({"room_id": 0}))]
#[case::blank_year(json!({"academic_year": "  "}))]
#[case::missing_field(json!({"teacher_id": null}))]
#[tokio::test]
async fn test_invalid_payloads_return_400(#[case] overrides: Value) {
    let ctx = TestContext::new();
    let mut payload = slot_payload(1, 1, 1, "09:00:00", "10:00:00");
    for (key, value) in overrides.as_object().unwrap() {
        payload[key] = value.clone();
    }

    let response = ctx.server.post("/api/timetable").json(&payload).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());
    assert!(ctx.store.is_empty().await);
}

#[rstest]
#[case::unparsable_time(json!({"start_time": "9am"}))]
#[case::string_id(json!({"teacher_id": "abc"}))]
#[case::day_out_of_range(json!({"day_of_week": 70000}))]
#[case::fractional_semester(json!({"semester": 1.5}))]
#[tokio::test]
async fn test_unparsable_payloads_return_400_json(#[case] overrides: Value) {
    let ctx = TestContext::new();
    let mut payload = slot_payload(1, 1, 1, "09:00:00", "10:00:00");
    for (key, value) in overrides.as_object().unwrap() {
        payload[key] = value.clone();
    }

    let create = ctx.server.post("/api/timetable").json(&payload).await;
    create.assert_status(StatusCode::BAD_REQUEST);
    let error = create.json::<Value>()["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Validation error: "), "{}", error);

    let check = ctx.server.post("/api/timetable/conflicts").json(&payload).await;
    check.assert_status(StatusCode::BAD_REQUEST);
    assert!(check.json::<Value>()["error"].is_string());

    assert!(ctx.store.is_empty().await);
}

#[tokio::test]
async fn test_unparsable_update_body_leaves_slot_unchanged() {
    let ctx = TestContext::new();
    let slot = create(&ctx, &slot_payload(1, 1, 1, "09:00:00", "10:00:00")).await;
    let path = format!("/api/timetable/{}", slot["id"].as_str().unwrap());

    let response = ctx
        .server
        .put(&path)
        .json(&json!({"end_time": "half past ten"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());
    assert_eq!(ctx.server.get(&path).await.json::<Value>(), slot);
}

#[tokio::test]
async fn test_malformed_id_and_filter_return_400_json() {
    let ctx = TestContext::new();

    let by_id = ctx.server.get("/api/timetable/not-a-uuid").await;
    by_id.assert_status(StatusCode::BAD_REQUEST);
    assert!(by_id.json::<Value>()["error"].is_string());

    let listing = ctx.server.get("/api/timetable?semester=first").await;
    listing.assert_status(StatusCode::BAD_REQUEST);
    assert!(listing.json::<Value>()["error"].is_string());

    let weekly = ctx.server.get("/api/timetable/weekly?teacher_id=abc").await;
    weekly.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overlong_academic_year_returns_400() {
    let ctx = TestContext::new();
    let mut payload = slot_payload(1, 1, 1, "09:00:00", "10:00:00");
    payload["academic_year"] = json!("2024-2025-autumn-evening-cohort-b");

    let response = ctx.server.post("/api/timetable").json(&payload).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(
        response.json::<Value>()["error"]
            .as_str()
            .unwrap()
            .contains("academic_year")
    );
}

#[tokio::test]
async fn test_get_unknown_slot_returns_404() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get(&format!("/api/timetable/{}", Uuid::new_v4()))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let ctx = TestContext::new();
    let slot = create(&ctx, &slot_payload(1, 1, 1, "09:00:00", "10:00:00")).await;
    let id = slot["id"].as_str().unwrap();

    let response = ctx
        .server
        .put(&format!("/api/timetable/{}", id))
        .json(&json!({"room_id": 42}))
        .await;

    response.assert_status_ok();
    let updated = response.json::<Value>();
    assert_eq!(updated["room_id"], 42);
    assert_eq!(updated["teacher_id"], slot["teacher_id"]);
    assert_eq!(updated["start_time"], slot["start_time"]);
}

#[tokio::test]
async fn test_update_into_conflict_leaves_slot_unchanged() {
    let ctx = TestContext::new();
    create(&ctx, &slot_payload(1, 1, 1, "09:00:00", "10:00:00")).await;
    let other = create(&ctx, &slot_payload(2, 2, 2, "11:00:00", "12:00:00")).await;
    let path = format!("/api/timetable/{}", other["id"].as_str().unwrap());

    let response = ctx
        .server
        .put(&path)
        .json(&json!({"room_id": 1, "start_time": "09:30:00"}))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["conflicts"][0]["dimension"], "room");

    let current = ctx.server.get(&path).await.json::<Value>();
    assert_eq!(current["room_id"], 2);
    assert_eq!(current["start_time"], "11:00:00");
}

#[tokio::test]
async fn test_deactivate_then_delete() {
    let ctx = TestContext::new();
    let slot = create(&ctx, &slot_payload(1, 1, 1, "09:00:00", "10:00:00")).await;
    let path = format!("/api/timetable/{}", slot["id"].as_str().unwrap());

    let response = ctx.server.post(&format!("{}/deactivate", path)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["is_active"], false);

    ctx.server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
    // The freed time can be booked again
    create(&ctx, &slot_payload(1, 1, 1, "09:00:00", "10:00:00")).await;

    ctx.server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
    ctx.server.delete(&path).await.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(ctx.store.len().await, 1);
}

#[tokio::test]
async fn test_list_filters_and_orders() {
    let ctx = TestContext::new();
    let late = create(&ctx, &slot_payload(7, 1, 1, "13:00:00", "14:00:00")).await;
    let early = create(&ctx, &slot_payload(7, 2, 2, "08:00:00", "09:00:00")).await;
    create(&ctx, &slot_payload(8, 3, 3, "08:00:00", "09:00:00")).await;

    let response = ctx.server.get("/api/timetable?teacher_id=7").await;

    response.assert_status_ok();
    let slots = response.json::<Vec<Value>>();
    let ids: Vec<&Value> = slots.iter().map(|slot| &slot["id"]).collect();
    assert_eq!(ids, vec![&early["id"], &late["id"]]);
}

#[tokio::test]
async fn test_weekly_groups_every_day() {
    let ctx = TestContext::new();
    create(&ctx, &slot_payload(1, 1, 1, "09:00:00", "10:00:00")).await;

    let response = ctx
        .server
        .get("/api/timetable/weekly?academic_year=2024-2025&semester=1")
        .await;

    response.assert_status_ok();
    let days = &response.json::<Value>()["days"];
    let days = days.as_object().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days["1"].as_array().unwrap().len(), 1);
    assert!(days["7"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_check_conflicts_is_read_only() {
    let ctx = TestContext::new();
    let existing = create(&ctx, &slot_payload(1, 1, 1, "09:00:00", "10:00:00")).await;

    let mut request = slot_payload(1, 1, 1, "09:30:00", "10:30:00");
    let response = ctx
        .server
        .post("/api/timetable/conflicts")
        .json(&request)
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["has_conflicts"], true);
    let dimensions: Vec<&Value> = body["conflicts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|conflict| &conflict["dimension"])
        .collect();
    assert_eq!(dimensions, vec!["teacher", "group", "room"]);

    // Excluding the existing slot models an edit of that slot
    request["exclude_id"] = existing["id"].clone();
    let response = ctx
        .server
        .post("/api/timetable/conflicts")
        .json(&request)
        .await;
    assert_eq!(response.json::<Value>()["has_conflicts"], false);

    assert_eq!(ctx.store.len().await, 1);
}
