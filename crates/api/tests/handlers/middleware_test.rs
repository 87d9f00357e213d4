use axum::body::to_bytes;
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;
use timetable_api::middleware::error_handling::{AppError, map_error};
use timetable_core::errors::TimetableError;
use timetable_core::models::conflict::{ConflictReport, Dimension};

async fn body_json(error: TimetableError) -> (StatusCode, Value) {
    let response = map_error(error);
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[rstest]
#[case::not_found(TimetableError::NotFound("slot".into()), StatusCode::NOT_FOUND)]
#[case::validation(TimetableError::Validation("semester".into()), StatusCode::BAD_REQUEST)]
#[case::invalid_range(TimetableError::InvalidRange("10:00 >= 09:00".into()), StatusCode::BAD_REQUEST)]
#[case::conflict(TimetableError::Conflict(ConflictReport::rejected(Dimension::Room)), StatusCode::CONFLICT)]
#[case::persistence(TimetableError::Persistence(eyre::eyre!("pool timed out")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_status_mapping(#[case] error: TimetableError, #[case] expected: StatusCode) {
    assert_eq!(AppError(error).status(), expected);
}

#[tokio::test]
async fn test_conflict_body_lists_dimensions() {
    let (status, body) =
        body_json(TimetableError::Conflict(ConflictReport::rejected(Dimension::Group))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["conflicts"][0]["dimension"], "group");
    assert_eq!(
        body["error"],
        "Scheduling conflict: group already has a class"
    );
}

#[tokio::test]
async fn test_persistence_details_are_not_leaked() {
    let (status, body) = body_json(TimetableError::Persistence(eyre::eyre!(
        "password authentication failed for user postgres"
    )))
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn test_validation_body_carries_message() {
    let (status, body) = body_json(TimetableError::Validation("semester must be 1 or 2".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation error: semester must be 1 or 2");
    assert!(body.get("conflicts").is_none());
}
