use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;
use timetable_core::models::{
    conflict::{ConflictCheckRequest, ConflictCheckResponse},
    slot::{SlotFields, SlotFilter, TimetableSlot},
    weekly::WeeklyTimetable,
};
use uuid::Uuid;

use crate::{
    ApiState,
    extract::{AppJson, AppPath, AppQuery},
    middleware::error_handling::AppError,
};

#[axum::debug_handler]
pub async fn list_slots(
    State(state): State<Arc<ApiState>>,
    AppQuery(filter): AppQuery<SlotFilter>,
) -> Result<Json<Vec<TimetableSlot>>, AppError> {
    let slots = state.slots.query(&filter).await?;
    Ok(Json(slots))
}

/// Active slots matching the filter, grouped by weekday.
#[axum::debug_handler]
pub async fn weekly_timetable(
    State(state): State<Arc<ApiState>>,
    AppQuery(filter): AppQuery<SlotFilter>,
) -> Result<Json<WeeklyTimetable>, AppError> {
    let weekly = state.slots.weekly(&filter).await?;
    Ok(Json(weekly))
}

#[axum::debug_handler]
pub async fn get_slot(
    State(state): State<Arc<ApiState>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<TimetableSlot>, AppError> {
    let slot = state.slots.get(id).await?;
    Ok(Json(slot))
}

#[axum::debug_handler]
pub async fn create_slot(
    State(state): State<Arc<ApiState>>,
    AppJson(payload): AppJson<SlotFields>,
) -> Result<(StatusCode, Json<TimetableSlot>), AppError> {
    let slot = state.slots.create(payload).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

/// Partial update: omitted fields keep their stored values.
#[axum::debug_handler]
pub async fn update_slot(
    State(state): State<Arc<ApiState>>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<SlotFields>,
) -> Result<Json<TimetableSlot>, AppError> {
    let slot = state.slots.update(id, payload).await?;
    Ok(Json(slot))
}

#[axum::debug_handler]
pub async fn deactivate_slot(
    State(state): State<Arc<ApiState>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<TimetableSlot>, AppError> {
    let slot = state.slots.deactivate(id).await?;
    Ok(Json(slot))
}

#[axum::debug_handler]
pub async fn delete_slot(
    State(state): State<Arc<ApiState>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.slots.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn check_conflicts(
    State(state): State<Arc<ApiState>>,
    AppJson(payload): AppJson<ConflictCheckRequest>,
) -> Result<Json<ConflictCheckResponse>, AppError> {
    let report = state
        .slots
        .check_only(payload.fields, payload.exclude_id)
        .await?;
    Ok(Json(report.into()))
}
