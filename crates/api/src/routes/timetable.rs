use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/timetable",
            get(handlers::timetable::list_slots).post(handlers::timetable::create_slot),
        )
        .route(
            "/api/timetable/weekly",
            get(handlers::timetable::weekly_timetable),
        )
        .route(
            "/api/timetable/conflicts",
            post(handlers::timetable::check_conflicts),
        )
        .route(
            "/api/timetable/:id",
            get(handlers::timetable::get_slot)
                .put(handlers::timetable::update_slot)
                .delete(handlers::timetable::delete_slot),
        )
        .route(
            "/api/timetable/:id/deactivate",
            post(handlers::timetable::deactivate_slot),
        )
}
