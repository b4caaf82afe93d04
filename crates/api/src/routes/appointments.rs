use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/appointments",
            get(handlers::appointments::list_appointments),
        )
        .route(
            "/api/appointments",
            post(handlers::appointments::create_appointment),
        )
        .route(
            "/api/appointments/:id",
            get(handlers::appointments::get_appointment),
        )
        .route(
            "/api/appointments/:id",
            put(handlers::appointments::update_appointment),
        )
        .route(
            "/api/appointments/:id/status",
            patch(handlers::appointments::update_appointment_status),
        )
        .route(
            "/api/appointments/:id",
            delete(handlers::appointments::cancel_appointment),
        )
}
