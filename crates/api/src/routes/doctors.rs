use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/doctors", get(handlers::doctors::list_doctors))
        .route("/api/doctors", post(handlers::doctors::create_doctor))
        .route("/api/doctors/:id", get(handlers::doctors::get_doctor))
        .route("/api/doctors/:id", put(handlers::doctors::update_doctor))
        .route("/api/doctors/:id", delete(handlers::doctors::delete_doctor))
}
