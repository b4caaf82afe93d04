use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/departments",
            get(handlers::departments::list_departments),
        )
        .route(
            "/api/departments",
            post(handlers::departments::create_department),
        )
        .route(
            "/api/departments/:id",
            get(handlers::departments::get_department),
        )
        .route(
            "/api/departments/:id",
            put(handlers::departments::update_department),
        )
        .route(
            "/api/departments/:id",
            delete(handlers::departments::delete_department),
        )
}
