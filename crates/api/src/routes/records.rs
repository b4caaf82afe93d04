use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/records", get(handlers::records::list_records))
        .route("/api/records", post(handlers::records::create_record))
        .route("/api/records/:id", get(handlers::records::get_record))
        .route("/api/records/:id", put(handlers::records::update_record))
        .route(
            "/api/records/:id/status",
            patch(handlers::records::update_record_status),
        )
        .route("/api/records/:id", delete(handlers::records::delete_record))
        .route(
            "/api/record-templates",
            get(handlers::records::list_templates),
        )
        .route(
            "/api/record-templates",
            post(handlers::records::create_template),
        )
        .route(
            "/api/record-templates/:id",
            get(handlers::records::get_template),
        )
        .route(
            "/api/record-templates/:id",
            put(handlers::records::update_template),
        )
        .route(
            "/api/record-templates/:id",
            delete(handlers::records::delete_template),
        )
}
