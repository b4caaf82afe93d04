use axum::{routing::get, Json, Router};
use omms_core::response::Envelope;
use std::sync::Arc;

use crate::ApiState;

async fn health_check() -> Json<Envelope<String>> {
    Json(Envelope::ok("ok".to_string()))
}

async fn version() -> Json<Envelope<String>> {
    Json(Envelope::ok(env!("CARGO_PKG_VERSION").to_string()))
}

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version))
}
