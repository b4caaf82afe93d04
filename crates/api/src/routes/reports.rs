use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/reports/daily/visits",
            get(handlers::reports::daily_visits),
        )
        .route(
            "/api/reports/daily/drugs",
            get(handlers::reports::daily_drugs),
        )
        .route(
            "/api/reports/monthly/visits",
            get(handlers::reports::monthly_visits),
        )
        .route(
            "/api/reports/monthly/drugs",
            get(handlers::reports::monthly_drugs),
        )
        .route("/api/reports/custom", get(handlers::reports::custom_report))
}
