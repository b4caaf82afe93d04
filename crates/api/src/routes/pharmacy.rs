use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/pharmacy/medicines",
            get(handlers::pharmacy::list_medicines),
        )
        .route(
            "/api/pharmacy/inventory/batches",
            get(handlers::pharmacy::list_batches),
        )
        .route(
            "/api/pharmacy/inventory/logs",
            get(handlers::pharmacy::list_logs),
        )
        .route(
            "/api/pharmacy/inventory/in",
            post(handlers::pharmacy::inventory_in),
        )
        .route(
            "/api/pharmacy/inventory/out",
            post(handlers::pharmacy::inventory_out),
        )
        .route(
            "/api/pharmacy/prescriptions",
            get(handlers::pharmacy::list_prescriptions),
        )
        .route(
            "/api/pharmacy/prescriptions/:id/status",
            patch(handlers::pharmacy::update_prescription_status),
        )
        .route(
            "/api/pharmacy/suppliers",
            get(handlers::pharmacy::list_suppliers),
        )
        .route(
            "/api/pharmacy/suppliers",
            post(handlers::pharmacy::create_supplier),
        )
        .route("/api/pharmacy/orders", get(handlers::pharmacy::list_orders))
        .route(
            "/api/pharmacy/orders",
            post(handlers::pharmacy::create_order),
        )
        .route(
            "/api/pharmacy/orders/:id/status",
            patch(handlers::pharmacy::update_order_status),
        )
}
