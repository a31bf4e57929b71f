use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use cart_cell::router::cart_routes;
use catalog_cell::router::catalog_routes;
use checkout_cell::router::checkout_routes;
use doctor_cell::router::doctor_routes;
use notification_cell::router::notification_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let api = Router::new()
        .merge(catalog_routes(state.clone()))
        .merge(doctor_routes(state.clone()))
        .merge(appointment_routes(state.clone()))
        .merge(cart_routes(state.clone()))
        .merge(checkout_routes(state.clone()))
        .merge(notification_routes(state.clone()));

    Router::new()
        .route("/", get(|| async { "PharmaCare API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/api", api)
}
