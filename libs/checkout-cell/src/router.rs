use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn checkout_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/checkout", post(handlers::create_checkout_session))
        .route("/purchases", get(handlers::list_purchases))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
