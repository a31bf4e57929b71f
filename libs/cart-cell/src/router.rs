use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn cart_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/cart", get(handlers::get_cart))
        .route("/cart/add", post(handlers::add_to_cart))
        .route("/cart/update", patch(handlers::update_cart_item))
        .route("/cart/remove/{item_id}", delete(handlers::remove_cart_item))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
