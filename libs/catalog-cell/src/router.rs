use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn catalog_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/categories", get(handlers::list_categories))
        .route("/categories/{category_id}", get(handlers::get_category))
        .route("/products", get(handlers::list_products))
        .route("/product/{item_id}", get(handlers::get_product))
        .route("/packages", get(handlers::list_packages))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
