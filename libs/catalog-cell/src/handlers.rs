use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::CatalogError;
use crate::services::catalog::CatalogService;

fn map_catalog_error(err: CatalogError) -> AppError {
    match err {
        CatalogError::CategoryNotFound => AppError::NotFound("Category not found".to_string()),
        CatalogError::ProductNotFound => AppError::NotFound("Product not found".to_string()),
        CatalogError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_categories(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = CatalogService::new(&state);
    let categories = service.list_categories().await.map_err(map_catalog_error)?;

    Ok(Json(json!(categories)))
}

#[axum::debug_handler]
pub async fn get_category(
    State(state): State<Arc<AppConfig>>,
    Path(category_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = CatalogService::new(&state);
    let category = service
        .get_category(category_id)
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(json!(category)))
}

#[axum::debug_handler]
pub async fn list_products(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let service = CatalogService::new(&state);
    let products = service.list_products().await.map_err(map_catalog_error)?;

    Ok(Json(json!(products)))
}

#[axum::debug_handler]
pub async fn get_product(
    State(state): State<Arc<AppConfig>>,
    Path(item_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = CatalogService::new(&state);
    let product = service.get_product(&item_id).await.map_err(map_catalog_error)?;

    Ok(Json(json!(product)))
}

#[axum::debug_handler]
pub async fn list_packages(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let service = CatalogService::new(&state);
    let packages = service.list_packages().await.map_err(map_catalog_error)?;

    Ok(Json(json!(packages)))
}
