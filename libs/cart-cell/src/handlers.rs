use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use shared_config::AppConfig;
use shared_models::{auth::User, error::AppError};
use uuid::Uuid;

use crate::models::{AddToCartRequest, CartError, CartResponse, UpdateCartItemRequest};
use crate::services::cart::CartService;

fn map_cart_error(err: CartError) -> AppError {
    match err {
        CartError::ProductNotFound => AppError::NotFound("Product not found".to_string()),
        CartError::ItemNotFound => AppError::NotFound("Cart item not found".to_string()),
        CartError::Database(msg) => AppError::Database(msg),
    }
}

fn caller_id(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id).map_err(|_| AppError::BadRequest("Invalid user id".to_string()))
}

#[axum::debug_handler]
pub async fn get_cart(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<CartResponse>, AppError> {
    let user_id = caller_id(&user)?;
    let service = CartService::new(&state);
    let cart = service.get_cart(user_id).await.map_err(map_cart_error)?;
    Ok(Json(cart))
}

#[axum::debug_handler]
pub async fn add_to_cart(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(payload): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>, AppError> {
    let user_id = caller_id(&user)?;
    let product_id = payload
        .product_id
        .ok_or_else(|| AppError::BadRequest("Missing field: product_id".to_string()))?;
    let quantity = payload
        .quantity
        .ok_or_else(|| AppError::BadRequest("Missing field: quantity".to_string()))?;

    let service = CartService::new(&state);
    let cart = service
        .add_item(user_id, product_id, quantity)
        .await
        .map_err(map_cart_error)?;
    Ok(Json(cart))
}

#[axum::debug_handler]
pub async fn update_cart_item(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<Json<CartResponse>, AppError> {
    let user_id = caller_id(&user)?;
    let item_id = payload
        .item_id
        .ok_or_else(|| AppError::BadRequest("Missing field: item_id".to_string()))?;
    let quantity = payload
        .quantity
        .ok_or_else(|| AppError::BadRequest("Missing field: quantity".to_string()))?;

    let service = CartService::new(&state);
    let cart = service
        .update_item(user_id, item_id, quantity)
        .await
        .map_err(map_cart_error)?;
    Ok(Json(cart))
}

#[axum::debug_handler]
pub async fn remove_cart_item(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(item_id): Path<i64>,
) -> Result<Json<CartResponse>, AppError> {
    let user_id = caller_id(&user)?;
    let service = CartService::new(&state);
    let cart = service
        .remove_item(user_id, item_id)
        .await
        .map_err(map_cart_error)?;
    Ok(Json(cart))
}
