use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_cell::models::ProductRecord;

/// Row in the `carts` table; one per user, created on first use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartRecord {
    pub id: i64,
    pub user_id: Uuid,
}

/// Row in the `cart_items` table. UNIQUE (cart_id, product_id): repeated
/// adds aggregate into one row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemRecord {
    pub id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemResponse {
    pub id: i64,
    pub product: Option<ProductRecord>,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub id: i64,
    pub user_id: Uuid,
    pub items: Vec<CartItemResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: Option<i64>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCartItemRequest {
    pub item_id: Option<i64>,
    pub quantity: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Cart item not found")]
    ItemNotFound,

    #[error("Database error: {0}")]
    Database(String),
}
