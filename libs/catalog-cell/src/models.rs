use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Row in the `categories` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

/// Category as served to clients, with the derived root-to-node path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub parent: Option<i64>,
    pub path: String,
}

/// Row in the `products` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub item_id: String,
    pub category_id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: Option<String>,
    pub all_image_urls: Value,
    pub item_specifications: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: i64,
    pub item_id: String,
    pub category: Option<CategoryResponse>,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: Option<String>,
    pub all_image_urls: Value,
    pub item_specifications: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthcarePackage {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub features: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Category not found")]
    CategoryNotFound,

    #[error("Product not found")]
    ProductNotFound,

    #[error("Database error: {0}")]
    Database(String),
}
