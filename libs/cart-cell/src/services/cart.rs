use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use uuid::Uuid;

use crate::models::{CartError, CartItemRecord, CartItemResponse, CartRecord, CartResponse};
use catalog_cell::models::ProductRecord;

/// Per-user shopping cart backed by the `carts` / `cart_items` tables.
#[derive(Clone)]
pub struct CartService {
    supabase: Arc<SupabaseClient>,
}

impl CartService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// Fetches the caller's cart, creating an empty one on first use.
    pub async fn get_or_create_cart(&self, user_id: Uuid) -> Result<CartRecord, CartError> {
        let existing: Vec<CartRecord> = self
            .supabase
            .request(
                reqwest::Method::GET,
                &format!("/rest/v1/carts?user_id=eq.{}", user_id),
                None,
            )
            .await
            .map_err(|e| CartError::Database(e.to_string()))?;

        if let Some(cart) = existing.into_iter().next() {
            return Ok(cart);
        }

        tracing::info!(user_id = %user_id, "Creating cart");
        let created: Vec<CartRecord> = self
            .supabase
            .insert_returning("/rest/v1/carts", json!({ "user_id": user_id }))
            .await
            .map_err(|e| CartError::Database(e.to_string()))?;

        created
            .into_iter()
            .next()
            .ok_or_else(|| CartError::Database("Cart insert returned no rows".to_string()))
    }

    /// Full cart view with product rows embedded into each item.
    pub async fn get_cart(&self, user_id: Uuid) -> Result<CartResponse, CartError> {
        let cart = self.get_or_create_cart(user_id).await?;
        let items = self.list_items(cart.id).await?;
        self.build_response(cart, items).await
    }

    /// Adds `quantity` of a product. An existing line for the same product
    /// absorbs the quantity instead of creating a duplicate row.
    pub async fn add_item(
        &self,
        user_id: Uuid,
        product_id: i64,
        quantity: i64,
    ) -> Result<CartResponse, CartError> {
        let products: Vec<ProductRecord> = self
            .supabase
            .request(
                reqwest::Method::GET,
                &format!("/rest/v1/products?id=eq.{}", product_id),
                None,
            )
            .await
            .map_err(|e| CartError::Database(e.to_string()))?;
        if products.is_empty() {
            return Err(CartError::ProductNotFound);
        }

        let cart = self.get_or_create_cart(user_id).await?;

        let existing: Vec<CartItemRecord> = self
            .supabase
            .request(
                reqwest::Method::GET,
                &format!(
                    "/rest/v1/cart_items?cart_id=eq.{}&product_id=eq.{}",
                    cart.id, product_id
                ),
                None,
            )
            .await
            .map_err(|e| CartError::Database(e.to_string()))?;

        match existing.into_iter().next() {
            Some(item) => {
                let _: Vec<CartItemRecord> = self
                    .supabase
                    .update_returning(
                        &format!("/rest/v1/cart_items?id=eq.{}", item.id),
                        json!({ "quantity": item.quantity + quantity }),
                    )
                    .await
                    .map_err(|e| CartError::Database(e.to_string()))?;
            }
            None => {
                let _: Vec<CartItemRecord> = self
                    .supabase
                    .insert_returning(
                        "/rest/v1/cart_items",
                        json!({
                            "cart_id": cart.id,
                            "product_id": product_id,
                            "quantity": quantity,
                        }),
                    )
                    .await
                    .map_err(|e| CartError::Database(e.to_string()))?;
            }
        }

        let items = self.list_items(cart.id).await?;
        self.build_response(cart, items).await
    }

    /// Overwrites an item's quantity. The item must belong to the caller's
    /// cart or the update is rejected as not found.
    pub async fn update_item(
        &self,
        user_id: Uuid,
        item_id: i64,
        quantity: i64,
    ) -> Result<CartResponse, CartError> {
        let cart = self.get_or_create_cart(user_id).await?;
        self.find_owned_item(cart.id, item_id).await?;

        let _: Vec<CartItemRecord> = self
            .supabase
            .update_returning(
                &format!("/rest/v1/cart_items?id=eq.{}", item_id),
                json!({ "quantity": quantity }),
            )
            .await
            .map_err(|e| CartError::Database(e.to_string()))?;

        let items = self.list_items(cart.id).await?;
        self.build_response(cart, items).await
    }

    /// Deletes one item from the caller's cart.
    pub async fn remove_item(
        &self,
        user_id: Uuid,
        item_id: i64,
    ) -> Result<CartResponse, CartError> {
        let cart = self.get_or_create_cart(user_id).await?;
        self.find_owned_item(cart.id, item_id).await?;

        self.supabase
            .delete(&format!("/rest/v1/cart_items?id=eq.{}", item_id))
            .await
            .map_err(|e| CartError::Database(e.to_string()))?;

        let items = self.list_items(cart.id).await?;
        self.build_response(cart, items).await
    }

    /// Drops the caller's cart wholesale. Cart items cascade with it.
    /// Used after a successful medicine checkout.
    pub async fn clear_cart(&self, user_id: Uuid) -> Result<(), CartError> {
        self.supabase
            .delete(&format!("/rest/v1/carts?user_id=eq.{}", user_id))
            .await
            .map_err(|e| CartError::Database(e.to_string()))
    }

    pub async fn list_items(&self, cart_id: i64) -> Result<Vec<CartItemRecord>, CartError> {
        self.supabase
            .request(
                reqwest::Method::GET,
                &format!("/rest/v1/cart_items?cart_id=eq.{}&order=id.asc", cart_id),
                None,
            )
            .await
            .map_err(|e| CartError::Database(e.to_string()))
    }

    async fn find_owned_item(
        &self,
        cart_id: i64,
        item_id: i64,
    ) -> Result<CartItemRecord, CartError> {
        let rows: Vec<CartItemRecord> = self
            .supabase
            .request(
                reqwest::Method::GET,
                &format!(
                    "/rest/v1/cart_items?id=eq.{}&cart_id=eq.{}",
                    item_id, cart_id
                ),
                None,
            )
            .await
            .map_err(|e| CartError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(CartError::ItemNotFound)
    }

    async fn build_response(
        &self,
        cart: CartRecord,
        items: Vec<CartItemRecord>,
    ) -> Result<CartResponse, CartError> {
        let products = self.fetch_products(&items).await?;
        Ok(CartResponse {
            id: cart.id,
            user_id: cart.user_id,
            items: items
                .into_iter()
                .map(|item| CartItemResponse {
                    id: item.id,
                    product: products.get(&item.product_id).cloned(),
                    quantity: item.quantity,
                })
                .collect(),
        })
    }

    async fn fetch_products(
        &self,
        items: &[CartItemRecord],
    ) -> Result<HashMap<i64, ProductRecord>, CartError> {
        if items.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<String> = items.iter().map(|i| i.product_id.to_string()).collect();
        let products: Vec<ProductRecord> = self
            .supabase
            .request(
                reqwest::Method::GET,
                &format!("/rest/v1/products?id=in.({})", ids.join(",")),
                None,
            )
            .await
            .map_err(|e| CartError::Database(e.to_string()))?;

        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }
}
