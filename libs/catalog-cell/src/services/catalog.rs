use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Method;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    CatalogError, CategoryRecord, CategoryResponse, HealthcarePackage, ProductRecord,
    ProductResponse,
};

/// Parent chains longer than this are treated as broken data rather than
/// walked forever. The hierarchy is expected to be shallow (2-3 levels).
const MAX_CATEGORY_DEPTH: usize = 32;

pub struct CatalogService {
    supabase: Arc<SupabaseClient>,
}

impl CatalogService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryResponse>, CatalogError> {
        let categories = self.fetch_categories().await?;
        let by_id: HashMap<i64, CategoryRecord> =
            categories.iter().map(|c| (c.id, c.clone())).collect();

        Ok(categories
            .iter()
            .map(|c| to_response(c, &by_id))
            .collect())
    }

    pub async fn get_category(&self, category_id: i64) -> Result<CategoryResponse, CatalogError> {
        let categories = self.fetch_categories().await?;
        let by_id: HashMap<i64, CategoryRecord> =
            categories.iter().map(|c| (c.id, c.clone())).collect();

        by_id
            .get(&category_id)
            .map(|c| to_response(c, &by_id))
            .ok_or(CatalogError::CategoryNotFound)
    }

    pub async fn list_products(&self) -> Result<Vec<ProductResponse>, CatalogError> {
        let products: Vec<ProductRecord> = self
            .supabase
            .request(Method::GET, "/rest/v1/products?order=id.asc", None)
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        debug!("Fetched {} products", products.len());

        let categories = self.fetch_categories().await?;
        let by_id: HashMap<i64, CategoryRecord> =
            categories.iter().map(|c| (c.id, c.clone())).collect();

        Ok(products
            .into_iter()
            .map(|p| embed_category(p, &by_id))
            .collect())
    }

    /// Products are addressed by their business key, not the surrogate id.
    pub async fn get_product(&self, item_id: &str) -> Result<ProductResponse, CatalogError> {
        let path = format!("/rest/v1/products?item_id=eq.{}", urlencoding::encode(item_id));
        let result: Vec<ProductRecord> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let product = result.into_iter().next().ok_or(CatalogError::ProductNotFound)?;

        let categories = self.fetch_categories().await?;
        let by_id: HashMap<i64, CategoryRecord> =
            categories.iter().map(|c| (c.id, c.clone())).collect();

        Ok(embed_category(product, &by_id))
    }

    pub async fn list_packages(&self) -> Result<Vec<HealthcarePackage>, CatalogError> {
        self.supabase
            .request(Method::GET, "/rest/v1/healthcare_packages?order=id.asc", None)
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))
    }

    async fn fetch_categories(&self) -> Result<Vec<CategoryRecord>, CatalogError> {
        self.supabase
            .request(Method::GET, "/rest/v1/categories?order=id.asc", None)
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))
    }
}

/// Walk the parent chain and join names root-first with " > ".
pub fn category_path(category: &CategoryRecord, by_id: &HashMap<i64, CategoryRecord>) -> String {
    let mut segments = vec![category.name.clone()];
    let mut current = category.parent_id;
    let mut depth = 0;

    while let Some(parent_id) = current {
        depth += 1;
        if depth > MAX_CATEGORY_DEPTH {
            break;
        }
        match by_id.get(&parent_id) {
            Some(parent) => {
                segments.push(parent.name.clone());
                current = parent.parent_id;
            }
            None => break,
        }
    }

    segments.reverse();
    segments.join(" > ")
}

fn to_response(category: &CategoryRecord, by_id: &HashMap<i64, CategoryRecord>) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name.clone(),
        parent: category.parent_id,
        path: category_path(category, by_id),
    }
}

fn embed_category(product: ProductRecord, by_id: &HashMap<i64, CategoryRecord>) -> ProductResponse {
    let category = by_id.get(&product.category_id).map(|c| to_response(c, by_id));

    ProductResponse {
        id: product.id,
        item_id: product.item_id,
        category,
        name: product.name,
        description: product.description,
        price: product.price,
        image: product.image,
        all_image_urls: product.all_image_urls,
        item_specifications: product.item_specifications,
    }
}
