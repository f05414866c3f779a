use crate::{error::AppResult, models::Product};

/// Source of the catalog snapshot handed to the recommender
///
/// Every request loads the full catalog once, before any filtering happens.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn load_catalog(&self) -> AppResult<Vec<Product>>;
}

/// Fixed catalog held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn load_catalog(&self) -> AppResult<Vec<Product>> {
        Ok(self.products.clone())
    }
}
