use std::{collections::HashSet, sync::Arc, time::Duration};

use crate::{
    error::AppError,
    models::{CartItem, Product},
    services::{
        catalog_filter::filter_catalog,
        prompt::{build_prompt, parse_product_ids, ReplyError},
        providers::ModelClient,
    },
};

/// Maximum number of products returned per request
pub const RECOMMENDATION_LIMIT: usize = 4;

/// Why a ranking attempt was abandoned in favour of the fallback
#[derive(thiserror::Error, Debug)]
enum RankError {
    #[error(transparent)]
    Model(#[from] AppError),

    #[error(transparent)]
    Reply(#[from] ReplyError),
}

/// Cart-aware product recommender
///
/// Narrows the catalog to platform-compatible products, asks the model to
/// rank them, and resolves the returned IDs back to catalog entries. Model
/// failures, timeouts and malformed replies never reach the caller: they
/// degrade to a deterministic pick from the filtered catalog.
#[derive(Clone)]
pub struct Recommender {
    model: Arc<dyn ModelClient>,
    timeout: Option<Duration>,
}

impl Recommender {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self {
            model,
            timeout: None,
        }
    }

    /// Bounds each model call; an elapsed call is handled like a failed one
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Recommends up to four products for the cart
    pub async fn recommend(&self, cart: &[CartItem], catalog: &[Product]) -> Vec<Product> {
        if cart.is_empty() {
            return trending(catalog);
        }

        let filtered = filter_catalog(cart, catalog);

        tracing::debug!(
            cart_items = cart.len(),
            catalog_size = catalog.len(),
            filtered_size = filtered.len(),
            "Catalog filtered by cart platforms"
        );

        match self.rank(cart, &filtered).await {
            Ok(ids) => {
                let picked = resolve(&filtered, &ids);
                tracing::info!(
                    provider = self.model.name(),
                    suggested = ids.len(),
                    resolved = picked.len(),
                    "Model recommendations resolved"
                );
                picked
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.model.name(),
                    error = %e,
                    "Model ranking failed, using fallback recommendations"
                );
                fallback(cart, &filtered)
            }
        }
    }

    async fn rank(&self, cart: &[CartItem], filtered: &[Product]) -> Result<Vec<i64>, RankError> {
        let prompt = build_prompt(cart, filtered);

        let reply = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.model.generate(&prompt))
                .await
                .map_err(|_| AppError::Timeout(limit.as_millis()))??,
            None => self.model.generate(&prompt).await?,
        };

        Ok(parse_product_ids(&reply)?)
    }
}

/// Default pick for an empty cart: the head of the catalog
fn trending(catalog: &[Product]) -> Vec<Product> {
    catalog.iter().take(RECOMMENDATION_LIMIT).cloned().collect()
}

/// Keeps filtered entries named by the model, in catalog order
fn resolve(filtered: &[Product], ids: &[i64]) -> Vec<Product> {
    let wanted: HashSet<i64> = ids.iter().copied().collect();

    filtered
        .iter()
        .filter(|product| wanted.contains(&product.id))
        .take(RECOMMENDATION_LIMIT)
        .cloned()
        .collect()
}

/// First filtered entries that are not already in the cart
fn fallback(cart: &[CartItem], filtered: &[Product]) -> Vec<Product> {
    let in_cart: HashSet<i64> = cart.iter().map(CartItem::id).collect();

    filtered
        .iter()
        .filter(|product| !in_cart.contains(&product.id))
        .take(RECOMMENDATION_LIMIT)
        .cloned()
        .collect()
}
