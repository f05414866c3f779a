use serde::Deserialize;

pub mod product;

pub use product::{CartItem, Category, CategoryKind, Product, ProductImage};

/// Body of `POST /api/v1/recommendations`
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    /// A missing or null cart is treated as an empty one
    #[serde(
        default,
        rename = "cartItems",
        alias = "cart_items",
        deserialize_with = "product::null_as_default"
    )]
    pub cart_items: Vec<CartItem>,
}
