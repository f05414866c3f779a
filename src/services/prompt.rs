//! Prompt and reply contract for the ranking model
//!
//! The model receives the cart and the platform-filtered catalog as plain
//! text and must answer with nothing but a JSON array of product IDs. Replies
//! are validated strictly: anything other than an array of integers is an
//! error, which the selector turns into a fallback.

use serde_json::Value;

use crate::models::{CartItem, CategoryKind, Product};

const POLICY: &str = "\
CRITICAL INSTRUCTIONS:
1. QUANTITY: Recommend exactly 4 products from the catalog. Reaching this number is MANDATORY whenever the catalog has enough products of the same platform/family.
2. CONSOLE RULE: If the shopper has a game but NO console in the cart, you may recommend the console of the SAME PLATFORM.
3. PRIORITY (BROAD MATCH):
   - Tier 1: Same series (e.g. Xbox 360) + same genre (e.g. Action).
   - Tier 2: Same series + different genre. (IMPORTANT: recommend these when Tier 1 runs out.)
   - Tier 3: Same family/platform (e.g. Xbox) + same genre.
   - Tier 4: Same family/platform + different genre.
4. GOAL: The shopper wants variety within their console. Do NOT restrict yourself to the genre. If they buy a football game, also recommend shooters or action games AS LONG AS they are for the same console.

Return ONLY a JSON array with the product IDs.
Example: [1, 2, 3, 4]";

/// Errors raised while interpreting a model reply
#[derive(thiserror::Error, Debug)]
pub enum ReplyError {
    #[error("reply is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a JSON array, got {0}")]
    NotAnArray(&'static str),

    #[error("product id is not an integer: {0}")]
    NonIntegerId(String),
}

/// Renders platform, series and genre tags, or `General` when there are none
pub fn format_tags(product: &Product) -> String {
    let tiers = [
        ("PLATFORM", CategoryKind::Platform),
        ("SERIES", CategoryKind::Series),
        ("GENRE", CategoryKind::Genre),
    ];

    let sections: Vec<String> = tiers
        .iter()
        .filter_map(|(label, kind)| {
            let names: Vec<&str> = product.category_names(kind).collect();
            if names.is_empty() {
                None
            } else {
                Some(format!("{}: {}", label, names.join(", ")))
            }
        })
        .collect();

    if sections.is_empty() {
        "General".to_string()
    } else {
        sections.join(" | ")
    }
}

fn cart_line(item: &CartItem) -> String {
    format!(
        "- {} ({}, Price: ${})",
        item.product.name,
        format_tags(&item.product),
        item.product.price
    )
}

fn catalog_line(product: &Product) -> String {
    format!(
        "- ID: {}, Name: {}, {}, Price: ${}",
        product.id,
        product.name,
        format_tags(product),
        product.price
    )
}

/// Builds the ranking instruction for a cart and its compatible catalog
pub fn build_prompt(cart: &[CartItem], catalog: &[Product]) -> String {
    let cart_context = cart.iter().map(cart_line).collect::<Vec<_>>().join("\n");
    let catalog_context = catalog.iter().map(catalog_line).collect::<Vec<_>>().join("\n");

    format!(
        "You are an expert video game sales assistant.\n\n\
         PRODUCTS IN THE CART:\n{}\n\n\
         AVAILABLE CATALOG (FILTERED BY COMPATIBLE PLATFORM):\n{}\n\n\
         {}\n",
        cart_context, catalog_context, POLICY
    )
}

/// Removes markdown code fences (optionally tagged `json`) and surrounding whitespace
pub fn strip_code_fences(reply: &str) -> String {
    reply
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parses a model reply into product IDs
pub fn parse_product_ids(reply: &str) -> Result<Vec<i64>, ReplyError> {
    let cleaned = strip_code_fences(reply);
    let value: Value = serde_json::from_str(&cleaned)?;

    let items = value
        .as_array()
        .ok_or_else(|| ReplyError::NotAnArray(json_kind(&value)))?;

    items
        .iter()
        .map(|item| {
            item.as_i64()
                .ok_or_else(|| ReplyError::NonIntegerId(item.to_string()))
        })
        .collect()
}
