use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// Reads an explicit JSON `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Matching tier of a category
///
/// The set is open: storefront admins may tag categories with any string, and
/// anything outside the three known tiers is kept verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryKind {
    Platform,
    Series,
    Genre,
    Other(String),
}

impl Default for CategoryKind {
    fn default() -> Self {
        CategoryKind::Other("General".to_string())
    }
}

impl From<String> for CategoryKind {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "platform" | "plataforma" => CategoryKind::Platform,
            "series" | "serie" | "family" | "familia" | "family/series" => CategoryKind::Series,
            "genre" | "genero" | "género" => CategoryKind::Genre,
            _ => CategoryKind::Other(raw),
        }
    }
}

impl From<&str> for CategoryKind {
    fn from(raw: &str) -> Self {
        CategoryKind::from(raw.to_string())
    }
}

impl From<CategoryKind> for String {
    fn from(kind: CategoryKind) -> Self {
        kind.to_string()
    }
}

impl Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryKind::Platform => write!(f, "Platform"),
            CategoryKind::Series => write!(f, "Series"),
            CategoryKind::Genre => write!(f, "Genre"),
            CategoryKind::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// A catalog category attached to products
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    /// Legacy payloads carry the tier under `type`
    #[serde(default, alias = "type", deserialize_with = "null_as_default")]
    pub kind: CategoryKind,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind,
        }
    }
}

/// Gallery image of a product, in the storefront's `imagenes` shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    #[serde(
        default,
        rename = "esPrincipal",
        alias = "principal",
        deserialize_with = "null_as_default"
    )]
    pub principal: bool,
    #[serde(
        default,
        rename = "orden",
        alias = "order",
        deserialize_with = "null_as_default"
    )]
    pub order: i32,
}

/// A purchasable catalog entry
///
/// Payloads may carry either a category list (`categories`, legacy
/// `Categorias`) or a single legacy `category`/`Categoria`. Both shapes are
/// folded into `categories` at deserialization time so matching code only
/// ever sees a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProductRecord")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, rename = "imagenes", skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ProductImage>,
    pub categories: Vec<Category>,
}

impl Product {
    pub fn new(id: i64, name: impl Into<String>, price: f64, categories: Vec<Category>) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            description: None,
            image: None,
            images: Vec::new(),
            categories,
        }
    }

    /// Principal gallery image, else the first one, else the legacy `image`
    pub fn cover_image(&self) -> Option<&str> {
        self.images
            .iter()
            .find(|img| img.principal)
            .or_else(|| self.images.first())
            .map(|img| img.url.as_str())
            .or(self.image.as_deref())
    }

    /// Names of the categories of the given tier, in declaration order
    pub fn category_names<'a>(&'a self, kind: &'a CategoryKind) -> impl Iterator<Item = &'a str> {
        self.categories
            .iter()
            .filter(move |c| &c.kind == kind)
            .map(|c| c.name.as_str())
    }

    /// Lower-cased platform names used for compatibility checks
    pub fn platform_keys(&self) -> Vec<String> {
        self.category_names(&CategoryKind::Platform)
            .map(str::to_lowercase)
            .collect()
    }
}

/// Wire shape accepted for a product before category normalization
#[derive(Debug, Deserialize)]
struct ProductRecord {
    id: i64,
    name: String,
    price: f64,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default, alias = "imagenes", deserialize_with = "null_as_default")]
    images: Vec<ProductImage>,
    #[serde(default, alias = "Categorias")]
    categories: Option<Vec<Category>>,
    #[serde(default, alias = "Categoria")]
    category: Option<Category>,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        let categories = match record.categories {
            Some(list) => list,
            None => record.category.into_iter().collect(),
        };

        Product {
            id: record.id,
            name: record.name,
            price: record.price,
            description: record.description,
            image: record.image,
            images: record.images,
            categories,
        }
    }
}

/// A product in a shopper's cart
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "CartItemRecord")]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    pub fn id(&self) -> i64 {
        self.product.id
    }
}

#[derive(Debug, Deserialize)]
struct CartItemRecord {
    #[serde(flatten)]
    product: ProductRecord,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl From<CartItemRecord> for CartItem {
    fn from(record: CartItemRecord) -> Self {
        CartItem {
            product: Product::from(record.product),
            quantity: record.quantity,
        }
    }
}
