use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use storefront_recs::{
    db::{CatalogStore, InMemoryCatalog},
    error::{AppError, AppResult},
    models::{Category, CategoryKind, Product, ProductImage},
    routes::{create_router, AppState},
    services::{ModelClient, Recommender},
};

/// Model stub returning a canned reply, or failing when none is set
struct ScriptedModel {
    reply: Option<&'static str>,
}

#[async_trait::async_trait]
impl ModelClient for ScriptedModel {
    async fn generate(&self, _prompt: &str) -> AppResult<String> {
        self.reply
            .map(str::to_string)
            .ok_or_else(|| AppError::ExternalApi("model unavailable".to_string()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

struct BrokenCatalog;

#[async_trait::async_trait]
impl CatalogStore for BrokenCatalog {
    async fn load_catalog(&self) -> AppResult<Vec<Product>> {
        Err(AppError::Internal("catalog offline".to_string()))
    }
}

fn store_catalog() -> Vec<Product> {
    let other = |name: &str| Category::new(name, CategoryKind::Other(name.to_string()));
    vec![
        Product::new(1, "Xbox Series X Console", 500.0, vec![other("Consoles")]),
        Product::new(2, "Xbox One Console", 300.0, vec![other("Consoles")]),
        Product::new(3, "Xbox Series X Controller", 60.0, vec![other("Accessories")]),
        Product::new(4, "Xbox One Controller", 50.0, vec![other("Accessories")]),
        Product::new(5, "Halo Infinite", 70.0, vec![other("Games")]),
        Product::new(6, "Gears 5", 40.0, vec![other("Games")]),
        Product::new(7, "Headset", 90.0, vec![other("Accessories")]),
        Product::new(8, "Gaming Chair", 199.0, vec![other("Furniture")]),
    ]
}

fn create_test_server(catalog: Arc<dyn CatalogStore>, reply: Option<&'static str>) -> TestServer {
    let recommender = Recommender::new(Arc::new(ScriptedModel { reply }));
    let state = Arc::new(AppState::new(catalog, recommender));
    TestServer::new(create_router(state)).unwrap()
}

fn default_server(reply: Option<&'static str>) -> TestServer {
    create_test_server(Arc::new(InMemoryCatalog::new(store_catalog())), reply)
}

fn ids(body: &[Value]) -> Vec<i64> {
    body.iter().map(|p| p["id"].as_i64().unwrap()).collect()
}

fn console_cart() -> Value {
    json!({
        "cartItems": [{
            "id": 1,
            "name": "Xbox Series X Console",
            "price": 500,
            "categories": [{"name": "Consoles", "kind": "Other"}]
        }]
    })
}

#[tokio::test]
async fn test_health_check() {
    let server = default_server(None);
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_list_products() {
    let server = default_server(None);
    let response = server.get("/api/v1/products").await;
    response.assert_status_ok();

    let products: Vec<Value> = response.json();
    assert_eq!(products.len(), 8);
    assert_eq!(products[0]["name"], "Xbox Series X Console");
    assert_eq!(products[0]["categories"][0]["kind"], "Other");
}

#[tokio::test]
async fn test_empty_cart_returns_trending() {
    let server = default_server(None);
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "cartItems": [] }))
        .await;
    response.assert_status_ok();

    let products: Vec<Value> = response.json();
    assert_eq!(ids(&products), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_null_cart_returns_trending() {
    let server = default_server(Some("[5]"));
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "cartItems": null }))
        .await;
    response.assert_status_ok();

    let products: Vec<Value> = response.json();
    assert_eq!(ids(&products), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_recommendations_carry_image_gallery() {
    let mut catalog = store_catalog();
    catalog[2].images = vec![
        ProductImage {
            url: "/uploads/controller-side.png".to_string(),
            principal: false,
            order: 0,
        },
        ProductImage {
            url: "/uploads/controller-front.png".to_string(),
            principal: true,
            order: 1,
        },
    ];
    let server = create_test_server(Arc::new(InMemoryCatalog::new(catalog)), Some("[3]"));

    let response = server
        .post("/api/v1/recommendations")
        .json(&console_cart())
        .await;
    response.assert_status_ok();

    let products: Vec<Value> = response.json();
    assert_eq!(ids(&products), vec![3]);
    let gallery = products[0]["imagenes"].as_array().unwrap();
    assert_eq!(gallery.len(), 2);
    assert_eq!(gallery[1]["url"], "/uploads/controller-front.png");
    assert_eq!(gallery[1]["esPrincipal"], true);
    assert_eq!(gallery[1]["orden"], 1);
}

#[tokio::test]
async fn test_model_reply_resolves_to_full_products() {
    let server = default_server(Some("[3, 7, 5, 8]"));
    let response = server
        .post("/api/v1/recommendations")
        .json(&console_cart())
        .await;
    response.assert_status_ok();

    let products: Vec<Value> = response.json();
    assert_eq!(ids(&products), vec![3, 5, 7, 8]);
    assert_eq!(products[0]["name"], "Xbox Series X Controller");
    assert_eq!(products[0]["price"], 60.0);
}

#[tokio::test]
async fn test_model_failure_falls_back() {
    let server = default_server(None);
    let response = server
        .post("/api/v1/recommendations")
        .json(&console_cart())
        .await;
    response.assert_status_ok();

    let products: Vec<Value> = response.json();
    assert_eq!(ids(&products), vec![2, 3, 4, 5]);
}

#[tokio::test]
async fn test_legacy_cart_shape_is_accepted() {
    let catalog = vec![
        Product::new(1, "Switch OLED", 350.0, vec![Category::new("Switch", CategoryKind::Platform)]),
        Product::new(2, "PS5", 500.0, vec![Category::new("PS5", CategoryKind::Platform)]),
        Product::new(3, "Mario Kart 8", 60.0, vec![Category::new("Switch", CategoryKind::Platform)]),
        Product::new(4, "Poster", 15.0, vec![]),
    ];
    let server = create_test_server(Arc::new(InMemoryCatalog::new(catalog)), None);

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "cartItems": [{
                "id": 1,
                "name": "Switch OLED",
                "price": 350,
                "Categoria": {"name": "switch", "type": "Plataforma"}
            }]
        }))
        .await;
    response.assert_status_ok();

    let products: Vec<Value> = response.json();
    assert_eq!(ids(&products), vec![3, 4]);
}

#[tokio::test]
async fn test_catalog_failure_is_server_error() {
    let server = create_test_server(Arc::new(BrokenCatalog), Some("[1]"));
    let response = server
        .post("/api/v1/recommendations")
        .json(&console_cart())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("catalog offline"));
}

#[tokio::test]
async fn test_non_sequence_cart_is_rejected() {
    let server = default_server(Some("[1]"));
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "cartItems": "nope" }))
        .expect_failure()
        .await;

    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = default_server(None);
    let request_id = "6f1c1a52-3b0e-4d5a-9f0a-2f6b8d1e4c77";

    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_static(request_id),
        )
        .await;

    assert_eq!(response.header("x-request-id"), request_id);
}
