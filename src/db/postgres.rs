use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    cached,
    db::{catalog::CatalogStore, Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Category, CategoryKind, Product, ProductImage},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

const CATALOG_QUERY: &str = r#"
    SELECT
        p.id::int8 AS product_id,
        p.name AS product_name,
        p.price::float8 AS price,
        p.description,
        p.image,
        c.id::int8 AS category_id,
        c.name AS category_name,
        c.type AS category_type
    FROM "Productos" p
    LEFT JOIN "ProductoCategoria" pc ON pc."ProductoId" = p.id
    LEFT JOIN "Categoria" c ON c.id = pc."CategoriaId"
    ORDER BY p.id, c.id
"#;

const IMAGES_QUERY: &str = r#"
    SELECT
        "ProductoId"::int8 AS product_id,
        url,
        orden,
        "esPrincipal" AS principal
    FROM "ProductoImagens"
    ORDER BY "ProductoId", orden, id
"#;

/// One product/category pair from the catalog join
#[derive(Debug, sqlx::FromRow)]
struct CatalogRow {
    product_id: i64,
    product_name: String,
    price: f64,
    description: Option<String>,
    image: Option<String>,
    category_id: Option<i64>,
    category_name: Option<String>,
    category_type: Option<String>,
}

/// One gallery image row
#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    product_id: i64,
    url: String,
    orden: Option<i32>,
    principal: Option<bool>,
}

/// Folds join rows (sorted by product id) into products with their categories
fn assemble_catalog(rows: Vec<CatalogRow>) -> Vec<Product> {
    let mut products: Vec<Product> = Vec::new();

    for row in rows {
        let category = row.category_name.map(|name| Category {
            id: row.category_id,
            name,
            kind: row
                .category_type
                .map(CategoryKind::from)
                .unwrap_or_default(),
        });

        match products.last_mut() {
            Some(current) if current.id == row.product_id => {
                current.categories.extend(category);
            }
            _ => {
                let mut product =
                    Product::new(row.product_id, row.product_name, row.price, Vec::new());
                product.description = row.description;
                product.image = row.image;
                product.categories.extend(category);
                products.push(product);
            }
        }
    }

    products
}

/// Attaches gallery rows to their products, keeping row order per product
fn attach_images(products: &mut [Product], rows: Vec<ImageRow>) {
    for row in rows {
        if let Some(product) = products.iter_mut().find(|p| p.id == row.product_id) {
            product.images.push(ProductImage {
                url: row.url,
                principal: row.principal.unwrap_or(false),
                order: row.orden.unwrap_or(0),
            });
        }
    }
}

/// Catalog backed by the storefront's Postgres tables
///
/// The assembled catalog is cached in Redis for a short TTL so bursts of
/// recommendation requests don't each re-run the join.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
    cache: Cache,
    cache_ttl: u64,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool, cache: Cache, cache_ttl: u64) -> Self {
        Self {
            pool,
            cache,
            cache_ttl,
        }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn load_catalog(&self) -> AppResult<Vec<Product>> {
        cached!(self.cache, CacheKey::Catalog, self.cache_ttl, async move {
            let rows = sqlx::query_as::<_, CatalogRow>(CATALOG_QUERY)
                .fetch_all(&self.pool)
                .await?;

            let mut catalog = assemble_catalog(rows);

            match sqlx::query_as::<_, ImageRow>(IMAGES_QUERY)
                .fetch_all(&self.pool)
                .await
            {
                Ok(images) => attach_images(&mut catalog, images),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Failed to load product images, serving without gallery"
                    );
                }
            }

            tracing::info!(products = catalog.len(), "Catalog loaded from database");

            Ok::<_, AppError>(catalog)
        })
    }
}
