pub mod catalog;
pub mod postgres;
pub mod redis;

pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use catalog::{CatalogStore, InMemoryCatalog};
pub use postgres::{create_pool, PgCatalogStore};
