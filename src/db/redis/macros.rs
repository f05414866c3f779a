/// Read-through caching over [`Cache`](crate::db::Cache).
///
/// Returns the cached value for `$key` when present. Otherwise awaits
/// `$block`, queues the computed value for a background write with a TTL of
/// `$ttl` seconds, and returns it. A failed cache read is logged and treated
/// as a miss, so an unavailable Redis only costs the source query. Errors
/// from `$block` propagate through `?`, so the enclosing function must return
/// an `AppResult`.
///
/// # Example
/// ```rust,ignore
/// cached!(self.cache, CacheKey::Catalog, 60, async move {
///     Ok::<_, AppError>(load_rows().await?)
/// })
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed, querying source");
                None
            }
        };

        match hit {
            Some(cached) => Ok(cached),
            None => {
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
