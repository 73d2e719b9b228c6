/// A macro to simplify read-through caching.
///
/// This macro checks if a value is present in the cache.
/// If found, it returns the cached value.
/// If not found, it executes the provided block to compute the value,
/// stores it in the cache, and then returns the computed value.
/// A failed cache write is logged and ignored; the computed value is
/// returned either way.
///
/// # Arguments
/// * `$cache`: The cache instance to use for retrieval and storage. The cache
///   must have `get` and `put` methods taking a [`crate::db::CacheKey`].
/// * `$key`: The key to use for caching the value.
/// * `$block`: The block of code to execute if the value is not found in cache.
///
/// # Example
/// ```ignore
/// let cached_value = cached!(cache, cache_key, async move {
///    // Compute the value if not in cache
///   compute_expensive_value().await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $block:expr) => {{
        // Attempt to get the value from cache
        if let Some(cached) = $cache.get(&$key).await? {
            Ok(cached)
        } else {
            // If not in cache, execute the block to compute the value
            let value = $block.await?;
            // Store the computed value in cache
            if let Err(e) = $cache.put(&$key, &value).await {
                tracing::warn!(key = %$key, error = %e, "Cache write failed");
            }
            Ok(value)
        }
    }};
}
