/// Read-through caching over [`Cache`](crate::db::Cache).
///
/// Evaluates to `Ok(value)` from the cache when present. On a miss, or when
/// the cache cannot be read, the future is awaited, its value queued for a
/// background write with the given TTL (seconds), and returned. Errors from
/// the future are propagated with `?`, so the macro must be used inside a
/// function returning `AppResult`.
///
/// ```rust,ignore
/// let genres = cached!(cache, CacheKey::GenreList, GENRE_CACHE_TTL, self.fetch_genres())?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $future:expr) => {{
        match $cache.get_from_cache(&$key).await {
            Ok(Some(hit)) => Ok(hit),
            lookup => {
                if let Err(e) = lookup {
                    ::tracing::warn!(error = %e, key = %$key, "Cache read failed, fetching from source");
                }
                let value = $future.await?;
                $cache.set_in_background(&$key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
