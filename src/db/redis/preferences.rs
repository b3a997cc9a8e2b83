use redis::AsyncCommands;
use redis::Client;
use std::collections::HashMap;

use crate::{
    db::PreferenceStore,
    error::AppResult,
    models::{GenreId, GenreScores},
};

/// Genre scores stored as one Redis hash per profile
///
/// Each hash field is the decimal genre id and its value the integer score,
/// so `HINCRBY` gives an atomic read-modify-write per genre.
#[derive(Clone)]
pub struct RedisPreferenceStore {
    redis_client: Client,
    key: String,
}

impl RedisPreferenceStore {
    pub fn new(redis_client: Client, profile: &str) -> Self {
        Self {
            redis_client,
            key: Self::hash_key(profile),
        }
    }

    fn hash_key(profile: &str) -> String {
        format!("prefs:{}:genres", profile)
    }

    /// Converts raw hash fields to scores, skipping fields that are not genre ids
    fn parse_scores(raw: HashMap<String, i64>) -> GenreScores {
        raw.into_iter()
            .filter_map(|(field, score)| match field.parse::<GenreId>() {
                Ok(genre_id) => Some((genre_id, score)),
                Err(_) => {
                    tracing::debug!(field = %field, "Ignoring non-genre preference field");
                    None
                }
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl PreferenceStore for RedisPreferenceStore {
    async fn get_all(&self) -> AppResult<GenreScores> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let raw: HashMap<String, i64> = conn.hgetall(&self.key).await?;
        Ok(Self::parse_scores(raw))
    }

    async fn increment(&self, genre_id: GenreId, delta: i64) -> AppResult<i64> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let score: i64 = conn.hincr(&self.key, genre_id.to_string(), delta).await?;
        tracing::debug!(genre_id, delta, score, "Genre score updated");
        Ok(score)
    }

    async fn clear_all(&self) -> AppResult<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(&self.key).await?;
        tracing::info!(key = %self.key, "User preferences have been reset");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_redis_client;

    #[test]
    fn test_hash_key_is_per_profile() {
        assert_eq!(RedisPreferenceStore::hash_key("alice"), "prefs:alice:genres");
    }

    #[test]
    fn test_parse_scores_skips_non_numeric_fields() {
        let raw = HashMap::from([
            ("28".to_string(), 10),
            ("18".to_string(), -5),
            ("schema".to_string(), 1),
        ]);

        let scores = RedisPreferenceStore::parse_scores(raw);
        assert_eq!(scores.get(28), 10);
        assert_eq!(scores.get(18), -5);
        assert_eq!(scores.iter().count(), 2);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis instance"]
    async fn test_increment_and_clear_round_trip() {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let client = create_redis_client(&redis_url).unwrap();
        let store = RedisPreferenceStore::new(client, "test_round_trip");

        store.clear_all().await.unwrap();
        assert_eq!(store.increment(28, 5).await.unwrap(), 5);
        assert_eq!(store.increment(28, 5).await.unwrap(), 10);
        assert_eq!(store.increment(18, -5).await.unwrap(), -5);

        let scores = store.get_all().await.unwrap();
        assert_eq!(scores.get(28), 10);
        assert_eq!(scores.get(18), -5);

        store.clear_all().await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }
}
