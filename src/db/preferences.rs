use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{GenreId, GenreScores},
};

/// Durable genre id → affinity score mapping
///
/// Each call is atomic for the key it touches; there is no transaction
/// spanning several genres.
#[async_trait::async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Every stored score; genres never rated are absent
    async fn get_all(&self) -> AppResult<GenreScores>;

    /// Atomically adds `delta` to a genre's score and returns the new value
    async fn increment(&self, genre_id: GenreId, delta: i64) -> AppResult<i64>;

    /// Removes every stored score
    async fn clear_all(&self) -> AppResult<()>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Process-local store, used in tests and when no Redis is configured
#[derive(Default)]
pub struct MemoryPreferenceStore {
    scores: RwLock<HashMap<GenreId, i64>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scores(scores: impl IntoIterator<Item = (GenreId, i64)>) -> Self {
        Self {
            scores: RwLock::new(scores.into_iter().collect()),
        }
    }
}

#[async_trait::async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get_all(&self) -> AppResult<GenreScores> {
        let scores = self.scores.read().await;
        Ok(GenreScores::new(scores.clone()))
    }

    async fn increment(&self, genre_id: GenreId, delta: i64) -> AppResult<i64> {
        let mut scores = self.scores.write().await;
        let score = scores.entry(genre_id).or_insert(0);
        *score += delta;
        Ok(*score)
    }

    async fn clear_all(&self) -> AppResult<()> {
        self.scores.write().await.clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_increment_creates_and_accumulates() {
        let store = MemoryPreferenceStore::new();

        assert_eq!(store.increment(28, 5).await.unwrap(), 5);
        assert_eq!(store.increment(28, 5).await.unwrap(), 10);
        assert_eq!(store.increment(28, -5).await.unwrap(), 5);

        let scores = store.get_all().await.unwrap();
        assert_eq!(scores.get(28), 5);
    }

    #[tokio::test]
    async fn test_score_can_net_to_zero_and_stay_stored() {
        let store = MemoryPreferenceStore::new();
        assert_ok!(store.increment(18, 5).await);
        assert_ok!(store.increment(18, -5).await);

        let scores = store.get_all().await.unwrap();
        assert!(!scores.is_empty());
        assert_eq!(scores.get(18), 0);
        assert!(scores.liked().is_empty());
        assert!(scores.disliked().is_empty());
    }

    #[tokio::test]
    async fn test_clear_all_removes_everything() {
        let store = MemoryPreferenceStore::with_scores([(28, 10), (35, -5)]);
        assert_ok!(store.clear_all().await);
        assert!(store.get_all().await.unwrap().is_empty());
    }
}
