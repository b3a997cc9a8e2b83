use std::sync::Arc;

use crate::{
    db::PreferenceStore,
    error::AppResult,
    models::{GenreId, MovieDetail, Rating},
};

/// Turns like/dislike verdicts into genre score changes
#[derive(Clone)]
pub struct PreferenceUpdater {
    store: Arc<dyn PreferenceStore>,
}

impl PreferenceUpdater {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Applies the rating's delta to every genre of the movie
    ///
    /// Each genre is incremented on its own; if one increment fails the
    /// earlier ones stay applied and the error is returned. Returns the
    /// touched genre ids in the movie's genre order.
    pub async fn apply(&self, movie: &MovieDetail, rating: Rating) -> AppResult<Vec<GenreId>> {
        let delta = rating.delta();
        tracing::info!(
            movie_id = movie.id,
            title = %movie.title,
            rating = ?rating,
            genres = movie.genres.len(),
            "Applying movie rating"
        );

        let mut updated = Vec::with_capacity(movie.genres.len());
        for genre in &movie.genres {
            let score = self.store.increment(genre.id, delta).await?;
            tracing::debug!(genre = %genre.name, delta, score, "Genre score changed");
            updated.push(genre.id);
        }

        Ok(updated)
    }

    /// Erases every genre score
    pub async fn reset(&self) -> AppResult<()> {
        self.store.clear_all().await?;
        tracing::info!(store = self.store.name(), "Genre preferences cleared");
        Ok(())
    }
}
