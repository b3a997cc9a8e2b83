use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    db::PreferenceStore,
    error::AppResult,
    models::{DetailErrorKind, DetailState, GenreId, MovieId, Rating, CAST_LIMIT},
    services::{catalog::CatalogClient, preferences::PreferenceUpdater},
};

/// Result of a like/dislike on the detail screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingOutcome {
    /// Scores were changed for these genres
    Applied(Vec<GenreId>),
    /// No detail is loaded, so there is nothing to rate
    Unavailable,
}

/// Controller behind one movie detail screen
pub struct MovieDetailController {
    catalog: Arc<dyn CatalogClient>,
    updater: PreferenceUpdater,
    state: Mutex<DetailState>,
}

impl MovieDetailController {
    pub fn new(catalog: Arc<dyn CatalogClient>, store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            catalog,
            updater: PreferenceUpdater::new(store),
            state: Mutex::new(DetailState::Loading),
        }
    }

    pub fn state(&self) -> DetailState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_state(&self, state: DetailState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Fetches details and credits in parallel; both must succeed
    pub async fn load(&self, movie_id: MovieId) -> DetailState {
        tracing::debug!(movie_id, "Fetching details for movie");
        self.set_state(DetailState::Loading);

        let result = tokio::try_join!(
            self.catalog.movie_detail(movie_id),
            self.catalog.credits(movie_id)
        );

        let state = match result {
            Ok((details, credits)) => {
                tracing::info!(movie_id, title = %details.title, "Movie detail loaded");
                DetailState::Success {
                    director: credits.director().map(str::to_string),
                    cast: credits.top_cast(CAST_LIMIT),
                    details,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, movie_id, "Error fetching movie details");
                DetailState::Error {
                    kind: DetailErrorKind::from(&e),
                }
            }
        };

        self.set_state(state.clone());
        state
    }

    pub async fn like(&self) -> AppResult<RatingOutcome> {
        self.rate(Rating::Like).await
    }

    pub async fn dislike(&self) -> AppResult<RatingOutcome> {
        self.rate(Rating::Dislike).await
    }

    /// Applies a rating to the loaded movie's genres; a no-op unless loaded
    pub async fn rate(&self, rating: Rating) -> AppResult<RatingOutcome> {
        let details = match self.state().details() {
            Some(details) => details.clone(),
            None => {
                tracing::debug!(rating = ?rating, "Ignoring rating, no movie detail loaded");
                return Ok(RatingOutcome::Unavailable);
            }
        };

        let genres = self.updater.apply(&details, rating).await?;
        Ok(RatingOutcome::Applied(genres))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryPreferenceStore;
    use crate::error::AppError;
    use crate::models::{CastMember, Credits, CrewMember, Genre, MovieDetail};
    use crate::services::catalog::MockCatalogClient;
    use tokio_test::assert_ok;

    fn detail(id: MovieId) -> MovieDetail {
        MovieDetail {
            id,
            title: "Heat".to_string(),
            plot: "A group of professional bank robbers.".to_string(),
            poster_path: Some("/heat.jpg".to_string()),
            release_date: "1995-12-15".to_string(),
            genres: vec![
                Genre { id: 10, name: "Action".to_string() },
                Genre { id: 20, name: "Drama".to_string() },
            ],
            runtime: Some(170),
            vote_average: 7.9,
        }
    }

    fn credits() -> Credits {
        Credits {
            cast: (1..=8)
                .map(|i| CastMember { name: format!("Actor {i}"), profile_path: None })
                .collect(),
            crew: vec![
                CrewMember { name: "Dante Spinotti".to_string(), job: "Director of Photography".to_string() },
                CrewMember { name: "Michael Mann".to_string(), job: "Director".to_string() },
            ],
        }
    }

    fn controller(catalog: MockCatalogClient) -> (MovieDetailController, Arc<MemoryPreferenceStore>) {
        let store = Arc::new(MemoryPreferenceStore::new());
        (MovieDetailController::new(Arc::new(catalog), store.clone()), store)
    }

    #[tokio::test]
    async fn test_load_success_picks_director_and_top_five_cast() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_movie_detail().returning(|id| Ok(detail(id)));
        catalog.expect_credits().returning(|_| Ok(credits()));
        let (controller, _) = controller(catalog);

        let state = controller.load(949).await;

        match state {
            DetailState::Success { details, director, cast } => {
                assert_eq!(details.id, 949);
                assert_eq!(director.as_deref(), Some("Michael Mann"));
                assert_eq!(cast.len(), 5);
                assert_eq!(cast[0].name, "Actor 1");
                assert_eq!(cast[4].name, "Actor 5");
            }
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(controller.state(), controller.load(949).await);
    }

    #[tokio::test]
    async fn test_credits_failure_is_an_error_state() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_movie_detail().returning(|id| Ok(detail(id)));
        catalog
            .expect_credits()
            .returning(|_| Err(AppError::ExternalApi("status 503".to_string())));
        let (controller, _) = controller(catalog);

        let state = controller.load(949).await;
        assert_eq!(state, DetailState::Error { kind: DetailErrorKind::Unavailable });
    }

    #[tokio::test]
    async fn test_missing_movie_is_not_found() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_movie_detail()
            .returning(|id| Err(AppError::NotFound(format!("movie {}", id))));
        catalog.expect_credits().returning(|_| Ok(Credits::default()));
        let (controller, _) = controller(catalog);

        let state = controller.load(1).await;
        assert_eq!(state, DetailState::Error { kind: DetailErrorKind::NotFound });
    }

    #[tokio::test]
    async fn test_like_updates_every_genre() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_movie_detail().returning(|id| Ok(detail(id)));
        catalog.expect_credits().returning(|_| Ok(credits()));
        let (controller, store) = controller(catalog);

        controller.load(949).await;
        let outcome = controller.like().await.unwrap();

        assert_eq!(outcome, RatingOutcome::Applied(vec![10, 20]));
        let scores = store.get_all().await.unwrap();
        assert_eq!(scores.get(10), 5);
        assert_eq!(scores.get(20), 5);

        assert_ok!(controller.dislike().await);
        let scores = store.get_all().await.unwrap();
        assert_eq!(scores.get(10), 0);
    }

    #[tokio::test]
    async fn test_rating_unavailable_before_load() {
        let (controller, store) = controller(MockCatalogClient::new());

        assert_eq!(controller.like().await.unwrap(), RatingOutcome::Unavailable);
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rating_unavailable_after_failed_load() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_movie_detail()
            .returning(|_| Err(AppError::ExternalApi("timeout".to_string())));
        catalog.expect_credits().returning(|_| Ok(credits()));
        let (controller, store) = controller(catalog);

        controller.load(949).await;
        assert_eq!(controller.dislike().await.unwrap(), RatingOutcome::Unavailable);
        assert!(store.get_all().await.unwrap().is_empty());
    }
}
