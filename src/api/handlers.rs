use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::{
    should_load_more, DetailErrorKind, DetailState, FeedReason, GenreId, HomeViewState, Movie,
    MovieId, PreferenceEntry, Rating,
};
use crate::services::{LoadMore, RatingOutcome};

use super::AppState;

const DETAIL_ERROR_MESSAGE: &str = "Could not load movie details.";
const EMPTY_PREFERENCES_MESSAGE: &str =
    "No preferences saved yet. Like or dislike movies to build your profile!";

// Request/Response types

#[derive(Debug, Serialize)]
pub struct MovieCard {
    pub id: MovieId,
    pub title: String,
    pub release_date: String,
    pub vote_average: f64,
    pub plot: String,
    pub genre_ids: Vec<GenreId>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
}

impl MovieCard {
    fn new(movie: &Movie, state: &AppState) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            release_date: movie.release_date.clone(),
            vote_average: movie.vote_average,
            plot: movie.plot.clone(),
            genre_ids: movie.genre_ids.clone(),
            poster_url: state.image_url(movie.poster_path.as_deref()),
            backdrop_url: state.image_url(movie.backdrop_path.as_deref()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub is_loading_more: bool,
    pub recommendation_reason: Option<FeedReason>,
    pub movies: Vec<MovieCard>,
    pub preference_scores: Vec<PreferenceEntry>,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

impl FeedResponse {
    fn new(view: HomeViewState, state: &AppState) -> Self {
        Self {
            is_loading: view.is_loading,
            is_refreshing: view.is_refreshing,
            is_loading_more: view.is_loading_more,
            recommendation_reason: view.recommendation_reason,
            movies: view
                .movies
                .movies()
                .iter()
                .map(|movie| MovieCard::new(movie, state))
                .collect(),
            preference_scores: view.preference_scores,
            last_refreshed_at: view.last_refreshed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoadMoreParams {
    /// Index of the last row the client has on screen
    pub last_visible: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub scores: Vec<PreferenceEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    #[serde(flatten)]
    pub state: DetailState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub movie_id: MovieId,
    pub rating: Rating,
    pub updated_genres: Vec<GenreId>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Current home feed
pub async fn get_feed(State(state): State<AppState>) -> Json<FeedResponse> {
    Json(FeedResponse::new(state.feed.snapshot(), &state))
}

/// Rebuild the feed from current preferences
///
/// A failed refresh keeps the previous feed; the client sees no error.
pub async fn refresh_feed(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Json<FeedResponse> {
    let applied = state.feed.refresh().await;
    tracing::info!(request_id = %request_id, applied, "Feed refresh finished");
    Json(FeedResponse::new(state.feed.snapshot(), &state))
}

/// Append the next page of explore movies
pub async fn load_more(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<LoadMoreParams>,
) -> Json<FeedResponse> {
    let total = state.feed.snapshot().movies.len();
    let near_end = params
        .last_visible
        .map_or(true, |last_visible| should_load_more(last_visible, total));

    if near_end {
        let outcome = state.feed.load_more().await;
        if outcome != LoadMore::Skipped {
            tracing::info!(request_id = %request_id, outcome = ?outcome, "Load more finished");
        }
    } else {
        tracing::debug!(request_id = %request_id, total, "Load more not needed yet");
    }

    Json(FeedResponse::new(state.feed.snapshot(), &state))
}

/// Stored genre scores, labelled with genre names
pub async fn get_preferences(State(state): State<AppState>) -> AppResult<Json<PreferencesResponse>> {
    let scores = state.feed.preference_entries().await?;
    let message = scores.is_empty().then_some(EMPTY_PREFERENCES_MESSAGE);
    Ok(Json(PreferencesResponse { scores, message }))
}

/// Clear all genre scores and rebuild the feed as on first launch
pub async fn reset_preferences(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<FeedResponse>> {
    let applied = state.feed.reset_preferences().await?;
    tracing::info!(request_id = %request_id, applied, "User preferences reset");
    Ok(Json(FeedResponse::new(state.feed.snapshot(), &state)))
}

/// Movie details with director and leading cast
pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
) -> (StatusCode, Json<DetailResponse>) {
    let detail_state = state.detail_controller().load(movie_id).await;

    let (status, poster_url, message) = match &detail_state {
        DetailState::Success { details, .. } => (
            StatusCode::OK,
            state.image_url(details.poster_path.as_deref()),
            None,
        ),
        DetailState::Error { kind } => (error_status(*kind), None, Some(DETAIL_ERROR_MESSAGE)),
        DetailState::Loading => (StatusCode::ACCEPTED, None, None),
    };

    (
        status,
        Json(DetailResponse {
            state: detail_state,
            poster_url,
            message,
        }),
    )
}

/// Like a movie: +5 to each of its genres
pub async fn like_movie(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(movie_id): Path<MovieId>,
) -> AppResult<Json<RatingResponse>> {
    rate_movie(state, request_id, movie_id, Rating::Like).await
}

/// Dislike a movie: -5 to each of its genres
pub async fn dislike_movie(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(movie_id): Path<MovieId>,
) -> AppResult<Json<RatingResponse>> {
    rate_movie(state, request_id, movie_id, Rating::Dislike).await
}

/// Loads the detail first; a movie can only be rated once its genres are known
async fn rate_movie(
    state: AppState,
    request_id: RequestId,
    movie_id: MovieId,
    rating: Rating,
) -> AppResult<Json<RatingResponse>> {
    let controller = state.detail_controller();

    if let DetailState::Error { kind } = controller.load(movie_id).await {
        return Err(match kind {
            DetailErrorKind::NotFound => AppError::NotFound(format!("Movie {} not found", movie_id)),
            DetailErrorKind::Unavailable => AppError::ExternalApi(DETAIL_ERROR_MESSAGE.to_string()),
        });
    }

    match controller.rate(rating).await? {
        RatingOutcome::Applied(updated_genres) => {
            tracing::info!(
                request_id = %request_id,
                movie_id,
                rating = ?rating,
                genres = updated_genres.len(),
                "Movie rated"
            );
            Ok(Json(RatingResponse {
                movie_id,
                rating,
                updated_genres,
            }))
        }
        RatingOutcome::Unavailable => Err(AppError::Internal(format!(
            "Movie {} detail was not loaded",
            movie_id
        ))),
    }
}

fn error_status(kind: DetailErrorKind) -> StatusCode {
    match kind {
        DetailErrorKind::NotFound => StatusCode::NOT_FOUND,
        DetailErrorKind::Unavailable => StatusCode::BAD_GATEWAY,
    }
}
