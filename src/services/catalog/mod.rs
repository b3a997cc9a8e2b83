//! Movie catalog abstraction
//!
//! The feed assembler and detail controller only talk to the catalog through
//! [`CatalogClient`], so tests can substitute a scripted catalog and the TMDB
//! client stays the single place that knows about HTTP.

use std::collections::BTreeSet;

use crate::{
    error::AppResult,
    models::{Credits, Genre, GenreId, Movie, MovieDetail, MovieId},
};

pub mod tmdb;

pub use tmdb::TmdbClient;

/// Highest page the discover endpoint serves
pub const MAX_DISCOVER_PAGE: u32 = 500;

/// Parameters of a paginated discover query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverQuery {
    pub page: u32,
    /// Match movies in any of these genres; empty means no filter
    pub with_genres: Vec<GenreId>,
    /// Drop movies in any of these genres; empty means no filter
    pub without_genres: Vec<GenreId>,
}

impl DiscoverQuery {
    /// Movies in any of the liked genres
    pub fn recommended(page: u32, liked: &BTreeSet<GenreId>) -> Self {
        Self {
            page,
            with_genres: liked.iter().copied().collect(),
            without_genres: Vec::new(),
        }
    }

    /// Movies outside every rated genre
    pub fn explore(page: u32, rated: &BTreeSet<GenreId>) -> Self {
        Self {
            page,
            with_genres: Vec::new(),
            without_genres: rated.iter().copied().collect(),
        }
    }
}

/// Joins genre ids the way the discover endpoint expects them, `None` when empty
pub fn join_genre_ids(ids: &[GenreId]) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    Some(
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Remote movie catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// One page of movies matching the genre filters
    async fn discover(&self, query: DiscoverQuery) -> AppResult<Vec<Movie>>;

    /// Every movie genre the catalog knows
    async fn genre_list(&self) -> AppResult<Vec<Genre>>;

    /// Full details of a single movie
    async fn movie_detail(&self, movie_id: MovieId) -> AppResult<MovieDetail>;

    /// Cast and crew of a single movie
    async fn credits(&self, movie_id: MovieId) -> AppResult<Credits>;

    /// Catalog name for logging and debugging
    fn name(&self) -> &'static str;
}
