use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use super::{GenreId, Movie, MovieId, PreferenceEntry};

/// Rows from the end of the feed at which the next page is requested
pub const LOAD_MORE_THRESHOLD: usize = 5;

/// Headline shown above the feed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FeedReason {
    #[serde(rename = "Trending Movies")]
    Trending,
    #[serde(rename = "Because you like our recommendations")]
    Recommended,
}

impl FeedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedReason::Trending => "Trending Movies",
            FeedReason::Recommended => "Because you like our recommendations",
        }
    }
}

impl std::fmt::Display for FeedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered movie list with no repeated ids
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Feed {
    movies: Vec<Movie>,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a feed from batches in order, keeping the first occurrence of each id
    pub fn from_batches<I>(batches: I) -> Self
    where
        I: IntoIterator<Item = Vec<Movie>>,
    {
        let mut feed = Self::new();
        for batch in batches {
            feed.extend_unique(batch);
        }
        feed
    }

    /// Appends movies whose id is not already in the feed; returns how many were added
    pub fn extend_unique(&mut self, movies: impl IntoIterator<Item = Movie>) -> usize {
        let mut seen: HashSet<MovieId> = self.movies.iter().map(|m| m.id).collect();
        let before = self.movies.len();
        for movie in movies {
            if seen.insert(movie.id) {
                self.movies.push(movie);
            }
        }
        self.movies.len() - before
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn ids(&self) -> Vec<MovieId> {
        self.movies.iter().map(|m| m.id).collect()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

/// Process-local pagination state, reset on every successful refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationCursor {
    pub current_page: u32,
    pub liked_genre_ids: BTreeSet<GenreId>,
    pub disliked_genre_ids: BTreeSet<GenreId>,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self {
            current_page: 1,
            liked_genre_ids: BTreeSet::new(),
            disliked_genre_ids: BTreeSet::new(),
        }
    }
}

impl PaginationCursor {
    pub fn first_page(liked: BTreeSet<GenreId>, disliked: BTreeSet<GenreId>) -> Self {
        Self {
            current_page: 1,
            liked_genre_ids: liked,
            disliked_genre_ids: disliked,
        }
    }

    /// Every genre that carried a non-zero score at the last refresh
    pub fn rated_genre_ids(&self) -> BTreeSet<GenreId> {
        self.liked_genre_ids
            .union(&self.disliked_genre_ids)
            .copied()
            .collect()
    }
}

/// Everything the home screen renders, owned by the feed assembler
#[derive(Debug, Clone, Default, Serialize)]
pub struct HomeViewState {
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub is_loading_more: bool,
    pub movies: Feed,
    pub recommendation_reason: Option<FeedReason>,
    pub preference_scores: Vec<PreferenceEntry>,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

/// Whether the client has scrolled close enough to the end to fetch the next page
pub fn should_load_more(last_visible_index: usize, total: usize) -> bool {
    total > 0 && last_visible_index.saturating_add(LOAD_MORE_THRESHOLD) >= total
}
