use serde::{Deserialize, Serialize};

mod detail;
mod feed;
mod preferences;

pub use detail::{DetailErrorKind, DetailState, CAST_LIMIT};
pub use feed::{should_load_more, Feed, FeedReason, HomeViewState, PaginationCursor};
pub use preferences::{GenreScores, PreferenceEntry, Rating};

/// Catalog identifier of a movie
pub type MovieId = u64;

/// Catalog identifier of a genre
pub type GenreId = u32;

// ============================================================================
// TMDB API Types
// ============================================================================

/// A single movie as listed by the `/discover` endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(rename = "overview", default)]
    pub plot: String,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
}

/// TMDB wraps discover listings in a `results` array
#[derive(Debug, Clone, Deserialize)]
pub struct MovieResponse {
    #[serde(rename = "results")]
    pub movies: Vec<Movie>,
}

/// A catalog-defined movie category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreResponse {
    pub genres: Vec<Genre>,
}

/// Full details of a single movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    pub id: MovieId,
    pub title: String,
    #[serde(rename = "overview", default)]
    pub plot: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrewMember {
    pub name: String,
    pub job: String,
}

/// Response of `/movie/{id}/credits`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

impl Credits {
    /// Name of the first crew member credited as "Director"
    pub fn director(&self) -> Option<&str> {
        self.crew
            .iter()
            .find(|member| member.job == "Director")
            .map(|member| member.name.as_str())
    }

    /// Leading cast members in billing order
    pub fn top_cast(&self, limit: usize) -> Vec<CastMember> {
        self.cast.iter().take(limit).cloned().collect()
    }
}
