//! TMDB v3 catalog client
//!
//! Endpoints used:
//! 1. Discover: /discover/movie → paginated listings with genre filters
//! 2. Genres: /genre/movie/list → id/name pairs (cached for a day)
//! 3. Details: /movie/{id} → full details with genre objects
//! 4. Credits: /movie/{id}/credits → cast and crew

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Credits, Genre, GenreResponse, Movie, MovieDetail, MovieId, MovieResponse},
    services::catalog::{join_genre_ids, CatalogClient, DiscoverQuery, MAX_DISCOVER_PAGE},
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

const GENRE_CACHE_TTL: u64 = 86400; // 1 day

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
}

impl TmdbClient {
    pub fn new(api_key: String, api_url: String, cache: Option<Cache>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// Query parameters for a discover call; empty genre filters are left out entirely
    fn discover_params(query: &DiscoverQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", query.page.to_string())];
        if let Some(with_genres) = join_genre_ids(&query.with_genres) {
            params.push(("with_genres", with_genres));
        }
        if let Some(without_genres) = join_genre_ids(&query.without_genres) {
            params.push(("without_genres", without_genres));
        }
        params
    }

    /// Issues a GET against the API and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> AppResult<T> {
        let url = format!("{}/{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("TMDB resource {}", path)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                response = %response_text,
                "Failed to deserialize TMDB response"
            );
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }

    async fn fetch_genres(&self) -> AppResult<Vec<Genre>> {
        let response: GenreResponse = self.get_json("genre/movie/list", &[]).await?;
        tracing::info!(genres = response.genres.len(), "Genre list fetched");
        Ok(response.genres)
    }
}

#[async_trait::async_trait]
impl CatalogClient for TmdbClient {
    async fn discover(&self, query: DiscoverQuery) -> AppResult<Vec<Movie>> {
        if query.page == 0 || query.page > MAX_DISCOVER_PAGE {
            return Err(AppError::InvalidInput(format!(
                "Discover page must be between 1 and {}, got {}",
                MAX_DISCOVER_PAGE, query.page
            )));
        }

        let params = Self::discover_params(&query);
        let response: MovieResponse = self.get_json("discover/movie", &params).await?;

        tracing::info!(
            page = query.page,
            with_genres = ?query.with_genres,
            without_genres = ?query.without_genres,
            results = response.movies.len(),
            "Discover query completed"
        );

        Ok(response.movies)
    }

    async fn genre_list(&self) -> AppResult<Vec<Genre>> {
        match &self.cache {
            Some(cache) => cached!(cache, CacheKey::GenreList, GENRE_CACHE_TTL, self.fetch_genres()),
            None => self.fetch_genres().await,
        }
    }

    async fn movie_detail(&self, movie_id: MovieId) -> AppResult<MovieDetail> {
        let detail: MovieDetail = self.get_json(&format!("movie/{}", movie_id), &[]).await?;
        tracing::debug!(movie_id, title = %detail.title, "Movie detail fetched");
        Ok(detail)
    }

    async fn credits(&self, movie_id: MovieId) -> AppResult<Credits> {
        let credits: Credits = self
            .get_json(&format!("movie/{}/credits", movie_id), &[])
            .await?;
        tracing::debug!(
            movie_id,
            cast = credits.cast.len(),
            crew = credits.crew.len(),
            "Movie credits fetched"
        );
        Ok(credits)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_discover_params_explore_without_rated_genres() {
        let query = DiscoverQuery::explore(1, &BTreeSet::new());
        let params = TmdbClient::discover_params(&query);
        assert_eq!(params, vec![("page", "1".to_string())]);
    }

    #[test]
    fn test_discover_params_explore_excludes_rated_genres() {
        let query = DiscoverQuery::explore(3, &BTreeSet::from([28, 18]));
        let params = TmdbClient::discover_params(&query);
        assert_eq!(
            params,
            vec![
                ("page", "3".to_string()),
                ("without_genres", "18,28".to_string())
            ]
        );
    }

    #[test]
    fn test_discover_params_recommended() {
        let query = DiscoverQuery::recommended(1, &BTreeSet::from([35]));
        let params = TmdbClient::discover_params(&query);
        assert_eq!(
            params,
            vec![("page", "1".to_string()), ("with_genres", "35".to_string())]
        );
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let client = TmdbClient::new(
            "key".to_string(),
            "https://api.themoviedb.org/3/".to_string(),
            None,
        );
        assert_eq!(client.api_url, "https://api.themoviedb.org/3");
    }

    #[tokio::test]
    async fn test_discover_rejects_page_zero() {
        let client = TmdbClient::new("key".to_string(), "http://test.local".to_string(), None);
        let result = client.discover(DiscoverQuery::explore(0, &BTreeSet::new())).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_discover_response_deserialization() {
        let json = r#"{
            "page": 1,
            "results": [
                {"id": 1, "title": "One", "genre_ids": [28]},
                {"id": 2, "title": "Two", "genre_ids": []}
            ],
            "total_pages": 10
        }"#;

        let response: MovieResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.movies.len(), 2);
        assert_eq!(response.movies[0].genre_ids, vec![28]);
    }
}
