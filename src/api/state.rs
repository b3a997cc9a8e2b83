use std::sync::Arc;

use crate::{
    db::PreferenceStore,
    services::{CatalogClient, FeedAssembler, MovieDetailController},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogClient>,
    pub store: Arc<dyn PreferenceStore>,
    /// The single home feed served to the client
    pub feed: Arc<FeedAssembler>,
    /// Prefix for poster and backdrop paths
    pub image_base_url: Arc<str>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        store: Arc<dyn PreferenceStore>,
        image_base_url: &str,
    ) -> Self {
        let feed = Arc::new(FeedAssembler::new(catalog.clone(), store.clone()));
        Self {
            catalog,
            store,
            feed,
            image_base_url: Arc::from(image_base_url.trim_end_matches('/')),
        }
    }

    /// A fresh controller for one detail screen
    pub fn detail_controller(&self) -> MovieDetailController {
        MovieDetailController::new(self.catalog.clone(), self.store.clone())
    }

    /// Full URL of a poster or backdrop, if the movie has one
    pub fn image_url(&self, path: Option<&str>) -> Option<String> {
        path.filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", self.image_base_url, p))
    }
}
