pub mod catalog;
pub mod detail;
pub mod feed;
pub mod preferences;

pub use catalog::{CatalogClient, DiscoverQuery, TmdbClient, MAX_DISCOVER_PAGE};
pub use detail::{MovieDetailController, RatingOutcome};
pub use feed::{FeedAssembler, LoadMore};
pub use preferences::PreferenceUpdater;
