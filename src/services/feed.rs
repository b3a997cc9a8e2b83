use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    db::PreferenceStore,
    error::AppResult,
    models::{
        Feed, FeedReason, GenreId, GenreScores, HomeViewState, PaginationCursor, PreferenceEntry,
    },
    services::{
        catalog::{CatalogClient, DiscoverQuery, MAX_DISCOVER_PAGE},
        preferences::PreferenceUpdater,
    },
};

/// Outcome of a load-more request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// Another load-more was still in flight
    Skipped,
    /// The page was fetched; holds how many unseen movies were appended
    Appended(usize),
    /// The catalog call failed; the feed is unchanged
    Failed,
    /// The cursor is already on the last page the catalog serves
    Exhausted,
}

/// A feed built from fresh preference scores, not yet shown
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledFeed {
    pub feed: Feed,
    pub reason: FeedReason,
    pub cursor: PaginationCursor,
}

/// Fetches the recommended and explore batches concurrently and merges them
///
/// Both queries must succeed; a failure in either discards the other's
/// results.
pub async fn assemble(catalog: &dyn CatalogClient, scores: &GenreScores) -> AppResult<AssembledFeed> {
    let liked = scores.liked();
    let disliked = scores.disliked();
    let rated: BTreeSet<GenreId> = liked.union(&disliked).copied().collect();

    let reason = if liked.is_empty() {
        FeedReason::Trending
    } else {
        FeedReason::Recommended
    };

    let recommended = async {
        if liked.is_empty() {
            Ok(Vec::new())
        } else {
            catalog.discover(DiscoverQuery::recommended(1, &liked)).await
        }
    };
    let explore = catalog.discover(DiscoverQuery::explore(1, &rated));

    let (recommended, explore) = tokio::try_join!(recommended, explore)?;

    tracing::debug!(
        recommended = recommended.len(),
        explore = explore.len(),
        "Feed batches fetched"
    );

    Ok(AssembledFeed {
        feed: Feed::from_batches([recommended, explore]),
        reason,
        cursor: PaginationCursor::first_page(liked, disliked),
    })
}

#[derive(Default)]
struct FeedState {
    view: HomeViewState,
    cursor: PaginationCursor,
    genre_names: HashMap<GenreId, String>,
    in_flight: HashMap<Flag, usize>,
}

/// Loading flags of the home view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Flag {
    Loading,
    Refreshing,
    LoadingMore,
}

impl Flag {
    fn slot(self, view: &mut HomeViewState) -> &mut bool {
        match self {
            Flag::Loading => &mut view.is_loading,
            Flag::Refreshing => &mut view.is_refreshing,
            Flag::LoadingMore => &mut view.is_loading_more,
        }
    }
}

fn lock(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Raises a loading flag and lowers it when the last guard for that flag is
/// dropped, including when the owning future is cancelled mid-request
struct FlagGuard<'a> {
    state: &'a Mutex<FeedState>,
    flag: Flag,
}

impl<'a> FlagGuard<'a> {
    fn raise(state: &'a Mutex<FeedState>, flag: Flag) -> Self {
        Self::enter(&mut lock(state), flag);
        Self { state, flag }
    }

    /// Raises the flag only if no other guard holds it
    fn try_raise(state: &'a Mutex<FeedState>, flag: Flag) -> Option<Self> {
        let mut guard = lock(state);
        if guard.in_flight.get(&flag).copied().unwrap_or(0) > 0 {
            return None;
        }
        Self::enter(&mut guard, flag);
        Some(Self { state, flag })
    }

    fn enter(state: &mut FeedState, flag: Flag) {
        *state.in_flight.entry(flag).or_insert(0) += 1;
        *flag.slot(&mut state.view) = true;
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        let remaining = match state.in_flight.get_mut(&self.flag) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => 0,
        };
        *self.flag.slot(&mut state.view) = remaining > 0;
    }
}

/// Owns the home feed: assembly from preference scores, pagination and reset
///
/// Full refreshes are not serialized against each other; overlapping
/// refreshes race and the last one to finish wins. `is_refreshing` stays
/// raised until every overlapping refresh has finished.
pub struct FeedAssembler {
    catalog: Arc<dyn CatalogClient>,
    store: Arc<dyn PreferenceStore>,
    updater: PreferenceUpdater,
    state: Mutex<FeedState>,
}

impl FeedAssembler {
    pub fn new(catalog: Arc<dyn CatalogClient>, store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            catalog,
            updater: PreferenceUpdater::new(store.clone()),
            store,
            state: Mutex::new(FeedState::default()),
        }
    }

    /// Current view state
    pub fn snapshot(&self) -> HomeViewState {
        lock(&self.state).view.clone()
    }

    /// Current pagination cursor
    pub fn cursor(&self) -> PaginationCursor {
        lock(&self.state).cursor.clone()
    }

    /// First launch: resolve genre names, then build the feed
    pub async fn initialize(&self) {
        self.load_genre_names().await;
        self.rebuild(Flag::Loading).await;
    }

    /// Rebuilds the feed from the current preference scores
    ///
    /// Returns whether the new feed was applied. On failure the previous
    /// feed, reason and cursor stay in place.
    pub async fn refresh(&self) -> bool {
        self.rebuild(Flag::Refreshing).await
    }

    /// Clears every genre score and rebuilds the feed as on first launch
    pub async fn reset_preferences(&self) -> AppResult<bool> {
        self.updater.reset().await?;
        Ok(self.refresh().await)
    }

    /// Fetches the genre id → name map used to label preference scores
    ///
    /// Failures are logged and leave labels falling back to genre ids.
    pub async fn load_genre_names(&self) {
        match self.catalog.genre_list().await {
            Ok(genres) => {
                let names: HashMap<GenreId, String> =
                    genres.into_iter().map(|g| (g.id, g.name)).collect();
                tracing::info!(genres = names.len(), "Genre names resolved");
                lock(&self.state).genre_names = names;
            }
            Err(e) => {
                tracing::error!(error = %e, catalog = self.catalog.name(), "Failed to fetch genre names");
            }
        }
    }

    /// Stored scores labelled with genre names
    pub async fn preference_entries(&self) -> AppResult<Vec<PreferenceEntry>> {
        let scores = self.store.get_all().await?;
        let state = lock(&self.state);
        Ok(scores.entries(&state.genre_names))
    }

    /// Appends the next explore page, skipping movies already in the feed
    ///
    /// The exclusion set comes from the cursor captured at the last refresh,
    /// not from the store.
    pub async fn load_more(&self) -> LoadMore {
        let Some(_flag) = FlagGuard::try_raise(&self.state, Flag::LoadingMore) else {
            tracing::debug!("Load more already in flight, skipping");
            return LoadMore::Skipped;
        };

        let next = {
            let mut state = lock(&self.state);
            if state.cursor.current_page >= MAX_DISCOVER_PAGE {
                None
            } else {
                state.cursor.current_page += 1;
                Some((state.cursor.current_page, state.cursor.rated_genre_ids()))
            }
        };
        let Some((page, rated)) = next else {
            tracing::debug!(max_page = MAX_DISCOVER_PAGE, "No more pages to load");
            return LoadMore::Exhausted;
        };

        tracing::debug!(page, "Loading more movies");

        match self.catalog.discover(DiscoverQuery::explore(page, &rated)).await {
            Ok(movies) => {
                let fetched = movies.len();
                let added = lock(&self.state).view.movies.extend_unique(movies);
                tracing::info!(page, fetched, added, "Appended movies to feed");
                LoadMore::Appended(added)
            }
            Err(e) => {
                tracing::error!(error = %e, page, "Error loading more movies");
                LoadMore::Failed
            }
        }
    }

    async fn rebuild(&self, flag: Flag) -> bool {
        let _flag = FlagGuard::raise(&self.state, flag);

        let scores = match self.store.get_all().await {
            Ok(scores) => scores,
            Err(e) => {
                tracing::error!(error = %e, store = self.store.name(), "Failed to read genre scores");
                return false;
            }
        };

        {
            let mut state = lock(&self.state);
            let entries = scores.entries(&state.genre_names);
            state.view.preference_scores = entries;
        }

        match assemble(&*self.catalog, &scores).await {
            Ok(assembled) => {
                let mut state = lock(&self.state);
                tracing::info!(
                    movies = assembled.feed.len(),
                    reason = %assembled.reason,
                    liked = assembled.cursor.liked_genre_ids.len(),
                    disliked = assembled.cursor.disliked_genre_ids.len(),
                    "Feed assembled"
                );
                state.view.movies = assembled.feed;
                state.view.recommendation_reason = Some(assembled.reason);
                state.view.last_refreshed_at = Some(Utc::now());
                state.cursor = assembled.cursor;
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching initial feed");
                false
            }
        }
    }
}
