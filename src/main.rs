use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use watchit_api::{
    api::{create_router, AppState},
    config::{Config, PreferenceBackend},
    db::{create_redis_client, Cache, MemoryPreferenceStore, PreferenceStore, RedisPreferenceStore},
    services::{CatalogClient, TmdbClient},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    let (store, cache, cache_handle) = match config.preference_store {
        PreferenceBackend::Redis => {
            let redis_client = create_redis_client(&config.redis_url)?;
            let (cache, handle) = Cache::new(redis_client.clone());
            let store: Arc<dyn PreferenceStore> = Arc::new(RedisPreferenceStore::new(
                redis_client,
                &config.preference_profile,
            ));
            (store, Some(cache), Some(handle))
        }
        PreferenceBackend::Memory => {
            tracing::warn!("Using in-memory preference store; scores are lost on restart");
            let store: Arc<dyn PreferenceStore> = Arc::new(MemoryPreferenceStore::new());
            (store, None, None)
        }
    };

    let catalog: Arc<dyn CatalogClient> = Arc::new(TmdbClient::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        cache,
    ));

    let state = AppState::new(catalog, store, &config.image_base_url);

    // Genre names first, then the first feed; requests are served meanwhile
    let feed = state.feed.clone();
    tokio::spawn(async move { feed.initialize().await });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        address = %config.bind_address(),
        preference_store = ?config.preference_store,
        "Server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("watchit_api=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
