mod api;
mod middleware;
mod scheduler;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use maikekai_reviews::{
    Carousel, PlacesProxyClient, PlacesUpstreamClient, ReviewAggregator, ReviewCache,
    ReviewsConfig,
};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState};
use crate::store::PgReviewStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = maikekai_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(?config, "starting maikekai-server");

    let pool_config = maikekai_db::PoolConfig::from_app_config(&config);
    let pool = maikekai_db::connect_pool(&config.database_url, pool_config)?;

    let reviews_config = ReviewsConfig::from_app_config(&config);
    if reviews_config.place_id.is_none() {
        tracing::warn!("GOOGLE_PLACE_ID not set; external reviews unavailable");
    }
    let cache = Arc::new(ReviewCache::new(reviews_config.cache_ttl));
    let aggregator = Arc::new(ReviewAggregator::new(
        PgReviewStore::new(pool.clone()),
        PlacesProxyClient::new(&reviews_config.proxy_url, reviews_config.http_timeout)?,
        Arc::clone(&cache),
        reviews_config.place_id.clone(),
    ));

    let places = match config.google_places_api_key.as_deref() {
        Some(key) => Some(Arc::new(PlacesUpstreamClient::new(
            key,
            Duration::from_secs(config.http_timeout_secs),
        )?)),
        None => {
            tracing::warn!("GOOGLE_PLACES_API_KEY not set; /api/google-reviews will return config_error");
            None
        }
    };

    // Bound first: the carousel's initial load goes through this server's
    // own proxy route.
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");

    let carousel = Carousel::spawn(Arc::clone(&aggregator), reviews_config.carousel_interval)?;
    let _scheduler = scheduler::build_scheduler(Arc::clone(&cache), carousel.clone()).await?;

    let app = build_app(
        AppState {
            pool,
            aggregator,
            carousel: carousel.clone(),
            places,
        },
        default_rate_limit_state(),
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    carousel.dispose().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
