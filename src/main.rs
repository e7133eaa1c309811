//! Match Clock - A local live-match clock server
//!
//! This is the main entry point for the match-clock application.

use std::sync::Arc;
use anyhow::anyhow;
use tokio::{net::TcpListener, sync::watch};
use tracing::info;

use match_clock::{
    config::Config,
    state::AppState,
    api::create_router,
    tasks::display_refresh_task,
    timer::{FileTimerStore, MatchTimers, SystemClock},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("match_clock={},tower_http=info", config.log_level()))
        .init();

    info!("Starting match-clock server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, data_dir={}, namespace={}, refresh={}ms",
          config.host, config.port, config.data_dir.display(), config.namespace, config.refresh_ms);

    let store = FileTimerStore::open(&config.data_dir, config.namespace.clone())
        .map_err(|e| anyhow!(e))?;
    let timers = MatchTimers::new(Arc::new(store), Arc::new(SystemClock));
    let restored = timers.restore().map_err(|e| anyhow!(e))?;
    info!("Restored {} persisted timers", restored);

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.refresh_interval(),
        timers,
    ));

    // Start the display refresh background task
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresh = tokio::spawn(display_refresh_task(Arc::clone(&state), shutdown_rx));

    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /matches/:id/timer        - Current elapsed time");
    info!("  POST /matches/:id/timer/toggle - Start or pause");
    info!("  POST /matches/:id/timer/reset  - Reset to 00:00");
    info!("  POST /matches/:id/events       - Draft an event stamped with the clock");
    info!("  POST /matches/:id/events/adjust - Correct logged event delays");
    info!("  POST /video/markers            - Lay out video markers");
    info!("  GET  /status                   - Server status");
    info!("  GET  /health                   - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = refresh.await {
        tracing::warn!("Display refresh task ended abnormally: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
