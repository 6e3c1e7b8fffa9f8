//! sismo server binary.
//!
//! Loads the region document, starts feed polling, eviction and subscriber
//! fan-out, then serves the REST and WebSocket surfaces until SIGTERM/SIGINT.

use std::net::SocketAddr;
use std::sync::Arc;

use sismo_geo::RegionClassifier;
use sismo_server::background::{start_collection_task, start_notification_task};
use sismo_server::config;
use sismo_server::hub::Hub;
use sismo_server::retention::start_eviction_task;
use sismo_server::{app, AppState};
use sismo_store::EventManager;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("SISMO_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration: the server cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    // Region data is required; without it every event would be rejected.
    let classifier = RegionClassifier::load(&config.regions.path)
        .expect("failed to load region document: check regions.path in config");

    let (manager, new_events) = EventManager::new(
        Arc::new(classifier),
        config.store.max_age(),
        config.store.notify_capacity(),
    );
    let manager = Arc::new(manager);
    let (hub, hub_task) = Hub::spawn(config.hub.session_queue_capacity());

    let client = sismo_feeds::http_client(config.ingest.feed_timeout())
        .expect("failed to build HTTP client");
    let feeds = sismo_feeds::build_feeds(&config.ingest.sources, &client)
        .expect("unsupported feed in ingest.sources");

    // Background tasks
    let cancel = CancellationToken::new();
    let collection = tokio::spawn(start_collection_task(
        feeds,
        manager.clone(),
        config.ingest.fetch_interval(),
        cancel.clone(),
    ));
    let notification = tokio::spawn(start_notification_task(
        new_events,
        hub.clone(),
        cancel.clone(),
    ));
    let eviction = tokio::spawn(start_eviction_task(
        manager.clone(),
        config.store.eviction_interval(),
        cancel.clone(),
    ));

    // Build application
    let app = app(AppState {
        manager,
        hub: hub.clone(),
    });
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting sismo server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address: is another process using this port?");

    // On signal: stop background work and close every subscriber queue so
    // open WebSocket sessions end and the server can drain.
    let on_signal = {
        let cancel = cancel.clone();
        let hub = hub.clone();
        async move {
            shutdown_signal().await;
            cancel.cancel();
            hub.shutdown();
        }
    };

    let grace = config.hub.shutdown_grace();
    let server = axum::serve(listener, app).with_graceful_shutdown(on_signal);
    let mut serve_task = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut serve_task => {
            if let Ok(Err(e)) = result {
                tracing::error!(error = %e, "server error");
            }
        }
        () = async {
            cancel.cancelled().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(grace_seconds = grace.as_secs(), "connections did not drain in time; forcing shutdown");
            serve_task.abort();
        }
    }

    cancel.cancel();
    hub.shutdown();
    let _ = tokio::join!(collection, notification, eviction, hub_task);

    tracing::info!("sismo server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
