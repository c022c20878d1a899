//! Warbanner Engine - Main entry point.

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warbanner_engine::infrastructure::settings::EngineSettings;
use warbanner_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {e}");
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warbanner_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Warbanner Engine");

    let settings = EngineSettings::from_env();
    tracing::info!(
        tick_interval_ms = settings.tick_interval_ms,
        tick_timeout_ms = settings.tick_timeout_ms,
        territory_sweep_secs = settings.territory_sweep_secs,
        preparation_secs = settings.preparation_secs,
        store_retries = settings.store_retries,
        "Engine configured"
    );

    let (app, broadcaster) = App::in_memory(settings);

    let restored = app.restore().await?;
    tracing::info!(
        sessions = restored.sessions,
        respawns = restored.respawns,
        "Restored state from storage"
    );

    let cancel = CancellationToken::new();
    let mut handles = app.spawn_background(&cancel);

    // Relay stand-in: log every outbound message until shutdown.
    let mut events = broadcaster.subscribe();
    let relay_cancel = cancel.child_token();
    handles.push(tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = relay_cancel.cancelled() => break,
                received = events.recv() => match received {
                    Ok(message) => match serde_json::to_string(&message) {
                        Ok(json) => tracing::debug!(kind = message.kind(), payload = %json, "Broadcast"),
                        Err(e) => tracing::warn!(error = %e, "Failed to serialize broadcast"),
                    },
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped = skipped, "Broadcast relay lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    }));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    cancel.cancel();
    app.shutdown();
    for handle in handles {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Background task ended abnormally");
        }
    }

    tracing::info!("Warbanner Engine stopped");
    Ok(())
}
