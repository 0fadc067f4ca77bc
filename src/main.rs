//! Fastep sync engine binary.
//!
//! Serves the local API immediately (answering `NOT_READY` while loading) and runs the
//! bootstrap in the background.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fastep_sync::config::Config;
use fastep_sync::db::{init_database, SettingsRepository};
use fastep_sync::remote::DataApiClient;
use fastep_sync::{create_router, AppState, Engine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Fastep sync engine");
    tracing::info!("Settings path: {:?}", config.settings_db_path);
    tracing::info!("Data API: {}", config.remote.base_url);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Local settings (session, language, populated markers)
    let pool = init_database(&config.settings_db_path).await?;
    let settings = Arc::new(SettingsRepository::new(pool));

    // Remote document store
    let remote = Arc::new(DataApiClient::new(config.remote.clone())?);

    let engine = Engine::assemble(remote, settings, &config.admin_email);

    let state = AppState {
        store: engine.store.clone(),
        session: engine.session.clone(),
        config: Arc::new(config.clone()),
    };

    let loader = engine.loader;
    tokio::spawn(async move {
        let report = loader.run().await;
        tracing::info!(
            "Bootstrap complete: {:?}, user: {:?}",
            report.collections,
            report.user.map(|u| u.id)
        );
    });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
