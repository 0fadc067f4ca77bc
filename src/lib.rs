//! Fastep sync engine
//!
//! Local-first state for the workforce app: six record collections held in memory,
//! mirrored fire-and-forget to a remote document store, with session and language
//! scalars persisted locally. Runs memory-only when no remote credential is configured.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod remote;
pub mod seed;
pub mod session;
pub mod settings;
pub mod state;
pub mod sync;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use bootstrap::BootstrapLoader;
use config::Config;
use remote::RemoteStore;
use session::SessionManager;
use settings::SettingsStore;
use state::StateStore;
use sync::CollectionSyncer;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StateStore>,
    pub session: Arc<SessionManager>,
    pub config: Arc<Config>,
}

/// The wired core, before bootstrap has run.
pub struct Engine {
    pub store: Arc<StateStore>,
    pub session: Arc<SessionManager>,
    pub loader: BootstrapLoader,
}

impl Engine {
    /// Wire syncer, store, session manager and bootstrap loader around one remote and
    /// one settings store. The store starts out holding the seed data.
    pub fn assemble(
        remote: Arc<dyn RemoteStore>,
        settings: Arc<dyn SettingsStore>,
        admin_email: &str,
    ) -> Self {
        let syncer = Arc::new(CollectionSyncer::new(remote.clone(), settings.clone()));
        let store = Arc::new(StateStore::new(
            seed::collections(),
            syncer,
            settings.clone(),
        ));
        let session = Arc::new(SessionManager::new(settings.clone(), store.clone()));
        let loader = BootstrapLoader::new(
            remote,
            settings,
            store.clone(),
            session.clone(),
            seed::administrator(admin_email),
        );

        Self {
            store,
            session,
            loader,
        }
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let store = state.store.clone();

    let api_routes = Router::new()
        // Collections
        .route(
            "/collections/{name}",
            get(api::get_collection).put(api::replace_collection),
        )
        .route("/collections/{name}/records", post(api::upsert_record))
        .route("/collections/{name}/records/{id}", delete(api::delete_record))
        // Session
        .route("/session", get(api::get_session))
        .route("/session/login", post(api::login))
        .route("/session/logout", post(api::logout))
        // Language
        .route("/language", get(api::get_language).put(api::set_language))
        // Sync status
        .route("/sync", get(api::get_sync_status))
        // Nothing under /api is answered before bootstrap finishes
        .layer(middleware::from_fn(move |req, next| {
            api::ready_gate_layer(store.clone(), req, next)
        }));

    // Health check (always available)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
pub(crate) mod test_support;
