// rest_api/src/lib.rs
//! HTTP surface of the hospital management system.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Error as AnyhowError};
use axum::{
    http::{header, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use lib::{create_storage, Collection, DocumentStore, StorageConfig};
use log::{info, warn};
use models::medical::{Announcement, Appointment, Checkup, Patient, Room, User};
use security::{authorize, AccessPolicy, AuthService, Guard, Resource, TokenIssuer};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};

pub mod ai;
pub mod config;
pub mod errors;
pub mod extract;
pub mod handlers;

pub use config::{load_rest_api_config, RestApiConfig};
pub use errors::RestApiError;

use crate::ai::{GeminiClient, GenerativeModel};

// Shared state for the Axum application
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<AuthService>,
    pub policy: Arc<AccessPolicy>,
    pub ai: Arc<dyn GenerativeModel>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        tokens: TokenIssuer,
        policy: AccessPolicy,
        ai: Arc<dyn GenerativeModel>,
    ) -> Self {
        let auth = AuthService::new(Collection::new(Arc::clone(&store)), tokens);
        AppState {
            store,
            auth: Arc::new(auth),
            policy: Arc::new(policy),
            ai,
        }
    }

    /// Opens the store, loads the access policy and builds the AI client.
    pub fn from_config(config: &RestApiConfig) -> Result<Self, AnyhowError> {
        let storage_config = StorageConfig::from_url(&config.database_url)
            .context("Failed to parse DATABASE_URL")?;
        let store = create_storage(&storage_config).context("Failed to open document store")?;

        let policy = match &config.roles_policy_path {
            Some(path) => AccessPolicy::from_yaml_file(path)?,
            None => AccessPolicy::embedded()?,
        };

        let tokens = TokenIssuer::new(config.jwt_secret.as_bytes(), chrono::Duration::hours(config.token_ttl_hours));

        if config.ai_api_key().is_none() {
            warn!("AI_API_KEY is not set; /api/ai/analyze will report a configuration error");
        }
        let ai = GeminiClient::new(
            config.ai_api_key().map(str::to_string),
            &config.ai_model,
            &config.ai_base_url,
            Duration::from_secs(config.ai_timeout_secs),
        )
        .context("Failed to build AI client")?;

        Ok(AppState::new(store, tokens, policy, Arc::new(ai)))
    }

    pub fn patients(&self) -> Collection<Patient> {
        Collection::new(Arc::clone(&self.store))
    }

    pub fn checkups(&self) -> Collection<Checkup> {
        Collection::new(Arc::clone(&self.store))
    }

    pub fn appointments(&self) -> Collection<Appointment> {
        Collection::new(Arc::clone(&self.store))
    }

    pub fn rooms(&self) -> Collection<Room> {
        Collection::new(Arc::clone(&self.store))
    }

    pub fn announcements(&self) -> Collection<Announcement> {
        Collection::new(Arc::clone(&self.store))
    }

    pub fn users(&self) -> Collection<User> {
        Collection::new(Arc::clone(&self.store))
    }
}

fn guarded(router: Router<AppState>, guard: &Guard, resource: Resource) -> Router<AppState> {
    router.route_layer(from_fn_with_state(guard.for_resource(resource), authorize))
}

/// Builds the full router. Every route except health, register and login
/// sits behind the auth middleware.
pub fn build_router(state: AppState) -> Router {
    let guard = Guard::new(Arc::clone(&state.auth), Arc::clone(&state.policy));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route("/api/health", get(handlers::health::health_check_handler))
        .merge(handlers::auth::routes(&guard))
        .merge(guarded(handlers::patients::routes(), &guard, Resource::Patients))
        .merge(guarded(handlers::checkups::routes(), &guard, Resource::Checkups))
        .merge(guarded(handlers::appointments::routes(), &guard, Resource::Appointments))
        .merge(guarded(handlers::rooms::routes(), &guard, Resource::Rooms))
        .merge(guarded(handlers::announcements::routes(), &guard, Resource::Announcements))
        .merge(guarded(handlers::users::routes(), &guard, Resource::Users))
        .merge(guarded(handlers::analysis::routes(), &guard, Resource::Analysis))
        .with_state(state)
        .layer(cors)
}

// Main function to start the REST API server
pub async fn start_server(config: RestApiConfig, shutdown_rx: oneshot::Receiver<()>) -> Result<(), AnyhowError> {
    let state = AppState::from_config(&config)?;
    let store = Arc::clone(&state.store);
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind to address: {}", addr))?;
    info!("REST API server listening on {} (storage: {})", addr, store.get_type());

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
            info!("Received shutdown signal.");
        })
        .await
        .context("REST API server failed to start or run")?;

    store.flush().await.context("Failed to flush document store")?;
    info!("REST API server stopped.");
    Ok(())
}
