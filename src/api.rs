//! HTTP surface: an axum router over [`CostService`] gated by [`TokenVerifier`].

pub mod auth;
pub mod error;
pub mod handlers;

pub use auth::*;
pub use error::*;
pub use handlers::*;

// crates.io
use axum::{
	Router,
	extract::FromRef,
	routing::{get, put},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
// self
use crate::{_prelude::*, auth::TokenVerifier, config::ServiceConfig, service::CostService};

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
	/// Record operations.
	pub service: CostService,
	/// Bearer token verifier.
	pub verifier: Arc<TokenVerifier>,
}
impl AppState {
	/// Creates a state from its parts.
	pub fn new(service: CostService, verifier: Arc<TokenVerifier>) -> Self {
		Self { service, verifier }
	}

	/// Opens the configured store and builds the production verifier.
	pub fn from_config(config: &ServiceConfig) -> Result<Self> {
		let store = config.store.open()?;
		let verifier = TokenVerifier::from_config(&config.auth)?;

		Ok(Self::new(CostService::new(store), Arc::new(verifier)))
	}
}
impl FromRef<AppState> for Arc<TokenVerifier> {
	fn from_ref(state: &AppState) -> Self {
		state.verifier.clone()
	}
}
impl FromRef<AppState> for CostService {
	fn from_ref(state: &AppState) -> Self {
		state.service.clone()
	}
}

/// Builds the service router with permissive CORS and request tracing.
pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(handlers::health))
		.route("/api/cost", get(handlers::list_costs).post(handlers::create_cost))
		.route("/api/cost/{cost_id}", put(handlers::update_cost).delete(handlers::delete_cost))
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
		.with_state(state)
}

/// Serves the router on `listener` until Ctrl-C is received.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
	tracing::info!(addr = ?listener.local_addr().ok(), "Serving cost API.");

	axum::serve(listener, router(state)).with_graceful_shutdown(shutdown_signal()).await
}

async fn shutdown_signal() {
	match tokio::signal::ctrl_c().await {
		Ok(()) => tracing::info!("Shutdown signal received."),
		Err(e) => {
			tracing::error!(error = %e, "Cannot listen for Ctrl-C; running until killed.");

			std::future::pending::<()>().await;
		},
	}
}
