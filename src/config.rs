//! Typed service configuration.
//!
//! [`AuthConfig`] describes the identity provider and the application tokens must be bound to;
//! [`StoreConfig`] selects and bounds the record store. Both are assembled by the CLI but can be
//! built directly by embedders and tests.

/// Builder API for [`AuthConfig`].
pub mod builder;

pub use builder::*;

// std
use std::{net::SocketAddr, path::PathBuf};
// crates.io
use jsonwebtoken::Algorithm;
// self
use crate::{
	_prelude::*,
	auth::KeyRefreshPolicy,
	error::ConfigError,
	store::{FileStore, MemoryStore, RecordStore, TimeoutStore},
};

/// Builds the issuer URL of a Cognito user pool.
pub fn cognito_issuer(region: &str, user_pool_id: &str) -> String {
	format!("https://cognito-idp.{region}.amazonaws.com/{user_pool_id}")
}

/// Validated token verification settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
	/// Exact value the `iss` claim must carry.
	pub issuer: String,
	/// Application identifier tokens must be bound to.
	pub client_id: String,
	/// Location of the JWKS document.
	pub jwks_url: Url,
	/// Accepted signature algorithms.
	pub algorithms: Vec<Algorithm>,
	/// Clock skew tolerated when checking `exp` and `nbf`.
	pub leeway: StdDuration,
	/// When cached signing keys are refetched.
	pub key_policy: KeyRefreshPolicy,
	/// Bound on each key set request.
	pub fetch_timeout: StdDuration,
}
impl AuthConfig {
	/// Creates a new builder for the provided issuer and application.
	pub fn builder(issuer: impl Into<String>, client_id: impl Into<String>) -> AuthConfigBuilder {
		AuthConfigBuilder::new(issuer, client_id)
	}
}

/// Record store backends selectable at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum StoreKind {
	/// Process-local map; contents vanish on exit.
	Memory,
	/// JSON snapshot file.
	#[default]
	File,
}

/// Record store selection and per-call bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
	/// Backend to open.
	pub kind: StoreKind,
	/// Snapshot location for [`StoreKind::File`].
	pub path: Option<PathBuf>,
	/// Bound applied to every store call.
	pub timeout: StdDuration,
}
impl StoreConfig {
	/// Snapshot file name used when none is configured.
	pub const DEFAULT_PATH: &'static str = "LogisticsCost.json";

	/// Opens the configured backend wrapped in a [`TimeoutStore`].
	pub fn open(&self) -> Result<Arc<dyn RecordStore>> {
		let inner: Arc<dyn RecordStore> = match self.kind {
			StoreKind::Memory => Arc::new(MemoryStore::default()),
			StoreKind::File => {
				let path = self.path.as_ref().ok_or(ConfigError::MissingStorePath)?;

				Arc::new(FileStore::open(path.clone())?)
			},
		};

		Ok(Arc::new(TimeoutStore::new(inner, self.timeout)))
	}
}
impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			kind: StoreKind::default(),
			path: Some(PathBuf::from(Self::DEFAULT_PATH)),
			timeout: TimeoutStore::DEFAULT_LIMIT,
		}
	}
}

/// Everything `serve` needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
	/// Listen address.
	pub bind: SocketAddr,
	/// Token verification settings.
	pub auth: AuthConfig,
	/// Record store settings.
	pub store: StoreConfig,
}
