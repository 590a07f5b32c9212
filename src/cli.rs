//! Command-line interface of the `cost-api` binary.
//!
//! Every flag falls back to a `COST_API_*` environment variable.

// std
use std::{net::SocketAddr, path::PathBuf};
// crates.io
use clap::{Args, Parser, Subcommand};
// self
use crate::{
	_prelude::*,
	auth::KeyRefreshPolicy,
	config::{self, AuthConfig, ServiceConfig, StoreConfig, StoreKind},
	error::ConfigError,
};

/// Cost record API.
#[derive(Debug, Parser)]
#[command(name = "cost-api", version, about, long_about = None)]
pub struct Cli {
	/// Action to run.
	#[command(subcommand)]
	pub command: Command,
}

/// Top-level actions.
#[derive(Debug, Subcommand)]
pub enum Command {
	/// Serve the HTTP API.
	Serve(Box<ServeArgs>),
	/// Create the record store if it does not exist yet.
	Provision(StoreArgs),
}

/// Record store flags shared by every action.
#[derive(Debug, Args)]
pub struct StoreArgs {
	/// Store backend.
	#[arg(
		long = "store",
		env = "COST_API_STORE",
		value_enum,
		default_value_t = StoreKind::File
	)]
	pub kind: StoreKind,
	/// Snapshot file used by the file backend.
	#[arg(
		long = "store-path",
		env = "COST_API_STORE_PATH",
		default_value = StoreConfig::DEFAULT_PATH
	)]
	pub path: PathBuf,
	/// Bound on every store call, in milliseconds.
	#[arg(
		long = "store-timeout-ms",
		env = "COST_API_STORE_TIMEOUT_MS",
		default_value_t = 5_000
	)]
	pub timeout_ms: u64,
}
impl StoreArgs {
	/// Converts the flags into a [`StoreConfig`].
	pub fn into_config(self) -> StoreConfig {
		StoreConfig {
			kind: self.kind,
			path: Some(self.path),
			timeout: StdDuration::from_millis(self.timeout_ms),
		}
	}
}

/// Flags of `cost-api serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
	/// Listen address.
	#[arg(long, env = "COST_API_BIND", default_value = "0.0.0.0:8000")]
	pub bind: SocketAddr,
	/// Token issuer; `iss` must equal it exactly.
	#[arg(
		long,
		env = "COST_API_ISSUER",
		conflicts_with_all = ["cognito_region", "user_pool_id"]
	)]
	pub issuer: Option<String>,
	/// Cognito region, combined with the user pool id into the issuer.
	#[arg(long, env = "COST_API_COGNITO_REGION", requires = "user_pool_id")]
	pub cognito_region: Option<String>,
	/// Cognito user pool id.
	#[arg(long, env = "COST_API_USER_POOL_ID", requires = "cognito_region")]
	pub user_pool_id: Option<String>,
	/// Application client id tokens must be issued to.
	#[arg(long, env = "COST_API_CLIENT_ID")]
	pub client_id: String,
	/// Key set location; defaults to `{issuer}/.well-known/jwks.json`.
	#[arg(long, env = "COST_API_JWKS_URL")]
	pub jwks_url: Option<Url>,
	/// Accepted signature algorithms, comma separated.
	#[arg(long, env = "COST_API_ALGORITHMS", value_delimiter = ',', default_value = "RS256")]
	pub algorithms: Vec<String>,
	/// Tolerated clock skew for `exp` and `nbf`, in seconds.
	#[arg(long, env = "COST_API_LEEWAY_SECS", default_value_t = 0)]
	pub leeway_secs: u64,
	/// Refetch signing keys once they are older than this many seconds.
	#[arg(long, env = "COST_API_KEY_MAX_AGE_SECS")]
	pub key_max_age_secs: Option<u64>,
	/// Refetch signing keys once when a token names an unknown key.
	#[arg(long, env = "COST_API_REFETCH_ON_UNKNOWN_KID")]
	pub refetch_on_unknown_kid: bool,
	/// Minimum seconds between refetches triggered by unknown key identifiers.
	#[arg(long, env = "COST_API_MIN_REFETCH_INTERVAL_SECS", default_value_t = 30)]
	pub min_refetch_interval_secs: u64,
	#[command(flatten)]
	#[allow(missing_docs)]
	pub store: StoreArgs,
}
impl ServeArgs {
	/// Validates the flags into a [`ServiceConfig`].
	pub fn into_config(self) -> Result<ServiceConfig, ConfigError> {
		let issuer = match (self.issuer, self.cognito_region, self.user_pool_id) {
			(Some(issuer), _, _) => issuer,
			(None, Some(region), Some(pool)) => config::cognito_issuer(&region, &pool),
			_ => return Err(ConfigError::MissingIssuer),
		};
		let algorithms = self
			.algorithms
			.iter()
			.map(|name| config::parse_algorithm(name))
			.collect::<Result<Vec<_>, _>>()?;
		let key_policy = KeyRefreshPolicy {
			max_age: self.key_max_age_secs.map(StdDuration::from_secs),
			refetch_on_unknown_kid: self.refetch_on_unknown_kid,
			min_refetch_interval: StdDuration::from_secs(self.min_refetch_interval_secs),
		};
		let mut builder = AuthConfig::builder(issuer, self.client_id)
			.algorithms(algorithms)
			.leeway(StdDuration::from_secs(self.leeway_secs))
			.key_policy(key_policy);

		if let Some(url) = self.jwks_url {
			builder = builder.jwks_url(url);
		}

		Ok(ServiceConfig {
			bind: self.bind,
			auth: builder.build()?,
			store: self.store.into_config(),
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use jsonwebtoken::Algorithm;
	// self
	use super::*;

	fn serve_args(args: &[&str]) -> ServeArgs {
		let cli = Cli::try_parse_from(["cost-api", "serve"].iter().chain(args))
			.expect("Arguments should parse.");

		match cli.command {
			Command::Serve(args) => *args,
			other => panic!("Unexpected command: {other:?}."),
		}
	}

	#[test]
	fn serve_builds_a_cognito_configuration() {
		let config = serve_args(&[
			"--cognito-region",
			"eu-west-1",
			"--user-pool-id",
			"eu-west-1_Pool",
			"--client-id",
			"app",
			"--key-max-age-secs",
			"3600",
			"--store",
			"memory",
		])
		.into_config()
		.expect("Configuration should validate.");

		assert_eq!(config.bind, "0.0.0.0:8000".parse().expect("Address should parse."));
		assert_eq!(
			config.auth.issuer,
			"https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_Pool"
		);
		assert_eq!(config.auth.algorithms, [Algorithm::RS256]);
		assert_eq!(config.auth.key_policy.max_age, Some(StdDuration::from_secs(3_600)));
		assert!(!config.auth.key_policy.refetch_on_unknown_kid);
		assert_eq!(
			config.auth.key_policy.min_refetch_interval,
			KeyRefreshPolicy::DEFAULT_MIN_REFETCH_INTERVAL
		);
		assert_eq!(config.store.kind, StoreKind::Memory);
		assert_eq!(config.store.timeout, StdDuration::from_secs(5));
	}

	#[test]
	fn serve_requires_an_issuer() {
		let err = serve_args(&["--client-id", "app"])
			.into_config()
			.expect_err("An issuer is mandatory.");

		assert!(matches!(err, ConfigError::MissingIssuer));
	}

	#[test]
	fn serve_rejects_unknown_algorithms() {
		let err = serve_args(&[
			"--issuer",
			"https://idp.example.com",
			"--client-id",
			"app",
			"--algorithms",
			"RS256,XX999",
		])
		.into_config()
		.expect_err("Unknown algorithms should be rejected.");

		assert!(matches!(err, ConfigError::UnknownAlgorithm { name } if name == "XX999"));
	}

	#[test]
	fn issuer_conflicts_with_cognito_flags() {
		let parsed = Cli::try_parse_from([
			"cost-api",
			"serve",
			"--issuer",
			"https://idp.example.com",
			"--cognito-region",
			"eu-west-1",
			"--user-pool-id",
			"p",
			"--client-id",
			"app",
		]);

		assert!(parsed.is_err());
	}

	#[test]
	fn provision_defaults_to_the_file_snapshot() {
		let cli = Cli::try_parse_from(["cost-api", "provision"]).expect("Arguments should parse.");
		let Command::Provision(store) = cli.command else {
			panic!("Expected the provision command.");
		};
		let config = store.into_config();

		assert_eq!(config.kind, StoreKind::File);
		assert_eq!(config.path, Some(PathBuf::from(StoreConfig::DEFAULT_PATH)));
	}
}
