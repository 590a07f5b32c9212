//! Subscriber installation for the binary.

// crates.io
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default directive used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,tower_http=info";

/// Installs a formatting subscriber filtered by `RUST_LOG`.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init() -> bool {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

	tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_target(false))
		.try_init()
		.is_ok()
}
