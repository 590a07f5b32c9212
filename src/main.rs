//! `cost-api` binary: serves the HTTP API or provisions the record store.

// crates.io
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tokio::net::TcpListener;
// self
use cost_api::{
	api::{self, AppState},
	cli::{Cli, Command},
	obs::logging,
	service::CostService,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	logging::init();

	match Cli::parse().command {
		Command::Serve(args) => {
			let config = args.into_config().wrap_err("Invalid serve configuration.")?;
			let state = AppState::from_config(&config).wrap_err("Failed to assemble the service.")?;
			let listener = TcpListener::bind(config.bind)
				.await
				.wrap_err_with(|| format!("Failed to bind {}.", config.bind))?;

			api::serve(listener, state).await.wrap_err("Server terminated abnormally.")?;
		},
		Command::Provision(args) => {
			let store = args.into_config().open().wrap_err("Failed to open the record store.")?;

			CostService::new(store).provision().await.wrap_err("Provisioning failed.")?;
		},
	}

	Ok(())
}
