//! `azure-oidc-exchange` CI plugin entry point.

// std
use std::{future, io};
// crates.io
use clap::Parser;
use color_eyre::{Result, eyre::eyre};
use tracing_subscriber::EnvFilter;
// self
use azure_oidc_exchange::{config::Args, exchange::TokenExchanger, pipeline, sink::EnvFileSink};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_new(&args.log_level)?)
		.with_writer(io::stderr)
		.init();

	let Some(output_file) = args.output_file.clone() else {
		return Err(eyre!("HARNESS_OUTPUT_SECRET_FILE is not set; nowhere to publish the access token."));
	};
	let sink = EnvFileSink::new(output_file);
	let exchanger = TokenExchanger::new(args.exchanger_config())?;
	let cancel = async {
		if tokio::signal::ctrl_c().await.is_err() {
			future::pending::<()>().await;
		}

		tracing::warn!("interrupt received, cancelling token exchange");
	};

	pipeline::run(&exchanger, &args.to_request(), &sink, cancel).await?;

	Ok(())
}
