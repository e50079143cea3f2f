//! Command-line and environment configuration for the `azure-oidc-exchange` binary.
//!
//! Every flag falls back to the environment variable a CI plugin runner exports. Required
//! exchange inputs stay optional here so the exchange validator reports them uniformly.

// std
use std::path::PathBuf;
// crates.io
use clap::Parser;
// self
use crate::{
	_prelude::*,
	auth::TenantPolicy,
	exchange::{ExchangeRequest, ExchangerConfig},
};

/// Arguments accepted by the binary.
#[derive(Clone, Debug, Parser)]
#[command(name = "azure-oidc-exchange", version, about = "Exchange a CI OIDC token for an Azure AD access token")]
pub struct Args {
	/// OIDC identity token issued by the CI platform.
	#[arg(long, env = "PLUGIN_OIDC_TOKEN_ID", hide_env_values = true)]
	pub oidc_token: Option<String>,

	/// Azure AD tenant (directory) ID.
	#[arg(long, env = "PLUGIN_TENANT_ID")]
	pub tenant_id: Option<String>,

	/// Azure AD application (client) ID.
	#[arg(long, env = "PLUGIN_CLIENT_ID")]
	pub client_id: Option<String>,

	/// Scope to request; defaults to the Azure Resource Manager scope.
	#[arg(long, env = "PLUGIN_SCOPE")]
	pub scope: Option<String>,

	/// Authority host for sovereign or government clouds.
	#[arg(long, env = "PLUGIN_AZURE_AUTHORITY_HOST")]
	pub authority_host: Option<String>,

	/// Log filter directive (trace, debug, info, warn, error).
	#[arg(long, env = "PLUGIN_LOG_LEVEL", default_value = "info")]
	pub log_level: String,

	/// Seconds allowed for the token endpoint to answer.
	#[arg(long, env = "PLUGIN_TIMEOUT_SECONDS", default_value_t = 30)]
	pub timeout_secs: u64,

	/// Accept `common`, `organizations`, and `consumers` as tenant IDs.
	#[arg(long, env = "PLUGIN_ALLOW_TENANT_ALIASES")]
	pub allow_tenant_aliases: bool,

	/// Env file the access token is appended to.
	#[arg(long, env = "HARNESS_OUTPUT_SECRET_FILE")]
	pub output_file: Option<PathBuf>,
}
impl Args {
	/// Builds the exchange request. Absent inputs become empty and fail validation.
	pub fn to_request(&self) -> ExchangeRequest {
		let mut request = ExchangeRequest::new(
			self.oidc_token.clone().unwrap_or_default(),
			self.tenant_id.clone().unwrap_or_default(),
			self.client_id.clone().unwrap_or_default(),
		);

		request.scope = self.scope.clone();
		request.authority_host = self.authority_host.clone();

		request
	}

	/// Builds the exchanger tunables.
	pub fn exchanger_config(&self) -> ExchangerConfig {
		let policy =
			if self.allow_tenant_aliases { TenantPolicy::AllowAliases } else { TenantPolicy::Strict };

		ExchangerConfig::default()
			.with_timeout(Duration::from_secs(self.timeout_secs))
			.with_tenant_policy(policy)
	}
}
