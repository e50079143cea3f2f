//! OIDC → Azure AD token exchange.
//!
//! [`TokenExchanger`] validates an [`ExchangeRequest`], posts the federated client-credentials
//! request to `{authority}/{tenant}/oauth2/v2.0/token`, and interprets the answer. One call is
//! one attempt: no retries, no caching, no state shared between calls beyond the transport.

pub mod request;
pub mod response;

pub use request::*;
pub use response::{DESCRIPTION_LIMIT, ProviderErrorResponse, truncate_description};

// std
use std::future;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError};
// self
use crate::{
	_prelude::*,
	auth::{TenantPolicy, TokenResponse},
	error::{ConfigError, ProviderRejection, TransportError},
	http::TokenHttpClient,
	obs::{self, ExchangeOutcome, ExchangeSpan, obs_event},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Exchanger specialized for the crate's default reqwest transport.
pub type ReqwestTokenExchanger = TokenExchanger<ReqwestHttpClient>;

/// Tunables applied to every exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExchangerConfig {
	/// Budget for the whole request/response cycle.
	pub timeout: Duration,
	/// Policy applied to tenant identifiers.
	pub tenant_policy: TenantPolicy,
}
impl ExchangerConfig {
	/// Default request/response budget.
	pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

	/// Overrides the request/response budget.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Overrides the tenant identifier policy.
	pub fn with_tenant_policy(mut self, tenant_policy: TenantPolicy) -> Self {
		self.tenant_policy = tenant_policy;

		self
	}
}
impl Default for ExchangerConfig {
	fn default() -> Self {
		Self { timeout: Self::DEFAULT_TIMEOUT, tenant_policy: TenantPolicy::default() }
	}
}

/// Performs OIDC → Azure AD token exchanges over a [`TokenHttpClient`].
///
/// The exchanger holds only the transport and immutable configuration, so a single instance
/// may serve concurrent exchanges for different tenants and clients.
pub struct TokenExchanger<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Tunables applied to every exchange.
	pub config: ExchangerConfig,
}
impl<C> TokenExchanger<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates an exchanger that reuses the caller-provided transport.
	pub fn with_http_client(http_client: impl Into<Arc<C>>, config: ExchangerConfig) -> Self {
		Self { http_client: http_client.into(), config }
	}

	/// Exchanges the OIDC token in `request` for an Azure AD access token.
	pub async fn exchange(&self, request: &ExchangeRequest) -> Result<TokenResponse> {
		self.exchange_until(request, future::pending()).await
	}

	/// Same as [`exchange`](Self::exchange), aborting with [`TransportError::Cancelled`] as
	/// soon as `cancel` resolves.
	///
	/// Validation always runs first; an invalid request never reaches the transport.
	pub async fn exchange_until<F>(
		&self,
		request: &ExchangeRequest,
		cancel: F,
	) -> Result<TokenResponse>
	where
		F: Future<Output = ()>,
	{
		obs::record_exchange_outcome(ExchangeOutcome::Attempt);

		let validated = match request.validate(self.config.tenant_policy) {
			Ok(validated) => validated,
			Err(e) => {
				obs::record_exchange_outcome(ExchangeOutcome::Failure);

				return Err(e.into());
			},
		};
		let span = ExchangeSpan::new(validated.tenant_id(), validated.client_id());
		let result = span.instrument(self.send(&validated, cancel)).await;

		match &result {
			Ok(_) => obs::record_exchange_outcome(ExchangeOutcome::Success),
			Err(_) => obs::record_exchange_outcome(ExchangeOutcome::Failure),
		}

		result
	}

	async fn send<F>(&self, validated: &ValidatedRequest, cancel: F) -> Result<TokenResponse>
	where
		F: Future<Output = ()>,
	{
		let http_request = validated.to_http_request()?;

		obs_event!(
			debug,
			endpoint = %http_request.uri(),
			scope = validated.scope(),
			"requesting Azure AD access token"
		);

		let handle = self.http_client.handle();
		let timeout = self.config.timeout;
		let response = tokio::select! {
			biased;
			_ = cancel => return Err(TransportError::Cancelled.into()),
			outcome = tokio::time::timeout(timeout, handle.call(http_request)) => match outcome {
				Ok(response) => response.map_err(map_http_client_error)?,
				Err(_) => return Err(TransportError::Timeout { after: timeout }.into()),
			},
		};
		let result = response::interpret(&response, validated.oidc_token());

		if let Err(Error::ProviderRejected(rejection)) = &result {
			log_rejection(rejection);
		}

		result
	}
}
#[cfg(feature = "reqwest")]
impl TokenExchanger<ReqwestHttpClient> {
	/// Creates an exchanger backed by a fresh reqwest client that refuses redirects.
	pub fn new(config: ExchangerConfig) -> Result<Self> {
		Ok(Self::with_http_client(ReqwestHttpClient::new()?, config))
	}
}
impl<C> Clone for TokenExchanger<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn clone(&self) -> Self {
		Self { http_client: self.http_client.clone(), config: self.config }
	}
}
impl<C> Debug for TokenExchanger<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenExchanger").field("config", &self.config).finish()
	}
}

fn map_http_client_error<E>(err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::Network { source: inner }.into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::Other { message }.into(),
		_ => TransportError::Other { message: "unrecognized transport failure".into() }.into(),
	}
}

fn log_rejection(rejection: &ProviderRejection) {
	#[cfg(feature = "tracing")]
	{
		if let ProviderRejection::Described {
			status, code, error_codes, trace_id, correlation_id, ..
		} = rejection
		{
			tracing::warn!(
				status,
				code = code.as_str(),
				error_codes = ?error_codes,
				trace_id = trace_id.as_deref(),
				correlation_id = correlation_id.as_deref(),
				"Azure AD rejected the token exchange"
			);
		} else {
			tracing::warn!(status = rejection.status(), "Azure AD rejected the token exchange");
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = rejection;
	}
}
