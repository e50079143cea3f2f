//! End-to-end run: exchange the OIDC token, then publish the access token.

// self
use crate::{
	_prelude::*,
	auth::TokenResponse,
	exchange::{ExchangeRequest, TokenExchanger},
	http::TokenHttpClient,
	obs::obs_event,
	sink::TokenSink,
};

/// Key under which the access token is published.
pub const ACCESS_TOKEN_KEY: &str = "AZURE_ACCESS_TOKEN";

/// Runs one exchange and, on success, publishes [`ACCESS_TOKEN_KEY`] through `sink`.
///
/// Nothing is published when the exchange fails. `cancel` aborts an in-flight exchange.
pub async fn run<C, S, F>(
	exchanger: &TokenExchanger<C>,
	request: &ExchangeRequest,
	sink: &S,
	cancel: F,
) -> Result<TokenResponse>
where
	C: ?Sized + TokenHttpClient,
	S: ?Sized + TokenSink,
	F: Future<Output = ()>,
{
	obs_event!(info, "exchanging OIDC token for Azure AD access token");

	let issued_at = OffsetDateTime::now_utc();
	let token = match exchanger.exchange_until(request, cancel).await {
		Ok(token) => token,
		Err(e) => {
			obs_event!(error, error_kind = e.kind(), error = %e, "token exchange failed");

			return Err(e);
		},
	};

	obs_event!(
		info,
		expires_in = token.expires_in(),
		expires_at = %token.expires_at(issued_at),
		"access token obtained"
	);

	sink.publish(ACCESS_TOKEN_KEY, token.access_token())?;

	obs_event!(info, key = ACCESS_TOKEN_KEY, "access token published");

	Ok(token)
}
