//! Exchange inputs, their validation, and token-request construction.

// crates.io
use oauth2::{
	HttpRequest,
	http::{Method, header},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{ClientId, TenantId, TenantPolicy, TokenSecret, ValidationError, id},
	error::ConfigError,
};

/// Scope requested when the caller leaves it blank.
pub const DEFAULT_SCOPE: &str = "https://management.azure.com/.default";
/// Azure public-cloud authority used when the caller leaves it blank.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
/// Assertion type for federated identity credentials.
pub const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";
/// Grant type used for the exchange.
pub const GRANT_TYPE: &str = "client_credentials";

/// Raw exchange inputs as supplied by configuration.
#[derive(Clone, Debug)]
pub struct ExchangeRequest {
	/// OIDC identity token presented as the client assertion.
	pub oidc_token: TokenSecret,
	/// Azure AD tenant identifier.
	pub tenant_id: String,
	/// Azure AD application (client) identifier.
	pub client_id: String,
	/// Requested scope; blank falls back to [`DEFAULT_SCOPE`].
	pub scope: Option<String>,
	/// Authority base URL; blank falls back to [`DEFAULT_AUTHORITY_HOST`].
	pub authority_host: Option<String>,
}
impl ExchangeRequest {
	/// Creates a request with default scope and authority host.
	pub fn new(
		oidc_token: impl Into<String>,
		tenant_id: impl Into<String>,
		client_id: impl Into<String>,
	) -> Self {
		Self {
			oidc_token: TokenSecret::new(oidc_token),
			tenant_id: tenant_id.into(),
			client_id: client_id.into(),
			scope: None,
			authority_host: None,
		}
	}

	/// Overrides the requested scope.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Overrides the authority host (sovereign and government clouds).
	pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
		self.authority_host = Some(authority_host.into());

		self
	}

	/// Checks required inputs and identifier shapes, resolving defaults on success.
	///
	/// Presence is checked for every field before any shape check, in the order
	/// `oidc_token`, `tenant_id`, `client_id`.
	pub fn validate(&self, policy: TenantPolicy) -> Result<ValidatedRequest, ValidationError> {
		if self.oidc_token.is_blank() {
			return Err(ValidationError::MissingField { field: "oidc_token" });
		}

		id::require_present("tenant_id", &self.tenant_id)?;
		id::require_present("client_id", &self.client_id)?;

		let tenant_id = TenantId::with_policy(&self.tenant_id, policy)?;
		let client_id = ClientId::new(&self.client_id)?;

		Ok(ValidatedRequest {
			oidc_token: self.oidc_token.clone(),
			tenant_id,
			client_id,
			scope: non_blank(self.scope.as_deref()).unwrap_or(DEFAULT_SCOPE).to_owned(),
			authority_host: resolve_authority_host(self.authority_host.as_deref()).to_owned(),
		})
	}
}

/// Exchange inputs that passed validation, with defaults applied.
#[derive(Clone, Debug)]
pub struct ValidatedRequest {
	oidc_token: TokenSecret,
	tenant_id: TenantId,
	client_id: ClientId,
	scope: String,
	authority_host: String,
}
impl ValidatedRequest {
	/// OIDC assertion to present.
	pub fn oidc_token(&self) -> &TokenSecret {
		&self.oidc_token
	}

	/// Validated tenant identifier.
	pub fn tenant_id(&self) -> &TenantId {
		&self.tenant_id
	}

	/// Validated client identifier.
	pub fn client_id(&self) -> &ClientId {
		&self.client_id
	}

	/// Effective scope.
	pub fn scope(&self) -> &str {
		&self.scope
	}

	/// Effective authority host without trailing slashes.
	pub fn authority_host(&self) -> &str {
		&self.authority_host
	}

	/// Composes `{authority_host}/{tenant_id}/oauth2/v2.0/token`.
	pub fn token_endpoint(&self) -> Result<Url, ConfigError> {
		let mut url = Url::parse(&self.authority_host).map_err(|source| {
			ConfigError::InvalidAuthority {
				authority: self.authority_host.clone(),
				source: Some(source),
			}
		})?;

		if !matches!(url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedAuthorityScheme { scheme: url.scheme().to_owned() });
		}

		url.path_segments_mut()
			.map_err(|_| ConfigError::InvalidAuthority {
				authority: self.authority_host.clone(),
				source: None,
			})?
			.pop_if_empty()
			.extend([self.tenant_id.as_ref(), "oauth2", "v2.0", "token"]);

		Ok(url)
	}

	/// Encodes the `application/x-www-form-urlencoded` token request body.
	pub fn form_body(&self) -> String {
		form_urlencoded::Serializer::new(String::new())
			.append_pair("client_id", &self.client_id)
			.append_pair("scope", &self.scope)
			.append_pair("client_assertion_type", CLIENT_ASSERTION_TYPE)
			.append_pair("client_assertion", self.oidc_token.expose())
			.append_pair("grant_type", GRANT_TYPE)
			.finish()
	}

	/// Builds the POST request sent to the token endpoint.
	pub(crate) fn to_http_request(&self) -> Result<HttpRequest, ConfigError> {
		let endpoint = self.token_endpoint()?;
		let request = oauth2::http::Request::builder()
			.method(Method::POST)
			.uri(endpoint.as_str())
			.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
			.header(header::ACCEPT, "application/json")
			.body(self.form_body().into_bytes())?;

		Ok(request)
	}
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}

fn resolve_authority_host(value: Option<&str>) -> &str {
	non_blank(value)
		.map(|host| host.trim_end_matches('/'))
		.filter(|host| !host.is_empty())
		.unwrap_or(DEFAULT_AUTHORITY_HOST)
}
