//! Crate-wide error types shared by validation, transport, decoding, and publishing.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// No variant ever renders the OIDC assertion or the issued access token.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Required input missing or malformed; raised before any network call.
	#[error(transparent)]
	Validation(#[from] crate::auth::ValidationError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout, cancellation).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Provider answered with a non-200 status.
	#[error(transparent)]
	ProviderRejected(#[from] ProviderRejection),
	/// Provider answered 200 with a body that is not a token response.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Result sink failed to publish the access token.
	#[error(transparent)]
	Sink(#[from] crate::sink::SinkError),
}
impl Error {
	/// Returns a stable label suitable for log fields or metric labels.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Validation(_) => "validation",
			Self::Config(_) => "config",
			Self::Transport(_) => "transport",
			Self::ProviderRejected(_) => "provider_rejected",
			Self::Decode(_) => "decode",
			Self::Sink(_) => "sink",
		}
	}
}

/// Configuration failures raised before a request leaves the process.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Authority host cannot be parsed as a base URL.
	#[error("Authority host `{authority}` is not a valid base URL.")]
	InvalidAuthority {
		/// Authority host as configured.
		authority: String,
		/// Underlying parsing failure, when the host did not parse at all.
		#[source]
		source: Option<url::ParseError>,
	},
	/// Authority host uses a scheme other than `http` or `https`.
	#[error("Authority host scheme `{scheme}` is not supported.")]
	UnsupportedAuthorityScheme {
		/// Offending scheme.
		scheme: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, deadlines).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
	/// The request/response cycle exceeded the configured timeout.
	#[error("Token endpoint did not answer within {}s.", .after.as_secs_f64())]
	Timeout {
		/// Timeout that elapsed.
		after: Duration,
	},
	/// The caller cancelled the in-flight exchange.
	#[error("Token exchange was cancelled before the token endpoint answered.")]
	Cancelled,
	/// Transport reported a failure without a typed source.
	#[error("HTTP client error occurred while calling the token endpoint: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Non-200 answers from the token endpoint.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderRejection {
	/// Provider returned a structured OAuth error body.
	#[error(
		"Token endpoint rejected the exchange with status {status}: {code} - {description}{}",
		trace_suffix(.trace_id.as_deref())
	)]
	Described {
		/// HTTP status code.
		status: u16,
		/// OAuth `error` code.
		code: String,
		/// Redacted and truncated `error_description`.
		description: String,
		/// Azure AD `error_codes` (AADSTS numbers).
		error_codes: Vec<i64>,
		/// Azure AD `trace_id`.
		trace_id: Option<String>,
		/// Azure AD `correlation_id`.
		correlation_id: Option<String>,
	},
	/// Body was missing, oversized, not JSON, or carried no `error` code.
	#[error("Token endpoint rejected the exchange: {status_line}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Status line, e.g. `503 Service Unavailable`.
		status_line: String,
	},
}
impl ProviderRejection {
	/// HTTP status code returned by the provider.
	pub fn status(&self) -> u16 {
		match self {
			Self::Described { status, .. } | Self::Status { status, .. } => *status,
		}
	}

	/// OAuth `error` code, when the provider supplied one.
	pub fn code(&self) -> Option<&str> {
		match self {
			Self::Described { code, .. } => Some(code),
			Self::Status { .. } => None,
		}
	}
}

/// A 200 answer that cannot be turned into a token response.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body is not JSON or does not match the token response shape.
	#[error("Token endpoint returned a malformed token response: {source}.")]
	Malformed {
		/// Structured parsing failure, including the path of the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Body parsed but the access token is empty.
	#[error("Token endpoint returned an empty access token.")]
	EmptyAccessToken,
}

fn trace_suffix(trace_id: Option<&str>) -> String {
	trace_id.map(|id| format!(" (trace_id: {id})")).unwrap_or_default()
}
