//! Interpretation of token endpoint answers.

// crates.io
use oauth2::{HttpResponse, http::StatusCode};
// self
use crate::{
	_prelude::*,
	auth::{TokenResponse, TokenSecret},
	error::{DecodeError, ProviderRejection},
	http::ERROR_BODY_LIMIT,
};

/// Maximum number of characters of a provider `error_description` kept in errors and logs,
/// ellipsis included.
pub const DESCRIPTION_LIMIT: usize = 200;

const ELLIPSIS: char = '…';
const REDACTED: &str = "<redacted>";

/// Azure AD error payload. Every field tolerates absence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderErrorResponse {
	/// OAuth `error` code.
	pub error: String,
	/// Human-readable description.
	pub error_description: String,
	/// AADSTS error numbers.
	pub error_codes: Vec<i64>,
	/// Provider timestamp.
	pub timestamp: Option<String>,
	/// Provider trace identifier.
	pub trace_id: Option<String>,
	/// Provider correlation identifier.
	pub correlation_id: Option<String>,
}

/// Turns an HTTP answer into a token or a typed failure.
///
/// `assertion` is scrubbed from any provider description before it is surfaced.
pub(crate) fn interpret(response: &HttpResponse, assertion: &TokenSecret) -> Result<TokenResponse> {
	let status = response.status();

	if status == StatusCode::OK {
		return decode_token(response.body()).map_err(Error::from);
	}

	Err(reject(status, response.body(), assertion).into())
}

/// Parses a 200 body into a [`TokenResponse`].
pub(crate) fn decode_token(body: &[u8]) -> Result<TokenResponse, DecodeError> {
	let deserializer = &mut serde_json::Deserializer::from_slice(body);
	let token: TokenResponse = serde_path_to_error::deserialize(deserializer)
		.map_err(|source| DecodeError::Malformed { source })?;

	if token.access_token().is_blank() {
		return Err(DecodeError::EmptyAccessToken);
	}

	Ok(token)
}

/// Builds the rejection for a non-200 answer from at most [`ERROR_BODY_LIMIT`] body bytes.
pub(crate) fn reject(status: StatusCode, body: &[u8], assertion: &TokenSecret) -> ProviderRejection {
	let bounded = &body[..body.len().min(ERROR_BODY_LIMIT)];

	match serde_json::from_slice::<ProviderErrorResponse>(bounded) {
		Ok(payload) if !payload.error.trim().is_empty() => ProviderRejection::Described {
			status: status.as_u16(),
			code: payload.error,
			description: truncate_description(&redact(&payload.error_description, assertion)),
			error_codes: payload.error_codes,
			trace_id: payload.trace_id,
			correlation_id: payload.correlation_id,
		},
		_ => ProviderRejection::Status { status: status.as_u16(), status_line: status.to_string() },
	}
}

/// Truncates to at most [`DESCRIPTION_LIMIT`] characters, ending in an ellipsis when cut.
pub fn truncate_description(description: &str) -> String {
	if description.chars().count() <= DESCRIPTION_LIMIT {
		return description.to_owned();
	}

	let mut buf: String = description.chars().take(DESCRIPTION_LIMIT - 1).collect();

	buf.push(ELLIPSIS);

	buf
}

fn redact(description: &str, assertion: &TokenSecret) -> String {
	let secret = assertion.expose();

	if secret.is_empty() {
		return description.to_owned();
	}

	description.replace(secret, REDACTED)
}
