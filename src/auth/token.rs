//! Token endpoint success payload.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access token issued by Azure AD for a successful exchange.
///
/// Produced only from an HTTP 200 answer; fields are read-only.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
	token_type: String,
	expires_in: u64,
	access_token: TokenSecret,
	#[serde(default)]
	refresh_token: Option<TokenSecret>,
}
impl TokenResponse {
	/// Token type reported by the provider (normally `Bearer`).
	pub fn token_type(&self) -> &str {
		&self.token_type
	}

	/// Lifetime of the access token in seconds.
	pub fn expires_in(&self) -> u64 {
		self.expires_in
	}

	/// Issued access token.
	pub fn access_token(&self) -> &TokenSecret {
		&self.access_token
	}

	/// Refresh token, when the provider issued one.
	pub fn refresh_token(&self) -> Option<&TokenSecret> {
		self.refresh_token.as_ref()
	}

	/// Instant the access token expires, given the instant it was issued.
	pub fn expires_at(&self, issued_at: OffsetDateTime) -> OffsetDateTime {
		let lifetime = i64::try_from(self.expires_in).unwrap_or(i64::MAX);

		issued_at.saturating_add(time::Duration::seconds(lifetime))
	}
}
