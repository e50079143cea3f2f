//! Strongly typed Azure AD identifiers and the shape checks that guard them.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $field:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after strict GUID-shape validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
				let view = value.as_ref();

				require_present($field, view)?;
				require_guid_shape($field, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!(stringify!($name), "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl std::str::FromStr for $name {
			type Err = ValidationError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

/// Tenant aliases accepted by multi-tenant Azure AD applications.
pub const MULTI_TENANT_ALIASES: [&str; 3] = ["common", "organizations", "consumers"];

const GUID_LEN: usize = 36;
const GUID_HYPHENS: [usize; 4] = [8, 13, 18, 23];

/// Error returned when request inputs fail validation.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// A required input was empty.
	#[error("{field} is not provided.")]
	MissingField {
		/// Name of the missing input.
		field: &'static str,
	},
	/// An identifier does not have the `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` shape.
	#[error("{field} must be a valid GUID format (xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx).")]
	MalformedIdentifier {
		/// Name of the malformed input.
		field: &'static str,
	},
}

/// Policy applied to tenant identifiers.
///
/// Strict GUID validation and multi-tenant aliases are mutually exclusive, so the choice is
/// explicit. Client identifiers are always GUID-checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TenantPolicy {
	/// Only GUID-shaped tenant identifiers are accepted.
	#[default]
	Strict,
	/// GUID-shaped identifiers plus [`MULTI_TENANT_ALIASES`] (case-insensitive).
	AllowAliases,
}

def_id! { TenantId, "Azure AD tenant (directory) identifier.", "tenant_id" }
def_id! { ClientId, "Azure AD application (client) identifier.", "client_id" }

impl TenantId {
	/// Creates a tenant identifier under the provided policy.
	pub fn with_policy(value: impl AsRef<str>, policy: TenantPolicy) -> Result<Self, ValidationError> {
		let view = value.as_ref();

		if policy == TenantPolicy::AllowAliases && is_multi_tenant_alias(view) {
			return Ok(Self(view.to_owned()));
		}

		Self::new(view)
	}

	/// Returns true if the identifier is one of [`MULTI_TENANT_ALIASES`].
	pub fn is_alias(&self) -> bool {
		is_multi_tenant_alias(&self.0)
	}
}

/// Checks the canonical GUID shape: 36 bytes with hyphens at offsets 8, 13, 18, and 23.
///
/// Only the hyphen positions are checked; the remaining characters are not required to be hex.
pub fn is_guid_shape(value: &str) -> bool {
	let bytes = value.as_bytes();

	bytes.len() == GUID_LEN && GUID_HYPHENS.iter().all(|&idx| bytes[idx] == b'-')
}

fn is_multi_tenant_alias(value: &str) -> bool {
	MULTI_TENANT_ALIASES.iter().any(|alias| alias.eq_ignore_ascii_case(value))
}

/// Fails with [`ValidationError::MissingField`] when `view` is empty or whitespace only.
pub(crate) fn require_present(field: &'static str, view: &str) -> Result<(), ValidationError> {
	if view.trim().is_empty() {
		return Err(ValidationError::MissingField { field });
	}

	Ok(())
}

fn require_guid_shape(field: &'static str, view: &str) -> Result<(), ValidationError> {
	if !is_guid_shape(view) {
		return Err(ValidationError::MalformedIdentifier { field });
	}

	Ok(())
}
