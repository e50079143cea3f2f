//! Azure AD identifiers, redacted secrets, and the token response model.

pub mod id;
pub mod secret;
pub mod token;

pub use id::*;
pub use secret::*;
pub use token::*;
