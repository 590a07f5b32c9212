//! Bearer-token verification against the identity provider's published signing keys.

pub mod bearer;
pub mod claims;
pub mod keys;
pub mod verifier;

pub use bearer::*;
pub use claims::*;
pub use keys::*;
pub use verifier::*;

// self
use crate::_prelude::*;

/// Reasons a bearer token is refused.
///
/// Every variant surfaces to HTTP callers as the same authentication failure class; only the
/// message differs.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AuthError {
	/// The `Authorization` header is absent or does not carry a bearer token.
	#[error("Not authenticated.")]
	MissingBearer,
	/// The token header or payload cannot be parsed.
	#[error("Invalid token: {reason}.")]
	MalformedToken {
		/// Parser-supplied reason.
		reason: String,
	},
	/// No cached signing key matches the token's `kid`.
	#[error("Invalid token key.")]
	UnknownSigningKey {
		/// Key identifier named by the token.
		kid: String,
	},
	/// Signature, issuer, or validity window check failed.
	#[error("Invalid token: {reason}.")]
	InvalidSignatureOrIssuer {
		/// Validator-supplied reason.
		reason: String,
	},
	/// The token is not an access token.
	#[error("Not an access token.")]
	WrongTokenClass {
		/// `token_use` claim as presented, if any.
		token_use: Option<String>,
	},
	/// The token was issued to another application.
	#[error("Invalid client_id.")]
	WrongAudience,
	/// Signing keys could not be fetched from the identity provider.
	#[error("Signing keys are unavailable.")]
	UpstreamUnavailable {
		/// Transport or parsing detail; logged, never sent to callers.
		message: String,
	},
}
