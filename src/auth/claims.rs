//! Claim set carried by verified access tokens.

// self
use crate::_prelude::*;

/// `token_use` value identifying access tokens.
pub const ACCESS_TOKEN_USE: &str = "access";

/// `aud` claim, which identity providers emit either as a string or as an array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
	/// Single audience value.
	Single(String),
	/// Several audience values.
	Many(Vec<String>),
}
impl Audience {
	/// Returns `true` when `value` is one of the audiences.
	pub fn contains(&self, value: &str) -> bool {
		match self {
			Audience::Single(aud) => aud == value,
			Audience::Many(auds) => auds.iter().any(|aud| aud == value),
		}
	}
}

/// Decoded claims of a verified access token.
///
/// Claims without a dedicated field are preserved in [`AccessClaims::extra`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
	/// Issuer URL.
	pub iss: String,
	/// Subject (the end user).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sub: Option<String>,
	/// Application the token was issued to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_id: Option<String>,
	/// Audience, consulted when `client_id` is absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub aud: Option<Audience>,
	/// Token class (`access`, `id`, ...).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_use: Option<String>,
	/// Space-separated scopes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
	/// Provider-side user name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	/// Expiry (seconds since epoch).
	pub exp: i64,
	/// Issued at (seconds since epoch).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iat: Option<i64>,
	/// Token identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub jti: Option<String>,
	/// Remaining claims.
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}
impl AccessClaims {
	/// Returns `true` when `token_use` marks an access token.
	pub fn is_access_token(&self) -> bool {
		self.token_use.as_deref() == Some(ACCESS_TOKEN_USE)
	}

	/// Checks the application binding: `client_id` when present, otherwise `aud`.
	pub fn is_bound_to(&self, client_id: &str) -> bool {
		match (&self.client_id, &self.aud) {
			(Some(bound), _) => bound == client_id,
			(None, Some(aud)) => aud.contains(client_id),
			(None, None) => false,
		}
	}

	/// Iterates over the granted scopes.
	pub fn scopes(&self) -> impl Iterator<Item = &str> {
		self.scope.as_deref().unwrap_or_default().split_whitespace()
	}
}
