//! `Authorization` header parsing.

// self
use crate::auth::AuthError;

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively; a missing header, any other scheme, or an empty token
/// yields [`AuthError::MissingBearer`].
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
	let (scheme, token) =
		header.and_then(|value| value.trim().split_once(' ')).ok_or(AuthError::MissingBearer)?;

	if !scheme.eq_ignore_ascii_case("bearer") {
		return Err(AuthError::MissingBearer);
	}

	let token = token.trim();

	if token.is_empty() { Err(AuthError::MissingBearer) } else { Ok(token) }
}
