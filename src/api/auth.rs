//! Request extractor that admits only verified access tokens.

// crates.io
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header::AUTHORIZATION, request::Parts},
};
// self
use crate::{
	_prelude::*,
	api::ApiError,
	auth::{self, AccessClaims, TokenVerifier},
};

/// Claims of the caller's verified access token.
///
/// Place it before any other extractor so rejected requests never reach the body or the store.
#[derive(Clone, Debug)]
pub struct Authenticated(pub AccessClaims);
impl<S> FromRequestParts<S> for Authenticated
where
	S: Send + Sync,
	Arc<TokenVerifier>: FromRef<S>,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let header = parts.headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
		let token = auth::bearer_token(header)?;
		let verifier = Arc::<TokenVerifier>::from_ref(state);
		let claims = verifier.verify(token).await?;

		tracing::debug!(sub = claims.sub.as_deref(), "Authenticated request.");

		Ok(Self(claims))
	}
}
