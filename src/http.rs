//! Transport primitives for fetching the identity provider's signing keys.
//!
//! The module exposes [`KeySetFetcher`], the key provider's only dependency on an HTTP stack, along
//! with the reqwest-backed [`ReqwestKeySetFetcher`] and the fixed [`StaticKeySetFetcher`] used by
//! tests and offline development.

// crates.io
use jsonwebtoken::jwk::{Jwk, JwkSet};
// self
use crate::{_prelude::*, auth::AuthError};

/// Boxed future returned by [`KeySetFetcher::fetch`].
pub type KeySetFuture<'a> = Pin<Box<dyn Future<Output = Result<JwkSet, AuthError>> + 'a + Send>>;

/// Source of JSON Web Key Sets.
///
/// Implementations report every failure (transport, status, body) as
/// [`AuthError::UpstreamUnavailable`] and never cache; caching belongs to
/// [`KeyProvider`](crate::auth::KeyProvider).
pub trait KeySetFetcher
where
	Self: 'static + Send + Sync,
{
	/// Retrieves the current key set.
	fn fetch(&self) -> KeySetFuture<'_>;
}

/// Fetches a JWKS document over HTTP with a bounded timeout.
#[derive(Clone, Debug)]
pub struct ReqwestKeySetFetcher {
	client: ReqwestClient,
	url: Url,
	timeout: StdDuration,
}
impl ReqwestKeySetFetcher {
	/// Bound applied to every key set request unless overridden.
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(5);

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient, url: Url) -> Self {
		Self { client, url, timeout: Self::DEFAULT_TIMEOUT }
	}

	/// Overrides the request timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Key set location.
	pub fn url(&self) -> &Url {
		&self.url
	}
}
impl KeySetFetcher for ReqwestKeySetFetcher {
	fn fetch(&self) -> KeySetFuture<'_> {
		Box::pin(async move {
			let response = self
				.client
				.get(self.url.clone())
				.timeout(self.timeout)
				.send()
				.await
				.map_err(|e| upstream(format!("request to {} failed: {e}", self.url)))?;
			let status = response.status();

			if !status.is_success() {
				return Err(upstream(format!("{} answered with HTTP {status}", self.url)));
			}

			let body = response
				.bytes()
				.await
				.map_err(|e| upstream(format!("reading {} failed: {e}", self.url)))?;

			parse_key_set(&body)
		})
	}
}

/// Serves a fixed key set, mainly for tests and offline development.
#[derive(Clone, Debug)]
pub struct StaticKeySetFetcher(pub JwkSet);
impl KeySetFetcher for StaticKeySetFetcher {
	fn fetch(&self) -> KeySetFuture<'_> {
		let set = self.0.clone();

		Box::pin(async move { Ok(set) })
	}
}

#[derive(Deserialize)]
struct RawKeySet {
	keys: Vec<serde_json::Value>,
}

/// Parses a JWKS document, reporting the JSON path of the first offending field.
///
/// Entries this crate cannot model (unknown key types or curves) are skipped with a warning; the
/// document only fails when it is not a key set or none of its entries is usable.
pub fn parse_key_set(bytes: &[u8]) -> Result<JwkSet, AuthError> {
	let mut de = serde_json::Deserializer::from_slice(bytes);
	let raw: RawKeySet = serde_path_to_error::deserialize(&mut de)
		.map_err(|e| upstream(format!("key set is malformed at `{}`: {}", e.path(), e.inner())))?;
	let published = raw.keys.len();
	let keys: Vec<Jwk> = raw
		.keys
		.into_iter()
		.enumerate()
		.filter_map(|(i, entry)| {
			let kid = entry.get("kid").and_then(|kid| kid.as_str()).map(ToOwned::to_owned);

			match serde_json::from_value::<Jwk>(entry) {
				Ok(jwk) => Some(jwk),
				Err(e) => {
					tracing::warn!(index = i, kid = ?kid, error = %e, "Skipping unsupported key.");

					None
				},
			}
		})
		.collect();

	if keys.is_empty() && published > 0 {
		return Err(upstream(format!("none of the {published} published keys is usable")));
	}

	Ok(JwkSet { keys })
}

fn upstream(message: String) -> AuthError {
	AuthError::UpstreamUnavailable { message }
}
