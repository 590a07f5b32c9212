//! Access token verification.

// crates.io
use jsonwebtoken::{Validation, errors::ErrorKind};
// self
use crate::{
	_prelude::*,
	auth::{AccessClaims, AuthError, KeyProvider, SigningKeySet},
	config::AuthConfig,
	error::ConfigError,
	obs::{OpKind, OpSpan, OpTimer},
};

/// Verifies bearer tokens issued by one identity provider to one application.
#[derive(Debug)]
pub struct TokenVerifier {
	keys: Arc<KeyProvider>,
	client_id: String,
	validation: Validation,
}
impl TokenVerifier {
	/// Creates a verifier that resolves keys through `keys`.
	pub fn new(config: &AuthConfig, keys: Arc<KeyProvider>) -> Self {
		let mut validation = Validation::default();

		validation.algorithms = config.algorithms.clone();
		validation.set_issuer(&[config.issuer.as_str()]);
		validation.set_required_spec_claims(&["exp", "iss"]);
		validation.validate_aud = false;
		validation.validate_nbf = true;
		validation.leeway = config.leeway.as_secs();

		Self { keys, client_id: config.client_id.clone(), validation }
	}

	/// Creates a verifier backed by the production key provider.
	pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
		Ok(Self::new(config, Arc::new(KeyProvider::from_config(config)?)))
	}

	/// Key provider backing this verifier.
	pub fn key_provider(&self) -> &Arc<KeyProvider> {
		&self.keys
	}

	/// Verifies `token`, fetching signing keys on first use.
	///
	/// When the provider's policy enables it, a token naming an unknown key triggers one key set
	/// refetch before the token is rejected.
	pub async fn verify(&self, token: &str) -> Result<AccessClaims, AuthError> {
		const KIND: OpKind = OpKind::VerifyToken;

		let span = OpSpan::new(KIND, "verify");
		let timer = OpTimer::start(KIND);
		let result = span
			.instrument(async move {
				// Reject unparseable tokens before any key lookup.
				token_kid(token)?;

				let keys = self.keys.signing_keys().await?;

				match self.verify_with_keys(token, &keys) {
					Err(AuthError::UnknownSigningKey { kid })
						if self.keys.policy().refetch_on_unknown_kid =>
					{
						tracing::info!(kid = %kid, "Unknown signing key; refetching the key set.");

						let keys = self.keys.refresh_after_miss(&keys).await?;

						self.verify_with_keys(token, &keys)
					},
					result => result,
				}
			})
			.await;

		timer.finish(&result);

		if let Err(e) = &result {
			tracing::debug!(error = %e, "Rejected bearer token.");
		}

		result
	}

	/// Verifies `token` against an explicit key set.
	///
	/// The result depends only on the token, the key set, and this verifier's configuration.
	pub fn verify_with_keys(
		&self,
		token: &str,
		keys: &SigningKeySet,
	) -> Result<AccessClaims, AuthError> {
		let kid = token_kid(token)?;
		let key = keys.get(&kid).ok_or(AuthError::UnknownSigningKey { kid })?;
		let claims = jsonwebtoken::decode::<AccessClaims>(token, key, &self.validation)
			.map_err(classify)?
			.claims;

		if !claims.is_access_token() {
			return Err(AuthError::WrongTokenClass { token_use: claims.token_use });
		}
		if !claims.is_bound_to(&self.client_id) {
			return Err(AuthError::WrongAudience);
		}

		Ok(claims)
	}
}

fn token_kid(token: &str) -> Result<String, AuthError> {
	let header = jsonwebtoken::decode_header(token)
		.map_err(|_| AuthError::MalformedToken { reason: "unreadable header".into() })?;

	header.kid.ok_or_else(|| AuthError::MalformedToken { reason: "missing kid".into() })
}

fn classify(e: jsonwebtoken::errors::Error) -> AuthError {
	let rejected = |reason: &str| AuthError::InvalidSignatureOrIssuer { reason: reason.into() };

	match e.kind() {
		ErrorKind::InvalidSignature => rejected("signature mismatch"),
		ErrorKind::ExpiredSignature => rejected("token expired"),
		ErrorKind::ImmatureSignature => rejected("token not yet valid"),
		ErrorKind::InvalidIssuer => rejected("issuer mismatch"),
		ErrorKind::InvalidAlgorithm => rejected("algorithm not accepted"),
		ErrorKind::MissingRequiredClaim(claim) =>
			AuthError::InvalidSignatureOrIssuer { reason: format!("missing {claim} claim") },
		ErrorKind::InvalidKeyFormat | ErrorKind::InvalidRsaKey(_) => rejected("unusable key"),
		_ => AuthError::MalformedToken { reason: e.to_string() },
	}
}
