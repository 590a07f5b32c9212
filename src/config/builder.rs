// crates.io
use jsonwebtoken::Algorithm;
// self
use crate::{
	_prelude::*, auth::KeyRefreshPolicy, config::AuthConfig, error::ConfigError,
	http::ReqwestKeySetFetcher,
};

/// Builder for [`AuthConfig`] values.
#[derive(Debug)]
pub struct AuthConfigBuilder {
	/// Issuer the `iss` claim must equal.
	pub issuer: String,
	/// Application identifier tokens must be bound to.
	pub client_id: String,
	/// Key set location; derived from the issuer when unset.
	pub jwks_url: Option<Url>,
	/// Accepted signature algorithms.
	pub algorithms: Vec<Algorithm>,
	/// Tolerated clock skew.
	pub leeway: StdDuration,
	/// Signing key refresh policy.
	pub key_policy: KeyRefreshPolicy,
	/// Bound on each key set request.
	pub fetch_timeout: StdDuration,
}
impl AuthConfigBuilder {
	/// Creates a new builder seeded with RS256, zero leeway, and the never-refresh key policy.
	pub fn new(issuer: impl Into<String>, client_id: impl Into<String>) -> Self {
		Self {
			issuer: issuer.into(),
			client_id: client_id.into(),
			jwks_url: None,
			algorithms: vec![Algorithm::RS256],
			leeway: StdDuration::ZERO,
			key_policy: KeyRefreshPolicy::default(),
			fetch_timeout: ReqwestKeySetFetcher::DEFAULT_TIMEOUT,
		}
	}

	/// Overrides the key set location.
	pub fn jwks_url(mut self, url: Url) -> Self {
		self.jwks_url = Some(url);

		self
	}

	/// Replaces the accepted signature algorithms.
	pub fn algorithms<I>(mut self, algorithms: I) -> Self
	where
		I: IntoIterator<Item = Algorithm>,
	{
		self.algorithms = algorithms.into_iter().collect();

		self
	}

	/// Sets the tolerated clock skew.
	pub fn leeway(mut self, leeway: StdDuration) -> Self {
		self.leeway = leeway;

		self
	}

	/// Sets the signing key refresh policy.
	pub fn key_policy(mut self, policy: KeyRefreshPolicy) -> Self {
		self.key_policy = policy;

		self
	}

	/// Sets the bound on each key set request.
	pub fn fetch_timeout(mut self, timeout: StdDuration) -> Self {
		self.fetch_timeout = timeout;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<AuthConfig, ConfigError> {
		let issuer = self.issuer.trim().to_owned();

		if issuer.is_empty() {
			return Err(ConfigError::MissingIssuer);
		}

		let issuer_url = parse_http_url("issuer", &issuer)?;
		let client_id = self.client_id.trim().to_owned();

		if client_id.is_empty() {
			return Err(ConfigError::MissingClientId);
		}

		let Some(&first) = self.algorithms.first() else {
			return Err(ConfigError::NoAlgorithms);
		};

		// The decoder refuses a key whose family differs from any accepted algorithm.
		let family = key_family(first);

		if let Some(&other) = self.algorithms.iter().find(|alg| key_family(**alg) != family) {
			return Err(ConfigError::MixedAlgorithmFamilies {
				first: format!("{first:?}"),
				other: format!("{other:?}"),
			});
		}

		let jwks_url = match self.jwks_url {
			Some(url) => {
				validate_scheme("jwks", &url)?;

				url
			},
			None => default_jwks_url(&issuer_url)?,
		};

		Ok(AuthConfig {
			issuer,
			client_id,
			jwks_url,
			algorithms: self.algorithms,
			leeway: self.leeway,
			key_policy: self.key_policy,
			fetch_timeout: self.fetch_timeout,
		})
	}
}

/// Parses an algorithm name such as `RS256`.
pub fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
	Algorithm::from_str(name.trim())
		.map_err(|_| ConfigError::UnknownAlgorithm { name: name.to_owned() })
}

#[derive(PartialEq, Eq)]
enum KeyFamily {
	Hmac,
	Rsa,
	Ec,
	Okp,
}

fn key_family(algorithm: Algorithm) -> KeyFamily {
	match algorithm {
		Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => KeyFamily::Hmac,
		Algorithm::RS256
		| Algorithm::RS384
		| Algorithm::RS512
		| Algorithm::PS256
		| Algorithm::PS384
		| Algorithm::PS512 => KeyFamily::Rsa,
		Algorithm::ES256 | Algorithm::ES384 => KeyFamily::Ec,
		Algorithm::EdDSA => KeyFamily::Okp,
	}
}

fn parse_http_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source })?;

	validate_scheme(field, &url)?;

	Ok(url)
}

fn validate_scheme(field: &'static str, url: &Url) -> Result<(), ConfigError> {
	match url.scheme() {
		"http" | "https" => Ok(()),
		_ => Err(ConfigError::UnsupportedScheme { field, url: url.to_string() }),
	}
}

fn default_jwks_url(issuer: &Url) -> Result<Url, ConfigError> {
	let base = issuer.as_str().trim_end_matches('/');

	parse_http_url("jwks", &format!("{base}/.well-known/jwks.json"))
}
