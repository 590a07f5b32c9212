//! Service-level error types shared across authentication, configuration, and stores.

// self
use crate::_prelude::*;

/// Service-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Bearer token could not be verified.
	#[error(transparent)]
	Auth(#[from] crate::auth::AuthError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller supplied an unusable record identifier.
	#[error(transparent)]
	InvalidId(#[from] crate::record::CostIdError),
}

/// Configuration and validation failures raised while assembling the service.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Issuer or key set URL cannot be parsed.
	#[error("The {field} URL is invalid.")]
	InvalidUrl {
		/// Which setting failed to parse.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Issuer or key set URL uses a scheme other than HTTP(S).
	#[error("The {field} URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Which setting failed validation.
		field: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// Neither an issuer nor a Cognito region + user pool pair was supplied.
	#[error("An issuer URL or a Cognito region and user pool id is required.")]
	MissingIssuer,
	/// Application client identifier is empty.
	#[error("The application client id cannot be empty.")]
	MissingClientId,
	/// No signature algorithm is accepted.
	#[error("At least one signature algorithm must be accepted.")]
	NoAlgorithms,
	/// Accepted algorithms span more than one key family.
	#[error("Signature algorithms {first} and {other} need different key types.")]
	MixedAlgorithmFamilies {
		/// First accepted algorithm.
		first: String,
		/// Algorithm whose key family differs from `first`.
		other: String,
	},
	/// Algorithm name is not recognized.
	#[error("Unsupported signature algorithm `{name}`.")]
	UnknownAlgorithm {
		/// Algorithm name as supplied.
		name: String,
	},
	/// File store path is required but absent.
	#[error("The file store requires a snapshot path.")]
	MissingStorePath,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{auth::AuthError, store::StoreError};

	#[test]
	fn store_error_converts_with_source() {
		let store_error = StoreError::Unavailable { message: "table unreachable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("table unreachable"));

		let source = StdError::source(&error)
			.expect("Service error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn auth_error_is_transparent() {
		let error: Error = AuthError::WrongAudience.into();

		assert_eq!(error.to_string(), AuthError::WrongAudience.to_string());
	}
}
