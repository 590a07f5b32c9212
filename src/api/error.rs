//! Mapping of service failures onto HTTP responses.

// crates.io
use axum::{
	Json,
	extract::rejection::JsonRejection,
	http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
	response::{IntoResponse, Response},
};
use serde_json::json;
// self
use crate::{
	_prelude::*, auth::AuthError, error::ConfigError, record::CostIdError, store::StoreError,
};

/// Failure returned by request handlers and extractors.
///
/// Renders as `{"detail": "<message>"}`. Store and configuration details are logged, never sent.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Bearer token missing or rejected.
	#[error(transparent)]
	Unauthorized(#[from] AuthError),
	/// Path identifier failed validation.
	#[error(transparent)]
	InvalidId(#[from] CostIdError),
	/// Request body is missing, not JSON, or does not match the expected shape.
	#[error(transparent)]
	InvalidBody(#[from] JsonRejection),
	/// Record store failed or timed out.
	#[error(transparent)]
	Store(#[from] StoreError),
	/// Service wiring problem surfacing at request time.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl ApiError {
	/// Status code this error renders with.
	pub fn status(&self) -> StatusCode {
		match self {
			ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
			ApiError::InvalidId(_) => StatusCode::UNPROCESSABLE_ENTITY,
			ApiError::InvalidBody(e) => e.status(),
			ApiError::Store(StoreError::Unavailable { .. }) => StatusCode::SERVICE_UNAVAILABLE,
			ApiError::Store(StoreError::Serialization { .. }) | ApiError::Config(_) =>
				StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn detail(&self) -> String {
		match self {
			ApiError::Unauthorized(e) => e.to_string(),
			ApiError::InvalidId(e) => e.to_string(),
			ApiError::InvalidBody(e) => e.body_text(),
			ApiError::Store(StoreError::Unavailable { .. }) => "Record store unavailable.".into(),
			ApiError::Store(StoreError::Serialization { .. }) | ApiError::Config(_) =>
				"Internal server error.".into(),
		}
	}
}
impl From<Error> for ApiError {
	fn from(e: Error) -> Self {
		match e {
			Error::Storage(e) => e.into(),
			Error::Auth(e) => e.into(),
			Error::Config(e) => e.into(),
			Error::InvalidId(e) => e.into(),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status();

		match &self {
			ApiError::Unauthorized(AuthError::UpstreamUnavailable { message }) => {
				tracing::warn!(%message, "Rejecting request; signing keys are unavailable.");
			},
			ApiError::Store(e) => tracing::error!(error = %e, "Record store failure."),
			ApiError::Config(e) => tracing::error!(error = ?e, "Service misconfiguration."),
			_ => {},
		}

		let mut response = (status, Json(json!({ "detail": self.detail() }))).into_response();

		if status == StatusCode::UNAUTHORIZED {
			response.headers_mut().insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
		}

		response
	}
}
