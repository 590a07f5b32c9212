//! Observability helpers shared by the service, the verifier, and the key provider.
//!
//! # Feature Flags
//!
//! - Spans named `cost_api.op` carry the `op` and `stage` fields and are always emitted through
//!   `tracing`.
//! - Enable `metrics` to increment the `cost_api_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`, and to record completed latencies in
//!   the `cost_api_op_duration_seconds` histogram.

pub mod logging;

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Listing every record.
	ListRecords,
	/// Creating (or overwriting) a record.
	CreateRecord,
	/// Partially updating a record.
	UpdateRecord,
	/// Deleting a record.
	DeleteRecord,
	/// Verifying a bearer token.
	VerifyToken,
	/// Fetching the identity provider's signing keys.
	FetchSigningKeys,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::ListRecords => "list_records",
			OpKind::CreateRecord => "create_record",
			OpKind::UpdateRecord => "update_record",
			OpKind::DeleteRecord => "delete_record",
			OpKind::VerifyToken => "verify_token",
			OpKind::FetchSigningKeys => "fetch_signing_keys",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}

	/// Maps a result onto its terminal outcome.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		match result {
			Ok(_) => OpOutcome::Success,
			Err(_) => OpOutcome::Failure,
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
