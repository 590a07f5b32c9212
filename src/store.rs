//! Storage contracts and built-in store implementations for cost records.

pub mod file;
pub mod memory;
pub mod timeout;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use timeout::TimeoutStore;

// self
use crate::{
	_prelude::*,
	record::{CostId, Record, RecordPatch},
};

/// Boxed future returned by every [`RecordStore`] operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Single-collection key-value contract keyed by [`CostId`].
///
/// Writes are unconditional: `put` overwrites and `patch` materializes missing records. Callers
/// that need existence checks must layer them on top.
pub trait RecordStore
where
	Self: Send + Sync,
{
	/// Performs the idempotent one-time setup of the backing collection.
	fn provision(&self) -> StoreFuture<'_, ProvisionOutcome>;

	/// Returns every stored record in no particular order.
	fn list(&self) -> StoreFuture<'_, Vec<Record>>;

	/// Fetches a single record, if present.
	fn fetch<'a>(&'a self, id: &'a CostId) -> StoreFuture<'a, Option<Record>>;

	/// Writes a full record, replacing any record with the same identifier.
	fn put(&self, record: Record) -> StoreFuture<'_, ()>;

	/// Rewrites amount, description, and update instant of a record.
	fn patch<'a>(&'a self, id: &'a CostId, patch: RecordPatch) -> StoreFuture<'a, ()>;

	/// Removes a record; succeeds when the identifier is unknown.
	fn delete<'a>(&'a self, id: &'a CostId) -> StoreFuture<'a, ()>;
}

/// Outcome of [`RecordStore::provision`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisionOutcome {
	/// The collection did not exist and was created.
	Created,
	/// The collection was already present.
	AlreadyExists,
}

/// Error type produced by [`RecordStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Persisted data could not be encoded or decoded.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// The backend could not be reached or did not answer in time.
	#[error("Store unavailable: {message}.")]
	Unavailable {
		/// Human-readable error payload.
		message: String,
	},
}
