//! [`RecordStore`] decorator that bounds every call with a deadline.

// self
use crate::{
	_prelude::*,
	record::{CostId, Record, RecordPatch},
	store::{ProvisionOutcome, RecordStore, StoreError, StoreFuture},
};

/// Wraps a store so that slow calls fail with [`StoreError::Unavailable`] instead of hanging.
///
/// The decorator never retries; an elapsed call is reported immediately.
#[derive(Clone)]
pub struct TimeoutStore {
	inner: Arc<dyn RecordStore>,
	limit: StdDuration,
}
impl TimeoutStore {
	/// Default per-call bound.
	pub const DEFAULT_LIMIT: StdDuration = StdDuration::from_secs(5);

	/// Wraps `inner` with the provided per-call limit.
	pub fn new(inner: Arc<dyn RecordStore>, limit: StdDuration) -> Self {
		Self { inner, limit }
	}

	/// Per-call limit applied to the wrapped store.
	pub fn limit(&self) -> StdDuration {
		self.limit
	}

	fn bounded<'a, T>(&self, op: &'static str, fut: StoreFuture<'a, T>) -> StoreFuture<'a, T>
	where
		T: 'a + Send,
	{
		let limit = self.limit;

		Box::pin(async move {
			match tokio::time::timeout(limit, fut).await {
				Ok(result) => result,
				Err(_) => Err(StoreError::Unavailable {
					message: format!("{op} timed out after {}ms", limit.as_millis()),
				}),
			}
		})
	}
}
impl Debug for TimeoutStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TimeoutStore").field("limit", &self.limit).finish()
	}
}
impl RecordStore for TimeoutStore {
	fn provision(&self) -> StoreFuture<'_, ProvisionOutcome> {
		self.bounded("provision", self.inner.provision())
	}

	fn list(&self) -> StoreFuture<'_, Vec<Record>> {
		self.bounded("list", self.inner.list())
	}

	fn fetch<'a>(&'a self, id: &'a CostId) -> StoreFuture<'a, Option<Record>> {
		self.bounded("fetch", self.inner.fetch(id))
	}

	fn put(&self, record: Record) -> StoreFuture<'_, ()> {
		self.bounded("put", self.inner.put(record))
	}

	fn patch<'a>(&'a self, id: &'a CostId, patch: RecordPatch) -> StoreFuture<'a, ()> {
		self.bounded("patch", self.inner.patch(id, patch))
	}

	fn delete<'a>(&'a self, id: &'a CostId) -> StoreFuture<'a, ()> {
		self.bounded("delete", self.inner.delete(id))
	}
}
