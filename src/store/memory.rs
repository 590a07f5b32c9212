//! Thread-safe in-memory [`RecordStore`] implementation for local development and tests.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// self
use crate::{
	_prelude::*,
	record::{CostId, Record, RecordPatch},
	store::{ProvisionOutcome, RecordStore, StoreFuture},
};

type RecordMap = Arc<RwLock<HashMap<CostId, Record>>>;

/// Storage backend that keeps records in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
	records: RecordMap,
	provisioned: Arc<AtomicBool>,
}
impl MemoryStore {
	/// Number of records currently held.
	pub fn len(&self) -> usize {
		self.records.read().len()
	}

	/// Returns `true` when no record is held.
	pub fn is_empty(&self) -> bool {
		self.records.read().is_empty()
	}

	fn put_now(map: RecordMap, record: Record) {
		map.write().insert(record.id.clone(), record);
	}

	fn patch_now(map: RecordMap, id: CostId, patch: RecordPatch) {
		let mut guard = map.write();

		match guard.get_mut(&id) {
			Some(record) => record.apply(patch),
			None => {
				guard.insert(id.clone(), Record::from_patch(id, patch));
			},
		}
	}
}
impl RecordStore for MemoryStore {
	fn provision(&self) -> StoreFuture<'_, ProvisionOutcome> {
		let provisioned = self.provisioned.clone();

		Box::pin(async move {
			if provisioned.swap(true, Ordering::AcqRel) {
				Ok(ProvisionOutcome::AlreadyExists)
			} else {
				Ok(ProvisionOutcome::Created)
			}
		})
	}

	fn list(&self) -> StoreFuture<'_, Vec<Record>> {
		let map = self.records.clone();

		Box::pin(async move {
			let records: Vec<Record> = map.read().values().cloned().collect();

			Ok(records)
		})
	}

	fn fetch<'a>(&'a self, id: &'a CostId) -> StoreFuture<'a, Option<Record>> {
		let map = self.records.clone();

		Box::pin(async move { Ok(map.read().get(id).cloned()) })
	}

	fn put(&self, record: Record) -> StoreFuture<'_, ()> {
		let map = self.records.clone();

		Box::pin(async move {
			Self::put_now(map, record);

			Ok(())
		})
	}

	fn patch<'a>(&'a self, id: &'a CostId, patch: RecordPatch) -> StoreFuture<'a, ()> {
		let map = self.records.clone();
		let id = id.to_owned();

		Box::pin(async move {
			Self::patch_now(map, id, patch);

			Ok(())
		})
	}

	fn delete<'a>(&'a self, id: &'a CostId) -> StoreFuture<'a, ()> {
		let map = self.records.clone();

		Box::pin(async move {
			map.write().remove(id);

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[tokio::test]
	async fn provision_reports_created_once() {
		let store = MemoryStore::default();

		assert_eq!(
			store.provision().await.expect("Provisioning should succeed."),
			ProvisionOutcome::Created
		);
		assert_eq!(
			store.provision().await.expect("Provisioning should stay idempotent."),
			ProvisionOutcome::AlreadyExists
		);
	}

	#[tokio::test]
	async fn patch_on_missing_id_materializes_partial_record() {
		let store = MemoryStore::default();
		let id = CostId::new("missing").expect("Identifier fixture should be valid.");
		let updated_at = macros::datetime!(2025-04-01 10:00 UTC);

		let patch = RecordPatch { amount: Decimal::TEN, description: "late".into(), updated_at };

		store
			.patch(&id, patch)
			.await
			.expect("Patch should succeed without an existing record.");

		let record = store
			.fetch(&id)
			.await
			.expect("Fetch should succeed.")
			.expect("Patched record should exist.");

		assert_eq!(record.created_at, None);
		assert_eq!(record.updated_at, Some(updated_at));
		assert_eq!(store.len(), 1);
	}
}
