//! Simple file-backed [`RecordStore`] for local development and single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	record::{CostId, Record, RecordPatch},
	store::{ProvisionOutcome, RecordStore, StoreError, StoreFuture},
};

/// Persists records to a JSON snapshot after each mutation.
///
/// Mutations are applied to a copy of the records, written to disk off the async runtime, and only
/// then published; a failed write leaves the served records untouched.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	records: Arc<RwLock<HashMap<CostId, Record>>>,
	write_gate: Arc<AsyncMutex<()>>,
}
impl FileStore {
	/// Opens a store at the provided path, eagerly loading an existing snapshot.
	///
	/// The snapshot itself is only created by [`RecordStore::provision`] or the first mutation.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();
		let snapshot = load_snapshot(&path)?;

		Ok(Self {
			path,
			records: Arc::new(RwLock::new(snapshot)),
			write_gate: Arc::new(AsyncMutex::new(())),
		})
	}

	/// Location of the snapshot file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Applies `mutate` to a copy of the records and publishes the copy once it is on disk.
	///
	/// `mutate` returns `false` when nothing changed, which skips the write.
	async fn commit<F>(&self, mutate: F) -> Result<(), StoreError>
	where
		F: FnOnce(&mut HashMap<CostId, Record>) -> bool,
	{
		let _gate = self.write_gate.lock().await;
		let mut next = self.records.read().clone();

		if !mutate(&mut next) {
			return Ok(());
		}

		self.persist(&next).await?;
		*self.records.write() = next;

		Ok(())
	}

	async fn persist(&self, contents: &HashMap<CostId, Record>) -> Result<(), StoreError> {
		let serialized = {
			let snapshot: Vec<_> = contents.values().collect();

			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?
		};
		let path = self.path.clone();

		tokio::task::spawn_blocking(move || write_snapshot(&path, &serialized)).await.map_err(
			|e| StoreError::Unavailable { message: format!("Snapshot writer stopped: {e}") },
		)?
	}
}
impl RecordStore for FileStore {
	fn provision(&self) -> StoreFuture<'_, ProvisionOutcome> {
		Box::pin(async move {
			let _gate = self.write_gate.lock().await;

			if self.path.exists() {
				return Ok(ProvisionOutcome::AlreadyExists);
			}

			let current = self.records.read().clone();

			self.persist(&current).await?;

			Ok(ProvisionOutcome::Created)
		})
	}

	fn list(&self) -> StoreFuture<'_, Vec<Record>> {
		Box::pin(async move {
			let records: Vec<Record> = self.records.read().values().cloned().collect();

			Ok(records)
		})
	}

	fn fetch<'a>(&'a self, id: &'a CostId) -> StoreFuture<'a, Option<Record>> {
		Box::pin(async move { Ok(self.records.read().get(id).cloned()) })
	}

	fn put(&self, record: Record) -> StoreFuture<'_, ()> {
		Box::pin(self.commit(move |records| {
			records.insert(record.id.clone(), record);

			true
		}))
	}

	fn patch<'a>(&'a self, id: &'a CostId, patch: RecordPatch) -> StoreFuture<'a, ()> {
		Box::pin(self.commit(move |records| {
			match records.get_mut(id) {
				Some(record) => record.apply(patch),
				None => {
					records.insert(id.clone(), Record::from_patch(id.clone(), patch));
				},
			}

			true
		}))
	}

	fn delete<'a>(&'a self, id: &'a CostId) -> StoreFuture<'a, ()> {
		Box::pin(self.commit(move |records| records.remove(id).is_some()))
	}
}

fn load_snapshot(path: &Path) -> Result<HashMap<CostId, Record>, StoreError> {
	if !path.exists() {
		return Ok(HashMap::new());
	}

	let bytes = fs::read(path).map_err(|e| StoreError::Unavailable {
		message: format!("Failed to read {}: {e}", path.display()),
	})?;

	if bytes.is_empty() {
		return Ok(HashMap::new());
	}

	let records: Vec<Record> =
		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})?;

	Ok(records.into_iter().map(|record| (record.id.clone(), record)).collect())
}

// Blocking; runs on the blocking pool.
fn write_snapshot(path: &Path, serialized: &[u8]) -> Result<(), StoreError> {
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent).map_err(|e| StoreError::Unavailable {
			message: format!("Failed to create store directory {}: {e}", parent.display()),
		})?;
	}

	let mut tmp_path = path.to_owned();

	tmp_path.set_extension("tmp");

	{
		let mut file = File::create(&tmp_path).map_err(|e| StoreError::Unavailable {
			message: format!("Failed to create {}: {e}", tmp_path.display()),
		})?;

		file.write_all(serialized).map_err(|e| StoreError::Unavailable {
			message: format!("Failed to write {}: {e}", tmp_path.display()),
		})?;
		file.sync_all().map_err(|e| StoreError::Unavailable {
			message: format!("Failed to sync {}: {e}", tmp_path.display()),
		})?;
	}

	fs::rename(&tmp_path, path).map_err(|e| StoreError::Unavailable {
		message: format!("Failed to replace {}: {e}", path.display()),
	})
}
