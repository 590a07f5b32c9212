//! Record operations exposed to request handlers.
//!
//! [`CostService`] owns the store handle and stamps timestamps; it performs no existence checks,
//! so `create` overwrites and `update` materializes missing records exactly as the store does.

// self
use crate::{
	_prelude::*,
	obs::{OpKind, OpSpan, OpTimer},
	record::{CostId, Record, RecordPatch, RecordUpdate},
	store::{ProvisionOutcome, RecordStore},
};

/// Cost record operations over a shared [`RecordStore`].
#[derive(Clone)]
pub struct CostService {
	/// Store every operation reads from or writes to.
	pub store: Arc<dyn RecordStore>,
}
impl CostService {
	/// Creates a service over `store`.
	pub fn new(store: Arc<dyn RecordStore>) -> Self {
		Self { store }
	}

	/// Performs the store's one-time setup.
	pub async fn provision(&self) -> Result<ProvisionOutcome> {
		let outcome = self.store.provision().await?;

		tracing::info!(?outcome, "Provisioned record store.");

		Ok(outcome)
	}

	/// Returns every record.
	pub async fn list(&self) -> Result<Vec<Record>> {
		observe(OpKind::ListRecords, async move { self.store.list().await.map_err(Error::from) })
			.await
	}

	/// Writes a new record stamped with the current instant, replacing any record with the same
	/// identifier.
	pub async fn create(
		&self,
		id: CostId,
		amount: Decimal,
		description: impl Into<String>,
	) -> Result<Record> {
		let record = Record::created(id, amount, description, OffsetDateTime::now_utc());

		observe(OpKind::CreateRecord, async move {
			self.store.put(record.clone()).await?;

			Ok::<_, Error>(record)
		})
		.await
	}

	/// Rewrites amount and description of `id`; the record is created when missing.
	pub async fn update(
		&self,
		id: CostId,
		amount: Decimal,
		description: impl Into<String>,
	) -> Result<RecordUpdate> {
		let patch = RecordPatch {
			amount,
			description: description.into(),
			updated_at: OffsetDateTime::now_utc(),
		};

		observe(OpKind::UpdateRecord, async move {
			self.store.patch(&id, patch.clone()).await?;

			Ok::<_, Error>(RecordUpdate {
				id,
				amount: patch.amount,
				description: patch.description,
				updated_at: patch.updated_at,
			})
		})
		.await
	}

	/// Removes `id`; unknown identifiers succeed.
	pub async fn delete(&self, id: &CostId) -> Result<()> {
		observe(OpKind::DeleteRecord, async move {
			self.store.delete(id).await.map_err(Error::from)
		})
		.await
	}
}
impl Debug for CostService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CostService").finish_non_exhaustive()
	}
}

async fn observe<T, Fut>(kind: OpKind, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OpSpan::new(kind, "store");
	let timer = OpTimer::start(kind);
	let result = span.instrument(fut).await;
	let elapsed = timer.finish(&result);

	if let Err(e) = &result {
		tracing::warn!(op = kind.as_str(), error = %e, ?elapsed, "Record operation failed.");
	}

	result
}
