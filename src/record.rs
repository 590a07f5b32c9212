//! Cost record model, identifiers, and the partial-update payload.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

/// Largest identifier accepted, matching the hash-key limit of the backing table.
pub const COST_ID_MAX_BYTES: usize = 2048;

/// Error returned when a record identifier fails validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum CostIdError {
	/// The identifier was empty.
	#[error("Cost identifier cannot be empty.")]
	Empty,
	/// The identifier exceeded the allowed byte count.
	#[error("Cost identifier exceeds {max} bytes.")]
	TooLong {
		/// Maximum permitted byte count.
		max: usize,
	},
}

/// Opaque, caller-supplied record identifier.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CostId(String);
impl CostId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl Into<String>) -> Result<Self, CostIdError> {
		let value = value.into();

		validate(&value)?;

		Ok(Self(value))
	}
}
impl Deref for CostId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for CostId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for CostId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<CostId> for String {
	fn from(value: CostId) -> Self {
		value.0
	}
}
impl TryFrom<String> for CostId {
	type Error = CostIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for CostId {
	type Err = CostIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for CostId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "CostId({})", self.0)
	}
}
impl Display for CostId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate(view: &str) -> Result<(), CostIdError> {
	if view.is_empty() {
		return Err(CostIdError::Empty);
	}
	if view.len() > COST_ID_MAX_BYTES {
		return Err(CostIdError::TooLong { max: COST_ID_MAX_BYTES });
	}

	Ok(())
}

/// Stored cost record.
///
/// `created_at` is optional because a patch against a missing identifier materializes a record
/// that was never created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
	/// Record identifier.
	#[serde(rename = "CostID")]
	pub id: CostId,
	/// Exact monetary amount.
	#[serde(rename = "Amount")]
	pub amount: Decimal,
	/// Free-form description; empty when none was supplied.
	#[serde(rename = "Description", default)]
	pub description: String,
	/// Creation instant, set once.
	#[serde(rename = "CreatedAt", default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
	/// Instant of the latest mutation.
	#[serde(rename = "UpdatedAt", default, with = "time::serde::rfc3339::option")]
	pub updated_at: Option<OffsetDateTime>,
}
impl Record {
	/// Builds a freshly created record whose timestamps both equal `now`.
	pub fn created(
		id: CostId,
		amount: Decimal,
		description: impl Into<String>,
		now: OffsetDateTime,
	) -> Self {
		Self {
			id,
			amount,
			description: description.into(),
			created_at: Some(now),
			updated_at: Some(now),
		}
	}

	/// Builds the partial record a patch leaves behind when no record existed.
	pub fn from_patch(id: CostId, patch: RecordPatch) -> Self {
		Self {
			id,
			amount: patch.amount,
			description: patch.description,
			created_at: None,
			updated_at: Some(patch.updated_at),
		}
	}

	/// Applies a patch in place, leaving `created_at` untouched.
	pub fn apply(&mut self, patch: RecordPatch) {
		self.amount = patch.amount;
		self.description = patch.description;
		self.updated_at = Some(patch.updated_at);
	}
}

/// Fields rewritten by an update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordPatch {
	/// New amount.
	pub amount: Decimal,
	/// New description.
	pub description: String,
	/// Mutation instant.
	pub updated_at: OffsetDateTime,
}

/// Result of an update: the written fields without `created_at`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordUpdate {
	/// Identifier taken from the request path.
	pub id: CostId,
	/// Amount as written.
	pub amount: Decimal,
	/// Description as written.
	pub description: String,
	/// Mutation instant.
	pub updated_at: OffsetDateTime,
}
