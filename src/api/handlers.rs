//! Route handlers and their wire representations.

// crates.io
use axum::{
	Json,
	extract::{Path, State, rejection::JsonRejection},
};
use serde::{Deserializer, de::Error as _};
use serde_json::{Value, json};
// self
use crate::{
	_prelude::*,
	api::{ApiError, Authenticated},
	record::{CostId, Record, RecordUpdate},
	service::CostService,
};

/// Body of `POST /api/cost`.
///
/// `Amount` accepts a JSON number or a decimal string whose magnitude fits [`Decimal::MAX`].
#[derive(Clone, Debug, Deserialize)]
pub struct CreateCost {
	/// Identifier of the record to write.
	#[serde(rename = "CostID")]
	pub id: CostId,
	/// Amount to store.
	#[serde(rename = "Amount", deserialize_with = "amount")]
	pub amount: Decimal,
	/// Optional description.
	#[serde(rename = "Description", default)]
	pub description: Option<String>,
}

/// Body of `PUT /api/cost/{cost_id}`.
///
/// A `CostID` member is tolerated and ignored; the path identifier wins.
#[derive(Clone, Debug, Deserialize)]
pub struct UpdateCost {
	/// New amount.
	#[serde(rename = "Amount", deserialize_with = "amount")]
	pub amount: Decimal,
	/// New description.
	#[serde(rename = "Description", default)]
	pub description: Option<String>,
}

/// Record as rendered to clients, with the amount as a JSON number.
#[derive(Clone, Debug, Serialize)]
pub struct CostView {
	#[serde(rename = "CostID")]
	id: CostId,
	#[serde(rename = "Amount", with = "rust_decimal::serde::float")]
	amount: Decimal,
	#[serde(rename = "Description")]
	description: String,
	#[serde(rename = "CreatedAt", with = "time::serde::rfc3339::option")]
	created_at: Option<OffsetDateTime>,
	#[serde(rename = "UpdatedAt", with = "time::serde::rfc3339::option")]
	updated_at: Option<OffsetDateTime>,
}
impl From<Record> for CostView {
	fn from(record: Record) -> Self {
		Self {
			id: record.id,
			amount: record.amount,
			description: record.description,
			created_at: record.created_at,
			updated_at: record.updated_at,
		}
	}
}

/// Update acknowledgement; carries no creation instant.
#[derive(Clone, Debug, Serialize)]
pub struct CostUpdateView {
	#[serde(rename = "CostID")]
	id: CostId,
	#[serde(rename = "Amount", with = "rust_decimal::serde::float")]
	amount: Decimal,
	#[serde(rename = "Description")]
	description: String,
	#[serde(rename = "UpdatedAt", with = "time::serde::rfc3339")]
	updated_at: OffsetDateTime,
}
impl From<RecordUpdate> for CostUpdateView {
	fn from(update: RecordUpdate) -> Self {
		Self {
			id: update.id,
			amount: update.amount,
			description: update.description,
			updated_at: update.updated_at,
		}
	}
}

fn amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
	D: Deserializer<'de>,
{
	<Decimal as serde::Deserialize>::deserialize(deserializer).map_err(|e| {
		D::Error::custom(format!(
			"Amount must be a decimal number no larger than {} in magnitude ({e})",
			Decimal::MAX
		))
	})
}

/// `GET /health`
pub async fn health() -> Json<Value> {
	Json(json!({ "health": "green" }))
}

/// `GET /api/cost`
pub async fn list_costs(
	_: Authenticated,
	State(service): State<CostService>,
) -> Result<Json<Vec<CostView>>, ApiError> {
	let records = service.list().await?;

	Ok(Json(records.into_iter().map(CostView::from).collect()))
}

/// `POST /api/cost`
pub async fn create_cost(
	_: Authenticated,
	State(service): State<CostService>,
	body: Result<Json<CreateCost>, JsonRejection>,
) -> Result<Json<CostView>, ApiError> {
	let Json(body) = body?;
	let record =
		service.create(body.id, body.amount, body.description.unwrap_or_default()).await?;

	Ok(Json(record.into()))
}

/// `PUT /api/cost/{cost_id}`
pub async fn update_cost(
	_: Authenticated,
	State(service): State<CostService>,
	Path(cost_id): Path<String>,
	body: Result<Json<UpdateCost>, JsonRejection>,
) -> Result<Json<CostUpdateView>, ApiError> {
	let id = CostId::new(cost_id)?;
	let Json(body) = body?;
	let update = service.update(id, body.amount, body.description.unwrap_or_default()).await?;

	Ok(Json(update.into()))
}

/// `DELETE /api/cost/{cost_id}`
pub async fn delete_cost(
	_: Authenticated,
	State(service): State<CostService>,
	Path(cost_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
	let id = CostId::new(cost_id)?;

	service.delete(&id).await?;

	Ok(Json(json!({ "deleted": id })))
}
