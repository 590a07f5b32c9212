mod common;

// std
use std::{sync::Arc, time::Duration};
// crates.io
use axum::{
	Router,
	body::Body,
	http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
// self
use common::*;
use cost_api::store::{MemoryStore, RecordStore, TimeoutStore};

async fn call(
	app: &Router,
	method: Method,
	uri: &str,
	token: Option<&str>,
	body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
	let mut request = Request::builder().method(method).uri(uri);

	if let Some(token) = token {
		request = request.header(header::AUTHORIZATION, bearer(token));
	}

	let request = match body {
		Some(body) => request
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string())),
		None => request.body(Body::empty()),
	}
	.expect("Request should build.");
	let response = app.clone().oneshot(request).await.expect("Router should respond.");
	let status = response.status();
	let challenge = response
		.headers()
		.get(header::WWW_AUTHENTICATE)
		.and_then(|value| value.to_str().ok())
		.map(ToOwned::to_owned);
	let bytes = response.into_body().collect().await.expect("Body should collect.").to_bytes();
	let json = if bytes.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&bytes).unwrap_or_else(|_| {
			Value::String(String::from_utf8_lossy(&bytes).into_owned())
		})
	};

	(status, challenge, json)
}

#[tokio::test]
async fn health_needs_no_token() {
	let app = app(Arc::new(MemoryStore::default()));
	let (status, _, body) = call(&app, Method::GET, "/health", None, None).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!({ "health": "green" }));
}

#[tokio::test]
async fn rejected_tokens_never_reach_the_store() {
	let store = Arc::new(CountingStore::new(Arc::new(MemoryStore::default())));
	let app = app(store.clone());
	let mut id_token = access_claims();

	id_token["token_use"] = json!("id");

	let mut other_client = access_claims();

	other_client["client_id"] = json!("someone-else");

	let cases = [
		(None, "Not authenticated."),
		(Some("garbage".to_owned()), "Invalid token: unreadable header."),
		(Some(sign_with_kid("rotated", &access_claims())), "Invalid token key."),
		(Some(sign(&id_token)), "Not an access token."),
		(Some(sign(&other_client)), "Invalid client_id."),
	];

	for (token, detail) in cases {
		let (status, challenge, body) = call(
			&app,
			Method::POST,
			"/api/cost",
			token.as_deref(),
			Some(json!({ "CostID": "A", "Amount": 1 })),
		)
		.await;

		assert_eq!(status, StatusCode::UNAUTHORIZED, "{detail}");
		assert_eq!(challenge.as_deref(), Some("Bearer"));
		assert_eq!(body, json!({ "detail": detail }));
	}

	for (method, uri) in [
		(Method::GET, "/api/cost"),
		(Method::PUT, "/api/cost/A"),
		(Method::DELETE, "/api/cost/A"),
	] {
		let (status, _, _) = call(&app, method, uri, None, None).await;

		assert_eq!(status, StatusCode::UNAUTHORIZED);
	}

	assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn crud_round_trip() {
	let store = Arc::new(MemoryStore::default());
	let app = app(store.clone());
	let token = sign(&access_claims());
	let (status, _, created) = call(
		&app,
		Method::POST,
		"/api/cost",
		Some(&token),
		Some(json!({ "CostID": "A", "Amount": 12.50, "Description": "x" })),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(created["CostID"], "A");
	assert_eq!(created["Amount"], json!(12.5));
	assert_eq!(created["Description"], "x");
	assert_eq!(created["CreatedAt"], created["UpdatedAt"]);

	let (status, _, listed) = call(&app, Method::GET, "/api/cost", Some(&token), None).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(listed, json!([created.clone()]));

	let (status, _, updated) = call(
		&app,
		Method::PUT,
		"/api/cost/A",
		Some(&token),
		Some(json!({ "CostID": "ignored", "Amount": 99.0, "Description": "y" })),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(updated["CostID"], "A");
	assert_eq!(updated["Amount"], json!(99.0));
	assert_eq!(updated["Description"], "y");
	assert!(updated.get("CreatedAt").is_none());

	let stored = store
		.fetch(&id("A"))
		.await
		.expect("Fetch should succeed.")
		.expect("Record should exist.");

	assert_eq!(stored.description, "y");
	assert!(stored.updated_at >= stored.created_at);
	assert!(store.fetch(&id("ignored")).await.expect("Fetch should succeed.").is_none());

	for _ in 0..2 {
		let (status, _, deleted) =
			call(&app, Method::DELETE, "/api/cost/A", Some(&token), None).await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(deleted, json!({ "deleted": "A" }));
	}

	assert!(store.is_empty());
}

#[tokio::test]
async fn create_overwrites_and_update_materializes() {
	let store = Arc::new(MemoryStore::default());
	let app = app(store.clone());
	let token = sign(&access_claims());

	for amount in [json!(1), json!("2.25")] {
		let (status, _, _) = call(
			&app,
			Method::POST,
			"/api/cost",
			Some(&token),
			Some(json!({ "CostID": "A", "Amount": amount })),
		)
		.await;

		assert_eq!(status, StatusCode::OK);
	}

	let (_, _, listed) = call(&app, Method::GET, "/api/cost", Some(&token), None).await;

	assert_eq!(listed.as_array().map(Vec::len), Some(1));
	assert_eq!(listed[0]["Amount"], json!(2.25));
	assert_eq!(listed[0]["Description"], "");

	let (status, _, _) = call(
		&app,
		Method::PUT,
		"/api/cost/ghost",
		Some(&token),
		Some(json!({ "Amount": 5 })),
	)
	.await;

	assert_eq!(status, StatusCode::OK);

	let ghost = store
		.fetch(&id("ghost"))
		.await
		.expect("Fetch should succeed.")
		.expect("Update should materialize the record.");

	assert_eq!(ghost.created_at, None);

	let (_, _, listed) = call(&app, Method::GET, "/api/cost", Some(&token), None).await;
	let ghost_view = listed
		.as_array()
		.and_then(|records| records.iter().find(|record| record["CostID"] == "ghost"))
		.expect("Ghost record should be listed.");

	assert_eq!(ghost_view["CreatedAt"], Value::Null);
}

#[tokio::test]
async fn oversized_path_ids_are_unprocessable() {
	let app = app(Arc::new(MemoryStore::default()));
	let token = sign(&access_claims());
	let uri = format!("/api/cost/{}", "a".repeat(2_049));
	let (status, _, body) = call(&app, Method::DELETE, &uri, Some(&token), None).await;

	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(body, json!({ "detail": "Cost identifier exceeds 2048 bytes." }));
}

#[tokio::test]
async fn malformed_bodies_are_rejected_after_authentication() {
	let app = app(Arc::new(MemoryStore::default()));
	let token = sign(&access_claims());
	let (status, _, _) = call(
		&app,
		Method::POST,
		"/api/cost",
		Some(&token),
		Some(json!({ "CostID": "A", "Amount": "twelve" })),
	)
	.await;

	assert!(status.is_client_error());
	assert_ne!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn out_of_range_amounts_explain_the_limit() {
	let store = Arc::new(MemoryStore::default());
	let app = app(store.clone());
	let token = sign(&access_claims());
	let (status, challenge, body) = call(
		&app,
		Method::POST,
		"/api/cost",
		Some(&token),
		Some(json!({ "CostID": "A", "Amount": 1e30 })),
	)
	.await;

	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(challenge, None);
	assert!(
		body["detail"]
			.as_str()
			.is_some_and(|detail| detail.contains("Amount must be a decimal number")),
		"{body}"
	);
	assert!(store.is_empty());
}

#[tokio::test]
async fn store_timeouts_become_service_unavailable() {
	let store: Arc<dyn RecordStore> =
		Arc::new(TimeoutStore::new(Arc::new(StalledStore), Duration::from_millis(50)));
	let app = app(store);
	let token = sign(&access_claims());
	let (status, challenge, body) =
		call(&app, Method::GET, "/api/cost", Some(&token), None).await;

	assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(challenge, None);
	assert_eq!(body, json!({ "detail": "Record store unavailable." }));
}
