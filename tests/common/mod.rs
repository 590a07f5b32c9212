//! Fixtures shared by the integration tests: a fixed RSA key pair, Cognito-shaped access tokens,
//! and a router wired to a static key set.

#![allow(dead_code)]

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use axum::Router;
use jsonwebtoken::{Algorithm, EncodingKey, Header, jwk::JwkSet};
use serde_json::{Value, json};
use time::OffsetDateTime;
// self
use cost_api::{
	api::{self, AppState},
	auth::{KeyProvider, KeyRefreshPolicy, TokenVerifier},
	config::AuthConfig,
	http::{StaticKeySetFetcher, parse_key_set},
	record::{CostId, Record, RecordPatch},
	service::CostService,
	store::{ProvisionOutcome, RecordStore, StoreFuture},
};

pub const ISSUER: &str = "https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_Fixture";
pub const CLIENT_ID: &str = "cost-api-client";
pub const KID: &str = "test-key-1";

const SIGNING_KEY: &[u8] = include_bytes!("../fixtures/signing_key.pem");
const JWKS: &[u8] = include_bytes!("../fixtures/jwks.json");

pub fn jwks() -> JwkSet {
	parse_key_set(JWKS).expect("Fixture key set should parse.")
}

/// Fixture key set with the key published under another identifier.
pub fn jwks_with_kid(kid: &str) -> JwkSet {
	let mut set = jwks();

	set.keys[0].common.key_id = Some(kid.into());

	set
}

pub fn jwks_body(set: &JwkSet) -> String {
	serde_json::to_string(set).expect("Key set should serialize.")
}

pub fn access_claims_for(issuer: &str) -> Value {
	let now = OffsetDateTime::now_utc().unix_timestamp();

	json!({
		"iss": issuer,
		"sub": "2f1c9a64-7d1e-4f7a-a2b5-0c1d2e3f4a5b",
		"client_id": CLIENT_ID,
		"token_use": "access",
		"scope": "aws.cognito.signin.user.admin",
		"auth_time": now,
		"iat": now,
		"exp": now + 3_600,
		"jti": "3b0c7c1e-93a4-4c52-9f33-5b8a1f0e7d21",
		"username": "fixture-user",
	})
}

pub fn access_claims() -> Value {
	access_claims_for(ISSUER)
}

pub fn sign_with_kid(kid: &str, claims: &Value) -> String {
	let mut header = Header::new(Algorithm::RS256);

	header.kid = Some(kid.into());

	let key = EncodingKey::from_rsa_pem(SIGNING_KEY).expect("Fixture signing key should load.");

	jsonwebtoken::encode(&header, claims, &key).expect("Fixture token should sign.")
}

pub fn sign(claims: &Value) -> String {
	sign_with_kid(KID, claims)
}

pub fn bearer(token: &str) -> String {
	format!("Bearer {token}")
}

pub fn auth_config() -> AuthConfig {
	AuthConfig::builder(ISSUER, CLIENT_ID).build().expect("Fixture auth config should build.")
}

pub fn static_verifier() -> Arc<TokenVerifier> {
	let provider = KeyProvider::new(Arc::new(StaticKeySetFetcher(jwks())))
		.with_policy(KeyRefreshPolicy::default());

	Arc::new(TokenVerifier::new(&auth_config(), Arc::new(provider)))
}

pub fn app(store: Arc<dyn RecordStore>) -> Router {
	api::router(AppState::new(CostService::new(store), static_verifier()))
}

pub fn id(value: &str) -> CostId {
	CostId::new(value).expect("Identifier fixture should be valid.")
}

/// Delegates to an inner store while counting every call.
pub struct CountingStore {
	inner: Arc<dyn RecordStore>,
	calls: AtomicUsize,
}
impl CountingStore {
	pub fn new(inner: Arc<dyn RecordStore>) -> Self {
		Self { inner, calls: AtomicUsize::new(0) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	fn touch(&self) {
		self.calls.fetch_add(1, Ordering::SeqCst);
	}
}
impl RecordStore for CountingStore {
	fn provision(&self) -> StoreFuture<'_, ProvisionOutcome> {
		self.touch();
		self.inner.provision()
	}

	fn list(&self) -> StoreFuture<'_, Vec<Record>> {
		self.touch();
		self.inner.list()
	}

	fn fetch<'a>(&'a self, id: &'a CostId) -> StoreFuture<'a, Option<Record>> {
		self.touch();
		self.inner.fetch(id)
	}

	fn put(&self, record: Record) -> StoreFuture<'_, ()> {
		self.touch();
		self.inner.put(record)
	}

	fn patch<'a>(&'a self, id: &'a CostId, patch: RecordPatch) -> StoreFuture<'a, ()> {
		self.touch();
		self.inner.patch(id, patch)
	}

	fn delete<'a>(&'a self, id: &'a CostId) -> StoreFuture<'a, ()> {
		self.touch();
		self.inner.delete(id)
	}
}

/// Never answers.
pub struct StalledStore;
impl RecordStore for StalledStore {
	fn provision(&self) -> StoreFuture<'_, ProvisionOutcome> {
		Box::pin(std::future::pending())
	}

	fn list(&self) -> StoreFuture<'_, Vec<Record>> {
		Box::pin(std::future::pending())
	}

	fn fetch<'a>(&'a self, _id: &'a CostId) -> StoreFuture<'a, Option<Record>> {
		Box::pin(std::future::pending())
	}

	fn put(&self, _record: Record) -> StoreFuture<'_, ()> {
		Box::pin(std::future::pending())
	}

	fn patch<'a>(&'a self, _id: &'a CostId, _patch: RecordPatch) -> StoreFuture<'a, ()> {
		Box::pin(std::future::pending())
	}

	fn delete<'a>(&'a self, _id: &'a CostId) -> StoreFuture<'a, ()> {
		Box::pin(std::future::pending())
	}
}
