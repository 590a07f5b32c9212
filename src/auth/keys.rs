//! Signing key cache in front of a [`KeySetFetcher`].

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use jsonwebtoken::{DecodingKey, jwk::JwkSet};
use tokio::time::Instant;
// self
use crate::{
	_prelude::*,
	auth::AuthError,
	config::AuthConfig,
	error::ConfigError,
	http::{KeySetFetcher, ReqwestKeySetFetcher},
	obs::{OpKind, OpSpan, OpTimer},
};

/// Decoding keys indexed by key identifier.
#[derive(Clone, Default)]
pub struct SigningKeySet {
	keys: HashMap<String, DecodingKey>,
}
impl SigningKeySet {
	/// Builds a set from a JWKS document.
	///
	/// Keys without a `kid`, or whose parameters cannot produce a decoding key, are skipped.
	pub fn from_jwks(set: &JwkSet) -> Self {
		let mut keys = HashMap::with_capacity(set.keys.len());

		for jwk in &set.keys {
			let Some(kid) = jwk.common.key_id.clone() else {
				tracing::warn!("Skipping signing key without a kid.");

				continue;
			};

			match DecodingKey::from_jwk(jwk) {
				Ok(key) => {
					keys.insert(kid, key);
				},
				Err(e) => tracing::warn!(kid = %kid, error = %e, "Skipping unusable signing key."),
			}
		}

		Self { keys }
	}

	/// Looks up the key published under `kid`.
	pub fn get(&self, kid: &str) -> Option<&DecodingKey> {
		self.keys.get(kid)
	}

	/// Returns `true` when a key is published under `kid`.
	pub fn contains(&self, kid: &str) -> bool {
		self.keys.contains_key(kid)
	}

	/// Iterates over the known key identifiers.
	pub fn kids(&self) -> impl Iterator<Item = &str> {
		self.keys.keys().map(String::as_str)
	}

	/// Number of usable keys.
	pub fn len(&self) -> usize {
		self.keys.len()
	}

	/// Returns `true` when no usable key was published.
	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}
}
impl Debug for SigningKeySet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut kids: Vec<_> = self.kids().collect();

		kids.sort_unstable();

		f.debug_struct("SigningKeySet").field("kids", &kids).finish()
	}
}

/// When a cached key set is considered stale.
///
/// The default never refreshes: the first successful fetch is kept for the lifetime of the
/// provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyRefreshPolicy {
	/// Refetch once the cached set is older than this.
	pub max_age: Option<StdDuration>,
	/// Refetch once when a token names a key the cached set does not contain.
	pub refetch_on_unknown_kid: bool,
	/// Minimum spacing between refetches triggered by unknown key identifiers.
	pub min_refetch_interval: StdDuration,
}
impl KeyRefreshPolicy {
	/// Default spacing between unknown-kid refetches.
	pub const DEFAULT_MIN_REFETCH_INTERVAL: StdDuration = StdDuration::from_secs(30);
}
impl Default for KeyRefreshPolicy {
	fn default() -> Self {
		Self {
			max_age: None,
			refetch_on_unknown_kid: false,
			min_refetch_interval: Self::DEFAULT_MIN_REFETCH_INTERVAL,
		}
	}
}

/// Thread-safe counters for key set fetches.
#[derive(Debug, Default)]
pub struct KeyProviderMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	stale_served: AtomicU64,
	refetch_throttled: AtomicU64,
}
impl KeyProviderMetrics {
	/// Returns the number of upstream fetches started.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of fetches that produced a key set.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed fetches.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns how often an expired set was served because its refresh failed.
	pub fn stale_served(&self) -> u64 {
		self.stale_served.load(Ordering::Relaxed)
	}

	/// Returns how often an unknown-kid refetch was skipped because one ran too recently.
	pub fn refetch_throttled(&self) -> u64 {
		self.refetch_throttled.load(Ordering::Relaxed)
	}

	fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	fn record_stale_served(&self) {
		self.stale_served.fetch_add(1, Ordering::Relaxed);
	}

	fn record_refetch_throttled(&self) {
		self.refetch_throttled.fetch_add(1, Ordering::Relaxed);
	}
}

struct CachedKeys {
	set: Arc<SigningKeySet>,
	fetched_at: Instant,
}

/// Fetches the identity provider's signing keys once and serves them from memory afterwards.
///
/// Concurrent callers that find the cache empty are collapsed into a single upstream fetch.
/// Failed fetches are never cached; the next caller retries.
pub struct KeyProvider {
	fetcher: Arc<dyn KeySetFetcher>,
	policy: KeyRefreshPolicy,
	cached: RwLock<Option<CachedKeys>>,
	last_miss_refetch: RwLock<Option<Instant>>,
	fetch_guard: AsyncMutex<()>,
	metrics: Arc<KeyProviderMetrics>,
}
impl KeyProvider {
	/// Creates a provider with the default (never refresh) policy.
	pub fn new(fetcher: Arc<dyn KeySetFetcher>) -> Self {
		Self {
			fetcher,
			policy: KeyRefreshPolicy::default(),
			cached: RwLock::new(None),
			last_miss_refetch: RwLock::new(None),
			fetch_guard: AsyncMutex::new(()),
			metrics: Default::default(),
		}
	}

	/// Builds the production provider: a reqwest fetcher pointed at the configured key set URL.
	pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().build()?;
		let fetcher = ReqwestKeySetFetcher::with_client(client, config.jwks_url.clone())
			.with_timeout(config.fetch_timeout);

		Ok(Self::new(Arc::new(fetcher)).with_policy(config.key_policy))
	}

	/// Overrides the refresh policy.
	pub fn with_policy(mut self, policy: KeyRefreshPolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Active refresh policy.
	pub fn policy(&self) -> KeyRefreshPolicy {
		self.policy
	}

	/// Shared fetch counters.
	pub fn metrics(&self) -> Arc<KeyProviderMetrics> {
		self.metrics.clone()
	}

	/// Returns the cached set, fetching it first when absent or expired.
	///
	/// An expired set whose refresh fails is still served, with a warning.
	pub async fn signing_keys(&self) -> Result<Arc<SigningKeySet>, AuthError> {
		if let Some(set) = self.fresh() {
			return Ok(set);
		}

		let _guard = self.fetch_guard.lock().await;

		// Another caller may have completed the fetch while this one waited.
		if let Some(set) = self.fresh() {
			return Ok(set);
		}

		let stale = self.current();

		match self.fetch().await {
			Ok(set) => Ok(set),
			Err(e) => match stale {
				Some(set) => {
					self.metrics.record_stale_served();
					tracing::warn!(error = ?e, "Key set refresh failed; serving the expired set.");

					Ok(set)
				},
				None => Err(e),
			},
		}
	}

	/// Replaces `stale` after a key lookup missed.
	///
	/// Skips the upstream call when another caller already replaced `stale`, or when the previous
	/// miss-triggered refetch happened less than
	/// [`min_refetch_interval`](KeyRefreshPolicy::min_refetch_interval) ago.
	pub async fn refresh_after_miss(
		&self,
		stale: &Arc<SigningKeySet>,
	) -> Result<Arc<SigningKeySet>, AuthError> {
		let _guard = self.fetch_guard.lock().await;

		if let Some(current) = self.current().filter(|current| !Arc::ptr_eq(current, stale)) {
			return Ok(current);
		}

		let throttled = self
			.last_miss_refetch
			.read()
			.is_some_and(|at| at.elapsed() < self.policy.min_refetch_interval);

		if throttled {
			self.metrics.record_refetch_throttled();
			tracing::debug!("Unknown-kid refetch ran recently; keeping the cached set.");

			return Ok(stale.clone());
		}

		*self.last_miss_refetch.write() = Some(Instant::now());

		self.fetch().await
	}

	fn current(&self) -> Option<Arc<SigningKeySet>> {
		self.cached.read().as_ref().map(|cached| cached.set.clone())
	}

	fn fresh(&self) -> Option<Arc<SigningKeySet>> {
		let cached = self.cached.read();
		let entry = cached.as_ref()?;

		match self.policy.max_age {
			Some(max_age) if entry.fetched_at.elapsed() >= max_age => None,
			_ => Some(entry.set.clone()),
		}
	}

	async fn fetch(&self) -> Result<Arc<SigningKeySet>, AuthError> {
		const KIND: OpKind = OpKind::FetchSigningKeys;

		let span = OpSpan::new(KIND, "fetch");

		let timer = OpTimer::start(KIND);

		self.metrics.record_attempt();

		let result = span.instrument(self.fetcher.fetch()).await;
		let elapsed = timer.finish(&result);

		match result {
			Ok(jwks) => {
				let set = Arc::new(SigningKeySet::from_jwks(&jwks));

				self.metrics.record_success();
				tracing::info!(keys = set.len(), ?elapsed, "Fetched signing keys.");

				*self.cached.write() =
					Some(CachedKeys { set: set.clone(), fetched_at: Instant::now() });

				Ok(set)
			},
			Err(e) => {
				self.metrics.record_failure();
				tracing::warn!(error = ?e, ?elapsed, "Fetching signing keys failed.");

				Err(e)
			},
		}
	}
}
impl Debug for KeyProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("KeyProvider")
			.field("policy", &self.policy)
			.field("cached", &self.current())
			.finish()
	}
}
