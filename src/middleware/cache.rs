//! Caching Middleware
//!
//! Serves stored response bodies for repeated requests and records fresh
//! ones on a miss.
//!
//! ```ignore
//! let cache = ResponseCache::with_rules(store, [KeyRule::Method.into()]);
//! let app = Router::new()
//!     .route("/", get(handler))
//!     .route_layer(middleware::from_fn_with_state(cache, cache_response));
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use bytes::Bytes;
use tracing::{debug, warn};

use crate::middleware::{CacheStats, ResponseRecorder};
use crate::policy::{CacheKey, CachePolicy, Rule};
use crate::store::ExpiringStore;

/// Response header reporting how the cache handled the request
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

// == Response Cache ==
/// Shared middleware state: policy, store and counters.
#[derive(Clone)]
pub struct ResponseCache {
    policy: Arc<CachePolicy>,
    store: Arc<dyn ExpiringStore>,
    stats: Arc<CacheStats>,
}

impl ResponseCache {
    // == Constructors ==
    /// Caches by request path only.
    pub fn new(store: Arc<dyn ExpiringStore>) -> Self {
        Self::with_policy(store, CachePolicy::default())
    }

    /// Caches by request path plus the given rules, in order.
    pub fn with_rules<I>(store: Arc<dyn ExpiringStore>, rules: I) -> Self
    where
        I: IntoIterator<Item = Rule>,
    {
        let mut policy = CachePolicy::default();
        policy.register_all(rules);
        Self::with_policy(store, policy)
    }

    /// Uses `policy` exactly as given.
    pub fn with_policy(store: Arc<dyn ExpiringStore>, policy: CachePolicy) -> Self {
        Self {
            policy: Arc::new(policy),
            store,
            stats: Arc::new(CacheStats::new()),
        }
    }

    /// Rules used to fingerprint and bypass requests.
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Backing store.
    pub fn store(&self) -> &Arc<dyn ExpiringStore> {
        &self.store
    }

    /// Hit, miss, bypass and store-error counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    // == Lookup ==
    /// Returns the stored body for `key`. Every failure reads as a miss.
    async fn lookup(&self, key: &CacheKey) -> Option<Bytes> {
        match self.store.get(key.as_str()).await {
            Ok(body) => Some(body),
            Err(err) if err.is_not_found() => None,
            Err(err) => {
                self.stats.record_store_error();
                warn!("Cache read failed on {} store for {}: {}", self.store.name(), key, err);
                None
            }
        }
    }
}

// == Middleware ==
/// axum middleware: use with `middleware::from_fn_with_state`.
///
/// On a hit the stored body is returned and `next` is never called. On a
/// miss or bypass `next` runs once, its body streams to the client through a
/// [`ResponseRecorder`], and the recorded bytes are stored under the request
/// fingerprint once the body ends. Store failures never reach the client.
pub async fn cache_response(
    State(cache): State<ResponseCache>,
    request: Request,
    next: Next,
) -> Response {
    let key = cache.policy.fingerprint(&request);
    let bypass = cache.policy.should_bypass(&request);

    let outcome = if bypass {
        cache.stats.record_bypass();
        debug!("Cache bypass for {} {}", request.method(), request.uri());
        "BYPASS"
    } else if let Some(body) = cache.lookup(&key).await {
        cache.stats.record_hit();
        debug!("Cache hit for {}", key);
        let mut response = Response::new(Body::from(body));
        response
            .headers_mut()
            .insert(X_CACHE, HeaderValue::from_static("HIT"));
        return response;
    } else {
        cache.stats.record_miss();
        debug!("Cache miss for {}", key);
        "MISS"
    };

    let (mut parts, body) = next.run(request).await.into_parts();
    parts
        .headers
        .insert(X_CACHE, HeaderValue::from_static(outcome));

    let store = cache.store.clone();
    let stats = cache.stats.clone();
    let recorder = ResponseRecorder::new(body).on_complete(move |recorded| async move {
        if let Err(err) = store.set(key.as_str(), recorded).await {
            stats.record_store_error();
            warn!("Cache write failed on {} store for {}: {}", store.name(), key, err);
        }
    });

    Response::from_parts(parts, Body::new(recorder))
}
