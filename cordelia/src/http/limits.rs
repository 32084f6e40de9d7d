//! Tracks the rate limits imposed by Discord on API calls.
//!
//! Discord enforces two regimes at once: a global cap on requests per second for each
//! authorization credential, and a per-route cap whose identity (the "bucket") is only
//! revealed by the headers of the first response to come back. Until then every
//! `(method, route key, credential)` triple gets its own provisional limit; once two
//! route keys are discovered to share a bucket, one limit is deprecated and its waiters
//! are redirected to the surviving one.

use crate::errors::*;
use crate::http::routing::Method;
use fnv::FnvHashMap;
use parking_lot::Mutex;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use std::cmp::min;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

fn parse_header<T: FromStr>(
    headers: &HeaderMap, name: &'static str,
) -> Result<Option<T>> where <T as FromStr>::Err: Into<LibError> {
    match headers.get(name) {
        Some(header) => {
            let header_str = header.to_str().bad_response("Invalid UTF-8 in header.")?;
            let header = header_str.parse::<T>().bad_response("Could not parse header.")?;
            Ok(Some(header))
        }
        None => Ok(None),
    }
}

/// Renders an authorization credential for logging without exposing it.
pub(crate) fn logging_auth(auth: Option<&HeaderValue>) -> String {
    match auth.and_then(|x| x.to_str().ok()) {
        None => "None".to_string(),
        Some(auth) if auth.len() < 12 => "[redacted]".to_string(),
        Some(auth) => format!("{}[redacted]", &auth[..12]),
    }
}

/// Signals returned by [`RateLimit::acquire`] when a request must not proceed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum AcquireError {
    /// This rate limit has been deprecated, and the request should be retried on the
    /// limit stored for the given bucket.
    Migrating(String),
    /// A previous request on this path returned 404, and all further requests to it are
    /// denied without touching the network.
    Denied,
}

/// Signals returned by [`RateLimit::update`] when the response could not be folded in.
#[derive(Debug)]
pub(crate) enum UpdateError {
    /// The response named a different bucket than the one this limit is bound to. The
    /// caller should rebind the route to the limit stored for that bucket and replay
    /// the update there.
    IncorrectBucket(Option<String>),
    /// The response headers could not be parsed.
    Failed(Error),
}
impl From<Error> for UpdateError {
    fn from(e: Error) -> Self {
        UpdateError::Failed(e)
    }
}

#[derive(Debug)]
struct LimitState {
    /// Maximum number of requests before acquisitions have to wait for the limit to reset.
    limit: u32,
    /// Remaining number of requests in the current window. Never exceeds `limit`.
    remaining: u32,
    /// Time the server reported the window will reset at. Informational only.
    reset: Option<SystemTime>,
    /// Seconds until `remaining` is replenished to `limit`, as last reported.
    reset_after: f64,
    /// The server-assigned name of this bucket, once discovered.
    bucket: Option<String>,
    /// Whether the next update will be the first driven by response headers.
    first_update: bool,
    /// Once set, every acquisition fails; set when the path returns 404.
    deny: bool,
    /// Once set, acquisitions fail with [`AcquireError::Migrating`] toward this bucket.
    migrating: Option<String>,
    /// The ready latch: set iff a token may currently be consumed without waiting.
    ready: bool,
    /// The countdown that replenishes `remaining`, if one is in flight.
    reset_task: Option<JoinHandle<()>>,
}
impl LimitState {
    fn resetting(&self) -> bool {
        self.reset_task.as_ref().map_or(false, |task| !task.is_finished())
    }

    fn cancel_reset_task(&mut self) {
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
    }
}

/// A single rate limit gate.
///
/// Used in two flavors: one per `(method, route key, credential)` triple (later shared
/// between routes that resolve to the same bucket), and one per credential enforcing
/// the global requests-per-second cap.
#[derive(Debug)]
pub(crate) struct RateLimit {
    state: Mutex<LimitState>,
    ready: Notify,
    time_offset: f64,
    global: bool,
}
impl RateLimit {
    /// Creates a rate limit for a route. Starts out permitting one request, so the
    /// first response can seed the real limits before a second request is sent.
    pub fn new_route(time_offset: f64) -> Arc<RateLimit> {
        Arc::new(RateLimit {
            state: Mutex::new(LimitState {
                limit: 1,
                remaining: 1,
                reset: None,
                reset_after: 1.0,
                bucket: None,
                first_update: true,
                deny: false,
                migrating: None,
                ready: true,
                reset_task: None,
            }),
            ready: Notify::new(),
            time_offset,
            global: false,
        })
    }

    /// Creates the global rate limit for a credential. The limit is configured rather
    /// than discovered, and the one second window starts on the first acquisition.
    pub fn new_global(max_per_second: u32, time_offset: f64, label: String) -> Arc<RateLimit> {
        Arc::new(RateLimit {
            state: Mutex::new(LimitState {
                limit: max_per_second,
                remaining: max_per_second,
                reset: None,
                reset_after: 1.0 + time_offset,
                bucket: Some(label),
                first_update: true,
                deny: false,
                migrating: None,
                ready: true,
                reset_task: None,
            }),
            ready: Notify::new(),
            time_offset,
            global: true,
        })
    }

    /// Returns the bucket this limit is bound to, if it has been discovered.
    pub fn bucket(&self) -> Option<String> {
        self.state.lock().bucket.clone()
    }

    /// Returns `(limit, remaining, reset_after, bucket)` for event dispatch.
    pub fn snapshot(&self) -> (u32, u32, f64, Option<String>) {
        let state = self.state.lock();
        (state.limit, state.remaining, state.reset_after, state.bucket.clone())
    }

    /// Suspends until a token is available, then consumes it.
    ///
    /// Multiple tasks may race from wake to acquisition; no FIFO order is guaranteed,
    /// only that the number of successful acquisitions per reset window never exceeds
    /// `limit`. The wait loop therefore re-checks its condition on every wake.
    pub async fn acquire(self: &Arc<Self>) -> StdResult<(), AcquireError> {
        loop {
            let notified = self.ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let mut state = self.state.lock();
                // The requestor that consumes the last token is the one that clears the
                // latch and makes sure a countdown is running.
                if state.remaining == 0 && state.ready {
                    debug!(
                        "Bucket {:?}: hit the remaining request limit of {}, locking until reset.",
                        state.bucket, state.limit,
                    );
                    state.ready = false;
                    if !state.resetting() {
                        self.arm_reset_task(&mut state);
                    }
                }
                if state.ready {
                    if let Some(bucket) = &state.migrating {
                        return Err(AcquireError::Migrating(bucket.clone()));
                    }
                    if state.deny {
                        return Err(AcquireError::Denied);
                    }
                    if self.global && !state.resetting() {
                        self.arm_reset_task(&mut state);
                    }
                    state.remaining = state.remaining.saturating_sub(1);
                    return Ok(());
                }
            }
            trace!("Waiting for rate limit...");
            notified.await;
        }
    }

    /// Folds the rate limit headers of a response into this limit.
    ///
    /// Responses belonging to the global rate limit are ignored here; see
    /// [`RateLimit::update_global`] for the other direction.
    pub fn update(
        self: &Arc<Self>, status: StatusCode, headers: &HeaderMap,
    ) -> StdResult<(), UpdateError> {
        let is_global = parse_header::<bool>(headers, "x-ratelimit-global")?.unwrap_or(false);
        if is_global {
            return Ok(());
        }

        let x_bucket = parse_header::<String>(headers, "x-ratelimit-bucket")?;
        let x_limit = parse_header::<u32>(headers, "x-ratelimit-limit")?;
        let x_remaining = parse_header::<u32>(headers, "x-ratelimit-remaining")?;
        let x_reset = parse_header::<f64>(headers, "x-ratelimit-reset")?;
        let x_reset_after = parse_header::<f64>(headers, "x-ratelimit-reset-after")?;
        let saw_headers = x_bucket.is_some() || x_limit.is_some() || x_remaining.is_some()
            || x_reset.is_some() || x_reset_after.is_some();

        let mut state = self.state.lock();

        // The bucket name is folded first, so an update meant for a different bucket
        // errors out before it can touch any counters.
        if state.bucket == x_bucket {
            // Already bound to this bucket.
        } else if state.bucket.is_none() {
            state.bucket = x_bucket.clone();
        } else {
            return Err(UpdateError::IncorrectBucket(x_bucket));
        }

        if status == StatusCode::NOT_FOUND {
            state.deny = true;
        }

        state.limit = x_limit.unwrap_or(1);

        match x_remaining {
            None => state.remaining = 1,
            Some(remaining) if state.first_update => state.remaining = remaining,
            // If responses come back out of order we could observe a stale, larger
            // count. remaining never goes back up except through the reset task.
            Some(remaining) => state.remaining = min(remaining, state.remaining),
        }

        if let Some(reset) = x_reset {
            state.reset = Some(UNIX_EPOCH + Duration::from_secs_f64(reset.max(0.0)));
        }

        if let Some(reset_after) = x_reset_after {
            let reset_after = reset_after + self.time_offset;
            if state.reset_after < reset_after {
                debug!(
                    "Bucket {:?}: reset after time increased to {}s, adapting reset time.",
                    state.bucket, reset_after,
                );
                state.reset_after = reset_after;
                self.arm_reset_task(&mut state);
            }
        }

        if saw_headers && !state.resetting() {
            self.arm_reset_task(&mut state);
        }

        // If we have requests remaining but the latch is clear, open it back up.
        if state.remaining > 0 && !state.ready {
            debug!(
                "Bucket {:?}: updated with remaining {}, setting ready event.",
                state.bucket, state.remaining,
            );
            state.ready = true;
            drop(state);
            self.ready.notify_waiters();
            state = self.state.lock();
        }

        if state.first_update {
            state.first_update = false;
        }

        debug!(
            "Bucket {:?}: updated with limit {}, remaining {}, reset {:?}, and reset_after {}s.",
            state.bucket, state.limit, state.remaining, state.reset, state.reset_after,
        );
        Ok(())
    }

    /// Folds a response into the global rate limit. Responses that are not marked
    /// `X-RateLimit-Global` are ignored.
    pub fn update_global(
        self: &Arc<Self>, status: StatusCode, headers: &HeaderMap, body: Option<&serde_json::Value>,
    ) -> Result<()> {
        let is_global = parse_header::<bool>(headers, "x-ratelimit-global")?.unwrap_or(false);
        if !is_global {
            return Ok(());
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Global rate limit 429 encountered, setting remaining to 0.");
            let scope = parse_header::<String>(headers, "x-ratelimit-scope")?;
            let retry_after = match body.and_then(|x| x.get("retry_after")).and_then(|x| x.as_f64()) {
                Some(retry_after) => Some(retry_after),
                None => parse_header::<f64>(headers, "retry-after")?,
            };

            let mut state = self.state.lock();
            state.remaining = 0;
            if scope.as_deref() == Some("global") {
                if let Some(retry_after) = retry_after {
                    debug!("Got global retry_after, resetting global after {}s.", retry_after);
                    state.reset_after = retry_after + self.time_offset;
                    state.cancel_reset_task();
                    self.arm_reset_task(&mut state);
                }
            }
            state.ready = false;
            if !state.resetting() {
                self.arm_reset_task(&mut state);
            }
        }
        Ok(())
    }

    /// Deprecates this limit in favor of the one stored for `bucket`, waking every
    /// waiter so it can observe the migration signal.
    pub fn migrate_to(&self, bucket: &str) {
        let mut state = self.state.lock();
        state.migrating = Some(bucket.to_string());
        state.remaining = state.limit;
        state.ready = true;
        state.cancel_reset_task();
        drop(state);
        self.ready.notify_waiters();
        debug!("Bucket {}: deprecated, acquiring requests will migrate.", bucket);
    }

    /// Arms the countdown that replenishes `remaining`, cancelling any countdown
    /// already in flight.
    fn arm_reset_task(self: &Arc<Self>, state: &mut LimitState) {
        state.cancel_reset_task();
        let this = Arc::clone(self);
        let delay = state.reset_after.max(0.0);
        debug!("Bucket {:?}: resetting after {}s.", state.bucket, delay);
        state.reset_task = Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs_f64(delay)).await;
            let mut state = this.state.lock();
            state.remaining = state.limit;
            state.ready = true;
            let bucket = state.bucket.clone();
            drop(state);
            this.ready.notify_waiters();
            debug!("Bucket {:?}: reset, allowing requests to continue.", bucket);
        }));
    }

    /// Cancels the reset task. Used when shutting the pipeline down.
    pub fn shutdown(&self) {
        self.state.lock().cancel_reset_task();
    }

    #[cfg(test)]
    pub fn test_state(&self) -> (u32, u32, f64, Option<String>, bool, bool, bool) {
        let state = self.state.lock();
        (
            state.limit, state.remaining, state.reset_after, state.bucket.clone(),
            state.ready, state.deny, state.resetting(),
        )
    }
}

/// The set of all rate limits tracked for a context.
///
/// Limits are created lazily and never destroyed; a route limit may however be
/// superseded by another through `set_route`, after which the old one retains no
/// requests.
#[derive(Debug)]
pub(crate) struct RateLimits {
    max_per_second: u32,
    time_offset: f64,
    globals: Mutex<FnvHashMap<Option<HeaderValue>, Arc<RateLimit>>>,
    routes: Mutex<FnvHashMap<(Method, String, Option<HeaderValue>), Arc<RateLimit>>>,
    buckets: Mutex<FnvHashMap<String, Arc<RateLimit>>>,
}
impl RateLimits {
    pub fn new(max_per_second: u32, time_offset: f64) -> Self {
        RateLimits {
            max_per_second,
            time_offset,
            globals: Default::default(),
            routes: Default::default(),
            buckets: Default::default(),
        }
    }

    /// Returns the global rate limit for an authorization credential, creating it if
    /// this is the first request made with it.
    pub fn global_for(&self, auth: Option<&HeaderValue>) -> Arc<RateLimit> {
        let mut globals = self.globals.lock();
        if let Some(limit) = globals.get(&auth.cloned()) {
            return limit.clone();
        }
        debug!(
            "Creating global rate limit for auth {} with max per second {}.",
            logging_auth(auth), self.max_per_second,
        );
        let label = match auth {
            Some(_) => format!("Global {}", logging_auth(auth)),
            None => "Global Unauthorized".to_string(),
        };
        let limit = RateLimit::new_global(self.max_per_second, self.time_offset, label);
        globals.insert(auth.cloned(), limit.clone());
        limit
    }

    fn route_key(
        &self, method: Method, bucket: &str, auth: Option<&HeaderValue>,
    ) -> (Method, String, Option<HeaderValue>) {
        (method, bucket.to_string(), auth.cloned())
    }

    /// Returns the rate limit stored for a route, creating a fresh one if none exists.
    pub fn route_for(
        &self, method: Method, bucket: &str, auth: Option<&HeaderValue>,
    ) -> Arc<RateLimit> {
        let mut routes = self.routes.lock();
        if let Some(limit) = routes.get(&self.route_key(method, bucket, auth)) {
            return limit.clone();
        }
        debug!(
            "Making route rate limit for {} {} {}",
            method, bucket, logging_auth(auth),
        );
        let limit = RateLimit::new_route(self.time_offset);
        routes.insert(self.route_key(method, bucket, auth), limit.clone());
        limit
    }

    /// Returns the rate limit stored for a route, if one exists.
    pub fn get_route(
        &self, method: Method, bucket: &str, auth: Option<&HeaderValue>,
    ) -> Option<Arc<RateLimit>> {
        self.routes.lock().get(&self.route_key(method, bucket, auth)).cloned()
    }

    /// Rebinds a route to a different rate limit.
    pub fn set_route(
        &self, method: Method, bucket: &str, auth: Option<&HeaderValue>, limit: Arc<RateLimit>,
    ) {
        self.routes.lock().insert(self.route_key(method, bucket, auth), limit);
    }

    /// Creates a fresh rate limit for a route, replacing whatever was stored.
    pub fn make_route(
        &self, method: Method, bucket: &str, auth: Option<&HeaderValue>,
    ) -> Arc<RateLimit> {
        let limit = RateLimit::new_route(self.time_offset);
        self.set_route(method, bucket, auth, limit.clone());
        limit
    }

    /// Returns the canonical rate limit for a server-assigned bucket name.
    pub fn bucket_limit(&self, bucket: &str) -> Option<Arc<RateLimit>> {
        self.buckets.lock().get(bucket).cloned()
    }

    /// Registers a rate limit as the canonical owner of a bucket name.
    pub fn register_bucket(&self, bucket: String, limit: Arc<RateLimit>) {
        self.buckets.lock().insert(bucket, limit);
    }

    /// Cancels every armed reset task. Used when shutting the pipeline down.
    pub fn shutdown(&self) {
        for limit in self.globals.lock().values() {
            limit.shutdown();
        }
        for limit in self.routes.lock().values() {
            limit.shutdown();
        }
        for limit in self.buckets.lock().values() {
            limit.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn headers(
        limit: u32, remaining: u32, reset_after: f64, bucket: &str,
    ) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert("x-ratelimit-limit", limit.to_string().parse().unwrap());
        map.insert("x-ratelimit-remaining", remaining.to_string().parse().unwrap());
        map.insert("x-ratelimit-reset-after", reset_after.to_string().parse().unwrap());
        map.insert("x-ratelimit-bucket", bucket.parse().unwrap());
        map
    }

    #[test]
    fn headerless_response_leaves_defaults() {
        let limit = RateLimit::new_route(0.0);
        limit.update(StatusCode::OK, &HeaderMap::new()).unwrap();
        let (max, remaining, reset_after, bucket, ready, deny, resetting) = limit.test_state();
        assert_eq!(max, 1);
        assert_eq!(remaining, 1);
        assert_eq!(reset_after, 1.0);
        assert_eq!(bucket, None);
        assert!(ready);
        assert!(!deny);
        assert!(!resetting);
    }

    #[tokio::test]
    async fn first_update_adopts_then_takes_minimum() {
        let limit = RateLimit::new_route(0.0);
        limit.update(StatusCode::OK, &headers(5, 4, 1.0, "abc")).unwrap();
        assert_eq!(limit.test_state().1, 4);
        limit.update(StatusCode::OK, &headers(5, 3, 1.0, "abc")).unwrap();
        assert_eq!(limit.test_state().1, 3);
        // A stale response arriving out of order must not raise the count.
        limit.update(StatusCode::OK, &headers(5, 4, 1.0, "abc")).unwrap();
        assert_eq!(limit.test_state().1, 3);
    }

    #[tokio::test]
    async fn update_is_idempotent() {
        let limit = RateLimit::new_route(0.0);
        limit.update(StatusCode::OK, &headers(5, 3, 1.5, "abc")).unwrap();
        let before = limit.test_state();
        limit.update(StatusCode::OK, &headers(5, 3, 1.5, "abc")).unwrap();
        assert_eq!(limit.test_state(), before);
    }

    #[tokio::test]
    async fn reset_after_only_grows() {
        let limit = RateLimit::new_route(0.0);
        limit.update(StatusCode::OK, &headers(5, 4, 2.0, "abc")).unwrap();
        assert_eq!(limit.test_state().2, 2.0);
        limit.update(StatusCode::OK, &headers(5, 3, 0.5, "abc")).unwrap();
        assert_eq!(limit.test_state().2, 2.0);
        limit.update(StatusCode::OK, &headers(5, 2, 3.5, "abc")).unwrap();
        assert_eq!(limit.test_state().2, 3.5);
    }

    #[tokio::test]
    async fn time_offset_is_added_to_reset_after() {
        let limit = RateLimit::new_route(0.25);
        limit.update(StatusCode::OK, &headers(5, 4, 2.0, "abc")).unwrap();
        assert_eq!(limit.test_state().2, 2.25);
    }

    #[tokio::test]
    async fn update_for_wrong_bucket_is_rejected() {
        let limit = RateLimit::new_route(0.0);
        limit.update(StatusCode::OK, &headers(5, 4, 1.0, "abc")).unwrap();
        match limit.update(StatusCode::OK, &headers(5, 4, 1.0, "xyz")) {
            Err(UpdateError::IncorrectBucket(Some(bucket))) => assert_eq!(bucket, "xyz"),
            other => panic!("expected IncorrectBucket, got {:?}", other.map(|_| ())),
        }
        // The rejected update must not have touched the binding.
        assert_eq!(limit.test_state().3.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn global_headers_are_ignored_by_route_limits() {
        let limit = RateLimit::new_route(0.0);
        let mut map = headers(5, 0, 1.0, "abc");
        map.insert("x-ratelimit-global", "true".parse().unwrap());
        limit.update(StatusCode::OK, &map).unwrap();
        assert_eq!(limit.test_state().1, 1);
        assert_eq!(limit.test_state().3, None);
    }

    #[tokio::test]
    async fn denied_after_404() {
        let limit = RateLimit::new_route(0.0);
        limit.update(StatusCode::NOT_FOUND, &headers(1, 1, 1.0, "abc")).unwrap();
        assert_eq!(limit.acquire().await, Err(AcquireError::Denied));
    }

    #[tokio::test(start_paused = true)]
    async fn migration_wakes_waiters() {
        let limit = RateLimit::new_route(0.0);
        limit.update(StatusCode::OK, &headers(1, 0, 30.0, "abc")).unwrap();

        let waiter = {
            let limit = limit.clone();
            tokio::spawn(async move { limit.acquire().await })
        };
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert!(!waiter.is_finished());

        limit.migrate_to("xyz");
        let result = waiter.await.unwrap();
        assert_eq!(result, Err(AcquireError::Migrating("xyz".to_string())));

        // Future acquisitions observe the same signal.
        assert_eq!(limit.acquire().await, Err(AcquireError::Migrating("xyz".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn burst_is_capped_at_limit_per_window() {
        let limit = RateLimit::new_route(0.0);
        limit.update(StatusCode::OK, &headers(2, 2, 1.0, "abc")).unwrap();

        static DONE: AtomicU32 = AtomicU32::new(0);
        DONE.store(0, Ordering::SeqCst);
        let mut tasks = Vec::new();
        for _ in 0..5 {
            let limit = limit.clone();
            tasks.push(tokio::spawn(async move {
                limit.acquire().await.unwrap();
                DONE.fetch_add(1, Ordering::SeqCst);
            }));
        }
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
        assert_eq!(DONE.load(Ordering::SeqCst), 2);

        tokio::time::advance(Duration::from_millis(1100)).await;
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
        assert_eq!(DONE.load(Ordering::SeqCst), 4);

        tokio::time::advance(Duration::from_millis(1100)).await;
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(DONE.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn global_429_clears_ready_and_adopts_retry_after() {
        let limit = RateLimit::new_global(50, 0.0, "Global test".to_string());
        let mut map = HeaderMap::new();
        map.insert("x-ratelimit-global", "true".parse().unwrap());
        map.insert("x-ratelimit-scope", "global".parse().unwrap());
        let body = serde_json::json!({ "retry_after": 2.5, "global": true });
        limit.update_global(StatusCode::TOO_MANY_REQUESTS, &map, Some(&body)).unwrap();

        let (_, remaining, reset_after, _, ready, _, resetting) = limit.test_state();
        assert_eq!(remaining, 0);
        assert_eq!(reset_after, 2.5);
        assert!(!ready);
        assert!(resetting);

        // The next acquisition waits out the full retry_after window.
        let start = tokio::time::Instant::now();
        limit.acquire().await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs_f64(2.5));
    }

    #[tokio::test]
    async fn non_global_responses_are_ignored_by_global_limits() {
        let limit = RateLimit::new_global(50, 0.0, "Global test".to_string());
        limit.update_global(
            StatusCode::TOO_MANY_REQUESTS, &headers(5, 0, 1.0, "abc"), None,
        ).unwrap();
        let (_, remaining, _, _, ready, _, _) = limit.test_state();
        assert_eq!(remaining, 50);
        assert!(ready);
    }

    #[tokio::test]
    async fn merge_keeps_remaining_in_range() {
        // A canonical limit that absorbed more consumption than a just-migrated slot
        // may receive replayed updates with a lower remaining count. The pessimistic
        // minimum stands, and the count can never underflow.
        let limit = RateLimit::new_route(0.0);
        limit.update(StatusCode::OK, &headers(3, 1, 1.0, "abc")).unwrap();
        limit.update(StatusCode::OK, &headers(3, 0, 1.0, "abc")).unwrap();
        assert_eq!(limit.test_state().1, 0);
        limit.update(StatusCode::OK, &headers(3, 0, 1.0, "abc")).unwrap();
        assert_eq!(limit.test_state().1, 0);
    }
}
