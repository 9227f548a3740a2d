//! Fetch resource manager.
//!
//! A [`ResourceManager`] hands out [`Subscription`]s: reactive views of
//! `{data, loading, error, is_refetching}` for a resource key, with a manual
//! [`Subscription::refetch`] trigger.
//!
//! ### Lifecycle
//! - Mount serves a fresh cache entry synchronously, otherwise starts a
//!   loading request. No key, or `enabled = false`, stays idle.
//! - `refetch`, focus regain and poll ticks revalidate silently
//!   (`is_refetching`), always bypassing the cache.
//! - Results are applied in issuance order: a newer request always wins,
//!   and cancellations never surface as errors.
//! - Successful results are written to the shared [`ResponseCache`].

mod focus;
mod options;
mod state;
mod subscription;

pub use focus::{FocusEvent, Visibility};
pub use options::{DEFAULT_CACHE_TIME, ErrorCallback, FetchOptions, SuccessCallback};
pub use state::{Phase, ResourceState};
pub use subscription::{Resource, Subscription};

use crate::fetch::Fetcher;
use folio_core::ResponseCache;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// A mounted subscription that reacts to focus regain.
pub(crate) trait FocusTarget: Send + Sync {
    /// Returns true if a revalidation was issued.
    fn revalidate_on_focus(self: Arc<Self>) -> bool;
}

struct ManagerInner {
    fetcher: Arc<dyn Fetcher>,
    cache: ResponseCache,
    focus_targets: Mutex<Vec<Weak<dyn FocusTarget>>>,
}

/// Creates subscriptions sharing one transport and one response cache.
///
/// Cloning is cheap; clones share the cache and the focus registry.
#[derive(Clone)]
pub struct ResourceManager {
    inner: Arc<ManagerInner>,
}

impl ResourceManager {
    /// Create a manager with an explicit cache (tests use a fresh one).
    pub fn new(fetcher: Arc<dyn Fetcher>, cache: ResponseCache) -> Self {
        Self { inner: Arc::new(ManagerInner { fetcher, cache, focus_targets: Mutex::new(Vec::new()) }) }
    }

    /// Create a manager backed by the process-wide cache.
    pub fn with_global_cache(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::new(fetcher, ResponseCache::global())
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    /// Mount a subscription for `key`.
    ///
    /// Must be called from within a tokio runtime; requests run as spawned
    /// tasks.
    pub fn subscribe<T: Resource>(&self, key: Option<&str>, options: FetchOptions<T>) -> Subscription<T> {
        let subscription =
            Subscription::mount(Arc::clone(&self.inner.fetcher), self.inner.cache.clone(), key, options);

        let mut targets = self.inner.focus_targets.lock().unwrap_or_else(PoisonError::into_inner);
        targets.retain(|target| target.strong_count() > 0);
        targets.push(Arc::downgrade(&subscription.focus_target()));

        subscription
    }

    /// Report a focus or visibility change from the host runtime.
    ///
    /// Every mounted, enabled subscription with `refetch_on_focus` that has
    /// finished its first load revalidates. Returns how many did.
    pub fn notify_focus(&self, event: FocusEvent) -> usize {
        if !event.is_foreground() {
            return 0;
        }

        let targets: Vec<Arc<dyn FocusTarget>> = {
            let mut targets = self.inner.focus_targets.lock().unwrap_or_else(PoisonError::into_inner);
            targets.retain(|target| target.strong_count() > 0);
            targets.iter().filter_map(Weak::upgrade).collect()
        };

        let revalidated = targets
            .into_iter()
            .filter(|target| Arc::clone(target).revalidate_on_focus())
            .count();
        tracing::debug!(?event, revalidated, "focus regained");
        revalidated
    }
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("cached_keys", &self.inner.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, ScriptedFetcher};
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const KEY: &str = "http://test.com/api";

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Payload {
        result: String,
    }

    fn payload(result: &str) -> Option<Payload> {
        Some(Payload { result: result.to_string() })
    }

    fn ok(result: &str) -> Reply {
        Reply::Json(json!({ "result": result }))
    }

    fn manager(fetcher: &Arc<ScriptedFetcher>) -> ResourceManager {
        ResourceManager::new(fetcher.clone(), ResponseCache::new())
    }

    async fn settle<T: Resource>(
        sub: &Subscription<T>, pred: impl FnMut(&ResourceState<T>) -> bool,
    ) -> ResourceState<T> {
        let mut rx = sub.watch();
        let state = tokio::time::timeout(Duration::from_secs(60), rx.wait_for(pred))
            .await
            .expect("timed out waiting for state")
            .expect("state channel closed");
        (*state).clone()
    }

    async fn settled<T: Resource>(sub: &Subscription<T>) -> ResourceState<T> {
        settle(sub, |s| !s.is_busy()).await
    }

    /// Let spawned requests reach the transport.
    async fn in_flight() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_data_successfully() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, ok("success"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        let state = sub.state();
        assert!(state.loading);
        assert!(state.data.is_none());
        assert!(state.error.is_none());

        let state = settled(&sub).await;
        assert_eq!(state.data, payload("success"));
        assert!(state.error.is_none());
        assert_eq!(state.phase(), Phase::Ready);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_error_message_is_verbatim() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, Reply::Network("Network error"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        let state = settled(&sub).await;
        assert!(state.data.is_none());
        assert_eq!(state.error.as_deref(), Some("Network error"));
        assert_eq!(state.phase(), Phase::Failed);
        assert!(manager.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_http_error_scenario() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, Reply::Status(404));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        let state = settled(&sub).await;
        assert_eq!(state.error.as_deref(), Some("HTTP 404: Not Found"));
        assert!(state.data.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_decode_failure_is_an_error_and_not_cached() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, Reply::Body("<html>not json</html>"));
        fetcher.reply("http://test.com/shape", Reply::Json(json!({"other": 1})));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        let state = settled(&sub).await;
        assert!(state.error.unwrap().starts_with("failed to decode response"));

        let sub = manager.subscribe::<Payload>(Some("http://test.com/shape"), FetchOptions::default());
        let state = settled(&sub).await;
        assert!(state.error.unwrap().starts_with("failed to decode response"));
        assert!(manager.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_or_absent_key_stays_idle() {
        let fetcher = ScriptedFetcher::new();
        let manager = manager(&fetcher);

        let disabled = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default().enabled(false));
        let absent = manager.subscribe::<Payload>(None, FetchOptions::default());

        for sub in [&disabled, &absent] {
            let state = sub.state();
            assert!(!state.loading);
            assert!(state.data.is_none());
            assert!(state.error.is_none());
            assert_eq!(state.phase(), Phase::Idle);
        }

        absent.refetch().await;
        disabled.refetch().await;
        assert_eq!(manager.notify_focus(FocusEvent::Focus), 0);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_load_then_refetch() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply("A", ok("first"));
        fetcher.reply("A", ok("second"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some("A"), FetchOptions::default());
        assert!(sub.state().loading);
        let state = settled(&sub).await;
        assert!(!state.loading);
        assert_eq!(state.data, payload("first"));

        let refetch = sub.refetch();
        let state = sub.state();
        assert!(state.is_refetching);
        assert!(!state.loading);
        assert_eq!(state.data, payload("first"));

        refetch.await;
        let state = sub.state();
        assert!(!state.is_refetching);
        assert_eq!(state.data, payload("second"));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_subscription_uses_fresh_cache() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, ok("cached"));
        let manager = manager(&fetcher);
        let options = || FetchOptions::<Payload>::default().cache_time(Duration::from_secs(60));

        let first = manager.subscribe(Some(KEY), options());
        settled(&first).await;
        drop(first);

        tokio::time::advance(Duration::from_secs(59)).await;
        let second = manager.subscribe(Some(KEY), options());
        let state = second.state();
        assert!(!state.loading);
        assert_eq!(state.data, payload("cached"));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_cache_issues_one_new_request() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, ok("first"));
        fetcher.reply(KEY, ok("second"));
        let manager = manager(&fetcher);
        let options = || FetchOptions::<Payload>::default().cache_time(Duration::from_secs(1));

        let first = manager.subscribe(Some(KEY), options());
        settled(&first).await;
        drop(first);

        tokio::time::advance(Duration::from_secs(1)).await;
        let second = manager.subscribe(Some(KEY), options());
        assert!(second.state().loading);
        let state = settled(&second).await;
        assert_eq!(state.data, payload("second"));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_bypasses_cache_and_refreshes_timestamp() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, ok("first"));
        fetcher.reply(KEY, ok("second"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default().cache_time(Duration::from_secs(60)));
        settled(&sub).await;
        let stored_at = manager.cache().get(KEY).unwrap().stored_at;

        tokio::time::advance(Duration::from_secs(5)).await;
        sub.refetch().await;

        assert_eq!(sub.state().data, payload("second"));
        assert_eq!(fetcher.calls(), 2);
        let entry = manager.cache().get(KEY).unwrap();
        assert!(entry.stored_at > stored_at);
        assert_eq!(entry.payload, json!({"result": "second"}));
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_request_never_overwrites_newer_result() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply_after(KEY, Duration::from_millis(100), ok("stale"));
        fetcher.reply_after(KEY, Duration::from_millis(10), ok("fresh"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        in_flight().await;
        sub.refetch().await;
        assert_eq!(sub.state().data, payload("fresh"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        let state = sub.state();
        assert_eq!(state.data, payload("fresh"));
        assert_eq!(state.phase(), Phase::Ready);
        assert_eq!(manager.cache().get(KEY).unwrap().payload, json!({"result": "fresh"}));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_failure_never_sets_error() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply_after(KEY, Duration::from_millis(100), Reply::Network("connection reset"));
        fetcher.reply_after(KEY, Duration::from_millis(10), ok("fresh"));
        let errors = Arc::new(AtomicUsize::new(0));
        let manager = manager(&fetcher);

        let counter = errors.clone();
        let options = FetchOptions::default().on_error(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let sub = manager.subscribe::<Payload>(Some(KEY), options);
        in_flight().await;
        sub.refetch().await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        let state = sub.state();
        assert!(state.error.is_none());
        assert_eq!(state.data, payload("fresh"));
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upstream_cancellation_is_not_an_error() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, Reply::Cancelled);
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        let state = settled(&sub).await;
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(state.data.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refetch_preserves_last_good_data() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, ok("good"));
        fetcher.reply(KEY, Reply::Status(500));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        settled(&sub).await;
        sub.refetch().await;

        let state = sub.state();
        assert_eq!(state.data, payload("good"));
        assert_eq!(state.error.as_deref(), Some("HTTP 500: Internal Server Error"));
        assert_eq!(state.phase(), Phase::Failed);
        assert_eq!(manager.cache().get(KEY).unwrap().payload, json!({"result": "good"}));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_failure_clears_error() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, Reply::Network("offline"));
        fetcher.reply(KEY, ok("recovered"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        assert_eq!(settled(&sub).await.error.as_deref(), Some("offline"));

        sub.refetch().await;
        let state = sub.state();
        assert!(state.error.is_none());
        assert_eq!(state.data, payload("recovered"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_change_discards_old_request() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply_after("http://test.com/api1", Duration::from_millis(100), ok("first"));
        fetcher.reply_after("http://test.com/api2", Duration::from_millis(10), ok("second"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some("http://test.com/api1"), FetchOptions::default());
        in_flight().await;
        sub.update(Some("http://test.com/api2"), FetchOptions::default());
        assert!(sub.state().loading);

        let state = settle(&sub, |s| s.data.is_some()).await;
        assert_eq!(state.data, payload("second"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(sub.state().data, payload("second"));
        assert_eq!(sub.key().as_deref(), Some("http://test.com/api2"));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_change_clears_previous_data() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply("http://test.com/api1", ok("first"));
        fetcher.reply_after("http://test.com/api2", Duration::from_millis(50), ok("second"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some("http://test.com/api1"), FetchOptions::default());
        settled(&sub).await;

        sub.update(Some("http://test.com/api2"), FetchOptions::default());
        let state = sub.state();
        assert!(state.loading);
        assert!(state.data.is_none());

        assert_eq!(settled(&sub).await.data, payload("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_back_to_cached_key_skips_network() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply("http://test.com/api1", ok("first"));
        fetcher.reply("http://test.com/api2", ok("second"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some("http://test.com/api1"), FetchOptions::default());
        settled(&sub).await;
        sub.update(Some("http://test.com/api2"), FetchOptions::default());
        settled(&sub).await;

        sub.update(Some("http://test.com/api1"), FetchOptions::default());
        let state = sub.state();
        assert!(!state.loading);
        assert_eq!(state.data, payload("first"));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabling_returns_to_idle_and_discards_in_flight() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply_after(KEY, Duration::from_millis(100), ok("late"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        in_flight().await;
        sub.update(Some(KEY), FetchOptions::default().enabled(false));
        assert_eq!(sub.state(), ResourceState::idle());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(sub.state(), ResourceState::idle());
        assert!(manager.cache().is_empty());

        sub.update(None, FetchOptions::default());
        assert_eq!(sub.state(), ResourceState::idle());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_callbacks_fire_once_per_attempt() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, ok("success"));
        fetcher.reply(KEY, Reply::Network("Network error"));
        let successes = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(Vec::new()));
        let manager = manager(&fetcher);

        let seen = successes.clone();
        let failed = errors.clone();
        let options = FetchOptions::default()
            .on_success(move |data: &Payload| seen.lock().unwrap().push(data.clone()))
            .on_error(move |err| failed.lock().unwrap().push(err.clone()));
        let sub = manager.subscribe::<Payload>(Some(KEY), options);
        settled(&sub).await;
        sub.refetch().await;

        assert_eq!(*successes.lock().unwrap(), vec![Payload { result: "success".into() }]);
        assert_eq!(*errors.lock().unwrap(), vec![folio_core::Error::Network("Network error".into())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_does_not_fire_callbacks() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, ok("cached"));
        let successes = Arc::new(AtomicUsize::new(0));
        let manager = manager(&fetcher);

        let first = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        settled(&first).await;

        let counter = successes.clone();
        let options = FetchOptions::default().on_success(move |_: &Payload| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let second = manager.subscribe::<Payload>(Some(KEY), options);
        assert_eq!(second.state().data, payload("cached"));
        assert_eq!(successes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_revalidates_after_first_load() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, ok("first"));
        fetcher.reply(KEY, ok("second"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default().refetch_on_focus(true));
        settled(&sub).await;

        assert_eq!(manager.notify_focus(FocusEvent::Focus), 1);
        assert!(sub.state().is_refetching);
        let state = settled(&sub).await;
        assert_eq!(state.data, payload("second"));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_visibility_events() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, ok("first"));
        fetcher.reply(KEY, ok("second"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        settled(&sub).await;

        assert_eq!(manager.notify_focus(FocusEvent::Visibility(Visibility::Hidden)), 0);
        assert_eq!(fetcher.calls(), 1);

        assert_eq!(manager.notify_focus(FocusEvent::Visibility(Visibility::Visible)), 1);
        assert_eq!(settled(&sub).await.data, payload("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_ignored_when_disabled_in_options() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, ok("data"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default().refetch_on_focus(false));
        settled(&sub).await;

        assert_eq!(manager.notify_focus(FocusEvent::Focus), 0);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_ignored_before_first_load_completes() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply_after(KEY, Duration::from_millis(100), ok("first"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        assert_eq!(manager.notify_focus(FocusEvent::Focus), 0);

        let state = settled(&sub).await;
        assert_eq!(state.data, payload("first"));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_skips_dropped_subscriptions() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, ok("first"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        settled(&sub).await;
        drop(sub);

        assert_eq!(manager.notify_focus(FocusEvent::Focus), 0);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_revalidates_while_data_present() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, ok("first"));
        fetcher.reply(KEY, ok("second"));
        let manager = manager(&fetcher);

        let sub =
            manager.subscribe::<Payload>(Some(KEY), FetchOptions::default().poll_interval(Duration::from_secs(1)));
        settled(&sub).await;
        let state = settle(&sub, |s| s.data == payload("second")).await;
        assert!(!state.is_refetching);
        assert_eq!(fetcher.calls(), 2);

        drop(sub);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_waits_for_data() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, Reply::Status(503));
        let manager = manager(&fetcher);

        let sub =
            manager.subscribe::<Payload>(Some(KEY), FetchOptions::default().poll_interval(Duration::from_secs(1)));
        assert!(settled(&sub).await.error.is_some());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_interval_change_rearms_timer() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, ok("first"));
        fetcher.reply(KEY, ok("second"));
        let manager = manager(&fetcher);

        let sub =
            manager.subscribe::<Payload>(Some(KEY), FetchOptions::default().poll_interval(Duration::from_secs(60)));
        settled(&sub).await;

        sub.update(Some(KEY), FetchOptions::default().poll_interval(Duration::from_secs(2)));
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(fetcher.calls(), 1);

        let state = settle(&sub, |s| s.data == payload("second")).await;
        assert_eq!(state.data, payload("second"));
        assert_eq!(fetcher.calls(), 2);

        sub.update(Some(KEY), FetchOptions::default());
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_discards_in_flight_result() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply_after(KEY, Duration::from_millis(100), ok("late"));
        let successes = Arc::new(AtomicUsize::new(0));
        let manager = manager(&fetcher);

        let counter = successes.clone();
        let options = FetchOptions::default().on_success(move |_: &Payload| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let sub = manager.subscribe::<Payload>(Some(KEY), options);
        let rx = sub.watch();
        drop(sub);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(successes.load(Ordering::SeqCst), 0);
        assert!(manager.cache().is_empty());
        assert!(rx.borrow().loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscriptions_share_the_cache() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, ok("first"));
        fetcher.reply(KEY, ok("second"));
        let manager = manager(&fetcher);

        let a = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        settled(&a).await;
        let b = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        assert_eq!(b.state().data, payload("first"));

        b.refetch().await;
        let c = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        assert_eq!(c.state().data, payload("second"));
        assert_eq!(a.state().data, payload("first"));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_payload_of_other_shape_is_a_miss() {
        #[derive(Debug, Clone, Deserialize)]
        struct Other {
            #[allow(dead_code)]
            count: u32,
        }

        let fetcher = ScriptedFetcher::new();
        fetcher.reply(KEY, ok("text"));
        fetcher.reply(KEY, Reply::Json(json!({"count": 3})));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        settled(&sub).await;

        let other = manager.subscribe::<Other>(Some(KEY), FetchOptions::default());
        assert!(other.state().loading);
        assert!(settled(&other).await.data.is_some());
        assert_eq!(fetcher.calls_for(KEY), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_during_initial_load_supersedes_it() {
        let fetcher = ScriptedFetcher::new();
        fetcher.reply_after(KEY, Duration::from_millis(100), ok("initial"));
        fetcher.reply_after(KEY, Duration::from_millis(100), ok("refetched"));
        let manager = manager(&fetcher);

        let sub = manager.subscribe::<Payload>(Some(KEY), FetchOptions::default());
        in_flight().await;
        let refetch = sub.refetch();
        let state = sub.state();
        assert!(!state.loading);
        assert!(state.is_refetching);

        refetch.await;
        assert_eq!(sub.state().data, payload("refetched"));
    }
}
