//! Subscription lifecycle: request issuance, stale-result discard, polling
//! and teardown.
//!
//! Every issuance mints a new token and aborts the request it supersedes.
//! Completions compare their token against the current one under the same
//! lock that guards the state, so a superseded request can never touch the
//! state or fire a callback even if the abort arrives late.

use super::{FetchOptions, FocusTarget, ResourceState};
use crate::fetch::{Fetcher, fetch_json};
use folio_core::{Error, ResponseCache};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};

/// Payload types a subscription can decode into.
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Resource for T where T: DeserializeOwned + Clone + Send + Sync + 'static {}

/// Why a request is being issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestKind {
    Initial,
    Refetch,
    Focus,
    Poll,
}

impl RequestKind {
    /// Everything except the initial load revalidates silently.
    fn is_silent(self) -> bool {
        !matches!(self, RequestKind::Initial)
    }

    fn as_str(self) -> &'static str {
        match self {
            RequestKind::Initial => "initial",
            RequestKind::Refetch => "refetch",
            RequestKind::Focus => "focus",
            RequestKind::Poll => "poll",
        }
    }
}

struct PollTimer {
    key: String,
    period: Duration,
    handle: AbortHandle,
}

struct Inner<T> {
    key: Option<String>,
    options: FetchOptions<T>,
    token: u64,
    in_flight: Option<AbortHandle>,
    first_load_done: bool,
    poll: Option<PollTimer>,
    torn_down: bool,
}

impl<T> Inner<T> {
    fn active_key(&self) -> Option<&str> {
        if self.torn_down || !self.options.enabled {
            return None;
        }
        self.key.as_deref()
    }

    /// Supersede the outstanding request; its completion will be discarded.
    fn invalidate(&mut self) -> u64 {
        self.token += 1;
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        self.token
    }
}

type Notify = Box<dyn FnOnce() + Send>;

pub(crate) struct Shared<T> {
    inner: Mutex<Inner<T>>,
    state: watch::Sender<ResourceState<T>>,
    fetcher: Arc<dyn Fetcher>,
    cache: ResponseCache,
}

impl<T: Resource> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cached(&self, key: &str, max_age: Duration) -> Option<T> {
        let entry = self.cache.get_fresh(key, max_age)?;
        match serde_json::from_value(entry.payload) {
            Ok(data) => Some(data),
            Err(err) => {
                tracing::debug!(key, error = %err, "cached payload does not fit this subscription");
                None
            }
        }
    }

    /// Start a request of the given kind, returning its task handle.
    ///
    /// Returns `None` when there is nothing to fetch (no key, disabled, torn
    /// down) or when an initial load was served from the cache.
    pub(crate) fn issue(self: &Arc<Self>, kind: RequestKind) -> Option<JoinHandle<()>> {
        let mut inner = self.lock();
        let key = inner.active_key()?.to_string();

        if kind == RequestKind::Initial
            && let Some(data) = self.cached(&key, inner.options.cache_time)
        {
            inner.invalidate();
            inner.first_load_done = true;
            self.state.send_replace(ResourceState { data: Some(data), ..ResourceState::idle() });
            self.sync_poll(&mut inner);
            return None;
        }

        let token = inner.invalidate();
        self.state.send_modify(|state| {
            state.loading = !kind.is_silent();
            state.is_refetching = kind.is_silent();
            state.error = None;
        });
        tracing::debug!(key = %key, token, kind = kind.as_str(), "issuing request");

        let shared = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let outcome = fetch_json(shared.fetcher.as_ref(), &key)
                .await
                .and_then(|payload| {
                    let data = serde_json::from_value::<T>(payload.clone())?;
                    Ok((payload, data))
                });
            shared.complete(token, &key, outcome);
        });
        inner.in_flight = Some(handle.abort_handle());
        Some(handle)
    }

    fn complete(self: &Arc<Self>, token: u64, key: &str, outcome: Result<(Value, T), Error>) {
        let notify: Option<Notify> = {
            let mut inner = self.lock();
            if inner.torn_down || inner.token != token {
                tracing::debug!(key, token, current = inner.token, "discarding stale result");
                return;
            }
            inner.in_flight = None;
            inner.first_load_done = true;

            let notify: Option<Notify> = match outcome {
                Ok((payload, data)) => {
                    self.cache.insert(key, payload);
                    self.state.send_modify(|state| {
                        state.data = Some(data.clone());
                        state.error = None;
                        state.loading = false;
                        state.is_refetching = false;
                    });
                    inner
                        .options
                        .on_success
                        .clone()
                        .map(|f| Box::new(move || f(&data)) as Notify)
                }
                Err(err) if err.is_cancelled() => {
                    tracing::debug!(key, token, "request cancelled upstream");
                    self.state.send_modify(|state| {
                        state.loading = false;
                        state.is_refetching = false;
                    });
                    None
                }
                Err(err) => {
                    tracing::warn!(key, token, code = err.code(), error = %err, "fetch failed");
                    self.state.send_modify(|state| {
                        state.error = Some(err.to_string());
                        state.loading = false;
                        state.is_refetching = false;
                    });
                    inner
                        .options
                        .on_error
                        .clone()
                        .map(|f| Box::new(move || f(&err)) as Notify)
                }
            };

            self.sync_poll(&mut inner);
            notify
        };

        if let Some(notify) = notify {
            notify();
        }
    }

    /// Arm, re-arm or clear the poll timer to match key, interval and data.
    fn sync_poll(self: &Arc<Self>, inner: &mut Inner<T>) {
        let has_data = self.state.borrow().data.is_some();
        // tokio intervals reject a zero period; treat it as "no polling".
        let period = inner.options.poll_interval.filter(|p| !p.is_zero());
        let wanted = match (inner.active_key(), period) {
            (Some(key), Some(period)) if has_data => Some((key.to_string(), period)),
            _ => None,
        };
        let current = inner.poll.as_ref().map(|timer| (timer.key.clone(), timer.period));
        if wanted == current {
            return;
        }

        if let Some(timer) = inner.poll.take() {
            timer.handle.abort();
            tracing::debug!(key = %timer.key, "poll timer cleared");
        }

        if let Some((key, period)) = wanted {
            let weak = Arc::downgrade(self);
            let handle = tokio::spawn(async move {
                let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    let Some(shared) = weak.upgrade() else { break };
                    shared.issue(RequestKind::Poll);
                }
            });
            tracing::debug!(key = %key, period_ms = period.as_millis() as u64, "poll timer armed");
            inner.poll = Some(PollTimer { key, period, handle: handle.abort_handle() });
        }
    }

    fn reconfigure(self: &Arc<Self>, key: Option<String>, options: FetchOptions<T>) {
        let restart = {
            let mut inner = self.lock();
            let before = inner.active_key().map(str::to_owned);
            inner.key = key;
            inner.options = options;
            let after = inner.active_key().map(str::to_owned);

            let changed = before != after;
            if changed {
                tracing::debug!(from = ?before, to = ?after, "resource key changed");
                inner.invalidate();
                inner.first_load_done = false;
                self.state.send_replace(ResourceState::idle());
            }
            self.sync_poll(&mut inner);
            changed && after.is_some()
        };

        if restart {
            self.issue(RequestKind::Initial);
        }
    }

    fn teardown(&self) {
        let mut inner = self.lock();
        inner.torn_down = true;
        inner.invalidate();
        if let Some(timer) = inner.poll.take() {
            timer.handle.abort();
        }
    }
}

impl<T: Resource> FocusTarget for Shared<T> {
    fn revalidate_on_focus(self: Arc<Self>) -> bool {
        {
            let inner = self.lock();
            if inner.active_key().is_none() || !inner.options.refetch_on_focus || !inner.first_load_done {
                return false;
            }
        }
        self.issue(RequestKind::Focus).is_some()
    }
}

/// A mounted consumer binding to one resource key.
///
/// Dropping the subscription tears it down: the in-flight request is
/// cancelled, the poll timer cleared, and late completions are ignored.
pub struct Subscription<T: Resource> {
    shared: Arc<Shared<T>>,
}

impl<T: Resource> Subscription<T> {
    pub(crate) fn mount(
        fetcher: Arc<dyn Fetcher>, cache: ResponseCache, key: Option<&str>, options: FetchOptions<T>,
    ) -> Self {
        let (state, _) = watch::channel(ResourceState::idle());
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                key: key.map(str::to_owned),
                options,
                token: 0,
                in_flight: None,
                first_load_done: false,
                poll: None,
                torn_down: false,
            }),
            state,
            fetcher,
            cache,
        });
        shared.issue(RequestKind::Initial);
        Self { shared }
    }

    pub(crate) fn focus_target(&self) -> Arc<dyn FocusTarget> {
        self.shared.clone()
    }

    /// Current snapshot of the state.
    pub fn state(&self) -> ResourceState<T> {
        self.shared.state.borrow().clone()
    }

    /// Reactive view; the receiver observes every state change.
    pub fn watch(&self) -> watch::Receiver<ResourceState<T>> {
        self.shared.state.subscribe()
    }

    /// The key currently bound, if any.
    pub fn key(&self) -> Option<String> {
        self.shared.lock().key.clone()
    }

    /// Silently revalidate, bypassing the cache.
    ///
    /// The request is issued immediately; the returned future resolves when
    /// it completes or is superseded. A no-op without an active key.
    pub fn refetch(&self) -> impl Future<Output = ()> + Send + use<T> {
        let handle = self.shared.issue(RequestKind::Refetch);
        async move {
            if let Some(handle) = handle {
                // A superseded request is aborted, which is not a failure here.
                let _ = handle.await;
            }
        }
    }

    /// Rebind to a new key and/or options, as a consumer re-render would.
    ///
    /// A change of the effective key (including enabling or disabling)
    /// cancels the outstanding request and starts a fresh load. Other
    /// option changes only re-arm the poll timer.
    pub fn update(&self, key: Option<&str>, options: FetchOptions<T>) {
        self.shared.reconfigure(key.map(str::to_owned), options);
    }
}

impl<T: Resource> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.shared.teardown();
    }
}

impl<T: Resource + std::fmt::Debug> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key())
            .field("state", &self.state())
            .finish()
    }
}
