//! Scripted transport for driving subscriptions in tests.

use crate::fetch::{FetchResponse, Fetcher};
use async_trait::async_trait;
use folio_core::Error;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the scripted transport answers with.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Json(Value),
    Status(u16),
    Body(&'static str),
    Network(&'static str),
    Cancelled,
}

/// Answers each key with queued replies, in order, after an optional delay.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
    script: Mutex<HashMap<String, VecDeque<(Duration, Reply)>>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn reply(&self, key: &str, reply: Reply) {
        self.reply_after(key, Duration::ZERO, reply);
    }

    pub(crate) fn reply_after(&self, key: &str, delay: Duration, reply: Reply) {
        self.script
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back((delay, reply));
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn calls_for(&self, key: &str) -> usize {
        self.seen.lock().unwrap().iter().filter(|k| *k == key).count()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, key: &str) -> Result<FetchResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(key.to_string());

        let next = self.script.lock().unwrap().get_mut(key).and_then(VecDeque::pop_front);
        let Some((delay, reply)) = next else {
            return Err(Error::Network(format!("no scripted reply for {key}")));
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match reply {
            Reply::Json(value) => Ok(FetchResponse::new(StatusCode::OK, value.to_string())),
            Reply::Status(code) => Ok(FetchResponse::new(StatusCode::from_u16(code).unwrap(), "")),
            Reply::Body(body) => Ok(FetchResponse::new(StatusCode::OK, body)),
            Reply::Network(message) => Err(Error::Network(message.to_string())),
            Reply::Cancelled => Err(Error::Cancelled),
        }
    }
}
