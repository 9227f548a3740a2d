//! The consumer-facing view of a subscription.

/// Lifecycle phase, derived from the state flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Refetching,
    Failed,
}

/// Snapshot of `{data, loading, error, isRefetching}` for one subscription.
///
/// `loading` and `is_refetching` are never both set. `error` is cleared by
/// every accepted success; a failed revalidation keeps the last good `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub is_refetching: bool,
    pub error: Option<String>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T> ResourceState<T> {
    /// `{data: None, loading: false, error: None}`.
    pub fn idle() -> Self {
        Self { data: None, loading: false, is_refetching: false, error: None }
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.is_refetching {
            Phase::Refetching
        } else if self.error.is_some() {
            Phase::Failed
        } else if self.data.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    /// True while any request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.loading || self.is_refetching
    }
}
