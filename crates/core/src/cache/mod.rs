//! In-memory response cache shared by every resource subscription.
//!
//! Entries are keyed by resource key and are never evicted, only overwritten
//! when a later fetch for the same key succeeds. Freshness is judged per
//! reader: each consumer supplies its own cache window.

pub mod entry;
pub mod store;

pub use entry::CacheEntry;
pub use store::ResponseCache;
