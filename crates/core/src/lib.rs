//! Core types and shared functionality for folio.
//!
//! This crate provides:
//! - The process-wide response cache shared by all resource subscriptions
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheEntry, ResponseCache};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
