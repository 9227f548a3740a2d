//! Client code for folio.
//!
//! This crate provides the data-fetching layer behind the site: the HTTP
//! transport, the fetch resource manager with its caching, cancellation,
//! polling and focus revalidation, and the two consumers built on top of it
//! (the weather widget and the contact form).

pub mod contact;
pub mod fetch;
pub mod resource;
pub mod weather;

#[cfg(test)]
pub(crate) mod testing;

pub use contact::{ContactForm, ContactMessage, EmailJsSender, EmailSender, OutgoingEmail, SubmitStatus};
pub use fetch::{FetchConfig, FetchResponse, Fetcher, HttpFetcher};
pub use resource::{FetchOptions, FocusEvent, Phase, ResourceManager, ResourceState, Subscription, Visibility};
pub use weather::{MockWeatherFetcher, WeatherReport, WeatherView, WeatherWidget};
