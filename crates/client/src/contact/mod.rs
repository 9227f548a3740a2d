//! Contact form: input validation, outbound email, and submit status.

mod emailjs;
mod status;

pub use emailjs::EmailJsSender;
pub use status::{StatusIndicator, SubmitStatus};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::{AppConfig, Error};
use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::sync::watch;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// A message as entered by a visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    /// Check every field is present and the reply address looks like an email.
    pub fn validate(&self) -> Result<(), Error> {
        let fields = [
            ("name", &self.name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::InvalidInput(format!("{} is required", field)));
            }
        }

        if !EMAIL_PATTERN.is_match(self.email.trim()) {
            return Err(Error::InvalidInput(format!("'{}' is not a valid email address", self.email.trim())));
        }

        Ok(())
    }

    /// Template parameters for delivering this message to `to_email`.
    pub fn to_outgoing(&self, to_email: &str, sent_at: DateTime<Utc>) -> OutgoingEmail {
        OutgoingEmail {
            from_name: self.name.trim().to_string(),
            from_email: self.email.trim().to_string(),
            title: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
            time: sent_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            to_email: to_email.to_string(),
        }
    }
}

/// Template parameters sent with each email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from_name: String,
    pub from_email: String,
    pub title: String,
    pub message: String,
    pub time: String,
    pub to_email: String,
}

/// Delivers an email somewhere.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), Error>;
}

/// Validates and delivers contact messages, tracking the last outcome.
pub struct ContactForm {
    sender: Arc<dyn EmailSender>,
    to_email: String,
    status: StatusIndicator,
}

impl ContactForm {
    pub fn new(sender: Arc<dyn EmailSender>, to_email: impl Into<String>, reset_after: Duration) -> Self {
        Self { sender, to_email: to_email.into(), status: StatusIndicator::new(reset_after) }
    }

    pub fn from_config(sender: Arc<dyn EmailSender>, config: &AppConfig) -> Self {
        Self::new(sender, config.contact.to_email.clone(), config.status_reset())
    }

    pub fn status(&self) -> SubmitStatus {
        self.status.get()
    }

    pub fn watch_status(&self) -> watch::Receiver<SubmitStatus> {
        self.status.watch()
    }

    /// Validate and send `message`.
    ///
    /// The outcome is reflected in [`ContactForm::status`] and also returned
    /// so callers can report the underlying error.
    pub async fn submit(&self, message: &ContactMessage) -> Result<(), Error> {
        let outcome = match message.validate() {
            Ok(()) => {
                let email = message.to_outgoing(&self.to_email, Utc::now());
                self.sender.send(&email).await
            }
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(()) => {
                tracing::info!(to = %self.to_email, "contact message sent");
                self.status.set(SubmitStatus::Success);
            }
            Err(e) => {
                tracing::warn!(code = e.code(), error = %e, "contact message failed");
                self.status.set(SubmitStatus::Error);
            }
        }

        outcome
    }
}

impl std::fmt::Debug for ContactForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactForm")
            .field("to_email", &self.to_email)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
