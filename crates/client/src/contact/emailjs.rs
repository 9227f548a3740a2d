//! Transactional email API client used by the contact form.

use super::{EmailSender, OutgoingEmail};
use async_trait::async_trait;
use folio_core::{AppConfig, Error};
use reqwest::Client;
use serde::Serialize;

/// Request body expected by the email API.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a OutgoingEmail,
}

/// Sends contact messages through the configured email template.
#[derive(Debug, Clone)]
pub struct EmailJsSender {
    http: Client,
    endpoint: String,
    service_id: String,
    template_id: String,
    public_key: String,
}

impl EmailJsSender {
    /// Create a sender from config; fails if credentials are missing.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let credentials = config.require_email_credentials()?;

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::EmailDelivery(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.contact.endpoint.clone(),
            service_id: credentials.service_id.to_string(),
            template_id: credentials.template_id.to_string(),
            public_key: credentials.public_key.to_string(),
        })
    }

    fn request<'a>(&'a self, email: &'a OutgoingEmail) -> SendRequest<'a> {
        SendRequest {
            service_id: &self.service_id,
            template_id: &self.template_id,
            user_id: &self.public_key,
            template_params: email,
        }
    }
}

#[async_trait]
impl EmailSender for EmailJsSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), Error> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&self.request(email))
            .send()
            .await
            .map_err(|e| Error::EmailDelivery(e.to_string()))?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "email API responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::EmailDelivery(format!("HTTP {}: {}", status.as_u16(), body.trim())));
        }

        Ok(())
    }
}
