// src/core/mail_relay.rs
//! Outbound mail through an HTTP mail API

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

use crate::config::MailConfig;

/// A fully addressed message ready for delivery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: Vec<String>,
    pub subject: String,
    #[serde(rename = "text")]
    pub body: String,
}

#[rocket::async_trait]
pub trait MailRelay: Send + Sync {
    /// Deliver one message. Any error means the message was not accepted.
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

pub struct HttpMailRelay {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HttpMailRelay {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[rocket::async_trait]
impl MailRelay for HttpMailRelay {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        info!("Relaying mail to {:?} via {}", email.to, self.api_url);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await
            .context("Failed to call mail API")?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            error!("Mail API error response: {}", error_text);
            anyhow::bail!("Mail API returned error status {}: {}", status, error_text)
        }
    }
}
