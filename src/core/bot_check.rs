// src/core/bot_check.rs
//! Server-side verification of the challenge-response token posted with the contact form

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{trace, warn};

use crate::config::RecaptchaConfig;
use crate::types::SiteVerifyResponse;

const VERIFY_TIMEOUT_SECS: u64 = 10;

#[rocket::async_trait]
pub trait BotCheck: Send + Sync {
    /// `Ok(false)` means the token was checked and rejected.
    async fn verify(&self, token: &str) -> Result<bool>;
}

pub struct RecaptchaVerifier {
    client: reqwest::Client,
    verify_url: String,
    private_key: String,
}

impl RecaptchaVerifier {
    pub fn new(config: &RecaptchaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(VERIFY_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            verify_url: config.verify_url.clone(),
            private_key: config.private_key.clone(),
        })
    }
}

#[rocket::async_trait]
impl BotCheck for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<bool> {
        trace!("Calling bot-check service: {}", self.verify_url);

        let response = self
            .client
            .post(&self.verify_url)
            .form(&[("secret", self.private_key.as_str()), ("response", token)])
            .send()
            .await
            .context("Failed to call bot-check service")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Bot-check service returned error status {}", status);
        }

        let verdict: SiteVerifyResponse = response
            .json()
            .await
            .context("Failed to parse bot-check response")?;

        if !verdict.success {
            warn!("Bot-check rejected token: {:?}", verdict.error_codes);
        }

        Ok(verdict.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn verifier(server: &MockServer) -> RecaptchaVerifier {
        RecaptchaVerifier::new(&RecaptchaConfig {
            public_key: "public".to_string(),
            private_key: "private".to_string(),
            verify_url: server.url("/siteverify"),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_accepted_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/siteverify")
                    .body_contains("secret=private")
                    .body_contains("response=good-token");
                then.status(200).json_body(serde_json::json!({"success": true}));
            })
            .await;

        assert!(verifier(&server).verify("good-token").await.unwrap());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_token() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/siteverify");
                then.status(200).json_body(serde_json::json!({
                    "success": false,
                    "error-codes": ["invalid-input-response"]
                }));
            })
            .await;

        assert!(!verifier(&server).verify("bad-token").await.unwrap());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/siteverify");
                then.status(503);
            })
            .await;

        assert!(verifier(&server).verify("token").await.is_err());
    }
}
