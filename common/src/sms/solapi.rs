// Solapi SMS gateway client

use crate::config::SmsConfig;
use crate::errors::SmsError;
use crate::sms::signature::{authorization_header, format_signing_date, generate_salt};
use crate::sms::SmsGateway;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, instrument};

const SEND_PATH: &str = "/messages/v4/send";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: OutgoingMessage<'a>,
    agent: Agent,
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    to: &'a str,
    from: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Agent {
    sdk_version: String,
    os_platform: String,
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            sdk_version: format!("rust/{}", env!("CARGO_PKG_VERSION")),
            os_platform: std::env::consts::OS.to_string(),
        }
    }
}

/// Sends single SMS messages through the Solapi v4 API
pub struct SolapiGateway {
    client: Client,
    endpoint: String,
    api_key: String,
    api_secret: String,
    sender_number: String,
}

impl SolapiGateway {
    pub fn new(config: &SmsConfig) -> Result<Self, SmsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SmsError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        if config.api_key.trim().is_empty() || config.api_secret.trim().is_empty() {
            return Err(SmsError::Configuration(
                "Solapi API key or secret is missing".to_string(),
            ));
        }

        Ok(Self {
            client,
            endpoint: format!("{}{}", config.api_base_url.trim_end_matches('/'), SEND_PATH),
            api_key: config.api_key.trim().to_string(),
            api_secret: config.api_secret.trim().to_string(),
            sender_number: config.sender_number.clone(),
        })
    }
}

#[async_trait]
impl SmsGateway for SolapiGateway {
    #[instrument(skip(self, text), fields(text_len = text.chars().count()))]
    async fn send(&self, to: &str, text: &str) -> Result<(), SmsError> {
        let date = format_signing_date(Utc::now());
        let salt = generate_salt();
        let authorization = authorization_header(&self.api_key, &self.api_secret, &date, &salt)?;

        let request = SendRequest {
            message: OutgoingMessage {
                to,
                from: &self.sender_number,
                text,
            },
            agent: Agent::default(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(to = to, status = status.as_u16(), body = %body, "SMS rejected");
            return Err(SmsError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(to = to, "SMS sent");
        Ok(())
    }
}
