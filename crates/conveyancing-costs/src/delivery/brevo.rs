use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};

use super::{join_url, truncate_body, DeliveryError, EmailAddress, EmailMessage, EmailSender};

const PROVIDER: &str = "brevo";
const SEND_ENDPOINT: &str = "v3/smtp/email";

/// Transactional email through Brevo's SMTP API. Only `201 Created` counts as delivered.
#[derive(Debug, Clone)]
pub struct BrevoClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    to: [Recipient<'a>; 1],
    subject: &'a str,
    html_content: &'a str,
    sender: &'a EmailAddress,
}

#[derive(Debug, Serialize)]
struct Recipient<'a> {
    email: &'a str,
}

impl BrevoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| DeliveryError::Transport {
                provider: PROVIDER,
                message: err.to_string(),
            })?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

#[async_trait]
impl EmailSender for BrevoClient {
    async fn send_email(&self, api_key: &str, message: &EmailMessage) -> Result<(), DeliveryError> {
        let url = join_url(&self.base_url, SEND_ENDPOINT);
        let payload = SendRequest {
            to: [Recipient {
                email: &message.to,
            }],
            subject: &message.subject,
            html_content: &message.html_content,
            sender: &message.sender,
        };

        debug!(%url, subject = %message.subject, "sending results email");

        let response = self
            .client
            .post(&url)
            .header("api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| DeliveryError::Transport {
                provider: PROVIDER,
                message: err.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::CREATED {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "email provider did not accept the message");
        Err(DeliveryError::Status {
            provider: PROVIDER,
            status: status.as_u16(),
            body: truncate_body(&body),
        })
    }
}
