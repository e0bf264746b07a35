//! Outbound delivery: HTML-to-PDF rendering and transactional email.
//!
//! Both providers sit behind traits so quote handling can be exercised with fakes.
//! Failures are reported once and never retried.

mod api2pdf;
mod brevo;

pub use api2pdf::Api2PdfClient;
pub use brevo::BrevoClient;

use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfRequest {
    pub html: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_content: String,
    pub sender: EmailAddress,
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("{provider} request failed: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} responded with status {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("{provider} rejected the request: {message}")]
    Rejected {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} returned an unreadable response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
}

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Converts HTML to a hosted PDF and returns its URL.
    async fn render_pdf(&self, api_key: &str, request: &PdfRequest)
        -> Result<String, DeliveryError>;

    /// Fetches the bytes of a previously rendered PDF.
    async fn download(&self, url: &str) -> Result<Vec<u8>, DeliveryError>;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, api_key: &str, message: &EmailMessage) -> Result<(), DeliveryError>;
}

pub(crate) fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 512;
    match body.char_indices().nth(LIMIT) {
        Some((index, _)) => format!("{}…", &body[..index]),
        None => body.to_string(),
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
