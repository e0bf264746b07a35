use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{join_url, truncate_body, DeliveryError, PdfRenderer, PdfRequest};

const PROVIDER: &str = "api2pdf";
const HTML_ENDPOINT: &str = "chrome/pdf/html";

/// HTML-to-PDF conversion through API2PDF's headless Chrome endpoint.
#[derive(Debug, Clone)]
pub struct Api2PdfClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConvertRequest<'a> {
    html: &'a str,
    file_name: &'a str,
    options: ConvertOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConvertOptions {
    landscape: bool,
    print_background: bool,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ConvertResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    file_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl Api2PdfClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| transport(&err))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

fn transport(err: &reqwest::Error) -> DeliveryError {
    DeliveryError::Transport {
        provider: PROVIDER,
        message: err.to_string(),
    }
}

#[async_trait]
impl PdfRenderer for Api2PdfClient {
    async fn render_pdf(
        &self,
        api_key: &str,
        request: &PdfRequest,
    ) -> Result<String, DeliveryError> {
        let url = join_url(&self.base_url, HTML_ENDPOINT);
        let payload = ConvertRequest {
            html: &request.html,
            file_name: &request.file_name,
            options: ConvertOptions {
                landscape: false,
                print_background: true,
                format: "A4",
            },
        };

        debug!(%url, file_name = %request.file_name, "requesting pdf conversion");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| transport(&err))?;

        let status = response.status();
        let body = response.text().await.map_err(|err| transport(&err))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "pdf conversion failed");
            return Err(DeliveryError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: ConvertResponse =
            serde_json::from_str(&body).map_err(|err| DeliveryError::Decode {
                provider: PROVIDER,
                message: err.to_string(),
            })?;

        match (parsed.success, parsed.file_url) {
            (true, Some(file_url)) if !file_url.is_empty() => Ok(file_url),
            (true, _) => Err(DeliveryError::Decode {
                provider: PROVIDER,
                message: "response did not include a FileUrl".to_string(),
            }),
            (false, _) => Err(DeliveryError::Rejected {
                provider: PROVIDER,
                message: parsed
                    .error
                    .unwrap_or_else(|| "conversion unsuccessful".to_string()),
            }),
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, DeliveryError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| transport(&err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let bytes = response.bytes().await.map_err(|err| transport(&err))?;
        Ok(bytes.to_vec())
    }
}
