//! The reqwest-backed PDF and email clients exercised against a local stand-in provider.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use conveyancing_costs::delivery::{
    Api2PdfClient, BrevoClient, DeliveryError, EmailAddress, EmailMessage, EmailSender,
    PdfRenderer, PdfRequest,
};

#[derive(Clone, Default)]
struct Captured {
    calls: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

impl Captured {
    fn record(&self, headers: HeaderMap, body: Value) {
        self.calls
            .lock()
            .expect("capture mutex poisoned")
            .push((headers, body));
    }

    fn take(&self) -> Vec<(HeaderMap, Value)> {
        std::mem::take(&mut *self.calls.lock().expect("capture mutex poisoned"))
    }
}

async fn convert_handler(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let rejected = body["html"] == "<p>reject</p>";
    captured.record(headers, body);
    if rejected {
        Json(json!({ "Success": false, "Error": "Invalid HTML" }))
    } else {
        Json(json!({ "Success": true, "FileUrl": "http://files.local/out.pdf", "MbIn": 0.1 }))
    }
}

async fn email_handler(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let status = if headers.get("api-key").and_then(|v| v.to_str().ok()) == Some("good-key") {
        StatusCode::CREATED
    } else {
        StatusCode::UNAUTHORIZED
    };
    captured.record(headers, body);
    (status, Json(json!({ "messageId": "<1@relay>" })))
}

async fn file_handler() -> impl IntoResponse {
    b"%PDF-1.7".to_vec()
}

async fn spawn_provider() -> (SocketAddr, Captured) {
    let captured = Captured::default();
    let app = Router::new()
        .route("/chrome/pdf/html", post(convert_handler))
        .route("/v3/smtp/email", post(email_handler))
        .route("/files/out.pdf", get(file_handler))
        .with_state(captured.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind provider");
    let addr = listener.local_addr().expect("provider addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("provider serves");
    });
    (addr, captured)
}

fn message(to: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Your Bond Cost Calculator Results".to_string(),
        html_content: "<p>link</p>".to_string(),
        sender: EmailAddress {
            name: Some("Bond Calculator".to_string()),
            email: "quotes@firm.example.co.za".to_string(),
        },
    }
}

#[tokio::test]
async fn api2pdf_client_posts_html_with_the_authorization_key() {
    let (addr, captured) = spawn_provider().await;
    let client =
        Api2PdfClient::new(format!("http://{addr}/"), Duration::from_secs(5)).expect("client");

    let url = client
        .render_pdf(
            "pdf-key",
            &PdfRequest {
                html: "<p>quote</p>".to_string(),
                file_name: "transfer-calculator-results.pdf".to_string(),
            },
        )
        .await
        .expect("pdf url");
    assert_eq!(url, "http://files.local/out.pdf");

    let calls = captured.take();
    let (headers, body) = &calls[0];
    assert_eq!(
        headers.get("authorization").and_then(|v| v.to_str().ok()),
        Some("pdf-key")
    );
    assert_eq!(body["html"], "<p>quote</p>");
    assert_eq!(body["fileName"], "transfer-calculator-results.pdf");
    assert_eq!(body["options"]["printBackground"], true);
    assert_eq!(body["options"]["format"], "A4");
}

#[tokio::test]
async fn api2pdf_unsuccessful_conversion_is_rejected() {
    let (addr, _captured) = spawn_provider().await;
    let client =
        Api2PdfClient::new(format!("http://{addr}"), Duration::from_secs(5)).expect("client");

    let result = client
        .render_pdf(
            "pdf-key",
            &PdfRequest {
                html: "<p>reject</p>".to_string(),
                file_name: "x.pdf".to_string(),
            },
        )
        .await;

    match result {
        Err(DeliveryError::Rejected { provider, message }) => {
            assert_eq!(provider, "api2pdf");
            assert_eq!(message, "Invalid HTML");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn api2pdf_download_fetches_the_file_bytes() {
    let (addr, _captured) = spawn_provider().await;
    let client =
        Api2PdfClient::new(format!("http://{addr}"), Duration::from_secs(5)).expect("client");

    let bytes = client
        .download(&format!("http://{addr}/files/out.pdf"))
        .await
        .expect("download");
    assert_eq!(bytes, b"%PDF-1.7".to_vec());

    let missing = client.download(&format!("http://{addr}/files/none.pdf")).await;
    assert!(matches!(
        missing,
        Err(DeliveryError::Status { status: 404, .. })
    ));
}

#[tokio::test]
async fn brevo_client_sends_the_transactional_payload() {
    let (addr, captured) = spawn_provider().await;
    let client = BrevoClient::new(format!("http://{addr}"), Duration::from_secs(5)).expect("client");

    client
        .send_email("good-key", &message("buyer@example.co.za"))
        .await
        .expect("email accepted");

    let calls = captured.take();
    let (_, body) = &calls[0];
    assert_eq!(body["to"], json!([{ "email": "buyer@example.co.za" }]));
    assert_eq!(body["subject"], "Your Bond Cost Calculator Results");
    assert_eq!(body["htmlContent"], "<p>link</p>");
    assert_eq!(body["sender"]["name"], "Bond Calculator");
    assert_eq!(body["sender"]["email"], "quotes@firm.example.co.za");
}

#[tokio::test]
async fn brevo_non_created_status_is_an_error() {
    let (addr, _captured) = spawn_provider().await;
    let client = BrevoClient::new(format!("http://{addr}"), Duration::from_secs(5)).expect("client");

    let result = client
        .send_email("bad-key", &message("buyer@example.co.za"))
        .await;
    assert!(matches!(
        result,
        Err(DeliveryError::Status {
            provider: "brevo",
            status: 401,
            ..
        })
    ));
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = BrevoClient::new(format!("http://{addr}"), Duration::from_secs(2)).expect("client");
    let result = client.send_email("good-key", &message("a@b.co")).await;
    assert!(matches!(result, Err(DeliveryError::Transport { .. })));
}
