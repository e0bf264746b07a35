use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Local;

use super::auth::{require_admin, AdminGuard};
use super::error::ApiError;
use super::payloads::{
    CalculateBondRequest, CalculateCombinedRequest, CalculateTransferRequest,
    CalculatorDataResponse, GeneratePdfRequest, GeneratePdfResponse, MessageResponse,
    QuoteResponse, SendEmailRequest, SettingsResponse, TableResponse, UploadResponse,
};
use super::service::CostCalculatorService;
use crate::calculator::{BondQuote, CombinedQuote, TransferQuote};
use crate::settings::PdfSettingsUpdate;
use crate::tables::{BondCostRow, CostRow, TransferCostRow};

type SharedService = State<Arc<CostCalculatorService>>;

/// Form fields accepted for a CSV upload.
const UPLOAD_FIELDS: [&str; 2] = ["file", "csv_file"];

/// Router builder exposing the calculator under `/api/v1`. Staff endpoints sit behind `guard`.
pub fn cost_router(service: Arc<CostCalculatorService>, guard: AdminGuard) -> Router {
    let staff = Router::new()
        .route("/calculator-data", get(calculator_data_handler))
        .route(
            "/pdf-settings",
            get(settings_handler).post(save_settings_handler),
        )
        .route("/pdf-example", get(example_pdf_handler))
        .route("/transfer-costs", get(list_handler::<TransferCostRow>))
        .route("/bond-costs", get(list_handler::<BondCostRow>))
        .route(
            "/upload-transfer-costs",
            post(upload_handler::<TransferCostRow>),
        )
        .route("/upload-bond-costs", post(upload_handler::<BondCostRow>))
        .route(
            "/download-transfer-costs",
            get(download_handler::<TransferCostRow>),
        )
        .route("/download-bond-costs", get(download_handler::<BondCostRow>))
        .route_layer(middleware::from_fn_with_state(guard, require_admin));

    let public = Router::new()
        .route("/calculate-transfer-cost", post(calculate_transfer_handler))
        .route("/calculate-bond-cost", post(calculate_bond_handler))
        .route("/calculate-combined-cost", post(calculate_combined_handler))
        .route("/generate-pdf", post(generate_pdf_handler))
        .route("/send-email", post(send_email_handler));

    Router::new()
        .nest("/api/v1", staff.merge(public))
        .with_state(service)
}

pub(crate) async fn calculate_transfer_handler(
    State(service): SharedService,
    payload: Result<Json<CalculateTransferRequest>, JsonRejection>,
) -> Result<Json<QuoteResponse<TransferQuote>>, ApiError> {
    let Json(request) = payload?;
    let quote = service.calculate_transfer(request.purchase_price)?;
    Ok(Json(quote.into()))
}

pub(crate) async fn calculate_bond_handler(
    State(service): SharedService,
    payload: Result<Json<CalculateBondRequest>, JsonRejection>,
) -> Result<Json<QuoteResponse<BondQuote>>, ApiError> {
    let Json(request) = payload?;
    let quote = service.calculate_bond(request.bond_amount)?;
    Ok(Json(quote.into()))
}

pub(crate) async fn calculate_combined_handler(
    State(service): SharedService,
    payload: Result<Json<CalculateCombinedRequest>, JsonRejection>,
) -> Result<Json<QuoteResponse<CombinedQuote>>, ApiError> {
    let Json(request) = payload?;
    let quote = service.calculate_combined(request.purchase_price, request.bond_amount)?;
    Ok(Json(quote.into()))
}

pub(crate) async fn generate_pdf_handler(
    State(service): SharedService,
    payload: Result<Json<GeneratePdfRequest>, JsonRejection>,
) -> Result<Json<GeneratePdfResponse>, ApiError> {
    let Json(request) = payload?;
    let pdf_url = service
        .generate_pdf(request, Local::now().date_naive())
        .await?;
    Ok(Json(GeneratePdfResponse {
        success: true,
        pdf_url,
    }))
}

pub(crate) async fn send_email_handler(
    State(service): SharedService,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    service.send_email(request).await?;
    Ok(Json(MessageResponse::ok("Email sent successfully")))
}

pub(crate) async fn calculator_data_handler(
    State(service): SharedService,
) -> Json<CalculatorDataResponse> {
    Json(CalculatorDataResponse {
        success: true,
        data: service.calculator_data(),
    })
}

pub(crate) async fn settings_handler(
    State(service): SharedService,
) -> Result<Json<SettingsResponse>, ApiError> {
    Ok(Json(SettingsResponse {
        success: true,
        data: service.settings()?,
    }))
}

pub(crate) async fn save_settings_handler(
    State(service): SharedService,
    payload: Result<Json<PdfSettingsUpdate>, JsonRejection>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let Json(update) = payload?;
    Ok(Json(SettingsResponse {
        success: true,
        data: service.save_settings(update)?,
    }))
}

pub(crate) async fn example_pdf_handler(
    State(service): SharedService,
) -> Result<Response, ApiError> {
    let (file_name, bytes) = service.example_pdf(Local::now().date_naive()).await?;
    Ok(attachment(mime::APPLICATION_PDF.as_ref(), &file_name, bytes))
}

pub(crate) async fn list_handler<R: CostRow>(
    State(service): SharedService,
) -> Result<Json<TableResponse<R>>, ApiError> {
    Ok(Json(TableResponse {
        success: true,
        data: service.rows::<R>()?,
    }))
}

pub(crate) async fn upload_handler<R: CostRow>(
    State(service): SharedService,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse<R>>, ApiError> {
    let mut multipart =
        multipart.map_err(|rejection| ApiError::InvalidInput(rejection.body_text()))?;

    let mut csv = None;
    while let Some(field) = multipart.next_field().await? {
        if field
            .name()
            .is_some_and(|name| UPLOAD_FIELDS.contains(&name))
        {
            csv = Some(field.bytes().await?);
            break;
        }
    }

    let csv = csv.ok_or_else(|| {
        ApiError::InvalidInput("a CSV file is required in the 'file' form field".to_string())
    })?;
    let rows = service.import_rows::<R>(&csv)?;
    Ok(Json(UploadResponse::new(rows)))
}

pub(crate) async fn download_handler<R: CostRow>(
    State(service): SharedService,
) -> Result<Response, ApiError> {
    let csv = service.export_rows::<R>()?;
    let file_name = format!("{}_costs.csv", R::KIND);
    Ok(attachment(mime::TEXT_CSV_UTF_8.as_ref(), &file_name, csv))
}

fn attachment(content_type: &str, file_name: &str, body: impl IntoResponse) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}
