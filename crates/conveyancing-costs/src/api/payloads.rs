//! Request and response bodies for the cost calculator endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::calculator::CostBreakdown;
use crate::documents::ScenarioKind;
use crate::settings::PdfSettings;
use crate::tables::{parse_amount, CostRow};

/// Amounts arrive either as JSON numbers or as strings such as `"600000"` or `"R 600,000.00"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum AmountInput {
    Number(serde_json::Number),
    Text(String),
}

impl AmountInput {
    fn into_decimal<E: serde::de::Error>(self) -> Result<Option<Decimal>, E> {
        let text = match self {
            AmountInput::Number(number) => number.to_string(),
            AmountInput::Text(text) if text.trim().is_empty() => return Ok(None),
            AmountInput::Text(text) => text,
        };
        parse_amount(&text)
            .map(Some)
            .ok_or_else(|| E::custom(format!("'{text}' is not a valid amount")))
    }
}

pub(crate) fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    AmountInput::deserialize(deserializer)?
        .into_decimal::<D::Error>()?
        .ok_or_else(|| serde::de::Error::custom("amount must not be blank"))
}

pub(crate) fn deserialize_optional_amount<'de, D>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<AmountInput>::deserialize(deserializer)? {
        Some(input) => input.into_decimal(),
        None => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
pub struct CalculateTransferRequest {
    #[serde(deserialize_with = "deserialize_amount")]
    pub purchase_price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CalculateBondRequest {
    #[serde(deserialize_with = "deserialize_amount")]
    pub bond_amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CalculateCombinedRequest {
    #[serde(deserialize_with = "deserialize_amount")]
    pub purchase_price: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub bond_amount: Option<Decimal>,
}

/// A quote as returned to the calculator front end, flattened beside `success`.
#[derive(Debug, Serialize)]
pub struct QuoteResponse<Q> {
    pub success: bool,
    #[serde(flatten)]
    pub quote: Q,
}

impl<Q> From<Q> for QuoteResponse<Q> {
    fn from(quote: Q) -> Self {
        Self {
            success: true,
            quote,
        }
    }
}

/// Amounts and totals shown on a generated PDF.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteFigures {
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub purchase_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub bond_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub transfer_total: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub bond_total: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub total: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratePdfRequest {
    #[serde(rename = "type")]
    pub kind: ScenarioKind,
    pub data: QuoteFigures,
    pub breakdown: CostBreakdown,
    #[serde(default)]
    pub bond_breakdown: Option<CostBreakdown>,
}

#[derive(Debug, Serialize)]
pub struct GeneratePdfResponse {
    pub success: bool,
    pub pdf_url: String,
}

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub email: String,
    #[serde(rename = "type")]
    pub kind: ScenarioKind,
    #[serde(default)]
    pub pdf_url: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TableResponse<R> {
    pub success: bool,
    pub data: Vec<R>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse<R> {
    pub success: bool,
    pub rows_imported: usize,
    pub rows: Vec<R>,
}

impl<R: CostRow> UploadResponse<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self {
            success: true,
            rows_imported: rows.len(),
            rows,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub success: bool,
    pub data: PdfSettings,
}

/// One row of the static demo listing on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatorEntry {
    pub date: &'static str,
    pub email: &'static str,
    #[serde(rename = "type")]
    pub kind: ScenarioKind,
    pub amount: Decimal,
    pub fee: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CalculatorDataResponse {
    pub success: bool,
    pub data: Vec<CalculatorEntry>,
}
