use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use super::error::ApiError;
use super::payloads::{CalculatorEntry, GeneratePdfRequest, QuoteFigures, SendEmailRequest};
use crate::calculator::{
    quote_bond, quote_combined, quote_transfer, BondQuote, CombinedQuote, CostBreakdown,
    TransferQuote,
};
use crate::delivery::{EmailAddress, EmailMessage, EmailSender, PdfRenderer, PdfRequest};
use crate::documents::{
    email_body, escape_html, render, sample_scenario, RenderContext, Scenario, ScenarioKind,
    SectionView,
};
use crate::settings::{is_valid_email, PdfSettings, PdfSettingsUpdate, SettingsStore};
use crate::tables::{export_csv, import_csv, CostRow, CostTableStore};

const EXAMPLE_FILE_NAME: &str = "bond-calculator-example.pdf";

/// Request-boundary service tying the table store, settings and delivery adapters together.
///
/// Every collaborator is injected, so handlers never reach for process-wide state.
pub struct CostCalculatorService {
    tables: Arc<dyn CostTableStore>,
    settings: Arc<dyn SettingsStore>,
    pdf: Arc<dyn PdfRenderer>,
    email: Arc<dyn EmailSender>,
}

impl CostCalculatorService {
    pub fn new(
        tables: Arc<dyn CostTableStore>,
        settings: Arc<dyn SettingsStore>,
        pdf: Arc<dyn PdfRenderer>,
        email: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            tables,
            settings,
            pdf,
            email,
        }
    }

    pub fn calculate_transfer(&self, purchase_price: Decimal) -> Result<TransferQuote, ApiError> {
        let table = self.tables.transfer_table()?;
        Ok(quote_transfer(&table, purchase_price)?)
    }

    pub fn calculate_bond(&self, bond_amount: Decimal) -> Result<BondQuote, ApiError> {
        let table = self.tables.bond_table()?;
        Ok(quote_bond(&table, bond_amount)?)
    }

    pub fn calculate_combined(
        &self,
        purchase_price: Decimal,
        bond_amount: Option<Decimal>,
    ) -> Result<CombinedQuote, ApiError> {
        let transfer = self.tables.transfer_table()?;
        let bond = self.tables.bond_table()?;
        Ok(quote_combined(&transfer, &bond, purchase_price, bond_amount)?)
    }

    pub fn rows<R: CostRow>(&self) -> Result<Vec<R>, ApiError> {
        Ok(R::load(self.tables.as_ref())?.rows().to_vec())
    }

    /// Validates an upload in full, then swaps it in. A rejected upload leaves the stored table as it was.
    pub fn import_rows<R: CostRow>(&self, csv: &[u8]) -> Result<Vec<R>, ApiError> {
        let table = import_csv::<R, _>(csv)?;
        let rows = table.rows().to_vec();
        R::replace(self.tables.as_ref(), table)?;
        info!(kind = %R::KIND, rows = rows.len(), "cost table replaced");
        Ok(rows)
    }

    pub fn export_rows<R: CostRow>(&self) -> Result<String, ApiError> {
        let table = R::load(self.tables.as_ref())?;
        Ok(export_csv(&table)?)
    }

    pub fn settings(&self) -> Result<PdfSettings, ApiError> {
        Ok(self.settings.load()?)
    }

    pub fn save_settings(&self, update: PdfSettingsUpdate) -> Result<PdfSettings, ApiError> {
        let next = self.settings.update(update)?;
        info!("pdf settings saved");
        Ok(next)
    }

    /// Renders the stored template for a quote and returns the hosted PDF URL.
    pub async fn generate_pdf(
        &self,
        request: GeneratePdfRequest,
        date: NaiveDate,
    ) -> Result<String, ApiError> {
        let settings = self.settings.load()?;
        let api_key = pdf_api_key(&settings)?;
        let scenario = scenario_from_request(request)?;
        let kind = scenario.kind();

        let html = render(&settings.template_html, &RenderContext { date, scenario });
        let pdf_request = PdfRequest {
            html,
            file_name: format!("{}-calculator-results.pdf", kind_slug(kind)),
        };

        let url = self.pdf.render_pdf(api_key, &pdf_request).await?;
        info!(kind = kind_slug(kind), "quote pdf generated");
        Ok(url)
    }

    /// Renders the fixed sample quote through the stored template and returns the PDF bytes.
    pub async fn example_pdf(&self, date: NaiveDate) -> Result<(String, Vec<u8>), ApiError> {
        let settings = self.settings.load()?;
        let api_key = pdf_api_key(&settings)?;
        let html = render(
            &settings.template_html,
            &RenderContext {
                date,
                scenario: sample_scenario(),
            },
        );

        let url = self
            .pdf
            .render_pdf(
                api_key,
                &PdfRequest {
                    html,
                    file_name: EXAMPLE_FILE_NAME.to_string(),
                },
            )
            .await?;
        let bytes = self.pdf.download(&url).await?;
        Ok((EXAMPLE_FILE_NAME.to_string(), bytes))
    }

    pub async fn send_email(&self, request: SendEmailRequest) -> Result<(), ApiError> {
        let recipient = request.email.trim();
        if !is_valid_email(recipient) {
            return Err(ApiError::InvalidInput("invalid email address".to_string()));
        }
        let pdf_url = request.pdf_url.trim();
        if pdf_url.is_empty() {
            return Err(ApiError::InvalidInput("pdf_url is required".to_string()));
        }
        if !(pdf_url.starts_with("https://") || pdf_url.starts_with("http://")) {
            return Err(ApiError::InvalidInput(
                "pdf_url must be an http(s) link".to_string(),
            ));
        }

        let settings = self.settings.load()?;
        let api_key = settings.email_api_key.as_deref().ok_or_else(|| {
            ApiError::ConfigurationMissing("email API key is not configured".to_string())
        })?;
        let sender_email = settings.sender_email.clone().ok_or_else(|| {
            ApiError::ConfigurationMissing("sender email is not configured".to_string())
        })?;

        let label = request.kind.calculator_label();
        let message = EmailMessage {
            to: recipient.to_string(),
            subject: settings.subject_line.replace("[CALCULATOR_TYPE]", label),
            html_content: email_body(label, &escape_html(pdf_url)),
            sender: EmailAddress {
                name: Some(settings.sender_name.clone()).filter(|name| !name.is_empty()),
                email: sender_email,
            },
        };

        self.email.send_email(api_key, &message).await?;
        info!(kind = kind_slug(request.kind), "results email sent");
        Ok(())
    }

    /// Static listing shown on the staff dashboard until real history is recorded.
    pub fn calculator_data(&self) -> Vec<CalculatorEntry> {
        vec![
            CalculatorEntry {
                date: "12 Jun 2025",
                email: "test@udit.co.za",
                kind: ScenarioKind::Transfer,
                amount: dec!(500000),
                fee: dec!(15000),
            },
            CalculatorEntry {
                date: "10 Jun 2025",
                email: "test@identipet.com",
                kind: ScenarioKind::Bond,
                amount: dec!(1000000),
                fee: dec!(25000),
            },
        ]
    }
}

fn pdf_api_key(settings: &PdfSettings) -> Result<&str, ApiError> {
    settings
        .pdf_api_key
        .as_deref()
        .ok_or_else(|| ApiError::ConfigurationMissing("PDF API key is not configured".to_string()))
}

fn kind_slug(kind: ScenarioKind) -> &'static str {
    match kind {
        ScenarioKind::Transfer => "transfer",
        ScenarioKind::Bond => "bond",
        ScenarioKind::Combined => "combined",
    }
}

fn required(value: Option<Decimal>, field: &str) -> Result<Decimal, ApiError> {
    value.ok_or_else(|| ApiError::InvalidInput(format!("data.{field} is required")))
}

fn section(amount: Decimal, total: Option<Decimal>, breakdown: CostBreakdown) -> SectionView {
    SectionView {
        amount,
        total: total.unwrap_or_else(|| breakdown.subtotal()),
        breakdown,
    }
}

/// Rebuilds a document scenario from figures the client received from a calculate call.
///
/// Section totals fall back to the overall `total` for single-section documents, then to the
/// sum of the breakdown.
fn scenario_from_request(request: GeneratePdfRequest) -> Result<Scenario, ApiError> {
    let GeneratePdfRequest {
        kind,
        data,
        breakdown,
        bond_breakdown,
    } = request;
    let QuoteFigures {
        purchase_price,
        bond_amount,
        transfer_total,
        bond_total,
        total,
    } = data;

    let scenario = match kind {
        ScenarioKind::Transfer => Scenario::Transfer(section(
            required(purchase_price, "purchase_price")?,
            transfer_total.or(total),
            breakdown,
        )),
        ScenarioKind::Bond => Scenario::Bond(section(
            required(bond_amount, "bond_amount")?,
            bond_total.or(total),
            breakdown,
        )),
        ScenarioKind::Combined => {
            let bond_breakdown = bond_breakdown.ok_or_else(|| {
                ApiError::InvalidInput("bond_breakdown is required for a combined document".into())
            })?;
            Scenario::Combined {
                transfer: section(
                    required(purchase_price, "purchase_price")?,
                    transfer_total,
                    breakdown,
                ),
                bond: section(required(bond_amount, "bond_amount")?, bond_total, bond_breakdown),
            }
        }
    };

    Ok(scenario)
}
