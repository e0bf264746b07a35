use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currency::format_rand;
use crate::calculator::{CombinedQuote, CostBreakdown, LineItem, Quote};

const TRANSFER_SECTION: (&str, &str) = ("[TRANSFER_SECTION_START]", "[TRANSFER_SECTION_END]");
const BOND_SECTION: (&str, &str) = ("[BOND_SECTION_START]", "[BOND_SECTION_END]");

/// Which quote a document or email describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Transfer,
    Bond,
    Combined,
}

impl ScenarioKind {
    /// Human label substituted for `[CALCULATOR_TYPE]`.
    pub fn calculator_label(self) -> &'static str {
        match self {
            ScenarioKind::Transfer => "Transfer Cost",
            ScenarioKind::Bond => "Bond Cost",
            ScenarioKind::Combined => "Transfer and Bond Cost",
        }
    }
}

/// One priced section of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionView {
    pub amount: Decimal,
    pub breakdown: CostBreakdown,
    pub total: Decimal,
}

impl<R> From<&Quote<R>> for SectionView {
    fn from(quote: &Quote<R>) -> Self {
        Self {
            amount: quote.amount,
            breakdown: quote.breakdown.clone(),
            total: quote.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scenario {
    Transfer(SectionView),
    Bond(SectionView),
    Combined {
        transfer: SectionView,
        bond: SectionView,
    },
}

impl Scenario {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            Scenario::Transfer(_) => ScenarioKind::Transfer,
            Scenario::Bond(_) => ScenarioKind::Bond,
            Scenario::Combined { .. } => ScenarioKind::Combined,
        }
    }

    fn transfer(&self) -> Option<&SectionView> {
        match self {
            Scenario::Transfer(section) | Scenario::Combined { transfer: section, .. } => {
                Some(section)
            }
            Scenario::Bond(_) => None,
        }
    }

    fn bond(&self) -> Option<&SectionView> {
        match self {
            Scenario::Bond(section) | Scenario::Combined { bond: section, .. } => Some(section),
            Scenario::Transfer(_) => None,
        }
    }

    pub fn grand_total(&self) -> Decimal {
        self.transfer().map_or(Decimal::ZERO, |section| section.total)
            + self.bond().map_or(Decimal::ZERO, |section| section.total)
    }
}

impl From<&CombinedQuote> for Scenario {
    fn from(quote: &CombinedQuote) -> Self {
        let transfer = SectionView::from(&quote.transfer);
        match &quote.bond {
            Some(bond) => Scenario::Combined {
                transfer,
                bond: SectionView::from(bond),
            },
            None => Scenario::Transfer(transfer),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    pub date: NaiveDate,
    pub scenario: Scenario,
}

/// Substitutes quote values into `template`.
///
/// Section markers of a hidden section are removed together with everything between them;
/// markers of a visible section are removed on their own. Unknown `[NAME]` tokens stay verbatim.
pub fn render(template: &str, context: &RenderContext) -> String {
    let scenario = &context.scenario;
    let html = apply_section(template, TRANSFER_SECTION, scenario.transfer().is_some());
    let html = apply_section(&html, BOND_SECTION, scenario.bond().is_some());

    let mut values: HashMap<&'static str, String> = HashMap::new();
    values.insert("DATE", context.date.format("%d/%m/%Y").to_string());
    values.insert("TOTAL", format_rand(scenario.grand_total()));
    insert_section(&mut values, "TRANSFER", scenario.transfer());
    insert_section(&mut values, "BOND", scenario.bond());

    substitute(&html, &values)
}

fn insert_section(
    values: &mut HashMap<&'static str, String>,
    prefix: &'static str,
    section: Option<&SectionView>,
) {
    let (amount, costs, total) = match section {
        Some(section) => (
            format_rand(section.amount),
            breakdown_html(&section.breakdown),
            format_rand(section.total),
        ),
        None => (String::new(), String::new(), String::new()),
    };

    let (amount_key, costs_key, total_key) = match prefix {
        "TRANSFER" => ("TRANSFER_AMOUNT", "TRANSFER_COSTS", "TRANSFER_TOTAL"),
        _ => ("BOND_AMOUNT", "BOND_COSTS", "BOND_TOTAL"),
    };
    values.insert(amount_key, amount);
    values.insert(costs_key, costs);
    values.insert(total_key, total);
}

fn apply_section(template: &str, (start, end): (&str, &str), visible: bool) -> String {
    if visible {
        return template.replace(start, "").replace(end, "");
    }

    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find(start) {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + start.len()..];
        match after_open.find(end) {
            Some(close) => rest = &after_open[close + end.len()..],
            None => {
                rest = after_open;
                break;
            }
        }
    }
    output.push_str(rest);
    output.replace(start, "").replace(end, "")
}

fn substitute(template: &str, values: &HashMap<&'static str, String>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('[') {
        output.push_str(&rest[..open]);
        let candidate = &rest[open + 1..];
        let replaced = candidate.find(']').and_then(|close| {
            values
                .get(&candidate[..close])
                .map(|value| (value, close))
        });

        match replaced {
            Some((value, close)) => {
                output.push_str(value);
                rest = &candidate[close + 1..];
            }
            None => {
                output.push('[');
                rest = candidate;
            }
        }
    }

    output.push_str(rest);
    output
}

/// HTML fragment listing a breakdown: category headings, one `Label - R…` line per item, then VAT.
pub fn breakdown_html(breakdown: &CostBreakdown) -> String {
    let mut html = String::new();
    html.push_str("<strong>Government Costs:</strong><br>");
    push_items(&mut html, &breakdown.government_costs);
    html.push_str("<strong>Attorneys Costs:</strong><br>");
    push_items(&mut html, &breakdown.attorney_costs);
    push_items(&mut html, std::slice::from_ref(&breakdown.vat));
    html
}

fn push_items(html: &mut String, items: &[LineItem]) {
    for item in items {
        let _ = write!(
            html,
            "{} - {}<br>",
            escape_html(&item.label),
            format_rand(item.amount)
        );
    }
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
