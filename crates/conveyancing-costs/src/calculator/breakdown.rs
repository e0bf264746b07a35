use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rules::{FixedFee, BOND_FIXED_FEES, TRANSFER_FIXED_FEES};
use crate::tables::{BondCostRow, TransferCostRow};

/// A labelled amount on a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub key: String,
    pub label: String,
    pub amount: Decimal,
}

impl LineItem {
    pub fn new(key: &str, label: &str, amount: Decimal) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            amount,
        }
    }
}

impl From<&FixedFee> for LineItem {
    fn from(fee: &FixedFee) -> Self {
        Self::new(fee.key, fee.label, fee.amount)
    }
}

/// Fee line items grouped the way quotes are presented to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub government_costs: Vec<LineItem>,
    pub attorney_costs: Vec<LineItem>,
    pub vat: LineItem,
}

impl CostBreakdown {
    pub fn for_transfer(row: &TransferCostRow) -> Self {
        Self {
            government_costs: vec![
                LineItem::new("transfer_duty", "Transfer Duty", row.transfer_duty),
                LineItem::new("deeds_office_fee", "Deeds Office Fee", row.deeds_office_fee),
            ],
            attorney_costs: attorney_costs(row.attorney_fee, TRANSFER_FIXED_FEES),
            vat: vat_item(row.vat),
        }
    }

    pub fn for_bond(row: &BondCostRow) -> Self {
        Self {
            government_costs: vec![LineItem::new(
                "deeds_office_fee",
                "Deeds Office Fee",
                row.deeds_office_fee,
            )],
            attorney_costs: attorney_costs(row.attorney_fee, BOND_FIXED_FEES),
            vat: vat_item(row.vat),
        }
    }

    pub fn government_total(&self) -> Decimal {
        self.government_costs.iter().map(|item| item.amount).sum()
    }

    pub fn attorney_total(&self) -> Decimal {
        self.attorney_costs.iter().map(|item| item.amount).sum()
    }

    /// Every line item on the breakdown, VAT included.
    pub fn subtotal(&self) -> Decimal {
        self.government_total() + self.attorney_total() + self.vat.amount
    }
}

fn attorney_costs(attorney_fee: Decimal, fixed: &[FixedFee]) -> Vec<LineItem> {
    std::iter::once(LineItem::new("attorney_fee", "Attorney Fee", attorney_fee))
        .chain(fixed.iter().map(LineItem::from))
        .collect()
}

fn vat_item(amount: Decimal) -> LineItem {
    LineItem::new("vat", "VAT", amount)
}
