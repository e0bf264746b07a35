use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::store::{CostTableStore, StoreError};

/// The two cost tables the firm maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Transfer,
    Bond,
}

impl TableKind {
    pub fn label(self) -> &'static str {
        match self {
            TableKind::Transfer => "transfer",
            TableKind::Bond => "bond",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A CSV column: the normalized key used for matching and the header written on export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub header: &'static str,
}

/// Behaviour shared by transfer and bond rows so the importer, exporter, store and
/// resolver can be written once.
pub trait CostRow:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: TableKind;
    /// Column order used on export; the first column is the threshold.
    const COLUMNS: &'static [ColumnSpec];

    /// The tier's lower bound.
    fn threshold(&self) -> Decimal;

    /// Builds a row from values ordered like [`CostRow::COLUMNS`].
    fn from_values(values: &[Decimal]) -> Self;

    /// Values ordered like [`CostRow::COLUMNS`].
    fn values(&self) -> Vec<Decimal>;

    fn load(store: &dyn CostTableStore) -> Result<Arc<CostTable<Self>>, StoreError>;

    fn replace(store: &dyn CostTableStore, table: CostTable<Self>) -> Result<(), StoreError>;
}

/// One transfer-cost tier, keyed by purchase price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCostRow {
    pub purchase_price: Decimal,
    pub attorney_fee: Decimal,
    pub vat: Decimal,
    pub transfer_duty: Decimal,
    pub deeds_office_fee: Decimal,
    pub total_cost: Decimal,
}

/// One bond-registration tier, keyed by bond amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondCostRow {
    pub bond_amount: Decimal,
    pub attorney_fee: Decimal,
    pub vat: Decimal,
    pub deeds_office_fee: Decimal,
    pub total_cost: Decimal,
}

const TRANSFER_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        key: "purchase_price",
        header: "Purchase Price",
    },
    ColumnSpec {
        key: "attorney_fee",
        header: "Attorney Fee",
    },
    ColumnSpec {
        key: "vat",
        header: "VAT",
    },
    ColumnSpec {
        key: "transfer_duty",
        header: "Transfer Duty",
    },
    ColumnSpec {
        key: "deeds_office_fee",
        header: "Deeds Office Fee",
    },
    ColumnSpec {
        key: "total_cost",
        header: "Total Cost",
    },
];

const BOND_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        key: "bond_amount",
        header: "Bond Amount",
    },
    ColumnSpec {
        key: "attorney_fee",
        header: "Attorney Fee",
    },
    ColumnSpec {
        key: "vat",
        header: "VAT",
    },
    ColumnSpec {
        key: "deeds_office_fee",
        header: "Deeds Office Fee",
    },
    ColumnSpec {
        key: "total_cost",
        header: "Total Cost",
    },
];

impl CostRow for TransferCostRow {
    const KIND: TableKind = TableKind::Transfer;
    const COLUMNS: &'static [ColumnSpec] = TRANSFER_COLUMNS;

    fn threshold(&self) -> Decimal {
        self.purchase_price
    }

    fn from_values(values: &[Decimal]) -> Self {
        Self {
            purchase_price: values[0],
            attorney_fee: values[1],
            vat: values[2],
            transfer_duty: values[3],
            deeds_office_fee: values[4],
            total_cost: values[5],
        }
    }

    fn values(&self) -> Vec<Decimal> {
        vec![
            self.purchase_price,
            self.attorney_fee,
            self.vat,
            self.transfer_duty,
            self.deeds_office_fee,
            self.total_cost,
        ]
    }

    fn load(store: &dyn CostTableStore) -> Result<Arc<CostTable<Self>>, StoreError> {
        store.transfer_table()
    }

    fn replace(store: &dyn CostTableStore, table: CostTable<Self>) -> Result<(), StoreError> {
        store.replace_transfer_table(table)
    }
}

impl CostRow for BondCostRow {
    const KIND: TableKind = TableKind::Bond;
    const COLUMNS: &'static [ColumnSpec] = BOND_COLUMNS;

    fn threshold(&self) -> Decimal {
        self.bond_amount
    }

    fn from_values(values: &[Decimal]) -> Self {
        Self {
            bond_amount: values[0],
            attorney_fee: values[1],
            vat: values[2],
            deeds_office_fee: values[3],
            total_cost: values[4],
        }
    }

    fn values(&self) -> Vec<Decimal> {
        vec![
            self.bond_amount,
            self.attorney_fee,
            self.vat,
            self.deeds_office_fee,
            self.total_cost,
        ]
    }

    fn load(store: &dyn CostTableStore) -> Result<Arc<CostTable<Self>>, StoreError> {
        store.bond_table()
    }

    fn replace(store: &dyn CostTableStore, table: CostTable<Self>) -> Result<(), StoreError> {
        store.replace_bond_table(table)
    }
}

/// Rows of one table, sorted ascending by threshold with unique thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostTable<R> {
    rows: Vec<R>,
}

impl<R: CostRow> CostTable<R> {
    /// Sorts the rows by threshold. Callers are responsible for rejecting duplicates first.
    pub fn from_rows(mut rows: Vec<R>) -> Self {
        rows.sort_by(|a, b| a.threshold().cmp(&b.threshold()));
        Self { rows }
    }

    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn kind(&self) -> TableKind {
        R::KIND
    }
}

impl<R: CostRow> Default for CostTable<R> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bond_row(amount: Decimal) -> BondCostRow {
        BondCostRow {
            bond_amount: amount,
            attorney_fee: dec!(1000),
            vat: dec!(150),
            deeds_office_fee: dec!(500),
            total_cost: dec!(1650),
        }
    }

    #[test]
    fn from_rows_sorts_by_threshold() {
        let table = CostTable::from_rows(vec![
            bond_row(dec!(900000)),
            bond_row(dec!(100000)),
            bond_row(dec!(450000)),
        ]);
        let thresholds: Vec<Decimal> = table.rows().iter().map(CostRow::threshold).collect();
        assert_eq!(thresholds, vec![dec!(100000), dec!(450000), dec!(900000)]);
        assert_eq!(table.kind(), TableKind::Bond);
    }

    #[test]
    fn values_follow_column_order() {
        let row = TransferCostRow {
            purchase_price: dec!(500000),
            attorney_fee: dec!(10000),
            vat: dec!(1500),
            transfer_duty: dec!(5000),
            deeds_office_fee: dec!(800),
            total_cost: dec!(17300),
        };
        assert_eq!(row.values().len(), TransferCostRow::COLUMNS.len());
        assert_eq!(TransferCostRow::from_values(&row.values()), row);
        assert_eq!(TransferCostRow::COLUMNS[3].key, "transfer_duty");
    }
}
