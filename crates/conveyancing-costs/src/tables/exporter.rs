use rust_decimal::{Decimal, RoundingStrategy};

use super::domain::{CostRow, CostTable};

#[derive(Debug, thiserror::Error)]
#[error("unable to write CSV export: {0}")]
pub struct ExportError(String);

/// Serializes a table with human-readable headers and two-decimal amounts, ascending by threshold.
pub fn export_csv<R: CostRow>(table: &CostTable<R>) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record(R::COLUMNS.iter().map(|column| column.header))
        .map_err(|err| ExportError(err.to_string()))?;

    for row in table.rows() {
        writer
            .write_record(row.values().into_iter().map(two_decimals))
            .map_err(|err| ExportError(err.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| ExportError(err.to_string()))
}

pub(crate) fn two_decimals(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}
