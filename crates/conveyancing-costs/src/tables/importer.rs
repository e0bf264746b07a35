use std::collections::{HashMap, HashSet};
use std::io::Read;

use rust_decimal::Decimal;

use super::domain::{CostRow, CostTable, TableKind};
use super::normalizer::{normalize_header, parse_amount};

/// Reasons an uploaded cost table is rejected. Line numbers are 1-based file lines,
/// so the header is line 1.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required column '{column}' for the {kind} cost table")]
    MissingColumn { kind: TableKind, column: &'static str },
    #[error("line {line}: column '{column}' has non-numeric value '{value}'")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },
    #[error("line {line}: column '{column}' must not be negative")]
    NegativeAmount { line: u64, column: &'static str },
    #[error("line {line}: threshold {threshold} appears more than once")]
    DuplicateThreshold { line: u64, threshold: Decimal },
    #[error("the {kind} cost table has no data rows")]
    Empty { kind: TableKind },
    #[error("unreadable CSV: {0}")]
    Malformed(String),
}

impl ValidationError {
    pub fn line(&self) -> Option<u64> {
        match self {
            ValidationError::InvalidNumber { line, .. }
            | ValidationError::NegativeAmount { line, .. }
            | ValidationError::DuplicateThreshold { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub fn column(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingColumn { column, .. }
            | ValidationError::InvalidNumber { column, .. }
            | ValidationError::NegativeAmount { column, .. } => Some(column),
            _ => None,
        }
    }
}

impl From<csv::Error> for ValidationError {
    fn from(err: csv::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Parses and validates a whole CSV upload. Nothing is returned unless every row is valid.
pub fn import_csv<R: CostRow, S: Read>(source: S) -> Result<CostTable<R>, ValidationError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (index, header) in headers.iter().enumerate() {
        positions.entry(normalize_header(header)).or_insert(index);
    }

    let indices = R::COLUMNS
        .iter()
        .map(|column| {
            positions
                .get(column.key)
                .copied()
                .ok_or(ValidationError::MissingColumn {
                    kind: R::KIND,
                    column: column.key,
                })
        })
        .collect::<Result<Vec<usize>, _>>()?;

    let mut rows = Vec::new();
    let mut seen: HashSet<Decimal> = HashSet::new();

    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let mut values = Vec::with_capacity(indices.len());

        for (column, index) in R::COLUMNS.iter().zip(&indices) {
            let raw = record.get(*index).unwrap_or("");
            let value = parse_amount(raw).ok_or_else(|| ValidationError::InvalidNumber {
                line,
                column: column.key,
                value: raw.to_string(),
            })?;
            if value.is_sign_negative() && !value.is_zero() {
                return Err(ValidationError::NegativeAmount {
                    line,
                    column: column.key,
                });
            }
            values.push(value);
        }

        let row = R::from_values(&values);
        if !seen.insert(row.threshold().normalize()) {
            return Err(ValidationError::DuplicateThreshold {
                line,
                threshold: row.threshold(),
            });
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ValidationError::Empty { kind: R::KIND });
    }

    Ok(CostTable::from_rows(rows))
}
