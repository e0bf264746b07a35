//! Tiered cost tables: row types, CSV ingestion and export, and the table store.

pub mod domain;
pub mod exporter;
pub mod importer;
mod normalizer;
pub mod store;

pub use domain::{BondCostRow, ColumnSpec, CostRow, CostTable, TableKind, TransferCostRow};
pub use exporter::{export_csv, ExportError};
pub use importer::{import_csv, ValidationError};
pub use store::{CostTableStore, FileCostTableStore, InMemoryCostTableStore, StoreError};
pub use normalizer::parse_amount;
