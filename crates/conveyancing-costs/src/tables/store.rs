use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, RwLock};

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::domain::{BondCostRow, CostRow, CostTable, TransferCostRow};
use crate::snapshot::{SnapshotError, SnapshotFile};

/// Storage abstraction for the two cost tables.
///
/// Reads hand out an immutable snapshot; replacement swaps in a fully built table,
/// so readers observe either the previous or the new table and never a partial one.
pub trait CostTableStore: Send + Sync {
    fn transfer_table(&self) -> Result<Arc<CostTable<TransferCostRow>>, StoreError>;
    fn bond_table(&self) -> Result<Arc<CostTable<BondCostRow>>, StoreError>;
    fn replace_transfer_table(&self, table: CostTable<TransferCostRow>) -> Result<(), StoreError>;
    fn replace_bond_table(&self, table: CostTable<BondCostRow>) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cost table store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("cost table snapshot {path} is unreadable: {detail}")]
    Corrupt { path: String, detail: String },
}

#[derive(Debug, Default)]
pub struct InMemoryCostTableStore {
    transfer: RwLock<Arc<CostTable<TransferCostRow>>>,
    bond: RwLock<Arc<CostTable<BondCostRow>>>,
}

impl InMemoryCostTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(
        transfer: CostTable<TransferCostRow>,
        bond: CostTable<BondCostRow>,
    ) -> Self {
        Self {
            transfer: RwLock::new(Arc::new(transfer)),
            bond: RwLock::new(Arc::new(bond)),
        }
    }
}

fn read_slot<T>(slot: &RwLock<Arc<T>>) -> Result<Arc<T>, StoreError> {
    slot.read()
        .map(|guard| Arc::clone(&guard))
        .map_err(|_| StoreError::Unavailable("table lock poisoned".to_string()))
}

fn swap_slot<T>(slot: &RwLock<Arc<T>>, value: T) -> Result<(), StoreError> {
    let mut guard = slot
        .write()
        .map_err(|_| StoreError::Unavailable("table lock poisoned".to_string()))?;
    *guard = Arc::new(value);
    Ok(())
}

impl CostTableStore for InMemoryCostTableStore {
    fn transfer_table(&self) -> Result<Arc<CostTable<TransferCostRow>>, StoreError> {
        read_slot(&self.transfer)
    }

    fn bond_table(&self) -> Result<Arc<CostTable<BondCostRow>>, StoreError> {
        read_slot(&self.bond)
    }

    fn replace_transfer_table(&self, table: CostTable<TransferCostRow>) -> Result<(), StoreError> {
        swap_slot(&self.transfer, table)
    }

    fn replace_bond_table(&self, table: CostTable<BondCostRow>) -> Result<(), StoreError> {
        swap_slot(&self.bond, table)
    }
}

/// Cost tables cached in memory and persisted as JSON snapshots under a data directory.
///
/// Each table has its own writer lock held across the snapshot write and the in-memory swap,
/// so the file on disk always holds the table being served.
#[derive(Debug)]
pub struct FileCostTableStore {
    cache: InMemoryCostTableStore,
    transfer_file: SnapshotFile,
    bond_file: SnapshotFile,
    transfer_writer: Mutex<()>,
    bond_writer: Mutex<()>,
}

impl FileCostTableStore {
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let transfer_file = SnapshotFile::new(data_dir.join("transfer_costs.json"));
        let bond_file = SnapshotFile::new(data_dir.join("bond_costs.json"));

        let transfer: CostTable<TransferCostRow> = load_snapshot(&transfer_file)?;
        let bond: CostTable<BondCostRow> = load_snapshot(&bond_file)?;

        info!(
            data_dir = %data_dir.display(),
            transfer_rows = transfer.len(),
            bond_rows = bond.len(),
            "loaded cost tables"
        );

        Ok(Self {
            cache: InMemoryCostTableStore::with_tables(transfer, bond),
            transfer_file,
            bond_file,
            transfer_writer: Mutex::new(()),
            bond_writer: Mutex::new(()),
        })
    }
}

/// One stored row: column key to the exact decimal text, so amounts reload without float rounding.
type StoredRow = BTreeMap<String, String>;

fn encode_rows<R: CostRow>(table: &CostTable<R>) -> Vec<StoredRow> {
    table
        .rows()
        .iter()
        .map(|row| {
            R::COLUMNS
                .iter()
                .zip(row.values())
                .map(|(column, value)| (column.key.to_string(), value.to_string()))
                .collect()
        })
        .collect()
}

fn decode_rows<R: CostRow>(
    file: &SnapshotFile,
    stored: Vec<StoredRow>,
) -> Result<CostTable<R>, StoreError> {
    let corrupt = |index: usize, column: &str| StoreError::Corrupt {
        path: file.path().display().to_string(),
        detail: format!("row {} has no valid '{column}' amount", index + 1),
    };

    let rows = stored
        .iter()
        .enumerate()
        .map(|(index, stored_row)| {
            let values = R::COLUMNS
                .iter()
                .map(|column| {
                    stored_row
                        .get(column.key)
                        .and_then(|raw| Decimal::from_str(raw).ok())
                        .ok_or_else(|| corrupt(index, column.key))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(R::from_values(&values))
        })
        .collect::<Result<Vec<R>, StoreError>>()?;

    Ok(CostTable::from_rows(rows))
}

fn load_snapshot<R: CostRow>(file: &SnapshotFile) -> Result<CostTable<R>, StoreError> {
    match file.read::<Vec<StoredRow>>()? {
        Some(stored) => decode_rows(file, stored),
        None => Ok(CostTable::empty()),
    }
}

fn persist_then_swap<R: CostRow>(
    writer: &Mutex<()>,
    file: &SnapshotFile,
    table: CostTable<R>,
    swap: impl FnOnce(CostTable<R>) -> Result<(), StoreError>,
) -> Result<(), StoreError> {
    let _guard = writer
        .lock()
        .map_err(|_| StoreError::Unavailable("snapshot writer lock poisoned".to_string()))?;
    file.write(&encode_rows(&table))?;
    debug!(path = %file.path().display(), kind = %R::KIND, "persisted cost table");
    swap(table)
}

impl CostTableStore for FileCostTableStore {
    fn transfer_table(&self) -> Result<Arc<CostTable<TransferCostRow>>, StoreError> {
        self.cache.transfer_table()
    }

    fn bond_table(&self) -> Result<Arc<CostTable<BondCostRow>>, StoreError> {
        self.cache.bond_table()
    }

    fn replace_transfer_table(&self, table: CostTable<TransferCostRow>) -> Result<(), StoreError> {
        persist_then_swap(&self.transfer_writer, &self.transfer_file, table, |table| {
            self.cache.replace_transfer_table(table)
        })
    }

    fn replace_bond_table(&self, table: CostTable<BondCostRow>) -> Result<(), StoreError> {
        persist_then_swap(&self.bond_writer, &self.bond_file, table, |table| {
            self.cache.replace_bond_table(table)
        })
    }
}
