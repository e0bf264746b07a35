//! JSON snapshot files written with a temp-file-then-rename swap, so a crash or a
//! concurrent reader never observes a half-written snapshot.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot io failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("snapshot at {path} is not valid JSON: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

static STAGING_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `Ok(None)` when the snapshot has never been written.
    pub fn read<T: DeserializeOwned>(&self) -> Result<Option<T>, SnapshotError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| SnapshotError::Decode {
                path: self.path.clone(),
                source,
            })
    }

    /// Every call stages into its own file, so overlapping writers never rename each other's output.
    /// Callers that must keep disk and memory in step serialize their writes themselves.
    pub fn write<T: Serialize>(&self, value: &T) -> Result<(), SnapshotError> {
        let encoded = serde_json::to_vec_pretty(value)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let staging = self.staging_path();
        let written = fs::File::create(&staging).and_then(|mut file| {
            file.write_all(&encoded)?;
            file.sync_all()
        });
        if let Err(source) = written {
            let _ = fs::remove_file(&staging);
            return Err(self.io_error(source));
        }

        fs::rename(&staging, &self.path).map_err(|source| {
            let _ = fs::remove_file(&staging);
            self.io_error(source)
        })
    }

    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot".to_string());
        let sequence = STAGING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        self.path
            .with_file_name(format!(".{name}.{}.{sequence}.tmp", std::process::id()))
    }

    fn io_error(&self, source: io::Error) -> SnapshotError {
        SnapshotError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
pub(crate) fn scratch_dir(label: &str) -> PathBuf {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);

    let dir = std::env::temp_dir().join(format!(
        "conveyancing-costs-{label}-{}-{}",
        std::process::id(),
        SEQUENCE.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_snapshot_reads_as_none() {
        let dir = scratch_dir("missing");
        let file = SnapshotFile::new(dir.join("absent.json"));
        let value: Option<Vec<u32>> = file.read().expect("read succeeds");
        assert!(value.is_none());
    }

    #[test]
    fn write_then_read_creates_parent_directories() {
        let dir = scratch_dir("write");
        let file = SnapshotFile::new(dir.join("nested").join("values.json"));
        file.write(&vec![1_u32, 2, 3]).expect("write succeeds");

        let value: Option<Vec<u32>> = file.read().expect("read succeeds");
        assert_eq!(value, Some(vec![1, 2, 3]));
        let leftovers: Vec<_> = fs::read_dir(dir.join("nested"))
            .expect("list dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn overlapping_writers_each_complete_their_rename() {
        let dir = scratch_dir("overlap");
        let file = SnapshotFile::new(dir.join("values.json"));

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4_u32)
                .map(|writer| {
                    let file = &file;
                    scope.spawn(move || {
                        for round in 0..25_u32 {
                            file.write(&vec![writer, round]).expect("write succeeds");
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().expect("writer thread");
            }
        });

        let value: Vec<u32> = file.read().expect("read").expect("written");
        assert_eq!(value.len(), 2);
        assert_eq!(value[1], 24);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn corrupt_snapshot_reports_decode_error() {
        let dir = scratch_dir("corrupt");
        fs::create_dir_all(&dir).expect("create dir");
        let path = dir.join("broken.json");
        fs::write(&path, b"{not json").expect("write fixture");

        let error = SnapshotFile::new(&path)
            .read::<Vec<u32>>()
            .expect_err("decode fails");
        assert!(matches!(error, SnapshotError::Decode { .. }));
        let _ = fs::remove_dir_all(dir);
    }
}
