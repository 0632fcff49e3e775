//! Partitioned Parquet store layout and the availability guard.
//!
//! The on-disk layout is `<root>/symbol=<SYMBOL>/*.parquet`, one directory
//! per symbol. Existence of a partition directory is the only signal that a
//! symbol has pruned storage; its absence is a routing decision, not an
//! error.

pub mod engine;
pub mod select;

use std::path::{Path, PathBuf};

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The store is available once the root exists and holds at least one
    /// Parquet file anywhere beneath it. Re-scans on every call; the probe is
    /// cheap next to the query it gates.
    pub fn available(&self) -> bool {
        self.root.is_dir() && has_parquet_file(&self.root)
    }

    pub fn ensure_available(&self) -> Result<(), ApiError> {
        if self.available() {
            Ok(())
        } else {
            Err(ApiError::StoreNotReady)
        }
    }

    /// Glob covering every partition.
    pub fn full_scan_glob(&self) -> String {
        format!("{}/**/*.parquet", normalize_path(&self.root))
    }

    /// Glob for one symbol's partition, if that partition exists.
    /// `symbol` must already be normalized (trimmed, uppercase).
    pub fn partition_glob(&self, symbol: &str) -> Option<String> {
        let dir = self.root.join(format!("symbol={symbol}"));
        dir.is_dir()
            .then(|| format!("{}/*.parquet", normalize_path(&dir)))
    }
}

fn has_parquet_file(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if has_parquet_file(&path) {
                return true;
            }
        } else if path.extension().is_some_and(|ext| ext == "parquet") {
            return true;
        }
    }
    false
}

/// Forward slashes regardless of platform, for glob consumption.
fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_root_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path().join("nope"));
        assert!(!store.available());
        assert!(store.ensure_available().is_err());
    }

    #[test]
    fn empty_root_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("symbol=TCS")).unwrap();
        let store = Store::new(tmp.path());
        assert!(!store.available());
    }

    #[test]
    fn nested_parquet_file_makes_store_available() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("symbol=TCS");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("data.parquet"), b"").unwrap();
        let store = Store::new(tmp.path());
        assert!(store.available());
        assert!(store.ensure_available().is_ok());
    }

    #[test]
    fn partition_glob_requires_directory() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("symbol=INFY")).unwrap();
        let store = Store::new(tmp.path());
        assert!(store.partition_glob("INFY").is_some());
        assert!(store.partition_glob("RELIANCE").is_none());
    }
}
