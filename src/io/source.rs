use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use log::{trace, warn};

use crate::error::FetchError;

/// The `locator -> bytes` boundary every category loader fetches through.
/// Network retry/backoff is deliberately not this trait's concern.
pub trait AssetSource: Send + Sync {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>, FetchError>;
}

/// Serves locators relative to a root directory.
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsAssetSource {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.root.join(locator);
        trace!("Fetching {} from {}", locator, path.display());
        std::fs::read(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => {
                warn!("Could not locate {}!", locator);
                FetchError::NotFound(locator.to_owned())
            }
            _ => FetchError::Io {
                locator: locator.to_owned(),
                source,
            },
        })
    }
}

/// In-memory source for embedded payloads and tests. Counts fetches per
/// locator so callers can assert a resource was fetched exactly once.
#[derive(Default)]
pub struct MemoryAssetSource {
    payloads: DashMap<String, Vec<u8>>,
    fetches: DashMap<String, AtomicUsize>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, locator: impl Into<String>, payload: impl Into<Vec<u8>>) {
        self.payloads.insert(locator.into(), payload.into());
    }

    pub fn fetch_count(&self, locator: &str) -> usize {
        self.fetches
            .get(locator)
            .map(|count| count.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches
            .iter()
            .map(|count| count.load(Ordering::SeqCst))
            .sum()
    }
}

impl AssetSource for MemoryAssetSource {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>, FetchError> {
        self.fetches
            .entry(locator.to_owned())
            .or_default()
            .fetch_add(1, Ordering::SeqCst);

        match self.payloads.get(locator) {
            Some(payload) => Ok(payload.value().clone()),
            None => {
                warn!("Could not locate {}!", locator);
                Err(FetchError::NotFound(locator.to_owned()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_counts_fetches() {
        let source = MemoryAssetSource::new();
        source.insert("a.bin", vec![1, 2, 3]);

        assert_eq!(source.fetch("a.bin").expect("payload present"), vec![1, 2, 3]);
        assert_eq!(source.fetch("a.bin").expect("payload present"), vec![1, 2, 3]);
        assert_eq!(source.fetch_count("a.bin"), 2);
        assert_eq!(source.fetch_count("missing.bin"), 0);
    }

    #[test]
    fn memory_source_misses_count_too() {
        let source = MemoryAssetSource::new();
        assert!(matches!(
            source.fetch("missing.bin"),
            Err(FetchError::NotFound(_))
        ));
        assert_eq!(source.fetch_count("missing.bin"), 1);
    }

    #[test]
    fn fs_source_reads_relative_to_root() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("blob.bin"), [7u8, 8, 9]).expect("write fixture");

        let source = FsAssetSource::new(dir.path());
        assert_eq!(source.fetch("blob.bin").expect("file present"), vec![7, 8, 9]);
        assert!(matches!(
            source.fetch("nope.bin"),
            Err(FetchError::NotFound(_))
        ));
    }
}
