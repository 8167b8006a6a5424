use async_trait::async_trait;
use phrase_core::model::UnitFile;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FetchError {
    #[error("unit file not found: {0}")]
    NotFound(String),

    #[error("io error reading {path}: {message}")]
    Io { path: String, message: String },
}

/// Source of raw unit file text.
#[async_trait]
pub trait UnitFetcher: Send + Sync {
    /// Fetch the raw text of a unit file.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the file is missing or unreadable.
    async fn fetch(&self, file: &UnitFile) -> Result<String, FetchError>;
}

/// Reads unit files relative to a data directory.
#[derive(Clone, Debug)]
pub struct FsUnitFetcher {
    root: PathBuf,
}

impl FsUnitFetcher {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl UnitFetcher for FsUnitFetcher {
    async fn fetch(&self, file: &UnitFile) -> Result<String, FetchError> {
        let path = self.root.join(&file.path);
        tokio::fs::read_to_string(&path).await.map_err(|err| {
            let path = path.display().to_string();
            if err.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(path)
            } else {
                FetchError::Io {
                    path,
                    message: err.to_string(),
                }
            }
        })
    }
}

/// In-memory unit files for tests and demos.
#[derive(Clone, Default)]
pub struct InMemoryFetcher {
    files: Arc<Mutex<HashMap<String, Result<String, FetchError>>>>,
    fetches: Arc<AtomicUsize>,
    latency: Option<Duration>,
}

impl InMemoryFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every fetch, so concurrent loads overlap.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert(&self, path: impl Into<String>, text: impl Into<String>) {
        self.set(path.into(), Ok(text.into()));
    }

    /// Make fetching `path` fail until it is inserted again.
    pub fn fail(&self, path: impl Into<String>, error: FetchError) {
        self.set(path.into(), Err(error));
    }

    /// Number of fetches performed so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn set(&self, path: String, entry: Result<String, FetchError>) {
        let mut guard = self
            .files
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(path, entry);
    }
}

#[async_trait]
impl UnitFetcher for InMemoryFetcher {
    async fn fetch(&self, file: &UnitFile) -> Result<String, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let guard = self
            .files
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard
            .get(&file.path)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::NotFound(file.path.clone())))
    }
}
