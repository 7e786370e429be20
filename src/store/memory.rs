//! In-memory granule store

use super::{GranuleHandle, HierarchicalStore, HistogramArray};
use crate::error::{ExtractionError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Contents of one in-memory granule
#[derive(Clone, Debug, Default)]
pub struct MemoryGranule {
    attributes: HashMap<(String, String), String>,
    datasets: HashMap<String, HistogramArray>,
}

impl MemoryGranule {
    /// Empty granule
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a string attribute to `object`
    pub fn with_attribute(
        mut self,
        object: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes
            .insert((object.into(), attribute.into()), value.into());
        self
    }

    /// Store a dataset at `path`
    pub fn with_dataset(mut self, path: impl Into<String>, data: impl Into<HistogramArray>) -> Self {
        self.datasets.insert(path.into(), data.into());
        self
    }
}

/// Path-keyed collection of [`MemoryGranule`]s
///
/// Tracks how many handles are currently open so callers can check that every
/// handle was released.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    granules: Arc<Mutex<HashMap<PathBuf, MemoryGranule>>>,
    open_handles: Arc<AtomicUsize>,
    opens: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `granule` under `path`, replacing any previous entry
    pub fn insert(&self, path: impl Into<PathBuf>, granule: MemoryGranule) {
        if let Ok(mut granules) = self.granules.lock() {
            granules.insert(path.into(), granule);
        }
    }

    /// Handles opened and not yet dropped
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    /// Successful `open` calls so far
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl HierarchicalStore for MemoryStore {
    fn open(&self, path: &Path) -> Result<Box<dyn GranuleHandle>> {
        let granule = self
            .granules
            .lock()
            .ok()
            .and_then(|granules| granules.get(path).cloned())
            .ok_or_else(|| ExtractionError::FileAccess {
                path: path.to_path_buf(),
                reason: "no such granule".to_string(),
            })?;

        self.opens.fetch_add(1, Ordering::SeqCst);
        self.open_handles.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MemoryHandle {
            path: path.to_path_buf(),
            granule,
            open_handles: Arc::clone(&self.open_handles),
        }))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

struct MemoryHandle {
    path: PathBuf,
    granule: MemoryGranule,
    open_handles: Arc<AtomicUsize>,
}

impl GranuleHandle for MemoryHandle {
    fn read_attribute(&self, object: &str, attribute: &str) -> Result<String> {
        self.granule
            .attributes
            .get(&(object.to_string(), attribute.to_string()))
            .cloned()
            .ok_or_else(|| {
                ExtractionError::AttributeNotFound {
                    object: object.to_string(),
                    attribute: attribute.to_string(),
                }
                .into()
            })
    }

    fn read_dataset(&self, dataset: &str) -> Result<HistogramArray> {
        self.granule.datasets.get(dataset).cloned().ok_or_else(|| {
            ExtractionError::DatasetNotFound {
                path: self.path.clone(),
                dataset: dataset.to_string(),
            }
            .into()
        })
    }
}

impl Drop for MemoryHandle {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}
