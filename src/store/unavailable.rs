//! Store used when no HDF5 backend is compiled in

use super::{GranuleHandle, HierarchicalStore};
use crate::error::{ExtractionError, Result};
use std::path::Path;

/// Fails every open with a pointer to the `hdf5` cargo feature
///
/// Lets the binary build on machines without libhdf5 while still reporting
/// a clear file-access error instead of silently doing nothing.
pub struct UnavailableStore;

impl HierarchicalStore for UnavailableStore {
    fn open(&self, path: &Path) -> Result<Box<dyn GranuleHandle>> {
        Err(ExtractionError::FileAccess {
            path: path.to_path_buf(),
            reason: "HDF5 support is not compiled in; rebuild with `--features hdf5`".to_string(),
        }
        .into())
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}
