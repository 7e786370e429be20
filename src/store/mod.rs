//! Hierarchical granule storage
//!
//! The extractor only needs three things from a granule file: open it, read a
//! string attribute from a group, and read a numeric dataset by path. Those
//! capabilities are expressed as the [`HierarchicalStore`] and
//! [`GranuleHandle`] traits so the on-disk format stays behind one seam.
//!
//! ## Implementations
//!
//! - [`Hdf5Store`]: reads real HDF5 granules (cargo feature `hdf5`)
//! - [`MemoryStore`]: path-keyed in-memory granules, used by tests and demos
//! - [`UnavailableStore`]: fails every open when no HDF5 backend was compiled in
//!
//! A [`GranuleHandle`] releases the underlying file when dropped.

#[cfg(feature = "hdf5")]
mod h5;
mod histogram;
mod memory;
mod unavailable;

#[cfg(feature = "hdf5")]
pub use h5::Hdf5Store;
pub use histogram::HistogramArray;
pub use memory::{MemoryGranule, MemoryStore};
pub use unavailable::UnavailableStore;

use crate::error::Result;
use std::path::Path;

/// An opened granule file
pub trait GranuleHandle {
    /// Read a string attribute attached to a group or dataset
    ///
    /// # Errors
    ///
    /// `ExtractionError::AttributeNotFound` when the object or attribute is missing.
    fn read_attribute(&self, object: &str, attribute: &str) -> Result<String>;

    /// Read a numeric dataset by its in-file path (e.g. `gt1l/residual_histogram/count`)
    ///
    /// # Errors
    ///
    /// `ExtractionError::DatasetNotFound` when nothing exists at `dataset`.
    fn read_dataset(&self, dataset: &str) -> Result<HistogramArray>;
}

/// Opens granule files for reading
pub trait HierarchicalStore: Send + Sync {
    /// Open `path` read-only
    ///
    /// # Errors
    ///
    /// `ExtractionError::FileAccess` when the path is missing or not a valid store.
    fn open(&self, path: &Path) -> Result<Box<dyn GranuleHandle>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Whether this build can read real HDF5 granules
pub const HDF5_ENABLED: bool = cfg!(feature = "hdf5");

/// The store the binary uses: HDF5 when compiled in, otherwise [`UnavailableStore`]
pub fn default_store() -> Box<dyn HierarchicalStore> {
    #[cfg(feature = "hdf5")]
    {
        Box::new(Hdf5Store)
    }
    #[cfg(not(feature = "hdf5"))]
    {
        Box::new(UnavailableStore)
    }
}

impl<S: HierarchicalStore + ?Sized> HierarchicalStore for Box<S> {
    fn open(&self, path: &Path) -> Result<Box<dyn GranuleHandle>> {
        (**self).open(path)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
