//! HDF5-backed granule store

use super::{GranuleHandle, HierarchicalStore, HistogramArray};
use crate::error::{ExtractionError, Result};
use ::hdf5::types::{FixedAscii, FloatSize, IntSize, TypeDescriptor, VarLenAscii, VarLenUnicode};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads granules with libhdf5
pub struct Hdf5Store;

impl HierarchicalStore for Hdf5Store {
    fn open(&self, path: &Path) -> Result<Box<dyn GranuleHandle>> {
        debug!(?path, "opening HDF5 granule");

        let file = ::hdf5::File::open(path).map_err(|e| ExtractionError::FileAccess {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Box::new(Hdf5Handle {
            path: path.to_path_buf(),
            file,
        }))
    }

    fn name(&self) -> &'static str {
        "hdf5"
    }
}

/// Read `ds` with its stored element type
fn read_as<T>(ds: &::hdf5::Dataset) -> ::hdf5::Result<HistogramArray>
where
    T: ::hdf5::H5Type,
    HistogramArray: From<ndarray::ArrayD<T>>,
{
    ds.read_dyn::<T>().map(HistogramArray::from)
}

struct Hdf5Handle {
    path: PathBuf,
    file: ::hdf5::File,
}

impl Hdf5Handle {
    fn attribute(&self, object: &str, attribute: &str) -> Option<::hdf5::Attribute> {
        if let Ok(group) = self.file.group(object) {
            return group.attr(attribute).ok();
        }
        self.file
            .dataset(object)
            .ok()
            .and_then(|ds| ds.attr(attribute).ok())
    }
}

impl GranuleHandle for Hdf5Handle {
    fn read_attribute(&self, object: &str, attribute: &str) -> Result<String> {
        let not_found = || ExtractionError::AttributeNotFound {
            object: object.to_string(),
            attribute: attribute.to_string(),
        };

        let attr = self.attribute(object, attribute).ok_or_else(not_found)?;

        // Granule metadata mixes fixed and variable length strings
        let value = attr
            .read_scalar::<VarLenUnicode>()
            .map(|s| s.as_str().to_string())
            .or_else(|_| {
                attr.read_scalar::<VarLenAscii>()
                    .map(|s| s.as_str().to_string())
            })
            .or_else(|_| {
                attr.read_scalar::<FixedAscii<64>>()
                    .map(|s| s.as_str().to_string())
            })
            .map_err(|_| not_found())?;

        Ok(value.trim_end_matches(['\0', ' ']).to_string())
    }

    fn read_dataset(&self, dataset: &str) -> Result<HistogramArray> {
        let not_found = || ExtractionError::DatasetNotFound {
            path: self.path.clone(),
            dataset: dataset.to_string(),
        };

        if !self.file.link_exists(dataset) {
            return Err(not_found().into());
        }

        let ds = self.file.dataset(dataset).map_err(|_| not_found())?;
        let read_failed = |e: ::hdf5::Error| ExtractionError::FileAccess {
            path: self.path.clone(),
            reason: format!("failed to read {}: {}", dataset, e),
        };

        let descriptor = ds
            .dtype()
            .and_then(|t| t.to_descriptor())
            .map_err(read_failed)?;

        let array = match descriptor {
            TypeDescriptor::Integer(IntSize::U1) => read_as::<i8>(&ds),
            TypeDescriptor::Integer(IntSize::U2) => read_as::<i16>(&ds),
            TypeDescriptor::Integer(IntSize::U4) => read_as::<i32>(&ds),
            TypeDescriptor::Integer(IntSize::U8) => read_as::<i64>(&ds),
            TypeDescriptor::Unsigned(IntSize::U1) => read_as::<u8>(&ds),
            TypeDescriptor::Unsigned(IntSize::U2) => read_as::<u16>(&ds),
            TypeDescriptor::Unsigned(IntSize::U4) => read_as::<u32>(&ds),
            TypeDescriptor::Unsigned(IntSize::U8) => read_as::<u64>(&ds),
            TypeDescriptor::Float(FloatSize::U4) => read_as::<f32>(&ds),
            TypeDescriptor::Float(FloatSize::U8) => read_as::<f64>(&ds),
            other => {
                return Err(ExtractionError::FileAccess {
                    path: self.path.clone(),
                    reason: format!("{} has non-numeric type {:?}", dataset, other),
                }
                .into());
            }
        }
        .map_err(read_failed)?;

        debug!(
            dataset,
            dtype = array.dtype(),
            shape = ?array.shape(),
            "read dataset"
        );

        Ok(array)
    }
}
