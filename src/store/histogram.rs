//! Dtype-preserving numeric arrays read from granules

use crate::error::{ExtractionError, Result};
use ndarray::{Array1, ArrayD};
use ndarray_npy::write_npy;
use std::path::Path;

/// A numeric dataset as stored in the granule
///
/// One variant per element type, so the `.npy` artifact carries the same
/// bytes as the source dataset.
#[derive(Clone, Debug, PartialEq)]
pub enum HistogramArray {
    /// 8-bit signed integers
    Int8(ArrayD<i8>),
    /// 16-bit signed integers
    Int16(ArrayD<i16>),
    /// 32-bit signed integers
    Int32(ArrayD<i32>),
    /// 64-bit signed integers
    Int64(ArrayD<i64>),
    /// 8-bit unsigned integers
    UInt8(ArrayD<u8>),
    /// 16-bit unsigned integers
    UInt16(ArrayD<u16>),
    /// 32-bit unsigned integers
    UInt32(ArrayD<u32>),
    /// 64-bit unsigned integers
    UInt64(ArrayD<u64>),
    /// 32-bit floats
    Float32(ArrayD<f32>),
    /// 64-bit floats
    Float64(ArrayD<f64>),
}

// Apply the same expression to the array inside any variant
macro_rules! each_variant {
    ($value:expr, $array:ident => $body:expr) => {
        match $value {
            HistogramArray::Int8($array) => $body,
            HistogramArray::Int16($array) => $body,
            HistogramArray::Int32($array) => $body,
            HistogramArray::Int64($array) => $body,
            HistogramArray::UInt8($array) => $body,
            HistogramArray::UInt16($array) => $body,
            HistogramArray::UInt32($array) => $body,
            HistogramArray::UInt64($array) => $body,
            HistogramArray::Float32($array) => $body,
            HistogramArray::Float64($array) => $body,
        }
    };
}

impl HistogramArray {
    /// Array dimensions
    pub fn shape(&self) -> &[usize] {
        each_variant!(self, a => a.shape())
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// True when the array holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// NumPy-style dtype name
    pub fn dtype(&self) -> &'static str {
        match self {
            HistogramArray::Int8(_) => "int8",
            HistogramArray::Int16(_) => "int16",
            HistogramArray::Int32(_) => "int32",
            HistogramArray::Int64(_) => "int64",
            HistogramArray::UInt8(_) => "uint8",
            HistogramArray::UInt16(_) => "uint16",
            HistogramArray::UInt32(_) => "uint32",
            HistogramArray::UInt64(_) => "uint64",
            HistogramArray::Float32(_) => "float32",
            HistogramArray::Float64(_) => "float64",
        }
    }

    /// Write the array to `path` in `.npy` format, replacing any existing file
    pub fn write_npy(&self, path: &Path) -> Result<()> {
        let written = each_variant!(self, a => write_npy(path, a));

        written.map_err(|e| {
            ExtractionError::ArtifactWrite {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

macro_rules! from_vec {
    ($($element:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$element>> for HistogramArray {
                fn from(values: Vec<$element>) -> Self {
                    HistogramArray::$variant(Array1::from(values).into_dyn())
                }
            }

            impl From<ArrayD<$element>> for HistogramArray {
                fn from(values: ArrayD<$element>) -> Self {
                    HistogramArray::$variant(values)
                }
            }
        )*
    };
}

from_vec! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
}
