//! Error types for icesat2-hist
//!
//! Every stage of the pipeline reports failures through [`Error`]:
//! - configuration problems from the command line or the service config file
//! - remote acquisition failures (login, order, download)
//! - extraction failures while reading a granule or writing artifacts
//!
//! Nothing is recovered locally. The first error aborts the run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for icesat2-hist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for icesat2-hist
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which option is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The option that caused the error (e.g., "EXTENT")
        key: Option<String>,
    },

    /// Remote acquisition failed (login, order, download)
    #[error("acquisition error: {0}")]
    Acquisition(#[from] AcquisitionError),

    /// Histogram extraction failed
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build a configuration error tied to a named option
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// True when the error came from the acquisition stage
    pub fn is_acquisition(&self) -> bool {
        matches!(self, Error::Acquisition(_))
    }

    /// True when the error came from the extraction stage
    pub fn is_extraction(&self) -> bool {
        matches!(self, Error::Extraction(_))
    }
}

/// Failures talking to the remote data archive
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The archive rejected the credentials, or none were available
    #[error("authentication failed: {reason}")]
    Authentication {
        /// Why the login was refused
        reason: String,
    },

    /// The order could not be formed or was refused by the catalog
    #[error("order rejected: {reason}")]
    Order {
        /// Why the order failed
        reason: String,
    },

    /// Granules could not be fetched or stored
    #[error("download failed: {reason}")]
    Download {
        /// Why the download failed
        reason: String,
    },
}

impl AcquisitionError {
    /// Shorthand for an authentication failure
    pub fn authentication(reason: impl Into<String>) -> Self {
        AcquisitionError::Authentication {
            reason: reason.into(),
        }
    }

    /// Shorthand for an order failure
    pub fn order(reason: impl Into<String>) -> Self {
        AcquisitionError::Order {
            reason: reason.into(),
        }
    }

    /// Shorthand for a download failure
    pub fn download(reason: impl Into<String>) -> Self {
        AcquisitionError::Download {
            reason: reason.into(),
        }
    }
}

/// Failures reading a granule or persisting its histograms
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The granule could not be opened as a hierarchical store
    #[error("cannot open {path}: {reason}")]
    FileAccess {
        /// The granule path
        path: PathBuf,
        /// Why the open failed
        reason: String,
    },

    /// A metadata attribute is missing
    #[error("attribute {attribute} not found on {object}")]
    AttributeNotFound {
        /// Group or dataset the attribute was looked up on
        object: String,
        /// The attribute name
        attribute: String,
    },

    /// A dataset path is missing from the granule
    #[error("dataset {dataset} not found in {path}")]
    DatasetNotFound {
        /// The granule path
        path: PathBuf,
        /// The in-file dataset path
        dataset: String,
    },

    /// A histogram artifact could not be written
    #[error("failed to write {path}: {reason}")]
    ArtifactWrite {
        /// The artifact path
        path: PathBuf,
        /// Why the write failed
        reason: String,
    },
}
