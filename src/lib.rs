//! # icesat2-hist
//!
//! Download ICESat-2 ATL06 granules for a bounding box and date range, then
//! pull the strong-beam residual histograms out of a granule as `.npy` files.
//!
//! ## Stages
//!
//! 1. [`config`] / [`cli`] build an immutable [`QueryConfiguration`]
//! 2. [`acquisition`] logs in to the archive, orders the `count` variable and
//!    downloads matching granules (skipped with `--noDownload`)
//! 3. [`extract`] opens the granule, picks the strong side from pair 1 and
//!    writes one histogram artifact per beam pair
//!
//! ## Quick Start
//!
//! ```no_run
//! use icesat2_hist::{
//!     AcquisitionClient, BeamHistogramExtractor, EarthdataService, Pipeline,
//!     QueryConfiguration, ServiceConfig, store,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = QueryConfiguration {
//!         skip_download: true,
//!         ..Default::default()
//!     };
//!
//!     let pipeline = Pipeline::new(
//!         AcquisitionClient::new(EarthdataService::new(ServiceConfig::default())?),
//!         BeamHistogramExtractor::new(store::default_store()),
//!     );
//!
//!     for artifact in pipeline.run(&config).await? {
//!         println!("{}", artifact.display());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Remote granule acquisition
pub mod acquisition;
/// Command line schema
pub mod cli;
/// Configuration types and defaults
pub mod config;
/// Error types
pub mod error;
/// Beam histogram extraction
pub mod extract;
/// Download-then-extract sequencing
pub mod pipeline;
/// Granule storage backends
pub mod store;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use acquisition::{AcquisitionClient, EarthdataService, RemoteDataService, RemoteSession};
pub use cli::{Invocation, parse_invocation};
pub use config::{Credentials, DateRange, QueryConfiguration, ServiceConfig, SpatialExtent};
pub use error::{AcquisitionError, Error, ExtractionError, Result};
pub use extract::{BeamHistogramExtractor, BeamPair, BeamSide, GroundTrack};
pub use pipeline::Pipeline;
pub use store::{GranuleHandle, HierarchicalStore, HistogramArray};
