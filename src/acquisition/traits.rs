//! Traits and types for remote granule acquisition

use crate::config::{Credentials, DateRange, QueryConfiguration, SpatialExtent};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// What to search the archive for
#[derive(Debug, Clone, PartialEq)]
pub struct GranuleQuery {
    /// Archive product identifier (e.g. "ATL06")
    pub short_name: String,
    /// Spatial bounding box
    pub spatial_extent: SpatialExtent,
    /// Inclusive date range
    pub date_range: DateRange,
}

impl From<&QueryConfiguration> for GranuleQuery {
    fn from(config: &QueryConfiguration) -> Self {
        Self {
            short_name: config.short_name.clone(),
            spatial_extent: config.spatial_extent,
            date_range: config.date_range.clone(),
        }
    }
}

/// A remote data archive that can open query-scoped sessions
///
/// # Examples
///
/// ```no_run
/// use icesat2_hist::acquisition::{EarthdataService, GranuleQuery, RemoteDataService};
/// use icesat2_hist::config::{QueryConfiguration, ServiceConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = EarthdataService::new(ServiceConfig::default())?;
/// let query = GranuleQuery::from(&QueryConfiguration::default());
/// let session = service.open_session(&query).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait RemoteDataService: Send + Sync {
    /// Start a session scoped to `query`
    ///
    /// # Errors
    ///
    /// `AcquisitionError::Order` when the product cannot be resolved.
    async fn open_session(&self, query: &GranuleQuery) -> crate::Result<Box<dyn RemoteSession>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// One query against the archive: login, order, download
#[async_trait]
pub trait RemoteSession: Send {
    /// Log in
    ///
    /// # Errors
    ///
    /// `AcquisitionError::Authentication` when the archive rejects the credentials.
    async fn authenticate(&mut self, credentials: &Credentials) -> crate::Result<()>;

    /// Add derived variables to the pending order
    ///
    /// # Errors
    ///
    /// `AcquisitionError::Order` when a variable is not offered by the catalog.
    async fn append_order_variables(&mut self, variables: &[String]) -> crate::Result<()>;

    /// Fetch every matching granule into `directory`
    ///
    /// # Errors
    ///
    /// `AcquisitionError::Download` on network or storage failure. The
    /// directory may hold partial results afterwards.
    async fn download_granules(&mut self, directory: &Path) -> crate::Result<Vec<PathBuf>>;
}
