//! Remote granule acquisition
//!
//! [`AcquisitionClient`] runs the fixed login → order → download sequence
//! against any [`RemoteDataService`]. Every step either succeeds or aborts the
//! run; nothing is retried here.
//!
//! ## Implementations
//!
//! - [`EarthdataService`]: NASA Earthdata Login, CMR and the NSIDC EGI order API

mod archive;
mod earthdata;
mod traits;


pub use archive::unpack_order_archive;
pub use earthdata::EarthdataService;
pub use traits::{GranuleQuery, RemoteDataService, RemoteSession};

use crate::config::{ORDER_VARIABLES, QueryConfiguration};
use crate::error::Result;
use std::path::PathBuf;
use tracing::info;

/// Drives one download through a [`RemoteDataService`]
pub struct AcquisitionClient<S> {
    service: S,
}

impl<S: RemoteDataService> AcquisitionClient<S> {
    /// Create a client over `service`
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// The underlying service
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Log in, order the `count` variable and download matching granules into
    /// `config.directory`
    ///
    /// Steps run strictly in order and the first failure is returned as-is.
    pub async fn download(&self, config: &QueryConfiguration) -> Result<Vec<PathBuf>> {
        let query = GranuleQuery::from(config);
        info!(
            service = self.service.name(),
            short_name = %query.short_name,
            extent = %query.spatial_extent,
            dates = %query.date_range,
            "opening archive session"
        );

        let mut session = self.service.open_session(&query).await?;

        session.authenticate(&config.credentials).await?;
        info!(user = %config.credentials.user, "authenticated");

        let variables: Vec<String> = ORDER_VARIABLES.iter().map(|v| v.to_string()).collect();
        session.append_order_variables(&variables).await?;

        let files = session.download_granules(&config.directory).await?;
        info!(
            directory = ?config.directory,
            count = files.len(),
            "granules downloaded"
        );

        Ok(files)
    }
}
