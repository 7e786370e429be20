//! Acquisition followed by extraction
//!
//! One run takes a [`QueryConfiguration`] through the optional download stage
//! and then extracts the beam histograms of the configured granule. Stages run
//! one after the other and the first failure ends the run.

use crate::acquisition::{AcquisitionClient, RemoteDataService};
use crate::config::QueryConfiguration;
use crate::error::Result;
use crate::extract::BeamHistogramExtractor;
use crate::store::HierarchicalStore;
use std::path::PathBuf;
use tracing::info;

/// Runs the download and extraction stages for one configuration
pub struct Pipeline<S, H> {
    acquisition: AcquisitionClient<S>,
    extractor: BeamHistogramExtractor<H>,
}

impl<S, H> Pipeline<S, H>
where
    S: RemoteDataService,
    H: HierarchicalStore,
{
    /// Create a pipeline from its two stages
    pub fn new(acquisition: AcquisitionClient<S>, extractor: BeamHistogramExtractor<H>) -> Self {
        Self {
            acquisition,
            extractor,
        }
    }

    /// The acquisition stage
    pub fn acquisition(&self) -> &AcquisitionClient<S> {
        &self.acquisition
    }

    /// The extraction stage
    pub fn extractor(&self) -> &BeamHistogramExtractor<H> {
        &self.extractor
    }

    /// Download (unless `skip_download` is set) and extract
    ///
    /// Returns the written artifact paths in ascending pair order.
    ///
    /// # Errors
    ///
    /// Any acquisition or extraction failure, unchanged. Granules already
    /// downloaded are left in place when extraction fails.
    pub async fn run(&self, config: &QueryConfiguration) -> Result<Vec<PathBuf>> {
        if config.skip_download {
            info!(directory = ?config.directory, "download skipped");
        } else {
            self.acquisition.download(config).await?;
        }

        let granule = config.granule_path();
        info!(?granule, "extracting beam histograms");

        let artifacts = self.extractor.extract_all(&granule)?;
        info!(count = artifacts.len(), "run complete");

        Ok(artifacts)
    }
}
