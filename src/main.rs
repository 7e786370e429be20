//! `get-hists`: download an ATL06 granule and extract its strong-beam histograms

use icesat2_hist::{
    AcquisitionClient, BeamHistogramExtractor, EarthdataService, Invocation, Pipeline, Result,
    ServiceConfig, parse_invocation, store,
};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(invocation: Invocation) -> Result<()> {
    let (query, service_config) = match invocation {
        Invocation::Help(usage) => {
            println!("{usage}");
            println!("Done.");
            return Ok(());
        }
        Invocation::Run {
            query,
            service_config,
        } => (query, service_config),
    };

    let service_config = match service_config {
        Some(path) => ServiceConfig::load(&path)?,
        None => ServiceConfig::default(),
    };

    if !store::HDF5_ENABLED {
        warn!("built without HDF5 support, granules cannot be opened; rebuild with --features hdf5");
    }

    let pipeline = Pipeline::new(
        AcquisitionClient::new(EarthdataService::new(service_config)?),
        BeamHistogramExtractor::new(store::default_store()),
    );

    for artifact in pipeline.run(&query).await? {
        println!("{}", artifact.display());
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    let outcome = match parse_invocation(std::env::args_os()) {
        Ok(invocation) => run(invocation).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
