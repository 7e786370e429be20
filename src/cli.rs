//! Command-line schema
//!
//! Every recognized option is declared once on [`CliArgs`]. Values are kept as
//! raw strings during parsing and converted in [`CliArgs::resolve`], so a help
//! request wins over any malformed value that appears next to it.
//!
//! `-E` belongs to `--EXTENT`. `--EMAIL` has no short form: the two options
//! historically shared `-E`, which made one of them unreachable.

use crate::config::{Credentials, DateRange, QueryConfiguration, SpatialExtent};
use crate::error::{Error, Result};
use crate::store::HDF5_ENABLED;
use crate::utils::expand_home;
use clap::{ArgAction, CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
Note: --EMAIL has no short flag. -E always selects --EXTENT.

The Earthdata password is read from the EARTHDATA_PASSWORD environment
variable (or the variable named by password_env in --CONFIG).

Examples:
  get-hists --USER=jdoe --EMAIL=jdoe@example.org
  get-hists -N --DIR=~/data --FILENAME=processed_ATL06_20200330121520_00600712_003_01.h5
  get-hists --EXTENT=31.5,-70.56,33.73,-69.29 --DATE=2020-03-30,2020-04-01 -U jdoe
";

/// Raw command-line options
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "get-hists",
    version,
    about = "Download ATL06 granules and save strong-beam residual histograms as .npy",
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true,
    after_help = AFTER_HELP
)]
pub struct CliArgs {
    /// Print this help and exit
    #[arg(long = "HELP", short = 'H', action = ArgAction::SetTrue)]
    pub help: bool,

    /// Data directory (default: /home/jovyan/data)
    #[arg(long = "DIR", short = 'D', value_name = "PATH")]
    pub dir: Option<String>,

    /// Spatial extent as lon0,lat0,lon1,lat1 (default: 31.5,-70.56,33.73,-69.29)
    #[arg(
        long = "EXTENT",
        short = 'E',
        value_name = "LON0,LAT0,LON1,LAT1",
        allow_hyphen_values = true
    )]
    pub extent: Option<String>,

    /// Date range as start,end (default: 2020-03-30,2020-04-1)
    #[arg(long = "DATE", short = 'T', value_name = "START,END")]
    pub date: Option<String>,

    /// Earthdata username
    #[arg(long = "USER", short = 'U')]
    pub user: Option<String>,

    /// Earthdata email
    #[arg(long = "EMAIL")]
    pub email: Option<String>,

    /// Granule file name to read
    #[arg(long = "FILENAME", short = 'F')]
    pub filename: Option<String>,

    /// Skip downloading, the granule is already on disk
    #[arg(long = "noDownload", short = 'N', action = ArgAction::SetTrue)]
    pub no_download: bool,

    /// JSON file with Earthdata endpoint and polling settings
    #[arg(long = "CONFIG", short = 'C', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Everything from the first non-option argument on, ignored
    ///
    /// Option parsing stops at the first such argument, so later flags are
    /// swallowed here too.
    #[arg(hide = true, num_args = 1.., trailing_var_arg = true)]
    pub positional: Vec<String>,
}

/// What the process was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// Print usage and exit successfully
    Help(String),
    /// Run the pipeline
    Run {
        /// The run configuration
        query: QueryConfiguration,
        /// Optional service configuration file
        service_config: Option<PathBuf>,
    },
}

impl CliArgs {
    /// Parse an argument list (first element is the program name)
    pub fn parse_from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        CliArgs::try_parse_from(args).map_err(|e| Error::Config {
            message: e.to_string().trim_end().to_string(),
            key: None,
        })
    }

    /// Convert raw options into a validated [`Invocation`]
    pub fn resolve(self) -> Result<Invocation> {
        if self.help {
            return Ok(Invocation::Help(usage()));
        }

        let defaults = QueryConfiguration::default();

        let spatial_extent = match self.extent.as_deref() {
            Some(raw) => raw.parse::<SpatialExtent>()?,
            None => defaults.spatial_extent,
        };

        let date_range = match self.date.as_deref() {
            Some(raw) => raw.parse::<DateRange>()?,
            None => defaults.date_range,
        };

        let query = QueryConfiguration {
            directory: self
                .dir
                .as_deref()
                .map(expand_home)
                .unwrap_or(defaults.directory),
            short_name: defaults.short_name,
            spatial_extent,
            date_range,
            credentials: Credentials {
                user: self.user.unwrap_or(defaults.credentials.user),
                email: self.email.unwrap_or(defaults.credentials.email),
            },
            target_filename: self.filename.unwrap_or(defaults.target_filename),
            skip_download: self.no_download,
        };

        Ok(Invocation::Run {
            query,
            service_config: self.config,
        })
    }
}

const NO_HDF5_NOTE: &str = "\
This build has no HDF5 support and cannot extract histograms: every granule
fails to open. Rebuild with `cargo build --features hdf5` (needs libhdf5).";

/// Rendered usage text
///
/// Builds without the `hdf5` feature say so at the end.
pub fn usage() -> String {
    let help = CliArgs::command().render_help().to_string();
    if HDF5_ENABLED {
        help
    } else {
        format!("{}\n{}\n", help.trim_end(), NO_HDF5_NOTE)
    }
}

/// Parse and resolve in one step
pub fn parse_invocation<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CliArgs::parse_from_args(args)?.resolve()
}
