//! Configuration types for icesat2-hist
//!
//! [`QueryConfiguration`] describes one acquisition + extraction run and is
//! built once from the command line. [`ServiceConfig`] holds the remote
//! archive endpoints and polling behavior and may be loaded from JSON.

use crate::error::{AcquisitionError, Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Local working directory used when `--DIR` is absent
pub const DEFAULT_DIRECTORY: &str = "/home/jovyan/data";

/// Archive product identifier
pub const DEFAULT_SHORT_NAME: &str = "ATL06";

/// Bounding box used when `--EXTENT` is absent
pub const DEFAULT_SPATIAL_EXTENT: [f64; 4] = [31.5, -70.56, 33.73, -69.29];

/// Date range used when `--DATE` is absent
pub const DEFAULT_DATE_RANGE: [&str; 2] = ["2020-03-30", "2020-04-1"];

/// Granule file name used when `--FILENAME` is absent
pub const DEFAULT_FILENAME: &str = "processed_ATL06_20200330121520_00600712_003_01.h5";

/// Derived variables appended to every order
pub const ORDER_VARIABLES: &[&str] = &["count"];

/// Environment variable holding the Earthdata password
pub const DEFAULT_PASSWORD_ENV: &str = "EARTHDATA_PASSWORD";

/// Spatial bounding box in the archive's order:
/// lower-left longitude, lower-left latitude, upper-right longitude, upper-right latitude
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    /// Lower-left longitude
    pub min_lon: f64,
    /// Lower-left latitude
    pub min_lat: f64,
    /// Upper-right longitude
    pub max_lon: f64,
    /// Upper-right latitude
    pub max_lat: f64,
}

impl SpatialExtent {
    /// Build from the four components in archive order
    pub fn from_array([min_lon, min_lat, max_lon, max_lat]: [f64; 4]) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// The four components in archive order
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

impl Default for SpatialExtent {
    fn default() -> Self {
        Self::from_array(DEFAULT_SPATIAL_EXTENT)
    }
}

impl FromStr for SpatialExtent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim().parse::<f64>().map_err(|e| {
                    Error::config("EXTENT", format!("'{}' is not a number: {}", part, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let values: [f64; 4] = values.try_into().map_err(|v: Vec<f64>| {
            Error::config(
                "EXTENT",
                format!("expected 4 comma-separated values, got {}", v.len()),
            )
        })?;

        Ok(Self::from_array(values))
    }
}

impl fmt::Display for SpatialExtent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// Inclusive date range, kept exactly as the user typed it
///
/// No ordering check happens here; `start <= end` is left to the archive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day (`YYYY-MM-DD`, one-digit month/day accepted)
    pub start: String,
    /// Last day, inclusive
    pub end: String,
}

impl DateRange {
    /// Render as the archive's `temporal` parameter, spanning whole days
    ///
    /// Dates are only parsed at this point, so a malformed date surfaces
    /// as an order failure.
    pub fn to_temporal(&self) -> Result<String> {
        let start = parse_day(&self.start)?;
        let end = parse_day(&self.end)?;
        Ok(format!(
            "{}T00:00:00,{}T23:59:59",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        ))
    }
}

fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        AcquisitionError::order(format!("invalid date '{}': {}", value, e)).into()
    })
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start: DEFAULT_DATE_RANGE[0].to_string(),
            end: DEFAULT_DATE_RANGE[1].to_string(),
        }
    }
}

impl FromStr for DateRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        match parts.as_slice() {
            [start, end] if !start.is_empty() && !end.is_empty() => Ok(Self {
                start: start.to_string(),
                end: end.to_string(),
            }),
            _ => Err(Error::config(
                "DATE",
                format!("expected 2 comma-separated dates, got '{}'", s),
            )),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.start, self.end)
    }
}

/// Earthdata identity used for login and order notifications
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Earthdata username
    pub user: String,
    /// Contact email attached to orders
    pub email: String,
}

/// One acquisition + extraction run
#[derive(Clone, Debug, PartialEq)]
pub struct QueryConfiguration {
    /// Local working directory for downloads and artifacts
    pub directory: PathBuf,
    /// Archive product identifier (default: "ATL06")
    pub short_name: String,
    /// Spatial bounding box
    pub spatial_extent: SpatialExtent,
    /// Inclusive date range
    pub date_range: DateRange,
    /// Earthdata identity
    pub credentials: Credentials,
    /// Granule file name to extract from, relative to `directory`
    pub target_filename: String,
    /// Skip the acquisition stage and use a file already on disk
    pub skip_download: bool,
}

impl QueryConfiguration {
    /// Path of the granule the extractor will open
    pub fn granule_path(&self) -> PathBuf {
        self.directory.join(&self.target_filename)
    }
}

impl Default for QueryConfiguration {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            short_name: DEFAULT_SHORT_NAME.to_string(),
            spatial_extent: SpatialExtent::default(),
            date_range: DateRange::default(),
            credentials: Credentials::default(),
            target_filename: DEFAULT_FILENAME.to_string(),
            skip_download: false,
        }
    }
}

/// Remote archive endpoints and order behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Earthdata Login base URL
    #[serde(default = "default_login_url")]
    pub login_url: String,

    /// CMR search base URL
    #[serde(default = "default_cmr_url")]
    pub cmr_url: String,

    /// NSIDC EGI subsetting base URL
    #[serde(default = "default_egi_url")]
    pub egi_url: String,

    /// Base URL serving finished order archives
    #[serde(default = "default_esir_url")]
    pub esir_url: String,

    /// Product version (latest from CMR when None)
    #[serde(default)]
    pub version: Option<String>,

    /// Granules per order page (default: 2000)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Delay between order status polls (default: 10 seconds)
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub poll_interval: Duration,

    /// Maximum number of status polls before giving up (default: 360)
    #[serde(default = "default_max_status_polls")]
    pub max_status_polls: u32,

    /// Per-request HTTP timeout (default: 300 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Environment variable holding the Earthdata password
    #[serde(default = "default_password_env")]
    pub password_env: String,
}

impl ServiceConfig {
    /// Load a JSON service configuration; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: Some("CONFIG".to_string()),
        })?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            cmr_url: default_cmr_url(),
            egi_url: default_egi_url(),
            esir_url: default_esir_url(),
            version: None,
            page_size: default_page_size(),
            poll_interval: default_poll_interval(),
            max_status_polls: default_max_status_polls(),
            request_timeout: default_request_timeout(),
            password_env: default_password_env(),
        }
    }
}

fn default_login_url() -> String {
    "https://urs.earthdata.nasa.gov".to_string()
}

fn default_cmr_url() -> String {
    "https://cmr.earthdata.nasa.gov".to_string()
}

fn default_egi_url() -> String {
    "https://n5eil02u.ecs.nsidc.org/egi".to_string()
}

fn default_esir_url() -> String {
    "https://n5eil02u.ecs.nsidc.org/esir".to_string()
}

fn default_page_size() -> u32 {
    2000
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_max_status_polls() -> u32 {
    360
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_password_env() -> String {
    DEFAULT_PASSWORD_ENV.to_string()
}

// Duration as whole seconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_literals() {
        let config = QueryConfiguration::default();

        assert_eq!(config.directory, PathBuf::from("/home/jovyan/data"));
        assert_eq!(config.short_name, "ATL06");
        assert_eq!(
            config.spatial_extent.to_array(),
            [31.5, -70.56, 33.73, -69.29]
        );
        assert_eq!(config.date_range.start, "2020-03-30");
        assert_eq!(config.date_range.end, "2020-04-1");
        assert_eq!(config.credentials, Credentials::default());
        assert_eq!(
            config.target_filename,
            "processed_ATL06_20200330121520_00600712_003_01.h5"
        );
        assert!(!config.skip_download);
    }

    #[test]
    fn granule_path_joins_directory_and_filename() {
        let config = QueryConfiguration {
            directory: PathBuf::from("/tmp/data"),
            target_filename: "sample.h5".into(),
            ..Default::default()
        };

        assert_eq!(config.granule_path(), PathBuf::from("/tmp/data/sample.h5"));
    }

    // --- SpatialExtent ---

    #[test]
    fn extent_parses_and_displays_back_to_the_same_string() {
        for raw in [
            "31.5,-70.56,33.73,-69.29",
            "-180,-90,180,90",
            "0.125,1e-7,12.5,45.000001",
        ] {
            let extent: SpatialExtent = raw.parse().expect("valid extent");
            let reparsed: SpatialExtent = extent.to_string().parse().expect("reparse");
            assert_eq!(reparsed, extent, "round trip of {raw}");
        }

        let canonical: SpatialExtent = "31.5,-70.56,33.73,-69.29".parse().unwrap();
        assert_eq!(canonical.to_string(), "31.5,-70.56,33.73,-69.29");
    }

    #[test]
    fn extent_keeps_component_order() {
        let extent: SpatialExtent = "1,2,3,4".parse().unwrap();
        assert_eq!(extent.min_lon, 1.0);
        assert_eq!(extent.min_lat, 2.0);
        assert_eq!(extent.max_lon, 3.0);
        assert_eq!(extent.max_lat, 4.0);
    }

    #[test]
    fn extent_rejects_non_numeric_component() {
        let err = "31.5,west,33.73,-69.29".parse::<SpatialExtent>().unwrap_err();
        match err {
            Error::Config { key, message } => {
                assert_eq!(key.as_deref(), Some("EXTENT"));
                assert!(message.contains("west"), "got: {message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn extent_rejects_wrong_component_count() {
        assert!("1,2,3".parse::<SpatialExtent>().is_err());
        assert!("1,2,3,4,5".parse::<SpatialExtent>().is_err());
    }

    // --- DateRange ---

    #[test]
    fn date_range_preserves_order_without_validation() {
        let range: DateRange = "2020-04-01,2020-03-30".parse().unwrap();
        assert_eq!(range.start, "2020-04-01");
        assert_eq!(range.end, "2020-03-30");
        assert_eq!(range.to_string(), "2020-04-01,2020-03-30");
    }

    #[test]
    fn date_range_requires_exactly_two_parts() {
        assert!("2020-03-30".parse::<DateRange>().is_err());
        assert!("2020-03-30,2020-03-31,2020-04-01".parse::<DateRange>().is_err());
        assert!("2020-03-30,".parse::<DateRange>().is_err());
    }

    #[test]
    fn temporal_parameter_pads_single_digit_days() {
        let range = DateRange::default();
        assert_eq!(
            range.to_temporal().unwrap(),
            "2020-03-30T00:00:00,2020-04-01T23:59:59"
        );
    }

    #[test]
    fn temporal_parameter_rejects_malformed_dates_as_order_errors() {
        let range = DateRange {
            start: "March 30".into(),
            end: "2020-04-01".into(),
        };
        let err = range.to_temporal().unwrap_err();
        assert!(err.is_acquisition(), "got: {err:?}");
    }

    // --- ServiceConfig ---

    #[test]
    fn service_config_fills_missing_fields_with_defaults() {
        let config: ServiceConfig =
            serde_json::from_str(r#"{"cmr_url": "http://localhost:9000", "poll_interval": 0}"#)
                .expect("deserialize failed");

        assert_eq!(config.cmr_url, "http://localhost:9000");
        assert_eq!(config.poll_interval, Duration::ZERO);
        assert_eq!(config.login_url, "https://urs.earthdata.nasa.gov");
        assert_eq!(config.page_size, 2000);
        assert_eq!(config.password_env, "EARTHDATA_PASSWORD");
        assert!(config.version.is_none());
    }

    #[test]
    fn service_config_loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.json");
        std::fs::write(&path, r#"{"version": "006", "max_status_polls": 3}"#).unwrap();

        let config = ServiceConfig::load(&path).unwrap();
        assert_eq!(config.version.as_deref(), Some("006"));
        assert_eq!(config.max_status_polls, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(300));
    }

    #[test]
    fn service_config_load_reports_missing_file_as_config_error() {
        let err = ServiceConfig::load(Path::new("/nonexistent/service.json")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }), "got: {err:?}");
    }
}
