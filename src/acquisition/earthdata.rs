//! NASA Earthdata client
//!
//! Login goes through Earthdata Login (URS), the product version comes from
//! CMR, and granules are ordered from the NSIDC EGI subsetting service, which
//! packs each finished order into a single ZIP.

use super::archive::unpack_order_archive;
use super::traits::{GranuleQuery, RemoteDataService, RemoteSession};
use crate::config::{Credentials, ServiceConfig};
use crate::error::{AcquisitionError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

#[allow(clippy::expect_used)]
static SUBSET_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<SubsetVariable\b[^>]*\bvalue="([^"]+)""#).expect("static regex")
});

#[allow(clippy::expect_used)]
static ORDER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<orderId>\s*([^<\s]+)\s*</orderId>").expect("static regex"));

#[allow(clippy::expect_used)]
static ORDER_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<status>\s*([^<\s]+)\s*</status>").expect("static regex"));

#[derive(Deserialize)]
struct CmrCollections {
    feed: CmrFeed,
}

#[derive(Deserialize)]
struct CmrFeed {
    #[serde(default)]
    entry: Vec<CmrEntry>,
}

#[derive(Deserialize)]
struct CmrEntry {
    version_id: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Highest version among CMR collection entries, compared numerically when possible
fn latest_version(entries: &[CmrEntry]) -> Option<String> {
    entries
        .iter()
        .map(|e| e.version_id.as_str())
        .max_by(|a, b| match (a.parse::<u32>(), b.parse::<u32>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => a.cmp(b),
        })
        .map(str::to_string)
}

/// Variable paths offered by an EGI capabilities document
fn subset_variables(capabilities: &str) -> Vec<String> {
    SUBSET_VARIABLE
        .captures_iter(capabilities)
        .map(|c| c[1].to_string())
        .collect()
}

/// Catalog paths whose last component is `variable`
fn matching_paths<'a>(available: &'a [String], variable: &str) -> Vec<&'a String> {
    available
        .iter()
        .filter(|path| path.trim_end_matches('/').rsplit('/').next() == Some(variable))
        .collect()
}

fn capture(pattern: &Regex, body: &str) -> Option<String> {
    pattern.captures(body).map(|c| c[1].to_string())
}

/// [`RemoteDataService`] backed by NASA Earthdata
///
/// The password is taken from [`with_password`](Self::with_password) when set,
/// otherwise from the environment variable named by
/// [`ServiceConfig::password_env`].
pub struct EarthdataService {
    http: reqwest::Client,
    config: ServiceConfig,
    password: Option<String>,
}

impl EarthdataService {
    /// Create a service using `config`
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("icesat2-hist/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config,
            password: None,
        })
    }

    /// Use an explicit password instead of the environment
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// The active configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    async fn resolve_version(&self, short_name: &str) -> Result<String> {
        if let Some(version) = &self.config.version {
            return Ok(version.clone());
        }

        let url = format!("{}/search/collections.json", self.config.cmr_url);
        debug!(%url, short_name, "looking up latest product version");

        let order_err = |e: reqwest::Error| {
            AcquisitionError::order(format!("version lookup for {} failed: {}", short_name, e))
        };

        let collections: CmrCollections = self
            .http
            .get(&url)
            .query(&[("short_name", short_name)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(order_err)?
            .json()
            .await
            .map_err(order_err)?;

        latest_version(&collections.feed.entry).ok_or_else(|| {
            AcquisitionError::order(format!("no collection named {} in CMR", short_name)).into()
        })
    }
}

#[async_trait]
impl RemoteDataService for EarthdataService {
    async fn open_session(&self, query: &GranuleQuery) -> Result<Box<dyn RemoteSession>> {
        let version = self.resolve_version(&query.short_name).await?;
        info!(short_name = %query.short_name, %version, "earthdata session opened");

        Ok(Box::new(EarthdataSession {
            http: self.http.clone(),
            config: self.config.clone(),
            password: self.password.clone(),
            query: query.clone(),
            version,
            token: None,
            email: String::new(),
            coverage: Vec::new(),
        }))
    }

    fn name(&self) -> &'static str {
        "earthdata"
    }
}

struct EarthdataSession {
    http: reqwest::Client,
    config: ServiceConfig,
    password: Option<String>,
    query: GranuleQuery,
    version: String,
    token: Option<String>,
    email: String,
    coverage: Vec<String>,
}

impl EarthdataSession {
    fn token(&self, stage: &str) -> Result<&str> {
        self.token.as_deref().ok_or_else(|| {
            AcquisitionError::authentication(format!("{} requires a prior login", stage)).into()
        })
    }

    fn product(&self) -> String {
        format!("{}.{}", self.query.short_name, self.version)
    }

    async fn fetch_text(&self, url: &str, token: &str) -> std::result::Result<String, String> {
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {} from {}", status, url));
        }

        response.text().await.map_err(|e| e.to_string())
    }

    /// Submit the order and return its id
    async fn submit_order(&self, token: &str) -> Result<String> {
        let temporal = self.query.date_range.to_temporal()?;
        let params = [
            ("short_name", self.query.short_name.clone()),
            ("version", self.version.clone()),
            ("temporal", temporal),
            ("bounding_box", self.query.spatial_extent.to_string()),
            ("Coverage", self.coverage.join(",")),
            ("request_mode", "async".to_string()),
            ("page_size", self.config.page_size.to_string()),
            ("page_num", "1".to_string()),
            ("email", self.email.clone()),
            ("token", token.to_string()),
            ("agent", "NO".to_string()),
            ("include_meta", "Y".to_string()),
        ];

        let url = format!("{}/request", self.config.egi_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&params)
            .send()
            .await
            .map_err(|e| AcquisitionError::download(format!("order submission failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AcquisitionError::download(format!("order reply unreadable: {}", e)))?;

        if !status.is_success() {
            return Err(AcquisitionError::download(format!(
                "order submission returned HTTP {}",
                status
            ))
            .into());
        }

        capture(&ORDER_ID, &body).ok_or_else(|| {
            AcquisitionError::download("order reply carried no orderId".to_string()).into()
        })
    }

    /// Poll until the order finishes processing
    async fn wait_for_order(&self, order_id: &str, token: &str) -> Result<()> {
        let url = format!("{}/request/{}", self.config.egi_url, order_id);
        let mut last_status = String::from("unknown");

        for attempt in 1..=self.config.max_status_polls {
            let body = self
                .fetch_text(&url, token)
                .await
                .map_err(|e| AcquisitionError::download(format!("status check failed: {}", e)))?;

            last_status = capture(&ORDER_STATUS, &body).unwrap_or_else(|| "unknown".to_string());
            debug!(order_id, attempt, status = %last_status, "order status");

            match last_status.as_str() {
                "complete" => return Ok(()),
                "complete_with_errors" => {
                    warn!(order_id, "order completed with errors");
                    return Ok(());
                }
                "failed" => {
                    return Err(
                        AcquisitionError::download(format!("order {} failed", order_id)).into(),
                    );
                }
                _ => tokio::time::sleep(self.config.poll_interval).await,
            }
        }

        Err(AcquisitionError::download(format!(
            "order {} still {} after {} status checks",
            order_id, last_status, self.config.max_status_polls
        ))
        .into())
    }

    /// Fetch the finished order archive into `directory`
    async fn fetch_archive(&self, order_id: &str, token: &str, directory: &Path) -> Result<PathBuf> {
        let url = format!("{}/{}.zip", self.config.esir_url, order_id);
        let failed = |reason: String| AcquisitionError::download(reason);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| failed(format!("archive fetch failed: {}", e)))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| failed(format!("archive transfer failed: {}", e)))?;

        let target = directory.join(format!("{}.zip", order_id));
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|e| failed(format!("failed to save {}: {}", target.display(), e)))?;

        debug!(?target, size = bytes.len(), "order archive saved");
        Ok(target)
    }
}

#[async_trait]
impl RemoteSession for EarthdataSession {
    async fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        if credentials.user.is_empty() {
            return Err(AcquisitionError::authentication("no username given").into());
        }

        let password = match &self.password {
            Some(p) => p.clone(),
            None => std::env::var(&self.config.password_env).map_err(|_| {
                AcquisitionError::authentication(format!(
                    "password environment variable {} is not set",
                    self.config.password_env
                ))
            })?,
        };

        let url = format!("{}/api/users/find_or_create_token", self.config.login_url);
        debug!(user = %credentials.user, "requesting earthdata token");

        let response = self
            .http
            .post(&url)
            .basic_auth(&credentials.user, Some(password))
            .send()
            .await
            .map_err(|e| AcquisitionError::authentication(format!("login request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AcquisitionError::authentication(format!(
                "credentials for {} rejected (HTTP {})",
                credentials.user, status
            ))
            .into());
        }
        if !status.is_success() {
            return Err(
                AcquisitionError::authentication(format!("login returned HTTP {}", status)).into(),
            );
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AcquisitionError::authentication(format!("login reply unreadable: {}", e))
        })?;

        self.token = Some(token.access_token);
        self.email = credentials.email.clone();
        Ok(())
    }

    async fn append_order_variables(&mut self, variables: &[String]) -> Result<()> {
        let token = self.token("ordering")?.to_string();
        let url = format!("{}/capabilities/{}.xml", self.config.egi_url, self.product());

        let capabilities = self.fetch_text(&url, &token).await.map_err(|e| {
            AcquisitionError::order(format!("capabilities lookup failed: {}", e))
        })?;
        let available = subset_variables(&capabilities);

        for variable in variables {
            let paths = matching_paths(&available, variable);
            if paths.is_empty() {
                return Err(AcquisitionError::order(format!(
                    "variable '{}' is not offered for {}",
                    variable,
                    self.product()
                ))
                .into());
            }

            for path in paths {
                if !self.coverage.contains(path) {
                    self.coverage.push(path.clone());
                }
            }
        }

        info!(
            product = %self.product(),
            paths = self.coverage.len(),
            "order variables appended"
        );
        Ok(())
    }

    async fn download_granules(&mut self, directory: &Path) -> Result<Vec<PathBuf>> {
        let token = self.token("downloading")?.to_string();

        tokio::fs::create_dir_all(directory).await.map_err(|e| {
            AcquisitionError::download(format!("failed to create {}: {}", directory.display(), e))
        })?;

        let order_id = self.submit_order(&token).await?;
        info!(%order_id, "order submitted");

        self.wait_for_order(&order_id, &token).await?;
        let archive = self.fetch_archive(&order_id, &token, directory).await?;

        let dest = directory.to_path_buf();
        let archive_path = archive.clone();
        let files = tokio::task::spawn_blocking(move || unpack_order_archive(&archive_path, &dest))
            .await
            .map_err(|e| AcquisitionError::download(format!("unpack task panicked: {}", e)))??;

        if let Err(e) = tokio::fs::remove_file(&archive).await {
            warn!(?archive, error = %e, "could not remove order archive");
        }

        Ok(files)
    }
}
