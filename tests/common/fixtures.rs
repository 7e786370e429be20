//! Granules, stub services and archive fixtures

use async_trait::async_trait;
use icesat2_hist::acquisition::GranuleQuery;
use icesat2_hist::store::{MemoryGranule, MemoryStore};
use icesat2_hist::{Credentials, RemoteDataService, RemoteSession, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Histogram path for `track`
pub fn histogram(track: &str) -> String {
    format!("{track}/residual_histogram/count")
}

/// Granule with all six tracks; `gt1l` carries `gt1l_type`
///
/// Left tracks hold 1..=9 in rows of three, right tracks hold the same
/// values times ten.
pub fn six_track_granule(gt1l_type: &str) -> MemoryGranule {
    let weak = if gt1l_type == "strong" { "weak" } else { "strong" };
    let mut granule = MemoryGranule::new()
        .with_attribute("gt1l", "atlas_beam_type", gt1l_type)
        .with_attribute("gt1r", "atlas_beam_type", weak);

    for pair in 1..=3i32 {
        let base: Vec<i32> = (0..3).map(|k| (pair - 1) * 3 + k + 1).collect();
        let scaled: Vec<i32> = base.iter().map(|v| v * 10).collect();
        granule = granule
            .with_dataset(histogram(&format!("gt{pair}l")), base)
            .with_dataset(histogram(&format!("gt{pair}r")), scaled);
    }
    granule
}

/// Store holding `granule` at `dir/name`
pub fn store_with(dir: &Path, name: &str, granule: MemoryGranule) -> MemoryStore {
    let store = MemoryStore::new();
    store.insert(dir.join(name), granule);
    store
}

/// Order archive with one sub-folder per entry
pub fn order_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in entries {
        zip.start_file(*name, zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Remote service that records every call and never touches the network
#[derive(Clone, Default)]
pub struct RecordingService {
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingService {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

struct RecordingSession {
    calls: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl RemoteDataService for RecordingService {
    async fn open_session(&self, query: &GranuleQuery) -> Result<Box<dyn RemoteSession>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("open {}", query.short_name));
        Ok(Box::new(RecordingSession {
            calls: Arc::clone(&self.calls),
        }))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

#[async_trait]
impl RemoteSession for RecordingSession {
    async fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("login {}", credentials.user));
        Ok(())
    }

    async fn append_order_variables(&mut self, variables: &[String]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("order {}", variables.join(",")));
        Ok(())
    }

    async fn download_granules(&mut self, directory: &Path) -> Result<Vec<PathBuf>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("download {}", directory.display()));
        Ok(Vec::new())
    }
}
