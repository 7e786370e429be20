//! End-to-end runs over the in-memory store

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{RecordingService, histogram, six_track_granule, store_with};
use icesat2_hist::store::MemoryGranule;
use icesat2_hist::{
    AcquisitionClient, BeamHistogramExtractor, Error, ExtractionError, Pipeline,
    QueryConfiguration,
};
use ndarray::ArrayD;
use ndarray_npy::read_npy;
use std::path::Path;

fn read_i32(path: &Path) -> Vec<i32> {
    let array: ArrayD<i32> = read_npy(path).unwrap();
    array.iter().copied().collect()
}

fn offline(dir: &Path, name: &str) -> QueryConfiguration {
    QueryConfiguration {
        directory: dir.to_path_buf(),
        target_filename: name.to_string(),
        skip_download: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn sample_granule_produces_three_strong_left_histograms() {
    let dir = tempfile::tempdir().unwrap();
    let granule = MemoryGranule::new()
        .with_attribute("gt1l", "atlas_beam_type", "strong")
        .with_dataset(histogram("gt1l"), vec![1i32, 2, 3])
        .with_dataset(histogram("gt2l"), vec![4i32, 5, 6])
        .with_dataset(histogram("gt3l"), vec![7i32, 8, 9]);
    let store = store_with(dir.path(), "sample.h5", granule);

    let service = RecordingService::default();
    let pipeline = Pipeline::new(
        AcquisitionClient::new(service.clone()),
        BeamHistogramExtractor::new(store.clone()),
    );

    let artifacts = pipeline.run(&offline(dir.path(), "sample.h5")).await.unwrap();

    assert_eq!(
        artifacts,
        vec![
            dir.path().join("sample_hist_gt1l.npy"),
            dir.path().join("sample_hist_gt2l.npy"),
            dir.path().join("sample_hist_gt3l.npy"),
        ]
    );
    assert_eq!(read_i32(&artifacts[0]), vec![1, 2, 3]);
    assert_eq!(read_i32(&artifacts[1]), vec![4, 5, 6]);
    assert_eq!(read_i32(&artifacts[2]), vec![7, 8, 9]);

    assert!(service.calls().is_empty(), "no remote interaction");
    assert_eq!(store.open_count(), 1);
    assert_eq!(store.open_handles(), 0);
}

#[tokio::test]
async fn weak_gt1l_switches_every_pair_to_the_right_side() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with(dir.path(), "g.h5", six_track_granule("weak"));
    let pipeline = Pipeline::new(
        AcquisitionClient::new(RecordingService::default()),
        BeamHistogramExtractor::new(store),
    );

    let artifacts = pipeline.run(&offline(dir.path(), "g.h5")).await.unwrap();

    let names: Vec<String> = artifacts
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["g_hist_gt1r.npy", "g_hist_gt2r.npy", "g_hist_gt3r.npy"]
    );
    assert_eq!(read_i32(&artifacts[2]), vec![70, 80, 90]);
}

#[tokio::test]
async fn download_stage_runs_the_full_remote_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with(dir.path(), "g.h5", six_track_granule("strong"));
    let service = RecordingService::default();
    let pipeline = Pipeline::new(
        AcquisitionClient::new(service.clone()),
        BeamHistogramExtractor::new(store),
    );

    let config = QueryConfiguration {
        skip_download: false,
        ..offline(dir.path(), "g.h5")
    };
    pipeline.run(&config).await.unwrap();

    assert_eq!(
        service.calls(),
        vec![
            "open ATL06".to_string(),
            "login ".to_string(),
            "order count".to_string(),
            format!("download {}", dir.path().display()),
        ]
    );
}

#[tokio::test]
async fn rerun_overwrites_existing_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("g_hist_gt1l.npy"), b"stale").unwrap();

    let store = store_with(dir.path(), "g.h5", six_track_granule("strong"));
    let pipeline = Pipeline::new(
        AcquisitionClient::new(RecordingService::default()),
        BeamHistogramExtractor::new(store),
    );

    let artifacts = pipeline.run(&offline(dir.path(), "g.h5")).await.unwrap();

    assert_eq!(read_i32(&artifacts[0]), vec![1, 2, 3]);
}

#[tokio::test]
async fn missing_pair_two_aborts_and_releases_the_granule() {
    let dir = tempfile::tempdir().unwrap();
    let granule = MemoryGranule::new()
        .with_attribute("gt1l", "atlas_beam_type", "strong")
        .with_dataset(histogram("gt1l"), vec![1i32])
        .with_dataset(histogram("gt3l"), vec![3i32]);
    let store = store_with(dir.path(), "g.h5", granule);
    let pipeline = Pipeline::new(
        AcquisitionClient::new(RecordingService::default()),
        BeamHistogramExtractor::new(store.clone()),
    );

    let err = pipeline.run(&offline(dir.path(), "g.h5")).await.unwrap_err();

    match err {
        Error::Extraction(ExtractionError::DatasetNotFound { dataset, .. }) => {
            assert_eq!(dataset, "gt2l/residual_histogram/count");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.open_handles(), 0);
    assert!(!dir.path().join("g_hist_gt3l.npy").exists());
}

#[tokio::test]
async fn skipped_download_without_a_granule_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let service = RecordingService::default();
    let pipeline = Pipeline::new(
        AcquisitionClient::new(service.clone()),
        BeamHistogramExtractor::new(icesat2_hist::store::MemoryStore::new()),
    );

    let err = pipeline
        .run(&offline(dir.path(), "absent.h5"))
        .await
        .unwrap_err();

    assert!(err.is_extraction());
    assert!(service.calls().is_empty());
}
