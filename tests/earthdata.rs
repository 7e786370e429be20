//! Full runs against a mocked Earthdata archive

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{order_zip, six_track_granule, store_with};
use icesat2_hist::{
    AcquisitionClient, BeamHistogramExtractor, Credentials, EarthdataService, Pipeline,
    QueryConfiguration, ServiceConfig,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GRANULE: &str = "processed_ATL06_20200330121520_00600712_003_01.h5";

async fn mock_archive(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/users/find_or_create_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/egi/capabilities/ATL06.006.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<Capabilities><SubsetVariable value="/gt1l/residual_histogram/count"/></Capabilities>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/egi/request"))
        .and(query_param("Coverage", "/gt1l/residual_histogram/count"))
        .respond_with(
            ResponseTemplate::new(201).set_body_string("<order><orderId>901</orderId></order>"),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/egi/request/901"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<status>complete_with_errors</status>"),
        )
        .mount(server)
        .await;

    let entry = format!("901/{GRANULE}");
    let archive = order_zip(&[(entry.as_str(), b"hdf5 bytes".as_slice())]);
    Mock::given(method("GET"))
        .and(path("/esir/901.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .mount(server)
        .await;
}

fn service(server: &MockServer) -> EarthdataService {
    let config = ServiceConfig {
        login_url: server.uri(),
        cmr_url: server.uri(),
        egi_url: format!("{}/egi", server.uri()),
        esir_url: format!("{}/esir", server.uri()),
        version: Some("006".into()),
        poll_interval: Duration::ZERO,
        ..Default::default()
    };
    EarthdataService::new(config).unwrap().with_password("pw")
}

#[tokio::test]
async fn download_then_extract() {
    let server = MockServer::start().await;
    mock_archive(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let store = store_with(dir.path(), GRANULE, six_track_granule("strong"));
    let pipeline = Pipeline::new(
        AcquisitionClient::new(service(&server)),
        BeamHistogramExtractor::new(store),
    );

    let config = QueryConfiguration {
        directory: dir.path().to_path_buf(),
        credentials: Credentials {
            user: "jdoe".into(),
            email: "jdoe@example.org".into(),
        },
        ..Default::default()
    };

    let artifacts = pipeline.run(&config).await.unwrap();

    assert_eq!(
        std::fs::read(dir.path().join(GRANULE)).unwrap(),
        b"hdf5 bytes",
        "granule is flattened into the working directory"
    );
    assert!(!dir.path().join("901.zip").exists());
    assert!(!dir.path().join("901").exists());
    assert_eq!(
        artifacts[0],
        dir.path()
            .join("processed_ATL06_20200330121520_00600712_003_01_hist_gt1l.npy")
    );
}

#[tokio::test]
async fn anonymous_run_fails_before_any_request() {
    let server = MockServer::start().await;

    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(
        AcquisitionClient::new(service(&server)),
        BeamHistogramExtractor::new(store_with(dir.path(), GRANULE, six_track_granule("strong"))),
    );

    let config = QueryConfiguration {
        directory: dir.path().to_path_buf(),
        ..Default::default()
    };
    let err = pipeline.run(&config).await.unwrap_err();

    assert!(err.is_acquisition());
    assert!(server.received_requests().await.unwrap().is_empty());
}
