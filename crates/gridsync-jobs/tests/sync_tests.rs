//! Synchronizer integration tests against a mocked CI server.

use gridsync_core::Error;
use gridsync_core::config::JobsConfig;
use gridsync_core::matrix::{LibraryVersion, VersionMatrix};
use gridsync_jobs::client::Credentials;
use gridsync_jobs::sync::MatrixSynchronizer;
use serde_json::json;
use std::collections::BTreeMap;
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scenario_matrix() -> VersionMatrix {
    let mut versions = BTreeMap::new();
    versions.insert(
        "2.7".to_string(),
        vec![
            LibraryVersion::Concrete("1.6".to_string()),
            LibraryVersion::Concrete("1.7".to_string()),
            LibraryVersion::FromSource,
        ],
    );
    VersionMatrix {
        versions,
        main: (
            "2.7".to_string(),
            LibraryVersion::Concrete("1.7".to_string()),
        ),
        common_packages: vec![],
        main_packages: vec![],
    }
}

fn credentials() -> Credentials {
    Credentials {
        username: "grid".to_string(),
        password: "hunter2".to_string(),
    }
}

fn jobs_config(server: &MockServer) -> JobsConfig {
    JobsConfig {
        server_url: server.uri(),
        job_pattern: ".*multiconfig$".to_string(),
        platform_label: "debian6".to_string(),
    }
}

async fn mount_listing(server: &MockServer, jobs: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .and(basic_auth("grid", "hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jobs": jobs })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn only_matching_jobs_are_touched() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        json!([
            {"name": "ci-debian-multiconfig", "url": format!("{}/job/ci-debian-multiconfig/", server.uri())},
            {"name": "ci-debian-single", "url": format!("{}/job/ci-debian-single/", server.uri())}
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/job/ci-debian-multiconfig/config.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"description": "grid"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/ci-debian-multiconfig/config.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    // The non-matching job must never be fetched, let alone updated.
    Mock::given(method("GET"))
        .and(path("/job/ci-debian-single/config.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let matrix = scenario_matrix();
    let synchronizer =
        MatrixSynchronizer::new(&jobs_config(&server), &matrix, credentials()).unwrap();
    let summary = synchronizer.sync_all().await.unwrap();

    assert_eq!(summary.matched, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn submitted_document_carries_recomputed_fields() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        json!([
            {"name": "grid-multiconfig", "url": format!("{}/job/grid-multiconfig/", server.uri())}
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/job/grid-multiconfig/config.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "description": "nightly grid",
            "axes": "stale",
            "builders": [{"shell": "run-tests"}],
            "combinationFilter": "stale"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/grid-multiconfig/config.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let matrix = scenario_matrix();
    let synchronizer =
        MatrixSynchronizer::new(&jobs_config(&server), &matrix, credentials()).unwrap();
    synchronizer.sync_all().await.unwrap();

    let submitted = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.method.as_str() == "POST")
        .expect("no document submitted");
    let document: serde_json::Value = serde_json::from_slice(&submitted.body).unwrap();

    assert_eq!(document["description"], json!("nightly grid"));
    assert_eq!(document["builders"], json!([{"shell": "run-tests"}]));
    assert_eq!(
        document["axes"],
        json!([
            {"type": "TextAxis", "name": "PYTHON_VER", "values": ["2.7"]},
            {"type": "TextAxis", "name": "NUMPY_VER", "values": ["1.6", "1.7"]},
            {"type": "LabelAxis", "name": "PLATFORM", "values": ["debian6"]}
        ])
    );
    assert_eq!(
        document["combinationFilter"],
        json!(
            "((PYTHON_VER == \"2.7\" && NUMPY_VER == \"1.6\") || \
             (PYTHON_VER == \"2.7\" && NUMPY_VER == \"1.7\"))"
        )
    );
}

#[tokio::test]
async fn one_failing_job_does_not_stop_the_rest() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        json!([
            {"name": "a-multiconfig", "url": format!("{}/job/a-multiconfig/", server.uri())},
            {"name": "b-multiconfig", "url": format!("{}/job/b-multiconfig/", server.uri())}
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/job/a-multiconfig/config.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/job/b-multiconfig/config.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/b-multiconfig/config.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let matrix = scenario_matrix();
    let synchronizer =
        MatrixSynchronizer::new(&jobs_config(&server), &matrix, credentials()).unwrap();
    let summary = synchronizer.sync_all().await.unwrap();

    assert_eq!(summary.matched, 2);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn listing_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let matrix = scenario_matrix();
    let synchronizer =
        MatrixSynchronizer::new(&jobs_config(&server), &matrix, credentials()).unwrap();
    let err = synchronizer.sync_all().await.unwrap_err();
    assert!(matches!(err, Error::JobList(_)));
}

#[tokio::test]
async fn invalid_selection_pattern_is_rejected_up_front() {
    let matrix = scenario_matrix();
    let config = JobsConfig {
        server_url: "http://localhost".to_string(),
        job_pattern: "*broken".to_string(),
        platform_label: "debian6".to_string(),
    };
    let result = MatrixSynchronizer::new(&config, &matrix, credentials());
    assert!(matches!(result.err(), Some(Error::InvalidConfig(_))));
}
