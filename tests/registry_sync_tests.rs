use std::fs;
use std::path::Path;

use nova_sdk::NovaError;
use nova_sdk::api::endpoints::SYNC_OBJECTS_PATH;
use nova_sdk::registry::{RegistryConfig, SyncOptions, run_sync};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> RegistryConfig {
    RegistryConfig {
        organisation_id: "org-1".to_string(),
        app_id: "app-1".to_string(),
        api_key: "secret".to_string(),
        api_endpoint: server.uri(),
    }
}

fn write_manifest(dir: &Path, contents: &str) {
    fs::write(dir.join("nova-objects.json"), contents).unwrap();
}

#[tokio::test]
async fn sync_writes_registry_and_posts_same_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SYNC_OBJECTS_PATH))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"synced": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    write_manifest(
        temp_dir.path(),
        r#"{"objects": {"x": {"color": "red"}}, "experiences": {}}"#,
    );

    let report = run_sync(&SyncOptions::new(temp_dir.path()), &config(&server))
        .await
        .unwrap();

    assert_eq!(report.object_count, 1);
    assert_eq!(report.experience_count, 0);
    assert_eq!(report.response, json!({"synced": 1}));
    assert_eq!(report.output_path, temp_dir.path().join("nova-registry.json"));

    let written: Value =
        serde_json::from_str(&fs::read_to_string(&report.output_path).unwrap()).unwrap();
    assert_eq!(written["objects"]["x"], json!({"color": "red"}));
    assert_eq!(written["experiences"], json!({}));
    assert_eq!(written["metadata"]["organisationId"], "org-1");
    assert_eq!(written["metadata"]["appId"], "app-1");
    assert_eq!(written["metadata"]["objectCount"], 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let posted: Value = requests[0].body_json().unwrap();
    assert_eq!(posted, written);
    server.verify().await;
}

#[tokio::test]
async fn sync_accepts_empty_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SYNC_OBJECTS_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    write_manifest(temp_dir.path(), r#"{"objects": {}, "experiences": {}}"#);

    let report = run_sync(&SyncOptions::new(temp_dir.path()), &config(&server))
        .await
        .unwrap();
    assert_eq!(report.response, Value::Null);
}

#[tokio::test]
async fn missing_experiences_fails_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SYNC_OBJECTS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    write_manifest(temp_dir.path(), r#"{"objects": {"x": {"color": "red"}}}"#);

    let err = run_sync(&SyncOptions::new(temp_dir.path()), &config(&server))
        .await
        .unwrap_err();

    assert!(matches!(err, NovaError::Configuration(_)));
    assert!(!temp_dir.path().join("nova-registry.json").exists());
    server.verify().await;
}

#[tokio::test]
async fn missing_manifest_fails_before_network() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    let err = run_sync(&SyncOptions::new(temp_dir.path()), &config(&server))
        .await
        .unwrap_err();

    assert!(matches!(err, NovaError::Configuration(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn backend_rejection_is_a_sync_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SYNC_OBJECTS_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("unknown app"))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    write_manifest(temp_dir.path(), r#"{"objects": {}, "experiences": {}}"#);

    let err = run_sync(&SyncOptions::new(temp_dir.path()), &config(&server))
        .await
        .unwrap_err();

    match err {
        NovaError::Sync { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "unknown app");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn custom_paths_resolve_against_project_dir() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SYNC_OBJECTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("config")).unwrap();
    fs::write(
        temp_dir.path().join("config/objects.json"),
        r#"{"objects": {}, "experiences": {"onboarding": {}}}"#,
    )
    .unwrap();

    let options = SyncOptions {
        project_dir: temp_dir.path().to_path_buf(),
        manifest_path: "config/objects.json".into(),
        output_path: "build/registry.json".into(),
    };
    let report = run_sync(&options, &config(&server)).await.unwrap();

    assert_eq!(report.experience_count, 1);
    assert!(temp_dir.path().join("build/registry.json").exists());
}
