//! HTTP-level tests of the GitHub client against a mock server.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use mirror_console::{
    ApiError, CredentialStore, Credentials, GitHubClient, DEFAULT_RUNS_PAGE_SIZE,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_with(server: &MockServer, token: Option<&str>) -> (GitHubClient, TempDir) {
    let temp = TempDir::new().unwrap();
    let store = CredentialStore::new(temp.path().join("credentials.toml"));
    let credentials = Credentials {
        repository_owner: "someone".to_string(),
        access_token: token.map(str::to_string),
        poll_interval_secs: 5,
    };
    let client = GitHubClient::new(credentials, store)
        .unwrap()
        .with_base_url(Url::parse(&server.uri()).unwrap());
    (client, temp)
}

const REPO_PATH: &str = "/repos/someone/docker_image_pusher";

fn repo_json() -> Value {
    json!({
        "full_name": "someone/docker_image_pusher",
        "description": "Mirror pipeline",
        "default_branch": "main",
        "private": false,
        "html_url": "https://github.com/someone/docker_image_pusher"
    })
}

#[tokio::test]
async fn status_401_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPO_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (client, _temp) = client_with(&server, Some("ghp_expired"));
    assert!(matches!(client.repository_info().await, Err(ApiError::Auth)));
}

#[tokio::test]
async fn status_403_maps_to_rate_limit_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPO_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let (client, _temp) = client_with(&server, None);
    assert!(matches!(
        client.repository_info().await,
        Err(ApiError::RateLimit)
    ));
}

#[tokio::test]
async fn other_statuses_map_to_http_error_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPO_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (client, _temp) = client_with(&server, None);
    match client.repository_info().await {
        Err(ApiError::Http { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected HttpError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_returns_tagged_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPO_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json()))
        .mount(&server)
        .await;

    let (client, _temp) = client_with(&server, None);
    let status = client.test_connection().await;
    assert!(status.is_connected());

    // And the failure side, against a fresh server with no mocks: wiremock
    // answers 404, which must come back as Failed, not as a panic or Err.
    let empty = MockServer::start().await;
    let (client, _temp) = client_with(&empty, None);
    assert!(!client.test_connection().await.is_connected());
}

#[tokio::test]
async fn tokenless_requests_carry_no_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPO_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json()))
        .mount(&server)
        .await;

    let (client, _temp) = client_with(&server, None);
    client.repository_info().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(
        requests[0].headers.get("accept").unwrap(),
        "application/vnd.github.v3+json"
    );
}

#[tokio::test]
async fn token_is_sent_in_the_documented_scheme() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPO_PATH))
        .and(header("authorization", "token ghp_abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json()))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _temp) = client_with(&server, Some("ghp_abc123"));
    client.repository_info().await.unwrap();
}

#[tokio::test]
async fn create_sync_issue_embeds_the_literal_image_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/someone/docker_image_pusher/issues"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "number": 7,
            "html_url": "https://github.com/someone/docker_image_pusher/issues/7"
        })))
        .mount(&server)
        .await;

    let (client, _temp) = client_with(&server, None);
    let list = "nginx:1.25\nghcr.io/org/app --platform linux/arm64";
    let issue = client.create_sync_issue(list).await.unwrap();

    assert_eq!(issue.number, 7);
    assert!(issue.html_url.ends_with("/issues/7"));

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();

    assert!(body["body"].as_str().unwrap().contains(list));
    assert_eq!(body["labels"], json!(["sync"]));
    assert_eq!(body["title"], json!(mirror_console::sync_issue_title()));
}

#[tokio::test]
async fn manual_sync_dispatch_sends_string_inputs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/repos/someone/docker_image_pusher/actions/workflows/manual-sync.yml/dispatches",
        ))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let (client, _temp) = client_with(&server, Some("ghp_abc123"));
    client
        .trigger_manual_sync("nginx:1.25", true, false)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();

    assert_eq!(body["ref"], json!("main"));
    assert_eq!(body["inputs"]["image_list"], json!("nginx:1.25"));
    assert_eq!(body["inputs"]["force_update"], json!("true"));
    assert_eq!(body["inputs"]["dry_run"], json!("false"));
}

#[tokio::test]
async fn main_workflow_dispatch_targets_the_pipeline_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/repos/someone/docker_image_pusher/actions/workflows/docker.yaml/dispatches",
        ))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _temp) = client_with(&server, Some("ghp_abc123"));
    client.trigger_main_workflow(true).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["inputs"]["force_sync"], json!("true"));
}

#[tokio::test]
async fn tracked_image_file_is_base64_decoded() {
    let server = MockServer::start().await;

    let plain = "nginx:1.25\nredis:7\n";
    let encoded = BASE64.encode(plain);
    // The provider wraps encoded content across lines.
    let wrapped = format!("{}\n{}", &encoded[..10], &encoded[10..]);

    Mock::given(method("GET"))
        .and(path("/repos/someone/docker_image_pusher/contents/images.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": wrapped,
            "encoding": "base64"
        })))
        .mount(&server)
        .await;

    let (client, _temp) = client_with(&server, None);
    assert_eq!(client.fetch_tracked_image_file().await, plain);
}

#[tokio::test]
async fn missing_tracked_image_file_soft_fails_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/someone/docker_image_pusher/contents/images.txt"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let (client, _temp) = client_with(&server, None);
    assert_eq!(client.fetch_tracked_image_file().await, "");
}

#[tokio::test]
async fn run_listings_hit_the_documented_endpoints() {
    let server = MockServer::start().await;

    let runs = json!({
        "total_count": 1,
        "workflow_runs": [{
            "id": 42,
            "name": "Manual Image Sync",
            "status": "completed",
            "conclusion": "success",
            "head_branch": "main",
            "head_sha": "0123456789abcdef",
            "created_at": "2024-05-01T12:00:00Z",
            "updated_at": "2024-05-01T12:03:00Z"
        }]
    });

    Mock::given(method("GET"))
        .and(path("/repos/someone/docker_image_pusher/actions/runs"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(runs.clone()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(
            "/repos/someone/docker_image_pusher/actions/workflows/manual-sync.yml/runs",
        ))
        .and(query_param("per_page", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(runs))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _temp) = client_with(&server, None);

    let all = client.list_all_runs(10).await.unwrap();
    assert_eq!(all.total_count, 1);
    assert_eq!(all.workflow_runs[0].id, 42);

    let manual = client
        .list_workflow_runs(None, DEFAULT_RUNS_PAGE_SIZE)
        .await
        .unwrap();
    assert_eq!(manual.workflow_runs.len(), 1);
}

#[tokio::test]
async fn single_run_and_logs_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/someone/docker_image_pusher/actions/runs/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "name": "Manual Image Sync",
            "status": "in_progress"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(
            "/repos/someone/docker_image_pusher/actions/runs/42/logs",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("pulling nginx:1.25\ndone\n"))
        .mount(&server)
        .await;

    let (client, _temp) = client_with(&server, Some("ghp_abc123"));

    let run = client.get_run(42).await.unwrap();
    assert_eq!(run.id, 42);

    let logs = client.get_run_logs(42).await.unwrap();
    assert!(logs.contains("pulling nginx:1.25"));
}

#[tokio::test]
async fn configure_round_trips_through_the_store() {
    let temp = TempDir::new().unwrap();
    let store_path = temp.path().join("credentials.toml");

    let store = CredentialStore::new(&store_path);
    let mut client = GitHubClient::new(Credentials::default(), store).unwrap();
    client
        .configure("someone", Some("ghp_persisted".to_string()), 15)
        .unwrap();

    let reloaded = CredentialStore::new(&store_path).load().unwrap();
    assert_eq!(reloaded.repository_owner, "someone");
    assert_eq!(reloaded.access_token.as_deref(), Some("ghp_persisted"));
    assert_eq!(reloaded.poll_interval_secs, 15);
}
