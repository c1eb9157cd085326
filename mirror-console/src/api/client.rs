//! The GitHub client implementation.

use super::types::FileContents;
use super::{
    ApiError, ConnectionStatus, CreatedIssue, RepositoryInfo, WorkflowRun, WorkflowRunList,
};
use crate::config::{ConfigError, CredentialStore, Credentials};
use crate::templates::TemplateRenderer;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Production API base. Tests point the client elsewhere via
/// [`GitHubClient::with_base_url`].
const API_BASE: &str = "https://api.github.com";

/// Media type GitHub expects on every call.
const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// Repository-resident file enumerating the currently mirrored images.
const TRACKED_IMAGE_FILE: &str = "images.txt";

/// Workflow dispatched for an operator-submitted image list.
const MANUAL_SYNC_WORKFLOW: &str = "manual-sync.yml";

/// Main pipeline workflow, dispatched without an image list.
const MAIN_WORKFLOW: &str = "docker.yaml";

/// Branch all dispatches run against.
const DISPATCH_REF: &str = "main";

/// Default page size for per-workflow run listings.
pub const DEFAULT_RUNS_PAGE_SIZE: u32 = 20;

/// Default page size for the all-workflows run listing.
pub const DEFAULT_ALL_RUNS_PAGE_SIZE: u32 = 30;

/// Client for the GitHub REST surface the mirroring pipeline consumes.
///
/// Owns the credential state. The `Authorization` header is attached only
/// when a token is configured; issue creation and run listings work without
/// one on public repositories.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    store: CredentialStore,
}

impl GitHubClient {
    /// Builds a client from already-loaded credentials and the store they
    /// persist to.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`] when the underlying HTTP client cannot
    /// be constructed.
    pub fn new(credentials: Credentials, store: CredentialStore) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("mirror-console/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Client)?;

        // API_BASE is a valid literal; parse cannot fail on it.
        let base_url = Url::parse(API_BASE)?;

        Ok(Self {
            http,
            base_url,
            credentials,
            store,
        })
    }

    /// Overrides the API base, used to point tests at a mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Applies repository-owner auto-detection for a panel served from the
    /// provider's static-hosting domain. Runs once at construction time;
    /// afterwards only [`configure`][Self::configure] changes the owner.
    #[must_use]
    pub fn with_serving_host(mut self, hostname: &str) -> Self {
        if let Some(owner) = crate::config::detect_owner(hostname) {
            info!(owner = %owner, "Detected repository owner from serving host");
            self.credentials.repository_owner = owner;
        }
        self
    }

    /// Returns the current credential state.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the configured poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.credentials.poll_interval_secs.max(1))
    }

    /// Updates and persists the credential state.
    ///
    /// An empty owner keeps the prior values untouched; callers are
    /// expected to pre-validate and this only logs a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when persisting the new values fails. The
    /// in-memory state is updated regardless.
    pub fn configure(
        &mut self,
        owner: &str,
        token: Option<String>,
        poll_interval_secs: u64,
    ) -> Result<(), ConfigError> {
        let owner = owner.trim();
        if owner.is_empty() {
            warn!("Ignoring configure call with empty repository owner");
            return Ok(());
        }

        self.credentials.repository_owner = owner.to_string();
        self.credentials.access_token = token.filter(|t| !t.is_empty());
        self.credentials.poll_interval_secs = poll_interval_secs.max(1);

        self.store.save(&self.credentials)
    }

    /// Reads repository metadata, reporting the outcome as a tagged status.
    /// Never returns an error past this boundary.
    pub async fn test_connection(&self) -> ConnectionStatus {
        match self.repository_info().await {
            Ok(repository) => {
                debug!(repo = %repository.full_name, "Connection test succeeded");
                ConnectionStatus::Connected { repository }
            }
            Err(e) => {
                warn!(error = %e, "Connection test failed");
                ConnectionStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// `GET /repos/{owner}/{repo}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] per the shared status taxonomy.
    pub async fn repository_info(&self) -> Result<RepositoryInfo, ApiError> {
        self.request_json(Method::GET, &self.repo_path(""), None)
            .await
    }

    /// Opens a sync-request issue embedding the literal image list. Works
    /// without a token on public repositories.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when rendering or the create call fails.
    pub async fn create_sync_issue(&self, image_list: &str) -> Result<CreatedIssue, ApiError> {
        let renderer = TemplateRenderer::new();
        let body = renderer.render_sync_issue(image_list, false, false)?;

        let payload = json!({
            "title": crate::templates::sync_issue_title(),
            "body": body,
            "labels": ["sync"],
        });

        let issue: CreatedIssue = self
            .request_json(Method::POST, &self.repo_path("/issues"), Some(&payload))
            .await?;

        info!(issue = issue.number, "Created sync issue");
        Ok(issue)
    }

    /// Dispatches the manual sync workflow with an operator image list.
    /// The provider rejects this without a token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] per the shared status taxonomy.
    pub async fn trigger_manual_sync(
        &self,
        image_list: &str,
        force_update: bool,
        dry_run: bool,
    ) -> Result<(), ApiError> {
        let inputs = json!({
            "image_list": image_list,
            "force_update": force_update.to_string(),
            "dry_run": dry_run.to_string(),
        });
        self.dispatch_workflow(MANUAL_SYNC_WORKFLOW, inputs).await
    }

    /// Dispatches the main pipeline workflow.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] per the shared status taxonomy.
    pub async fn trigger_main_workflow(&self, force_sync: bool) -> Result<(), ApiError> {
        let inputs = json!({
            "force_sync": force_sync.to_string(),
        });
        self.dispatch_workflow(MAIN_WORKFLOW, inputs).await
    }

    /// Lists runs of one workflow, defaulting to the manual sync workflow.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] per the shared status taxonomy.
    pub async fn list_workflow_runs(
        &self,
        workflow_file: Option<&str>,
        per_page: u32,
    ) -> Result<WorkflowRunList, ApiError> {
        let workflow = workflow_file.unwrap_or(MANUAL_SYNC_WORKFLOW);
        let path = self.repo_path(&format!(
            "/actions/workflows/{workflow}/runs?per_page={per_page}"
        ));
        self.request_json(Method::GET, &path, None).await
    }

    /// Lists recent runs across all workflows.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] per the shared status taxonomy.
    pub async fn list_all_runs(&self, per_page: u32) -> Result<WorkflowRunList, ApiError> {
        let path = self.repo_path(&format!("/actions/runs?per_page={per_page}"));
        self.request_json(Method::GET, &path, None).await
    }

    /// Fetches one run by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] per the shared status taxonomy.
    pub async fn get_run(&self, run_id: u64) -> Result<WorkflowRun, ApiError> {
        let path = self.repo_path(&format!("/actions/runs/{run_id}"));
        self.request_json(Method::GET, &path, None).await
    }

    /// Fetches the plain-text logs of one run. The provider requires a
    /// token for this endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] per the shared status taxonomy.
    pub async fn get_run_logs(&self, run_id: u64) -> Result<String, ApiError> {
        let path = self.repo_path(&format!("/actions/runs/{run_id}/logs"));
        let response = self.send(Method::GET, &path, None).await?;
        response.text().await.map_err(ApiError::Decode)
    }

    /// Reads the tracked image file used to pre-populate the editor.
    ///
    /// This is a soft-fail path: a missing or unreadable file yields an
    /// empty string, never an error.
    pub async fn fetch_tracked_image_file(&self) -> String {
        match self.tracked_image_file().await {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, file = TRACKED_IMAGE_FILE, "Could not fetch tracked image file");
                String::new()
            }
        }
    }

    async fn tracked_image_file(&self) -> Result<String, ApiError> {
        let path = self.repo_path(&format!("/contents/{TRACKED_IMAGE_FILE}"));
        let contents: FileContents = self.request_json(Method::GET, &path, None).await?;

        if let Some(encoding) = contents.encoding.as_deref() {
            if encoding != "base64" {
                return Err(ApiError::Content(format!(
                    "unsupported content encoding '{encoding}'"
                )));
            }
        }

        // The transport encoding wraps lines; strip whitespace first.
        let encoded: String = contents
            .content
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let bytes = BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| ApiError::Content(e.to_string()))?;

        String::from_utf8(bytes).map_err(|e| ApiError::Content(e.to_string()))
    }

    async fn dispatch_workflow(&self, workflow_file: &str, inputs: Value) -> Result<(), ApiError> {
        let payload = json!({
            "ref": DISPATCH_REF,
            "inputs": inputs,
        });
        let path = self.repo_path(&format!("/actions/workflows/{workflow_file}/dispatches"));

        // Dispatches answer 204 with no body.
        self.send(Method::POST, &path, Some(&payload)).await?;
        info!(workflow = workflow_file, "Dispatched workflow");
        Ok(())
    }

    fn repo_path(&self, suffix: &str) -> String {
        format!(
            "/repos/{}/{}{}",
            self.credentials.repository_owner,
            self.credentials.repository_name(),
            suffix
        )
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let response = self.send(method, path, body).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.base_url.join(path)?;
        debug!(method = %method, path, "Sending API request");

        let mut request = self.http.request(method, url).header(ACCEPT, ACCEPT_HEADER);

        if let Some(token) = &self.credentials.access_token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::Network)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Auth);
        }
        if status == StatusCode::FORBIDDEN {
            return Err(ApiError::RateLimit);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_client(owner: &str) -> (GitHubClient, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = CredentialStore::new(temp.path().join("credentials.toml"));
        let credentials = Credentials {
            repository_owner: owner.to_string(),
            ..Credentials::default()
        };
        (GitHubClient::new(credentials, store).unwrap(), temp)
    }

    #[test]
    fn builds_repo_paths() {
        let (client, _temp) = test_client("someone");
        assert_eq!(client.repo_path(""), "/repos/someone/docker_image_pusher");
        assert_eq!(
            client.repo_path("/actions/runs/7"),
            "/repos/someone/docker_image_pusher/actions/runs/7"
        );
    }

    #[test]
    fn configure_ignores_empty_owner() {
        let (mut client, _temp) = test_client("someone");

        client
            .configure("", Some("ghp_new".to_string()), 30)
            .unwrap();

        assert_eq!(client.credentials().repository_owner, "someone");
        assert!(client.credentials().access_token.is_none());
    }

    #[test]
    fn configure_clamps_poll_interval() {
        let (mut client, _temp) = test_client("someone");

        client.configure("someone", None, 0).unwrap();

        assert_eq!(client.credentials().poll_interval_secs, 1);
        assert_eq!(client.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn serving_host_overrides_persisted_owner() {
        let (client, _temp) = test_client("persisted");

        let detected = client.clone().with_serving_host("fresh.github.io");
        assert_eq!(detected.credentials().repository_owner, "fresh");

        let unchanged = client.with_serving_host("example.com");
        assert_eq!(unchanged.credentials().repository_owner, "persisted");
    }
}
