//! Panel controller: capability state machine, sync actions, polling.
//!
//! The controller owns the API client and the credential state behind it,
//! keeps exactly one polling session alive at a time, and reports every
//! state change to the front end through an event channel. It never touches
//! presentation directly, so tests (and any front end) consume the same
//! surface.

mod capability;
mod error;
mod events;
mod polling;

pub use capability::{ActionGates, CapabilityTier};
pub use error::{SettingsError, SyncError};
pub use events::{ControllerEvent, NoticeLevel};

use crate::api::{ApiError, ConnectionStatus, CreatedIssue, GitHubClient, WorkflowRun};
use crate::config::TokenUpdate;
use crate::images::parse_image_list;
use polling::{PollHandle, HISTORY_PAGE_SIZE};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

/// Drives the mirror panel.
pub struct Controller {
    client: GitHubClient,
    events: UnboundedSender<ControllerEvent>,
    poll: Option<PollHandle>,
    generation: u64,
}

impl Controller {
    /// Creates a controller around a configured client, returning the event
    /// stream the front end renders from.
    #[must_use]
    pub fn new(client: GitHubClient) -> (Self, UnboundedReceiver<ControllerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                client,
                events,
                poll: None,
                generation: 0,
            },
            receiver,
        )
    }

    /// Returns the owned API client.
    #[must_use]
    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    /// Recomputes the capability tier from the current credentials.
    #[must_use]
    pub fn capability(&self) -> CapabilityTier {
        CapabilityTier::from_credentials(self.client.credentials())
    }

    /// Recomputes the action gates from the current credentials.
    #[must_use]
    pub fn gates(&self) -> ActionGates {
        ActionGates::for_tier(self.capability())
    }

    /// Loads startup state: announces the capability tier and, when the
    /// repository is readable, the current run history and the tracked
    /// image file for the editor.
    pub async fn load_initial(&mut self) {
        let tier = self.capability();
        self.emit(ControllerEvent::CapabilityChanged { tier });

        if tier == CapabilityTier::Unconfigured {
            return;
        }

        self.refresh_history().await;

        let content = self.client.fetch_tracked_image_file().await;
        if !content.is_empty() {
            self.emit(ControllerEvent::EditorLoaded { content });
        }
    }

    /// Validates and persists new settings, then re-derives the capability
    /// tier and reloads repository state.
    ///
    /// A failed connection test is reported as a notice but does not roll
    /// back the save; the operator may be configuring ahead of the
    /// repository becoming reachable.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when validation or persistence fails; the
    /// stored credentials are unchanged in the validation cases.
    pub async fn save_settings(
        &mut self,
        owner: &str,
        token: TokenUpdate,
        poll_interval_secs: u64,
    ) -> Result<CapabilityTier, SettingsError> {
        let owner = owner.trim();
        if owner.is_empty() {
            self.notice(NoticeLevel::Error, "Repository owner must not be empty");
            return Err(SettingsError::MissingOwner);
        }

        let token = match token {
            TokenUpdate::Keep => self.client.credentials().access_token.clone(),
            TokenUpdate::Clear => None,
            TokenUpdate::Set(token) => {
                if !crate::config::token_is_well_formed(&token) {
                    self.notice(NoticeLevel::Error, "Access token must start with 'ghp_'");
                    return Err(SettingsError::MalformedToken);
                }
                Some(token)
            }
        };

        self.client.configure(owner, token, poll_interval_secs)?;

        let tier = self.capability();
        info!(tier = %tier, "Settings saved");
        self.emit(ControllerEvent::CapabilityChanged { tier });

        match self.client.test_connection().await {
            ConnectionStatus::Connected { repository } => {
                let message = match tier {
                    CapabilityTier::FullAccess => {
                        format!("Settings saved, full access to {}", repository.full_name)
                    }
                    _ => format!(
                        "Settings saved, issue-based sync against {}",
                        repository.full_name
                    ),
                };
                self.notice(NoticeLevel::Success, message);
                self.refresh_history().await;

                let content = self.client.fetch_tracked_image_file().await;
                if !content.is_empty() {
                    self.emit(ControllerEvent::EditorLoaded { content });
                }
            }
            ConnectionStatus::Failed { reason } => {
                self.notice(NoticeLevel::Error, format!("Connection failed: {reason}"));
            }
        }

        Ok(tier)
    }

    /// Submits an image list by opening a sync-request issue, then starts
    /// polling run history.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when gating, parsing or the create call fails.
    /// On failure the triggering control should return to its pre-action
    /// state so the operator can retry.
    pub async fn sync_via_issue(&mut self, image_text: &str) -> Result<CreatedIssue, SyncError> {
        if !self.gates().issue_sync {
            self.notice(
                NoticeLevel::Error,
                "Configure a repository owner before syncing",
            );
            return Err(SyncError::NotPermitted {
                action: "issue-based sync",
            });
        }

        let image_list = self.prepare_image_list(image_text)?;

        match self.client.create_sync_issue(&image_list).await {
            Ok(issue) => {
                self.notice(
                    NoticeLevel::Success,
                    format!(
                        "Sync issue #{} created, the pipeline will pick it up shortly",
                        issue.number
                    ),
                );
                self.emit(ControllerEvent::IssueOpened {
                    number: issue.number,
                    url: issue.html_url.clone(),
                });
                self.start_polling();
                Ok(issue)
            }
            Err(e) => {
                self.notice(
                    NoticeLevel::Error,
                    format!("Could not create sync issue: {e}"),
                );
                Err(e.into())
            }
        }
    }

    /// Submits an image list by dispatching the manual sync workflow, then
    /// starts polling run history. Requires full access.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when gating, parsing or the dispatch fails.
    pub async fn sync_via_dispatch(
        &mut self,
        image_text: &str,
        force_update: bool,
        dry_run: bool,
    ) -> Result<(), SyncError> {
        if !self.gates().workflow_dispatch {
            self.notice(
                NoticeLevel::Error,
                "Workflow dispatch requires an access token",
            );
            return Err(SyncError::NotPermitted {
                action: "workflow dispatch",
            });
        }

        let image_list = self.prepare_image_list(image_text)?;

        match self
            .client
            .trigger_manual_sync(&image_list, force_update, dry_run)
            .await
        {
            Ok(()) => {
                self.notice(NoticeLevel::Success, "Manual sync workflow dispatched");
                self.start_polling();
                Ok(())
            }
            Err(e) => {
                self.notice(NoticeLevel::Error, format!("Could not dispatch sync: {e}"));
                Err(e.into())
            }
        }
    }

    /// Dispatches the main pipeline workflow. Requires full access.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when gating or the dispatch fails.
    pub async fn trigger_main_workflow(&mut self, force_sync: bool) -> Result<(), SyncError> {
        if !self.gates().workflow_dispatch {
            self.notice(
                NoticeLevel::Error,
                "Workflow dispatch requires an access token",
            );
            return Err(SyncError::NotPermitted {
                action: "workflow dispatch",
            });
        }

        match self.client.trigger_main_workflow(force_sync).await {
            Ok(()) => {
                self.notice(NoticeLevel::Success, "Main pipeline workflow dispatched");
                self.start_polling();
                Ok(())
            }
            Err(e) => {
                self.notice(
                    NoticeLevel::Error,
                    format!("Could not dispatch pipeline: {e}"),
                );
                Err(e.into())
            }
        }
    }

    /// Fetches a run-history snapshot once. Read-path failures degrade to
    /// keeping the previous snapshot; they never block the panel.
    pub async fn refresh_history(&mut self) {
        if self.capability() == CapabilityTier::Unconfigured {
            return;
        }

        match self.client.list_all_runs(HISTORY_PAGE_SIZE).await {
            Ok(list) => {
                self.emit(ControllerEvent::HistoryUpdated {
                    generation: self.generation,
                    runs: list.workflow_runs,
                });
            }
            Err(e) => warn!(error = %e, "Failed to refresh run history"),
        }
    }

    /// Fetches one run by id. The caller keys any rendering on the run id,
    /// since responses may arrive out of issuance order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] per the shared status taxonomy.
    pub async fn run_details(&self, run_id: u64) -> Result<WorkflowRun, ApiError> {
        self.client.get_run(run_id).await
    }

    /// Fetches the plain-text logs of one run. Requires full access.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when gating or the fetch fails.
    pub async fn run_logs(&self, run_id: u64) -> Result<String, SyncError> {
        if !self.gates().run_logs {
            return Err(SyncError::NotPermitted {
                action: "run log retrieval",
            });
        }
        Ok(self.client.get_run_logs(run_id).await?)
    }

    /// Starts a polling session, replacing (and thereby cancelling) any
    /// active one. Exactly one polling timer exists afterwards.
    pub fn start_polling(&mut self) {
        self.generation += 1;
        let generation = self.generation;

        // Dropping the previous handle aborts its task before the new one
        // is stored.
        self.poll = Some(PollHandle::spawn(
            self.client.clone(),
            self.events.clone(),
            generation,
        ));

        info!(generation, "Started history polling");
        self.emit(ControllerEvent::PollingStarted { generation });
    }

    /// Cancels the active polling session, if any.
    pub fn stop_polling(&mut self) {
        if let Some(handle) = self.poll.take() {
            let generation = handle.generation();
            drop(handle);
            info!(generation, "Stopped history polling");
            self.emit(ControllerEvent::PollingStopped { generation });
        }
    }

    /// Returns true while a polling session is active.
    #[must_use]
    pub fn polling_is_active(&self) -> bool {
        self.poll.is_some()
    }

    /// Returns the current polling generation.
    #[must_use]
    pub fn poll_generation(&self) -> u64 {
        self.generation
    }

    /// Returns true when a history snapshot with the given generation
    /// reflects the latest sync, false when it is stale and must be
    /// discarded.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    fn prepare_image_list(&self, image_text: &str) -> Result<String, SyncError> {
        let descriptors = parse_image_list(image_text);
        if descriptors.is_empty() {
            self.notice(NoticeLevel::Warning, "No images found in the provided list");
            return Err(SyncError::EmptyImageList);
        }

        let malformed = descriptors.iter().filter(|d| !d.is_valid).count();
        if malformed > 0 {
            self.notice(
                NoticeLevel::Warning,
                format!("{malformed} image reference(s) look malformed, submitting anyway"),
            );
        }

        // Duplicates are submitted verbatim; the pipeline deduplicates on
        // its side if it cares to.
        Ok(descriptors
            .iter()
            .map(|d| d.original.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn notice(&self, level: NoticeLevel, message: impl Into<String>) {
        self.emit(ControllerEvent::Notice {
            level,
            message: message.into(),
        });
    }

    fn emit(&self, event: ControllerEvent) {
        // A dropped receiver means the front end is gone; nothing to do.
        let _ = self.events.send(event);
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.poll.take();
    }
}
