//! Lifecycle controller for one agent processing job at a time.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::connection::{ConnectionEvent, ConnectionHandle, TaggedEvent};
use super::http::HttpJobApi;
use super::transport::{CreateJobRequest, JobApi, StreamConnector, StreamSignal};
use super::ws::WsConnector;
use crate::config::DocentConfig;
use crate::error::{DecodeError, DocentError};
use crate::gate::ScreenshotGate;
use crate::progress::{ProgressState, ProgressStore};
use crate::router::MessageRouter;
use crate::types::{AgentStatus, CapturedRegion, CloseInfo, InboundMessage, JobId};

pub const CAPTURED_MESSAGE: &str = "Screenshot captured. Ready to start processing.";
pub const INITIATING_MESSAGE: &str = "Initiating agent processing...";
pub const CREATED_MESSAGE: &str = "Agent job created. Connecting for updates...";
pub const CONNECTED_MESSAGE: &str = "Connected to agent. Waiting for updates...";
pub const START_FAILED_MESSAGE: &str = "Failed to start agent.";
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error.";
pub const DISCONNECTED_MESSAGE: &str = "Disconnected from agent.";
pub const START_CANCELLED_MESSAGE: &str = "Agent start cancelled.";

/// Point-in-time view of a [`JobClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub job_id: Option<JobId>,
    pub status: AgentStatus,
    pub has_region: bool,
    pub connected: bool,
    pub progress: ProgressState,
    /// How the most recent stream for this job ended.
    pub last_close: Option<CloseInfo>,
}

/// Owns the lifecycle of one agent processing job: creation, the update
/// stream, frame decoding, and status transitions.
///
/// ```text
/// idle/completed/failed --start()--> initiating
/// initiating --creation ok--> connecting --stream open--> processing
/// initiating --creation fails--> failed
/// connecting/processing --final_result--> completed
/// connecting/processing --error frame / stream error--> failed
/// connecting/processing --close--> idle
/// any --reset()--> idle
/// ```
///
/// All mutation goes through `&mut self`; frames from the stream are applied
/// one at a time, in arrival order, by [`JobClient::next_update`]. Observers
/// that cannot hold the client can follow [`JobClient::watch`].
pub struct JobClient {
    config: DocentConfig,
    api: Arc<dyn JobApi>,
    connector: Arc<dyn StreamConnector>,
    region: Option<CapturedRegion>,
    job_id: Option<JobId>,
    status: AgentStatus,
    progress: ProgressStore,
    connection: Option<ConnectionHandle>,
    generation: u64,
    last_close: Option<CloseInfo>,
    events_tx: mpsc::UnboundedSender<TaggedEvent>,
    events_rx: mpsc::UnboundedReceiver<TaggedEvent>,
    snapshot_tx: watch::Sender<JobSnapshot>,
}

impl JobClient {
    /// Client speaking HTTP + WebSocket to the configured backend.
    pub fn new(config: DocentConfig) -> Result<Self, DocentError> {
        config.validate()?;
        let api = Arc::new(HttpJobApi::new(&config)?);
        let connector = Arc::new(WsConnector::new(config.clone()));
        Ok(Self::with_transports(config, api, connector))
    }

    /// Client with custom transports.
    pub fn with_transports(
        config: DocentConfig,
        api: Arc<dyn JobApi>,
        connector: Arc<dyn StreamConnector>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let progress = ProgressStore::new();
        let (snapshot_tx, _) = watch::channel(JobSnapshot {
            job_id: None,
            status: AgentStatus::Idle,
            has_region: false,
            connected: false,
            progress: progress.state().clone(),
            last_close: None,
        });
        Self {
            config,
            api,
            connector,
            region: None,
            job_id: None,
            status: AgentStatus::Idle,
            progress,
            connection: None,
            generation: 0,
            last_close: None,
            events_tx,
            events_rx,
            snapshot_tx,
        }
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn region(&self) -> Option<&CapturedRegion> {
        self.region.as_ref()
    }

    pub fn progress(&self) -> &ProgressState {
        self.progress.state()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            job_id: self.job_id.clone(),
            status: self.status,
            has_region: self.region.is_some(),
            connected: self.connection.is_some(),
            progress: self.progress.state().clone(),
            last_close: self.last_close.clone(),
        }
    }

    /// Subscribe to snapshots published on every state change.
    pub fn watch(&self) -> watch::Receiver<JobSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Record the most recent screenshot.
    ///
    /// A new capture supersedes any job that has moved past `initiating`:
    /// transcript, artifacts, and the stream are discarded first.
    pub fn capture_region(&mut self, region: CapturedRegion) {
        if !matches!(self.status, AgentStatus::Idle | AgentStatus::Initiating) {
            info!(status = %self.status, "new capture supersedes current job");
            self.reset_job();
        }
        debug!(?region, "region captured");
        self.region = Some(region);
        self.progress.set_status_message(CAPTURED_MESSAGE);
        self.publish();
    }

    /// Start a job for the held region.
    ///
    /// Returns the status after the call. Validation failures are returned
    /// as [`DocentError::Validation`] (and recorded as the error message)
    /// without any network action. Calling while a job is in flight is a
    /// logged no-op. Creation failures land in `failed` rather than `Err`.
    /// Dropping the future before the backend answers returns to `idle`.
    pub async fn start(&mut self, prompt: &str) -> Result<AgentStatus, DocentError> {
        if !self.status.accepts_start() {
            warn!(status = %self.status, "agent processing already in progress");
            return Ok(self.status);
        }

        let (region, prompt) = match ScreenshotGate::check(self.region.as_ref(), prompt) {
            Ok((region, prompt)) => (region.clone(), prompt.to_string()),
            Err(error) => {
                warn!(%error, "start rejected");
                if let DocentError::Validation(message) = &error {
                    self.progress.set_error(message.clone());
                }
                self.publish();
                return Err(error);
            }
        };

        self.reset_job();
        self.progress.push_user(prompt.clone());
        self.progress.set_status_message(INITIATING_MESSAGE);
        self.status = AgentStatus::Initiating;
        self.publish();

        let request = CreateJobRequest {
            image_data_url: region.data_url().to_string(),
            user_prompt: prompt,
        };
        let api = Arc::clone(&self.api);
        let created = {
            let pending = PendingStart::new(self);
            let created = api.create_job(&request).await;
            pending.settle();
            created
        };
        match created {
            Ok(job_id) => {
                info!(%job_id, "agent job initiated");
                self.job_id = Some(job_id.clone());
                self.progress.set_status_message(CREATED_MESSAGE);
                self.connect(job_id);
            }
            Err(error) => {
                warn!(%error, "failed to start agent processing");
                self.progress
                    .set_error(format!("Failed to initiate agent: {}", creation_detail(&error)));
                self.progress.set_status_message(START_FAILED_MESSAGE);
                self.status = AgentStatus::Failed;
                self.publish();
            }
        }
        Ok(self.status)
    }

    /// Undo `initiating` when the creation request was abandoned mid-flight.
    fn abandon_start(&mut self) {
        if self.status != AgentStatus::Initiating {
            return;
        }
        warn!("job creation cancelled before the backend answered");
        self.status = AgentStatus::Idle;
        self.progress.set_status_message(START_CANCELLED_MESSAGE);
        self.publish();
    }

    /// Open the update stream for `job_id`.
    ///
    /// No-op when a stream for that job is already open. The stream opens in
    /// the background; [`JobClient::next_update`] reports when it does.
    pub fn connect(&mut self, job_id: JobId) {
        if let Some(connection) = &self.connection {
            if connection.job_id() == &job_id {
                debug!(%job_id, "update stream already open");
                return;
            }
        }
        self.close_connection(CloseInfo::normal("superseded by new job"));

        self.generation += 1;
        info!(%job_id, generation = self.generation, "connecting to agent updates");
        self.progress
            .set_status_message(format!("Connecting to agent for job {job_id}..."));
        self.status = AgentStatus::Connecting;
        self.last_close = None;
        self.job_id = Some(job_id.clone());
        self.connection = Some(ConnectionHandle::spawn(
            Arc::clone(&self.connector),
            job_id,
            self.generation,
            self.events_tx.clone(),
        ));
        self.publish();
    }

    /// Wait for the next event on the live stream and apply it.
    ///
    /// Returns `None` once no stream is live.
    pub async fn next_update(&mut self) -> Option<JobSnapshot> {
        loop {
            let generation = self.connection.as_ref()?.generation();
            let tagged = self.events_rx.recv().await?;
            if tagged.generation != generation {
                debug!(
                    stale = tagged.generation,
                    current = generation,
                    "dropping event from abandoned stream"
                );
                continue;
            }
            self.handle_event(tagged.event);
            self.publish();
            return Some(self.snapshot());
        }
    }

    /// Apply stream events until the stream is gone.
    pub async fn run_to_settled(&mut self) -> JobSnapshot {
        while self.next_update().await.is_some() {}
        self.snapshot()
    }

    /// Close the stream with a normal code, keeping job state.
    pub fn disconnect(&mut self) {
        if self.connection.is_none() {
            return;
        }
        self.close_connection(CloseInfo::normal("client disconnect"));
        if self.status.is_streaming() {
            self.status = AgentStatus::Idle;
            self.progress.set_status_message(DISCONNECTED_MESSAGE);
        }
        self.publish();
    }

    /// Discard the job (stream, id, transcript, artifacts, error) and return
    /// to `idle`. The captured region is kept.
    pub fn reset(&mut self) {
        self.reset_job();
        self.publish();
    }

    /// [`JobClient::reset`] plus dropping the captured region.
    pub fn clear(&mut self) {
        self.reset_job();
        self.region = None;
        self.publish();
    }

    fn reset_job(&mut self) {
        self.close_connection(CloseInfo::normal("reset"));
        self.job_id = None;
        self.status = AgentStatus::Idle;
        self.last_close = None;
        self.progress.reset();
    }

    fn close_connection(&mut self, close: CloseInfo) {
        if let Some(connection) = self.connection.take() {
            debug!(job_id = %connection.job_id(), reason = %close.reason, "closing update stream");
            connection.close(close);
        }
    }

    fn handle_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Opened => {
                if self.status == AgentStatus::Connecting {
                    info!(job_id = ?self.job_id, "update stream open");
                    self.status = AgentStatus::Processing;
                    self.progress.set_status_message(CONNECTED_MESSAGE);
                }
            }
            ConnectionEvent::OpenFailed(error) => {
                self.connection = None;
                self.fail_connection(error);
            }
            ConnectionEvent::Signal(StreamSignal::Text(raw)) => {
                self.handle_frame(MessageRouter::decode(&raw));
            }
            ConnectionEvent::Signal(StreamSignal::Binary(raw)) => {
                self.handle_frame(MessageRouter::decode_bytes(&raw));
            }
            ConnectionEvent::Signal(StreamSignal::Closed(close)) => {
                self.connection = None;
                if close.is_normal() {
                    info!(reason = %close.reason, status = %self.status, "update stream closed");
                } else {
                    warn!(code = close.code, reason = %close.reason, status = %self.status, "update stream closed unexpectedly");
                }
                if self.status.is_streaming() {
                    self.status = AgentStatus::Idle;
                    self.progress.set_status_message(DISCONNECTED_MESSAGE);
                }
                self.last_close = Some(close);
            }
            ConnectionEvent::Signal(StreamSignal::Error(error)) => {
                self.connection = None;
                if self.status.is_terminal() {
                    debug!(%error, "stream error after job finished");
                } else {
                    self.fail_connection(error);
                }
            }
        }
    }

    fn fail_connection(&mut self, error: String) {
        warn!(%error, "update stream error");
        self.progress.set_error(format!(
            "WebSocket connection error ({error}). Ensure the backend is running and accessible."
        ));
        self.progress.set_status_message(CONNECTION_ERROR_MESSAGE);
        self.status = AgentStatus::Failed;
    }

    fn handle_frame(&mut self, decoded: Result<InboundMessage, DecodeError>) {
        let message = match decoded {
            Ok(message) => message,
            Err(error) => {
                let error = DocentError::from(error);
                warn!(%error, category = ?error.category(), "dropping undecodable frame");
                return;
            }
        };
        debug!(kind = message.kind(), status = %self.status, "frame received");

        if self.status.is_terminal() {
            if message.is_terminal() {
                warn!(kind = message.kind(), "ignoring terminal frame after job finished");
            } else {
                self.progress.apply(&message);
            }
            return;
        }

        self.progress.apply(&message);
        match message {
            InboundMessage::FinalResult(_) => {
                info!(job_id = ?self.job_id, "agent job completed");
                self.status = AgentStatus::Completed;
                if let Some(connection) = &self.connection {
                    connection.close_after(
                        self.config.final_grace_period,
                        CloseInfo::normal("job complete"),
                    );
                }
            }
            InboundMessage::Error(report) => {
                warn!(job_id = ?self.job_id, error = %report.error_message, "agent reported an error");
                self.status = AgentStatus::Failed;
                self.close_connection(CloseInfo::normal("agent reported an error"));
            }
            InboundMessage::StatusUpdate(_) | InboundMessage::PartialResult(_) => {}
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

/// Held across the creation request. Dropping it unsettled (the `start`
/// future was cancelled) puts the client back in `idle`.
struct PendingStart<'a> {
    client: &'a mut JobClient,
    settled: bool,
}

impl<'a> PendingStart<'a> {
    fn new(client: &'a mut JobClient) -> Self {
        Self {
            client,
            settled: false,
        }
    }

    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for PendingStart<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.client.abandon_start();
        }
    }
}

fn creation_detail(error: &DocentError) -> String {
    match error {
        DocentError::Api { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
