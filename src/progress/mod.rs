//! Observable job progress, derived from inbound messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{
    EntryKind, ErrorReport, FinalResult, InboundMessage, PartialResult, ResultType, StatusUpdate,
    Transcript, TranscriptEntry,
};

pub const READY_MESSAGE: &str = "Ready to process.";
pub const COMPLETE_MESSAGE: &str = "Processing complete!";
pub const ERROR_STATUS_MESSAGE: &str = "An error occurred.";

/// How a completed job turned out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalOutcome<'a> {
    /// The animation rendered.
    Video(&'a str),
    /// Rendering failed; any generated code is still available.
    GenerationFailed(&'a str),
    /// Code was produced but no video was attempted.
    CodeOnly(&'a str),
    Empty,
}

/// Everything the presentation layer reads about a job's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    pub status_message: String,
    pub transcript: Transcript,
    /// Latest content per artifact kind; each update replaces the last.
    pub artifacts: BTreeMap<ResultType, String>,
    pub final_code: Option<String>,
    pub video_url: Option<String>,
    pub manim_error: Option<String>,
    pub error_message: Option<String>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            status_message: READY_MESSAGE.to_string(),
            transcript: Transcript::default(),
            artifacts: BTreeMap::new(),
            final_code: None,
            video_url: None,
            manim_error: None,
            error_message: None,
        }
    }
}

impl ProgressState {
    pub fn artifact(&self, kind: ResultType) -> Option<&str> {
        self.artifacts.get(&kind).map(String::as_str)
    }

    /// Outcome of the final result, if one has arrived.
    pub fn outcome(&self) -> FinalOutcome<'_> {
        match (&self.video_url, &self.manim_error, &self.final_code) {
            (Some(url), _, _) => FinalOutcome::Video(url),
            (None, Some(error), _) => FinalOutcome::GenerationFailed(error),
            (None, None, Some(code)) => FinalOutcome::CodeOnly(code),
            (None, None, None) => FinalOutcome::Empty,
        }
    }
}

/// Pure reducer: fold one inbound message into the progress state.
pub fn reduce(mut state: ProgressState, message: &InboundMessage) -> ProgressState {
    match message {
        InboundMessage::StatusUpdate(update) => apply_status(&mut state, update),
        InboundMessage::PartialResult(partial) => apply_partial(&mut state, partial),
        InboundMessage::FinalResult(result) => apply_final(&mut state, result),
        InboundMessage::Error(report) => apply_error(&mut state, report),
    }
    state
}

fn apply_status(state: &mut ProgressState, update: &StatusUpdate) {
    let text = update.display_text().to_string();
    state.status_message = text.clone();
    state
        .transcript
        .push(TranscriptEntry::agent(text, EntryKind::Status));
}

fn apply_partial(state: &mut ProgressState, partial: &PartialResult) {
    state
        .artifacts
        .insert(partial.result_type, partial.content.clone());
    if partial.result_type.is_narrative() {
        state.transcript.push(TranscriptEntry::agent(
            partial.content.clone(),
            EntryKind::Partial,
        ));
    }
}

fn apply_final(state: &mut ProgressState, result: &FinalResult) {
    state.final_code = non_empty(&result.refactored_code);
    state.video_url = non_empty(&result.video_url);
    // A rendered video supersedes any generation error reported alongside it.
    state.manim_error = match state.video_url {
        Some(_) => None,
        None => non_empty(&result.manim_error),
    };
    state.status_message = non_empty(&result.message).unwrap_or_else(|| COMPLETE_MESSAGE.to_string());

    let summary = match state.outcome() {
        FinalOutcome::Video(url) => format!("Your video is ready: {url}"),
        FinalOutcome::GenerationFailed(error) => format!("Video generation failed: {error}"),
        FinalOutcome::CodeOnly(_) => "Processing complete. Final Manim code generated.".to_string(),
        FinalOutcome::Empty => state.status_message.clone(),
    };
    state
        .transcript
        .push(TranscriptEntry::agent(summary, EntryKind::Final));
}

fn apply_error(state: &mut ProgressState, report: &ErrorReport) {
    state.error_message = Some(report.error_message.clone());
    state.status_message = ERROR_STATUS_MESSAGE.to_string();
    state.transcript.push(TranscriptEntry::agent(
        format!("Error: {}", report.error_message),
        EntryKind::Error,
    ));
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|text| !text.is_empty()).cloned()
}

/// Owner of a [`ProgressState`] that folds messages in arrival order.
#[derive(Debug, Clone, Default)]
pub struct ProgressStore {
    state: ProgressState,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn apply(&mut self, message: &InboundMessage) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, message);
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.state.status_message = message.into();
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.state.error_message = Some(message.into());
    }

    pub fn push_user(&mut self, prompt: impl Into<String>) {
        self.state.transcript.push(TranscriptEntry::user(prompt));
    }

    /// Drop everything back to a fresh state.
    pub fn reset(&mut self) {
        self.state = ProgressState::default();
    }
}
