//! Per-job reader task that owns the open stream.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::debug;

use super::transport::{FrameStream, StreamConnector, StreamSignal};
use crate::types::{CloseInfo, JobId};

/// What the reader task reports back to the client.
#[derive(Debug)]
pub(crate) enum ConnectionEvent {
    Opened,
    OpenFailed(String),
    Signal(StreamSignal),
}

/// A [`ConnectionEvent`] stamped with the connection that produced it, so
/// events from a connection the client already abandoned can be dropped.
#[derive(Debug)]
pub(crate) struct TaggedEvent {
    pub generation: u64,
    pub event: ConnectionEvent,
}

enum Command {
    Close(CloseInfo),
    CloseAfter(Duration, CloseInfo),
}

/// Client-side handle to a running reader task.
pub(crate) struct ConnectionHandle {
    job_id: JobId,
    generation: u64,
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl ConnectionHandle {
    pub fn spawn(
        connector: Arc<dyn StreamConnector>,
        job_id: JobId,
        generation: u64,
        events_tx: mpsc::UnboundedSender<TaggedEvent>,
    ) -> Self {
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_connection(
            connector,
            job_id.clone(),
            generation,
            events_tx,
            commands_rx,
        ));
        Self {
            job_id,
            generation,
            commands,
            task,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Close now. The task finishes the close handshake on its own.
    pub fn close(self, close: CloseInfo) {
        if self.commands.send(Command::Close(close)).is_err() {
            // Task already exited.
            self.task.abort();
        }
    }

    /// Keep delivering frames for `grace`, then close.
    pub fn close_after(&self, grace: Duration, close: CloseInfo) {
        let _ = self.commands.send(Command::CloseAfter(grace, close));
    }
}

async fn run_connection(
    connector: Arc<dyn StreamConnector>,
    job_id: JobId,
    generation: u64,
    events_tx: mpsc::UnboundedSender<TaggedEvent>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let emit = |event: ConnectionEvent| {
        let _ = events_tx.send(TaggedEvent { generation, event });
    };

    let mut stream: Box<dyn FrameStream> = tokio::select! {
        opened = connector.connect(&job_id) => match opened {
            Ok(stream) => stream,
            Err(error) => {
                emit(ConnectionEvent::OpenFailed(error.to_string()));
                return;
            }
        },
        // Closed (or abandoned) before the stream opened.
        _ = commands.recv() => return,
    };
    emit(ConnectionEvent::Opened);

    let mut deadline: Option<(Instant, CloseInfo)> = None;
    loop {
        let grace_expired = async {
            match &deadline {
                Some((at, _)) => time::sleep_until(*at).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Close(close)) => {
                    debug!(job_id = %job_id, code = close.code, "closing update stream");
                    let _ = stream.close(close).await;
                    return;
                }
                Some(Command::CloseAfter(grace, close)) => {
                    deadline = Some((Instant::now() + grace, close));
                }
                None => {
                    let _ = stream.close(CloseInfo::normal("client dropped")).await;
                    return;
                }
            },
            _ = grace_expired => {
                let close = deadline
                    .take()
                    .map(|(_, close)| close)
                    .unwrap_or_else(|| CloseInfo::normal(""));
                debug!(job_id = %job_id, "grace period over, closing update stream");
                let _ = stream.close(close.clone()).await;
                emit(ConnectionEvent::Signal(StreamSignal::Closed(close)));
                return;
            }
            signal = stream.next_signal() => match signal {
                Some(StreamSignal::Closed(close)) => {
                    // Answer the peer's close handshake before reporting it.
                    let _ = stream.close(close.clone()).await;
                    emit(ConnectionEvent::Signal(StreamSignal::Closed(close)));
                    return;
                }
                Some(StreamSignal::Error(message)) => {
                    emit(ConnectionEvent::Signal(StreamSignal::Error(message)));
                    return;
                }
                Some(frame) => emit(ConnectionEvent::Signal(frame)),
                None => {
                    emit(ConnectionEvent::Signal(StreamSignal::Closed(CloseInfo::abnormal())));
                    return;
                }
            },
        }
    }
}
