//! Job update stream over WebSocket.

use std::borrow::Cow;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        error::ProtocolError,
        protocol::{frame::coding::CloseCode, CloseFrame},
        Error as WsError, Message,
    },
    MaybeTlsStream, WebSocketStream,
};
use tracing::debug;

use super::transport::{FrameStream, StreamConnector, StreamSignal};
use crate::config::DocentConfig;
use crate::error::DocentError;
use crate::types::{CloseInfo, JobId};

/// Close frame arrived without a status code.
pub const NO_STATUS_RECEIVED: u16 = 1005;

type UpdateSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connects to `{ws}/ws/agent_updates/{job_id}`.
#[derive(Debug, Clone)]
pub struct WsConnector {
    config: DocentConfig,
}

impl WsConnector {
    pub fn new(config: DocentConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StreamConnector for WsConnector {
    async fn connect(&self, job_id: &JobId) -> Result<Box<dyn FrameStream>, DocentError> {
        let url = self.config.updates_url(job_id);
        debug!(%url, "opening update stream");
        let (socket, _) = connect_async(url.as_str())
            .await
            .map_err(map_connect_error)?;
        Ok(Box::new(WsFrameStream { socket }))
    }
}

/// An open update stream.
pub struct WsFrameStream {
    socket: UpdateSocket,
}

#[async_trait]
impl FrameStream for WsFrameStream {
    async fn next_signal(&mut self) -> Option<StreamSignal> {
        loop {
            match self.socket.next().await? {
                Ok(Message::Text(text)) => return Some(StreamSignal::Text(text)),
                Ok(Message::Binary(bytes)) => return Some(StreamSignal::Binary(bytes)),
                // tungstenite queues the Pong reply itself.
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                Ok(Message::Close(frame)) => {
                    let close = frame
                        .map(|frame| CloseInfo {
                            code: u16::from(frame.code),
                            reason: frame.reason.into_owned(),
                        })
                        .unwrap_or(CloseInfo {
                            code: NO_STATUS_RECEIVED,
                            reason: String::new(),
                        });
                    return Some(StreamSignal::Closed(close));
                }
                Err(error) => return Some(map_receive_error(error)),
            }
        }
    }

    async fn close(&mut self, close: CloseInfo) -> Result<(), DocentError> {
        let frame = CloseFrame {
            code: CloseCode::from(close.code),
            reason: Cow::Owned(close.reason),
        };
        match self.socket.close(Some(frame)).await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
            Err(error) => Err(DocentError::Stream(format!(
                "Update stream close failed: {error}"
            ))),
        }
    }
}

/// Drops without a closing handshake look like a browser's 1006 close.
fn map_receive_error(error: WsError) -> StreamSignal {
    match error {
        WsError::ConnectionClosed
        | WsError::AlreadyClosed
        | WsError::Io(_)
        | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
            StreamSignal::Closed(CloseInfo::abnormal())
        }
        other => StreamSignal::Error(format!("Update stream receive failed: {other}")),
    }
}

fn map_connect_error(error: WsError) -> DocentError {
    match error {
        WsError::Http(response) => {
            let status = response.status().as_u16();
            DocentError::api(
                status,
                format!("Update stream handshake failed with status {status}"),
            )
        }
        WsError::Io(error) => DocentError::Io(error),
        WsError::Url(error) => {
            DocentError::Configuration(format!("Invalid update stream URL: {error}"))
        }
        other => DocentError::Stream(format!("Update stream connect failed: {other}")),
    }
}
