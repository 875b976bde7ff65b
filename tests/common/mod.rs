//! Shared test helpers: an in-process update stream server and fixtures.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use docent::config::DocentConfig;
use docent::types::CapturedRegion;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_hdr_async,
    tungstenite::{
        handshake::server::{Request, Response},
        protocol::{frame::coding::CloseCode, CloseFrame},
        Message,
    },
};

/// One scripted action of the update stream server.
pub enum Step {
    Send(Value),
    Raw(String),
    Ping(&'static [u8]),
    Pause(Duration),
    /// Start the close handshake from the server side.
    Close(u16, &'static str),
    /// Drop the TCP connection without a close frame.
    Drop,
}

/// What the server saw from the client.
#[derive(Debug, Default)]
pub struct ServerReport {
    pub path: String,
    pub client_close: Option<(u16, String)>,
    pub pongs: Vec<Vec<u8>>,
}

pub fn region() -> CapturedRegion {
    CapturedRegion::from_png(b"\x89PNG\r\n\x1a\nregion").expect("png should encode")
}

pub fn test_config(api_base_url: &str, ws_base_url: &str) -> DocentConfig {
    DocentConfig::default()
        .with_api_base_url(api_base_url)
        .with_ws_base_url(ws_base_url)
        .with_final_grace_period(Duration::from_millis(50))
        .with_request_timeout(Some(Duration::from_secs(5)))
}

/// A `ws://` base URL nothing listens on.
pub async fn unused_ws_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let address = listener.local_addr().expect("local addr should be available");
    drop(listener);
    format!("ws://{address}")
}

/// Accept one update stream connection and play `steps` on it.
///
/// Returns the base URL to connect to and a receiver for the report, which
/// is sent once the connection is over.
pub async fn spawn_update_server(steps: Vec<Step>) -> (String, oneshot::Receiver<ServerReport>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let address = listener.local_addr().expect("local addr should be available");
    let (report_tx, report_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("server should accept");
        let path = Arc::new(Mutex::new(String::new()));
        let path_inner = Arc::clone(&path);
        let mut ws = accept_hdr_async(stream, move |req: &Request, response: Response| {
            *path_inner.lock().expect("path lock should not poison") = req.uri().path().to_string();
            Ok(response)
        })
        .await
        .expect("handshake should succeed");

        let mut report = ServerReport {
            path: path.lock().expect("path lock should not poison").clone(),
            client_close: None,
            pongs: Vec::new(),
        };

        for step in steps {
            match step {
                Step::Send(value) => ws
                    .send(Message::Text(value.to_string()))
                    .await
                    .expect("frame should send"),
                Step::Raw(text) => ws
                    .send(Message::Text(text))
                    .await
                    .expect("raw frame should send"),
                Step::Ping(payload) => ws
                    .send(Message::Ping(payload.to_vec()))
                    .await
                    .expect("ping should send"),
                Step::Pause(duration) => tokio::time::sleep(duration).await,
                Step::Close(code, reason) => {
                    let _ = ws
                        .close(Some(CloseFrame {
                            code: CloseCode::from(code),
                            reason: reason.into(),
                        }))
                        .await;
                }
                Step::Drop => {
                    drop(ws);
                    let _ = report_tx.send(report);
                    return;
                }
            }
        }

        // Drain until the client closes or goes away.
        while let Ok(Some(message)) = timeout(Duration::from_secs(5), ws.next()).await {
            match message {
                Ok(Message::Close(frame)) => {
                    if report.client_close.is_none() {
                        report.client_close = frame
                            .map(|frame| (u16::from(frame.code), frame.reason.into_owned()));
                    }
                }
                Ok(Message::Pong(payload)) => report.pongs.push(payload),
                Ok(_) => {}
                Err(_) => break,
            }
        }
        let _ = report_tx.send(report);
    });

    (format!("ws://{address}"), report_rx)
}

pub async fn report(rx: oneshot::Receiver<ServerReport>) -> ServerReport {
    timeout(Duration::from_secs(5), rx)
        .await
        .expect("server should finish")
        .expect("server should report")
}
