//! Agent job lifecycle: creation, update stream, and state transitions.

pub mod client;
mod connection;
pub mod http;
pub mod transport;
pub mod ws;

pub use client::{JobClient, JobSnapshot};
pub use http::HttpJobApi;
pub use transport::{CreateJobRequest, FrameStream, JobApi, StreamConnector, StreamSignal};
pub use ws::{WsConnector, WsFrameStream};
