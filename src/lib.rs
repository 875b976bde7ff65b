//! Docent: client for a document explainer agent.
//!
//! Capture a region of a document page, send it with a prompt to the agent
//! backend, and follow the job's update stream until it produces an
//! explanation video or generated code.
//!
//! # Quick Start
//!
//! ```no_run
//! use docent::prelude::*;
//!
//! # async fn example(png: &[u8]) -> docent::error::Result<()> {
//! let mut client = JobClient::new(DocentConfig::from_env())?;
//! client.capture_region(CapturedRegion::from_png(png)?);
//! client.start("Explain this diagram").await?;
//!
//! let settled = client.run_to_settled().await;
//! if let Some(url) = settled.progress.video_url {
//!     println!("{url}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod job;
pub mod library;
pub mod prelude;
pub mod progress;
pub mod render;
pub mod router;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
