//! Core types shared by the gate, router, progress store, and job client.

pub mod job;
pub mod message;
pub mod region;
pub mod status;
pub mod transcript;

pub use job::*;
pub use message::*;
pub use region::*;
pub use status::*;
pub use transcript::*;
