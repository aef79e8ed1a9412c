//! papercast: daily digest of new arXiv papers, localized and read aloud
//!
//! The binary wires the stages from the member crates together; this library
//! holds the application config and the pipeline so both can be tested
//! without a network.

pub mod config;
pub mod pipeline;

pub use config::AppConfig;
pub use pipeline::{Pipeline, RunSummary};
