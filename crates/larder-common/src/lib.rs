//! Larder Common Library
//!
//! Shared plumbing for the Larder workspace members.
//!
//! # Overview
//!
//! - **Logging**: a single place to configure `tracing` output (console,
//!   rolling files, text or JSON) from code or from `LOG_*` variables.
//!
//! # Example
//!
//! ```no_run
//! use larder_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&LogConfig::from_env()?)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel, LogOutput};
