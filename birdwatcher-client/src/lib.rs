//! Typed client for the birdwatcher Milvus diagnostic shell.
//!
//! Commands are composed as text, run through a one-shot tool process and the
//! JSON payload in its output is mapped onto [`birdwatcher_core`] entities.

pub mod binary;
pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod exec;
pub mod payload;

pub use client::{Birdwatcher, DEFAULT_TIMEOUT_SECS};
pub use command::{CollectionFilter, ConnectionContext, Query, SegmentFilter};
pub use config::{ClientConfig, ConfigError};
pub use error::{BirdwatcherError, BirdwatcherResult};
pub use exec::{Executor, ProcessExecutor};
pub use payload::extract_payload;

pub use birdwatcher_core as model;
