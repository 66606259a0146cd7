//! Skorda: a resumable company-registry harvester
//!
//! This crate orchestrates the extraction of structured company and person
//! records from a multi-page, rate-limited public site. It owns the durable
//! work queue, the session-recovery state machine, the page-to-page
//! navigation protocol and the fault-tolerant extraction pipeline; the
//! page-rendering client itself is pluggable behind the [`client::PageClient`]
//! trait.

pub mod client;
pub mod config;
pub mod extract;
pub mod harvest;
pub mod output;
pub mod queue;
pub mod record;
pub mod session;

use thiserror::Error;

/// Main error type for harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Work queue error: {0}")]
    Queue(#[from] queue::QueueError),

    #[error("Record sink error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("Page client error: {0}")]
    Client(#[from] client::ClientError),

    #[error("Session error: {0}")]
    Session(#[from] session::SessionError),

    #[error("Run aborted: {0}")]
    Aborted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{Orchestrator, RunSummary};
pub use record::CompanyRecord;
