//! Error types for the beacon agent.

use std::path::PathBuf;

/// Errors from building and starting an agent.
///
/// Failures inside the loop never surface here; they are logged and counted.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Mean dwell must be a finite number greater than zero, got {value}")]
    InvalidMeanDwell { value: f64 },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Errors from the request/response round-trip with the control endpoint.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("Endpoint {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Errors while turning an incoming node into a task.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Task batch must be an array or object, got {found}")]
    InvalidBatch { found: String },

    #[error("Task node must be an object")]
    NotAnObject,

    #[error("Task node is missing field '{field}'")]
    MissingField { field: &'static str },

    #[error("Task field '{field}' is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Unknown task type '{task_type}'")]
    UnknownTaskType { task_type: String },
}

pub type Result<T> = std::result::Result<T, Error>;
