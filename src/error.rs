//! Error types shared across the regulator.

use thiserror::Error;

/// Failure to obtain a carbon-intensity reading.
///
/// Every variant is treated as transient by the producer loop.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("error code {status}: {message}")]
    Http { status: u16, message: String },
    #[error("malformed intensity response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no intensity data")]
    NoData,
}

/// An asset refused or failed to apply a charging directive.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AssetError {
    #[error("asset {id} rejected unknown charging value {value}")]
    InvalidDirective { id: String, value: f64 },
    #[error("asset {id} fault: {reason}")]
    Fault { id: String, reason: String },
}

/// The other end of the directive channel has been dropped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("directive channel closed")]
pub struct ChannelClosed;

#[derive(Debug, Error)]
pub enum RegulatorError {
    #[error("{task} loop terminated abnormally: {source}")]
    TaskFailed {
        task: &'static str,
        #[source]
        source: tokio::task::JoinError,
    },
}
