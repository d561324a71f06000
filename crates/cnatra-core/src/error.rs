use std::io;

use reqwest::StatusCode;
use thiserror::Error;

/// Failures that abort a squadron's schedule session.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("malformed date '{input}': expected YYYY-MM-DD")]
    MalformedDate { input: String },
    #[error("page is missing state token '{token}'")]
    MissingStateToken { token: &'static str },
    #[error("no dates were requested")]
    EmptyBatch,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ScheduleError {
    pub fn malformed_date<T: Into<String>>(input: T) -> Self {
        ScheduleError::MalformedDate {
            input: input.into(),
        }
    }

    /// True when re-running the whole session could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ScheduleError::Transport(err) => err.is_retryable(),
            _ => false,
        }
    }
}

/// Failures surfaced by a [`crate::transport::Transport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} responded with {status}")]
    Status { status: StatusCode, url: String },
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Http(err) => match err.status() {
                Some(status) => retryable_status(status),
                None => err.is_timeout() || err.is_connect() || err.is_request(),
            },
            TransportError::Status { status, .. } => retryable_status(*status),
            TransportError::Unavailable(_) => true,
        }
    }
}

fn retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("squadron '{0}' is not tracked by the store")]
    UnknownSquadron(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    Ser(#[from] toml::ser::Error),
    #[error("configuration error: {0}")]
    Invalid(String),
}
