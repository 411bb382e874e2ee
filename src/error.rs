use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the user lookup service or its push channel.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("push channel: {0}")]
    PushChannel(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("no answer within {0:?}")]
    Timeout(Duration),

    #[error("invalid service url: {0}")]
    InvalidUrl(String),
}
