use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlightWatchError>;

#[derive(Error, Debug)]
pub enum FlightWatchError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid route key: {0}")]
    InvalidRouteKey(String),

    #[error("Upstream returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
}
