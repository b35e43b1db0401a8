use std::path::PathBuf;
use thiserror::Error;

/// Fatal collector failures. A run that returns one of these leaves the
/// history file untouched (or, for `HistoryWrite`, possibly half written).
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    // Non-success HTTP status; same category as `Transport`
    #[error("profile API returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("profile API error: {0}")]
    Api(String),

    #[error("failed to write history to {path}: {source}")]
    HistoryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Problems reading an existing history file. The collector logs these and
/// starts over from an empty history.
#[derive(Error, Debug)]
pub enum HistoryReadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} does not hold a history array or entry: {source}")]
    Shape {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Presenter failures. The page only ever shows a generic error state; the
/// variant is for the log.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to fetch history: {0}")]
    Fetch(String),

    #[error("unusable history data: {0}")]
    Data(String),
}
