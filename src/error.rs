use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure fetching one source. Never fatal to a harvest: the source just
/// contributes nothing.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode {what}: {reason}")]
    Decode { what: String, reason: String },
    #[error("giving up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: String,
    },
    #[error("http client setup failed: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// Transport errors, rate limiting and server errors are worth another try.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn decode(what: impl Into<String>, reason: impl ToString) -> Self {
        FetchError::Decode {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failure reading or writing the feed file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
