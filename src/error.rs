//! Error types for catalog retrieval, local synchronization and git invocation.
//!
//! Library code returns [`Error`]; the binary wraps it in `anyhow` at the edge.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The bearer token environment variable is missing or empty
    #[error("the environment variable {0} is not set")]
    MissingCredential(String),

    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    /// Request could not be sent or its body could not be read
    #[error("failed to send request to {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("failed to decode repository list page {page}")]
    Decode {
        page: u32,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to create base folder {}", path.display())]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read directory {}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Clone failure annotated with the repository it happened on
    #[error("error cloning repository {full_name}")]
    Clone {
        full_name: String,
        #[source]
        source: GitError,
    },

    /// Raised after a keep-going run in which at least one clone failed
    #[error("{failed} of {total} repositories failed to clone")]
    PartialFailure { failed: usize, total: usize },
}

/// Failure of a single `git` invocation
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to execute git")]
    Spawn(#[source] std::io::Error),

    #[error("git {args} exited with {}: {stderr}", code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    Exit {
        args: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("git {args} timed out after {}s", timeout.as_secs())]
    Timeout { args: String, timeout: Duration },
}
