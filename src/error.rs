//! Error types for spdeploy
//!
//! Uses `thiserror` for library errors. Remote-call failures carry their
//! `ClientError` kind so the orchestrator can decide continue vs abort per
//! variant instead of relying on blanket propagation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for spdeploy operations
pub type SpDeployResult<T> = Result<T, SpDeployError>;

/// Main error type for spdeploy operations
#[derive(Error, Debug)]
pub enum SpDeployError {
    /// Config file could not be read
    #[error("cannot read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON or misses required fields
    #[error("invalid config in {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// A selected package file does not exist on disk
    #[error("package file not found: {path}")]
    MissingPackage { path: PathBuf },

    /// Site URL argument does not match the accepted target shapes
    #[error("invalid site URL '{input}' - expected /sites/<name> or /teams/<name>, optionally prefixed with https://<tenant>.sharepoint.com")]
    InvalidSiteUrl { input: String },

    /// Credential prompt was cancelled by the user
    #[error("credential prompt aborted")]
    PromptAborted,

    /// Prompting is impossible because stdin is not a terminal
    #[error("cannot prompt for credentials in a non-interactive session - pass --username and --password")]
    NonInteractive,

    /// Connecting to a target failed; aborts the entire run
    #[error("connection to {url} failed: {message}")]
    Connection { url: String, message: String },

    /// Any other remote catalog operation failed
    #[error("remote operation failed: {0}")]
    Client(#[from] crate::client::ClientError),
}
