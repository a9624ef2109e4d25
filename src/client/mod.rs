//! Remote app catalog boundary
//!
//! Abstracts the management service the orchestrator drives. The trait is
//! session-oriented: one connection is open at a time, and errors carry an
//! explicit kind so callers choose continue vs abort per variant.

pub mod m365;

pub use m365::M365Client;

use std::fmt;
use std::path::Path;

use crate::credentials::Credential;
use crate::models::{AppHandle, AppScope, UploadOptions};

/// Error from a remote catalog operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Could not establish a session with the target
    Connection(String),
    /// The site already carries an app catalog; callers treat this as success
    CatalogAlreadyExists,
    /// No app found behind a handle
    AppNotFound(String),
    /// Management CLI invocation failed
    CommandFailed(String),
    /// Anything the management service reported without a dedicated kind
    Unexpected(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "connection error: {}", msg),
            Self::CatalogAlreadyExists => write!(f, "app catalog already exists"),
            Self::AppNotFound(id) => write!(f, "app not found: {}", id),
            Self::CommandFailed(msg) => write!(f, "command failed: {}", msg),
            Self::Unexpected(msg) => write!(f, "unexpected error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// Installation state reported for an uploaded app
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppStatus {
    pub installed: bool,
}

/// Session-oriented client for a tenant or site-collection app catalog.
///
/// `connect` opens a session against one target URL and replaces any
/// previous session; all other operations act on the connected target.
pub trait AppCatalogClient {
    /// Open a session against `url` with the resolved credential
    fn connect(&mut self, url: &str, credential: &Credential) -> Result<(), ClientError>;

    /// Create the connected site's app catalog if it does not exist.
    ///
    /// Returns `CatalogAlreadyExists` when one is already present; callers
    /// suppress that variant.
    fn ensure_site_catalog(&mut self) -> Result<(), ClientError>;

    /// Upload a package to the connected target's catalog and return its
    /// handle
    fn upload_app(
        &mut self,
        package: &Path,
        scope: AppScope,
        options: &UploadOptions,
    ) -> Result<AppHandle, ClientError>;

    /// Query whether the app behind `handle` is installed on the connected
    /// target
    fn get_app(&mut self, handle: &AppHandle) -> Result<AppStatus, ClientError>;

    /// Install the app behind `handle` at the given scope
    fn install_app(&mut self, handle: &AppHandle, scope: AppScope) -> Result<(), ClientError>;

    /// Close the current session; must be called before connecting to the
    /// next target
    fn disconnect(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        assert_eq!(
            ClientError::Connection("timeout".to_string()).to_string(),
            "connection error: timeout"
        );
        assert_eq!(
            ClientError::CatalogAlreadyExists.to_string(),
            "app catalog already exists"
        );
        assert_eq!(
            ClientError::AppNotFound("b2c1".to_string()).to_string(),
            "app not found: b2c1"
        );
    }
}
