//! Microsoft 365 CLI client
//!
//! Drives the `m365` command-line tool as the management boundary. The CLI
//! handles authentication and the SharePoint REST surface; this module only
//! shells out, maps exit status to error kinds, and parses `--output json`
//! where a handle comes back.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::credentials::Credential;
use crate::models::{AppHandle, AppScope, UploadOptions};

use super::{AppCatalogClient, AppStatus, ClientError};

/// Client backed by the `m365` CLI.
///
/// Holds the URL of the currently connected target; one session at a time.
pub struct M365Client {
    binary: String,
    site_url: Option<String>,
}

impl M365Client {
    pub fn new() -> Self {
        Self {
            binary: "m365".to_string(),
            site_url: None,
        }
    }

    /// Use a different binary name or path (e.g. a wrapper script)
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            site_url: None,
        }
    }

    /// Check if the m365 CLI is installed and available
    pub fn is_available() -> bool {
        Command::new("m365")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn run(&self, args: &[&str]) -> Result<String, ClientError> {
        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ClientError::CommandFailed(format!("{}: {}", self.binary, e)))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(ClientError::CommandFailed(stderr))
        }
    }

    fn connected_url(&self) -> Result<&str, ClientError> {
        self.site_url
            .as_deref()
            .ok_or_else(|| ClientError::Unexpected("no open connection".to_string()))
    }
}

impl Default for M365Client {
    fn default() -> Self {
        Self::new()
    }
}

impl AppCatalogClient for M365Client {
    fn connect(&mut self, url: &str, credential: &Credential) -> Result<(), ClientError> {
        // The error message must not echo the argument list: it carries the
        // password.
        let output = Command::new(&self.binary)
            .args([
                "login",
                "--authType",
                "password",
                "--userName",
                &credential.username,
                "--password",
                credential.secret(),
            ])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ClientError::Connection(format!("{}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ClientError::Connection(stderr));
        }

        self.site_url = Some(url.to_string());
        Ok(())
    }

    fn ensure_site_catalog(&mut self) -> Result<(), ClientError> {
        let url = self.connected_url()?.to_string();
        match self.run(&["spo", "site", "appcatalog", "add", "--siteUrl", url.as_str()]) {
            Ok(_) => Ok(()),
            Err(ClientError::CommandFailed(msg)) if msg.contains("already exists") => {
                Err(ClientError::CatalogAlreadyExists)
            }
            Err(e) => Err(e),
        }
    }

    fn upload_app(
        &mut self,
        package: &Path,
        scope: AppScope,
        options: &UploadOptions,
    ) -> Result<AppHandle, ClientError> {
        let url = self.connected_url()?.to_string();
        let package_path = package.display().to_string();

        let mut args = vec!["spo", "app", "add", "--filePath", package_path.as_str()];
        if options.overwrite {
            args.push("--overwrite");
        }
        if scope == AppScope::Site {
            args.extend([
                "--appCatalogScope",
                "sitecollection",
                "--appCatalogUrl",
                url.as_str(),
            ]);
        }
        args.extend(["--output", "json"]);

        let stdout = self.run(&args)?;
        let value: serde_json::Value = serde_json::from_str(&stdout)
            .map_err(|e| ClientError::Unexpected(format!("unparseable app add output: {}", e)))?;
        let id = value
            .get("UniqueId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ClientError::Unexpected("app add output carries no UniqueId".to_string())
            })?;
        let handle = AppHandle::new(id);

        if options.publish {
            let id = handle.as_str().to_string();
            let mut args = vec!["spo", "app", "deploy", "--id", id.as_str()];
            if options.skip_feature_deployment {
                args.push("--skipFeatureDeployment");
            }
            if scope == AppScope::Site {
                args.extend([
                    "--appCatalogScope",
                    "sitecollection",
                    "--appCatalogUrl",
                    url.as_str(),
                ]);
            }
            self.run(&args)?;
        }

        Ok(handle)
    }

    fn get_app(&mut self, handle: &AppHandle) -> Result<AppStatus, ClientError> {
        let url = self.connected_url()?.to_string();
        let stdout = self.run(&[
            "spo",
            "app",
            "instance",
            "list",
            "--siteUrl",
            url.as_str(),
            "--output",
            "json",
        ])?;

        let instances: serde_json::Value = serde_json::from_str(&stdout)
            .map_err(|e| ClientError::Unexpected(format!("unparseable instance list: {}", e)))?;

        let installed = instances
            .as_array()
            .map(|list| {
                list.iter().any(|instance| {
                    instance
                        .get("AppId")
                        .and_then(|v| v.as_str())
                        .is_some_and(|id| id.eq_ignore_ascii_case(handle.as_str()))
                })
            })
            .unwrap_or(false);

        Ok(AppStatus { installed })
    }

    fn install_app(&mut self, handle: &AppHandle, scope: AppScope) -> Result<(), ClientError> {
        let url = self.connected_url()?.to_string();
        let id = handle.as_str().to_string();

        let mut args = vec![
            "spo",
            "app",
            "install",
            "--id",
            id.as_str(),
            "--siteUrl",
            url.as_str(),
        ];
        if scope == AppScope::Site {
            args.extend(["--appCatalogScope", "sitecollection"]);
        }
        self.run(&args)?;
        Ok(())
    }

    fn disconnect(&mut self) {
        // Best effort: a failed logout must not abort the run.
        let _ = self.run(&["logout", "--force"]);
        self.site_url = None;
    }
}
