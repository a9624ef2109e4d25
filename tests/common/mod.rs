//! Shared test helpers: a scripted in-memory catalog client plus config
//! fixtures for driving the orchestrator without any real remote service.

use std::collections::HashSet;
use std::path::Path;

use spdeploy::client::{AppCatalogClient, AppStatus, ClientError};
use spdeploy::models::{AppHandle, AppScope, UploadOptions};
use spdeploy::{Credential, DeployConfig, FileEntry, WebPartsConfig};

/// One recorded client call, in invocation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect(String),
    EnsureCatalog,
    Upload(String, AppScope),
    GetApp(String),
    Install(String, AppScope),
    Disconnect,
}

/// In-memory catalog client that records every call and fails on cue.
#[derive(Default)]
pub struct ScriptedClient {
    pub calls: Vec<Call>,
    /// Fail the nth connect attempt (0-based)
    pub fail_connect_on: Option<usize>,
    /// Report every site catalog as already present
    pub catalog_exists: bool,
    /// Handles reported as installed by lookups
    pub installed: HashSet<String>,
    /// Make every installation lookup fail
    pub lookup_fails: bool,
    pub connects: usize,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_urls(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Connect(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn install_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Install(..)))
            .count()
    }

    pub fn upload_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Upload(..)))
            .count()
    }
}

fn package_name(package: &Path) -> String {
    package
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl AppCatalogClient for ScriptedClient {
    fn connect(&mut self, url: &str, _credential: &Credential) -> Result<(), ClientError> {
        self.calls.push(Call::Connect(url.to_string()));
        let attempt = self.connects;
        self.connects += 1;
        if self.fail_connect_on == Some(attempt) {
            return Err(ClientError::Connection("scripted failure".to_string()));
        }
        Ok(())
    }

    fn ensure_site_catalog(&mut self) -> Result<(), ClientError> {
        self.calls.push(Call::EnsureCatalog);
        if self.catalog_exists {
            Err(ClientError::CatalogAlreadyExists)
        } else {
            Ok(())
        }
    }

    fn upload_app(
        &mut self,
        package: &Path,
        scope: AppScope,
        _options: &UploadOptions,
    ) -> Result<AppHandle, ClientError> {
        let name = package_name(package);
        self.calls.push(Call::Upload(name.clone(), scope));
        Ok(AppHandle::new(format!("app-{name}")))
    }

    fn get_app(&mut self, handle: &AppHandle) -> Result<AppStatus, ClientError> {
        self.calls.push(Call::GetApp(handle.as_str().to_string()));
        if self.lookup_fails {
            return Err(ClientError::Unexpected("scripted lookup failure".to_string()));
        }
        Ok(AppStatus {
            installed: self.installed.contains(handle.as_str()),
        })
    }

    fn install_app(&mut self, handle: &AppHandle, scope: AppScope) -> Result<(), ClientError> {
        self.calls
            .push(Call::Install(handle.as_str().to_string(), scope));
        Ok(())
    }

    fn disconnect(&mut self) {
        self.calls.push(Call::Disconnect);
    }
}

pub fn entry(file_name: &str, deploy_to_tenant: bool) -> FileEntry {
    FileEntry {
        file_name: file_name.to_string(),
        deploy_to_tenant,
    }
}

pub fn sample_config(files: Vec<FileEntry>) -> DeployConfig {
    DeployConfig {
        root_site_url: "https://contoso.sharepoint.com".to_string(),
        admin_site_url: "https://contoso-admin.sharepoint.com".to_string(),
        webparts: WebPartsConfig {
            path_to_folder: "packages".into(),
            files,
        },
    }
}

pub fn credential() -> Credential {
    Credential::new("admin@contoso.com", "pw")
}
