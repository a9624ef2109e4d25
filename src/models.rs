//! Core data models for spdeploy
//!
//! Defines the value types shared between the config layer, the remote
//! client boundary and the orchestrator:
//! - `RunMode`: tenant-wide vs per-site deployment, fixed for the whole run
//! - `AppScope`: catalog scope of a single remote operation
//! - `AppHandle`: opaque identifier returned by the upload operation
//! - `UploadOptions`: flags forwarded to the upload operation

use serde::{Deserialize, Serialize};

/// Deployment mode for the whole run.
///
/// Fixed before any remote call is made and never changes mid-run. Tenant
/// mode targets the single admin URL; site mode iterates over a target list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Deploy tenant-scoped packages to the tenant app catalog
    Tenant,
    /// Deploy site-scoped packages to each target site collection
    Site,
}

impl RunMode {
    /// The `deployToTenant` value a file entry must carry to be selected
    pub fn deploys_to_tenant(self) -> bool {
        matches!(self, RunMode::Tenant)
    }
}

/// Catalog scope of a single remote operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppScope {
    /// Tenant app catalog; packages become available organisation-wide
    Tenant,
    /// Site-collection app catalog; packages are visible to one site only
    Site,
}

/// Opaque identifier returned by the upload operation for a file+target.
///
/// Used immediately afterwards to query installation state and to install.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppHandle(String);

impl AppHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AppHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Flags forwarded to the upload operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Replace an existing package with the same name
    pub overwrite: bool,
    /// Publish immediately so no manual activation step is needed
    pub publish: bool,
    /// Make the package available without per-site feature activation
    pub skip_feature_deployment: bool,
}

impl UploadOptions {
    /// Upload semantics used for the tenant catalog
    pub fn tenant() -> Self {
        Self {
            overwrite: true,
            publish: true,
            skip_feature_deployment: true,
        }
    }

    /// Upload semantics used for a site-collection catalog
    pub fn site() -> Self {
        Self {
            overwrite: true,
            publish: true,
            skip_feature_deployment: false,
        }
    }
}
