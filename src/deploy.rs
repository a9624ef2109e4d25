//! Deployment orchestrator
//!
//! Drives the remote catalog client through the per-target lifecycle:
//! connect, prepare the catalog (site mode), upload each selected package,
//! install when absent, disconnect. Targets are processed strictly
//! sequentially with a single open connection at a time.
//!
//! Failure policy: a connection failure aborts the entire run, including
//! any remaining targets. `CatalogAlreadyExists` is suppressed as success,
//! and a failed installation lookup is treated as "not installed". Every
//! other remote failure propagates and ends the run.
//!
//! Dry runs go through `plan_tenant`/`plan_sites`, which walk the same
//! selection and target order but take no client and no credential.

use crate::client::{AppCatalogClient, ClientError};
use crate::config::{DeployConfig, FileEntry};
use crate::credentials::Credential;
use crate::error::{SpDeployError, SpDeployResult};
use crate::models::{AppScope, UploadOptions};
use crate::url;

/// Progress notifications emitted while a deployment runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    Connecting { url: String },
    Connected { url: String },
    CatalogReady { url: String },
    Uploading { file: String, url: String },
    Uploaded { file: String, handle: String },
    AlreadyInstalled { file: String, url: String },
    Installed { file: String, url: String },
    Disconnected { url: String },
    WouldDeploy { file: String, url: String, scope: AppScope },
}

/// Summary of a completed deployment run
#[derive(Debug, Clone, Default)]
pub struct DeployReport {
    /// Packages uploaded, as "file @ target"
    pub uploaded: Vec<String>,
    /// Packages installed on a site
    pub installed: Vec<String>,
    /// Packages that were already installed and left alone
    pub already_installed: Vec<String>,
    /// Targets fully processed (the admin site counts as one)
    pub targets_processed: usize,
}

impl DeployReport {
    /// True when the run made no remote changes
    pub fn is_noop(&self) -> bool {
        self.uploaded.is_empty() && self.installed.is_empty()
    }
}

/// Emit the tenant-mode plan: one `WouldDeploy` per selected package
/// against the admin URL. Makes no remote call and needs no credential.
pub fn plan_tenant(
    config: &DeployConfig,
    files: &[FileEntry],
    mut on_event: impl FnMut(DeployEvent),
) -> DeployReport {
    let mut report = DeployReport::default();
    if files.is_empty() {
        return report;
    }

    for entry in files {
        on_event(DeployEvent::WouldDeploy {
            file: entry.file_name.clone(),
            url: config.admin_site_url.clone(),
            scope: AppScope::Tenant,
        });
    }
    report.targets_processed = 1;
    report
}

/// Emit the site-mode plan: targets are normalized in order and every
/// selected package yields a `WouldDeploy`. Makes no remote call and needs
/// no credential.
pub fn plan_sites(
    config: &DeployConfig,
    files: &[FileEntry],
    targets: &[String],
    mut on_event: impl FnMut(DeployEvent),
) -> DeployReport {
    let mut report = DeployReport::default();
    if files.is_empty() {
        return report;
    }

    for target in targets {
        let url = url::normalize(&config.root_site_url, target);
        for entry in files {
            on_event(DeployEvent::WouldDeploy {
                file: entry.file_name.clone(),
                url: url.clone(),
                scope: AppScope::Site,
            });
        }
        report.targets_processed += 1;
    }
    report
}

/// Deploy tenant-scoped packages to the tenant app catalog.
///
/// The admin URL is the single target; a connection failure ends the run.
/// Tenant-scope apps are available tenant-wide on publish, so this never
/// installs anything.
pub fn deploy_tenant(
    client: &mut dyn AppCatalogClient,
    config: &DeployConfig,
    files: &[FileEntry],
    credential: &Credential,
    mut on_event: impl FnMut(DeployEvent),
) -> SpDeployResult<DeployReport> {
    let mut report = DeployReport::default();
    if files.is_empty() {
        return Ok(report);
    }

    let url = config.admin_site_url.clone();

    on_event(DeployEvent::Connecting { url: url.clone() });
    client
        .connect(&url, credential)
        .map_err(|e| SpDeployError::Connection {
            url: url.clone(),
            message: e.to_string(),
        })?;
    on_event(DeployEvent::Connected { url: url.clone() });

    for entry in files {
        let package = config.package_path(entry);
        on_event(DeployEvent::Uploading {
            file: entry.file_name.clone(),
            url: url.clone(),
        });
        let handle = client.upload_app(&package, AppScope::Tenant, &UploadOptions::tenant())?;
        on_event(DeployEvent::Uploaded {
            file: entry.file_name.clone(),
            handle: handle.to_string(),
        });
        report.uploaded.push(format!("{} @ {}", entry.file_name, url));
    }

    client.disconnect();
    on_event(DeployEvent::Disconnected { url });
    report.targets_processed = 1;

    Ok(report)
}

/// Deploy site-scoped packages to each target site collection.
///
/// Targets are normalized against the configured root URL and processed
/// one at a time. A connection failure aborts the whole run immediately;
/// remaining targets are never attempted.
pub fn deploy_sites(
    client: &mut dyn AppCatalogClient,
    config: &DeployConfig,
    files: &[FileEntry],
    targets: &[String],
    credential: &Credential,
    mut on_event: impl FnMut(DeployEvent),
) -> SpDeployResult<DeployReport> {
    let mut report = DeployReport::default();
    if files.is_empty() {
        return Ok(report);
    }

    for target in targets {
        let url = url::normalize(&config.root_site_url, target);

        on_event(DeployEvent::Connecting { url: url.clone() });
        client
            .connect(&url, credential)
            .map_err(|e| SpDeployError::Connection {
                url: url.clone(),
                message: e.to_string(),
            })?;
        on_event(DeployEvent::Connected { url: url.clone() });

        match client.ensure_site_catalog() {
            Ok(()) | Err(ClientError::CatalogAlreadyExists) => {
                on_event(DeployEvent::CatalogReady { url: url.clone() });
            }
            Err(e) => return Err(e.into()),
        }

        for entry in files {
            let package = config.package_path(entry);
            on_event(DeployEvent::Uploading {
                file: entry.file_name.clone(),
                url: url.clone(),
            });
            let handle = client.upload_app(&package, AppScope::Site, &UploadOptions::site())?;
            on_event(DeployEvent::Uploaded {
                file: entry.file_name.clone(),
                handle: handle.to_string(),
            });
            report.uploaded.push(format!("{} @ {}", entry.file_name, url));

            // A failed lookup counts as "not installed".
            let installed = client
                .get_app(&handle)
                .map(|status| status.installed)
                .unwrap_or(false);

            if installed {
                on_event(DeployEvent::AlreadyInstalled {
                    file: entry.file_name.clone(),
                    url: url.clone(),
                });
                report
                    .already_installed
                    .push(format!("{} @ {}", entry.file_name, url));
            } else {
                client.install_app(&handle, AppScope::Site)?;
                on_event(DeployEvent::Installed {
                    file: entry.file_name.clone(),
                    url: url.clone(),
                });
                report.installed.push(format!("{} @ {}", entry.file_name, url));
            }
        }

        client.disconnect();
        on_event(DeployEvent::Disconnected { url });
        report.targets_processed += 1;
    }

    Ok(report)
}
