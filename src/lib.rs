//! spdeploy - configuration-driven SharePoint app package deployment
//!
//! spdeploy reads a JSON deployment config describing a set of app packages
//! ("webparts"), resolves a credential once, then deploys the packages either
//! to the tenant app catalog or to a list of site-collection app catalogs,
//! one target at a time.

pub mod client;
pub mod config;
pub mod credentials;
pub mod deploy;
pub mod error;
pub mod models;
pub mod url;

// Re-exports for convenience
pub use client::{AppCatalogClient, AppStatus, ClientError, M365Client};
pub use config::{ConfigWarning, DeployConfig, FileEntry, WebPartsConfig};
pub use credentials::Credential;
pub use deploy::{
    deploy_sites, deploy_tenant, plan_sites, plan_tenant, DeployEvent, DeployReport,
};
pub use error::{SpDeployError, SpDeployResult};
pub use models::{AppHandle, AppScope, RunMode, UploadOptions};
