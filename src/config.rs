//! Configuration module for spdeploy
//!
//! Loads the JSON deployment config once at startup; the result is immutable
//! for the rest of the run. The only derived state is the file selection
//! computed from the active `RunMode`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SpDeployError, SpDeployResult};
use crate::models::RunMode;

/// One app package listed in the config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Package file name inside `webparts.pathToFolder`
    pub file_name: String,

    /// True for tenant-scope packages, false for site-scope packages
    pub deploy_to_tenant: bool,
}

/// The `webparts` section of the config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebPartsConfig {
    /// Local directory holding the package files
    pub path_to_folder: PathBuf,

    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// Main configuration structure, one per run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfig {
    /// Absolute base URL relative site references are resolved against
    pub root_site_url: String,

    /// Absolute URL of the tenant admin site (tenant mode's single target)
    pub admin_site_url: String,

    pub webparts: WebPartsConfig,
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl DeployConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> SpDeployResult<Self> {
        let (config, _warnings) = Self::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> SpDeployResult<(Self, Vec<ConfigWarning>)> {
        let content = fs::read_to_string(path).map_err(|source| SpDeployError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let mut unknown_paths: Vec<String> = Vec::new();
        let mut deserializer = serde_json::Deserializer::from_str(&content);

        let config: Self = serde_ignored::deserialize(&mut deserializer, |path| {
            unknown_paths.push(path.to_string());
        })
        .map_err(|e| SpDeployError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let warnings = unknown_paths
            .into_iter()
            .map(|path_str| {
                let key = path_str
                    .split('.')
                    .last()
                    .unwrap_or(path_str.as_str())
                    .to_string();
                ConfigWarning {
                    key: key.clone(),
                    file: path.to_path_buf(),
                    line: find_line_number(&content, &key),
                    suggestion: suggest_key(&key),
                }
            })
            .collect();

        Ok((config, warnings))
    }

    /// File entries whose `deployToTenant` matches the active mode.
    ///
    /// Order is preserved from the config sequence.
    pub fn selected_files(&self, mode: RunMode) -> Vec<FileEntry> {
        self.webparts
            .files
            .iter()
            .filter(|f| f.deploy_to_tenant == mode.deploys_to_tenant())
            .cloned()
            .collect()
    }

    /// Local path of a package file
    pub fn package_path(&self, entry: &FileEntry) -> PathBuf {
        self.webparts.path_to_folder.join(&entry.file_name)
    }

    /// Verify every selected package exists on disk before any remote call
    pub fn verify_packages(&self, selection: &[FileEntry]) -> SpDeployResult<()> {
        for entry in selection {
            let path = self.package_path(entry);
            if !path.exists() {
                return Err(SpDeployError::MissingPackage { path });
            }
        }
        Ok(())
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "rootSiteUrl",
        "adminSiteUrl",
        "webparts",
        "pathToFolder",
        "files",
        "fileName",
        "deployToTenant",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] = std::cmp::min(
                std::cmp::min(prev[j + 1] + 1, curr[j] + 1),
                prev[j] + cost,
            );
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
