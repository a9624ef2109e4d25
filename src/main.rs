//! spdeploy CLI - configuration-driven SharePoint app package deployment
//!
//! Usage: spdeploy <COMMAND>
//!
//! Commands:
//!   deploy  Deploy configured packages to the tenant or to site collections
//!   check   Validate the config and local packages without remote contact

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use spdeploy::deploy::{
    deploy_sites, deploy_tenant, plan_sites, plan_tenant, DeployEvent, DeployReport,
};
use spdeploy::{credentials, url, DeployConfig, M365Client, RunMode};

/// spdeploy - SharePoint app package deployment tool
#[derive(Parser, Debug)]
#[command(name = "spdeploy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output machine-readable JSON events
    #[arg(long, default_value = "false")]
    json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deploy configured packages to the tenant or to site collections
    Deploy {
        /// Path to the JSON deployment config
        #[arg(short, long)]
        config: PathBuf,

        /// Target site URLs; tenant mode when none are given
        sites: Vec<String>,

        /// Read target site URLs from stdin, one per line
        #[arg(long)]
        sites_from_stdin: bool,

        /// Username to connect as (password prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,

        /// Password for --username
        #[arg(short, long, requires = "username")]
        password: Option<String>,

        /// Show what would be deployed without contacting any service
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate the config and local packages without remote contact
    Check {
        /// Path to the JSON deployment config
        #[arg(short, long)]
        config: PathBuf,

        /// Check the tenant-scope selection instead of the site-scope one
        #[arg(long)]
        tenant: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy {
            config,
            sites,
            sites_from_stdin,
            username,
            password,
            dry_run,
        } => cmd_deploy(
            &config,
            sites,
            sites_from_stdin,
            username,
            password,
            dry_run,
            cli.json,
            cli.verbose,
        ),
        Commands::Check { config, tenant } => cmd_check(&config, tenant, cli.json),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_deploy(
    config_path: &PathBuf,
    mut sites: Vec<String>,
    sites_from_stdin: bool,
    username: Option<String>,
    password: Option<String>,
    dry_run: bool,
    json: bool,
    verbose: u8,
) -> Result<()> {
    if sites_from_stdin {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            let line = line.trim();
            if !line.is_empty() {
                sites.push(line.to_string());
            }
        }
    }

    // Reject malformed targets before any processing.
    for site in &sites {
        if !url::is_valid_target(site) {
            return Err(spdeploy::SpDeployError::InvalidSiteUrl {
                input: site.clone(),
            }
            .into());
        }
    }

    // `--sites-from-stdin` commits the run to site mode even when the piped
    // list turns out to be empty; an empty list must never flip the run
    // into a tenant deployment.
    let mode = run_mode_for(&sites, sites_from_stdin);

    if mode == RunMode::Site && sites.is_empty() {
        if json {
            println!(
                "{}",
                serde_json::json!({ "event": "nothing_to_do", "reason": "no_targets" })
            );
        } else {
            eprintln!("⚠ Nothing to deploy: no target sites supplied");
        }
        return Ok(());
    }

    let (config, warnings) = DeployConfig::load_with_warnings(config_path)?;
    print_config_warnings(&warnings, json);

    if !json {
        println!("📦 spdeploy");
        println!("Config: {}", config_path.display());
        match mode {
            RunMode::Tenant => println!("Mode: Tenant ({})", config.admin_site_url),
            RunMode::Site => println!("Mode: Site ({} targets)", sites.len()),
        }
        if dry_run {
            println!("Option: Dry run");
        }
    }

    let selection = config.selected_files(mode);
    if selection.is_empty() {
        if json {
            println!(
                "{}",
                serde_json::json!({ "event": "nothing_to_do", "mode": mode_name(mode) })
            );
        } else {
            eprintln!(
                "⚠ Nothing to deploy: no packages marked deployToTenant={}",
                mode.deploys_to_tenant()
            );
        }
        return Ok(());
    }

    config.verify_packages(&selection)?;

    if !json {
        println!("\n✓ Selected {} packages", selection.len());
    }

    let on_event = |event: DeployEvent| {
        if json {
            println!("{}", event_json(&event));
        } else {
            render_event(&event, verbose);
        }
    };

    let report = if dry_run {
        match mode {
            RunMode::Tenant => plan_tenant(&config, &selection, on_event),
            RunMode::Site => plan_sites(&config, &selection, &sites, on_event),
        }
    } else {
        let credential = credentials::resolve(username, password)?;

        if !M365Client::is_available() {
            anyhow::bail!("m365 CLI not found on PATH - install it or use --dry-run");
        }
        let mut client = M365Client::new();

        match mode {
            RunMode::Tenant => {
                deploy_tenant(&mut client, &config, &selection, &credential, on_event)?
            }
            RunMode::Site => {
                deploy_sites(&mut client, &config, &selection, &sites, &credential, on_event)?
            }
        }
    };

    print_report(&report, dry_run, json);
    Ok(())
}

/// Site mode is selected by the invocation's parameter set, not by how many
/// targets actually arrived: passing `--sites-from-stdin` is a site-mode
/// invocation even if the piped list is empty.
fn run_mode_for(sites: &[String], sites_from_stdin: bool) -> RunMode {
    if sites_from_stdin || !sites.is_empty() {
        RunMode::Site
    } else {
        RunMode::Tenant
    }
}

fn cmd_check(config_path: &PathBuf, tenant: bool, json: bool) -> Result<()> {
    let mode = if tenant { RunMode::Tenant } else { RunMode::Site };
    let (config, warnings) = DeployConfig::load_with_warnings(config_path)?;
    print_config_warnings(&warnings, json);

    let selection = config.selected_files(mode);
    let mut missing = 0usize;

    if json {
        for entry in &selection {
            let path = config.package_path(entry);
            let present = path.exists();
            if !present {
                missing += 1;
            }
            println!(
                "{}",
                serde_json::json!({
                    "event": "package",
                    "file": entry.file_name,
                    "path": path.display().to_string(),
                    "present": present,
                })
            );
        }
        println!(
            "{}",
            serde_json::json!({
                "event": "check",
                "mode": mode_name(mode),
                "selected": selection.len(),
                "missing": missing,
            })
        );
    } else {
        println!("🔍 spdeploy check");
        println!("Config: {}", config_path.display());
        println!("Mode: {}", mode_name(mode));
        println!();

        if selection.is_empty() {
            println!(
                "⚠ No packages marked deployToTenant={}",
                mode.deploys_to_tenant()
            );
            return Ok(());
        }

        for entry in &selection {
            let path = config.package_path(entry);
            if path.exists() {
                println!("  ✓ {}", entry.file_name);
            } else {
                println!("  ✗ {} (missing: {})", entry.file_name, path.display());
                missing += 1;
            }
        }

        println!();
        println!(
            "Summary: {} selected, {} missing",
            selection.len(),
            missing
        );
    }

    if missing > 0 {
        anyhow::bail!("{missing} package file(s) missing");
    }
    Ok(())
}

fn mode_name(mode: RunMode) -> &'static str {
    match mode {
        RunMode::Tenant => "tenant",
        RunMode::Site => "site",
    }
}

fn print_config_warnings(warnings: &[spdeploy::ConfigWarning], json: bool) {
    for warning in warnings {
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "event": "config_warning",
                    "key": warning.key,
                    "line": warning.line,
                    "suggestion": warning.suggestion,
                })
            );
        } else {
            match &warning.suggestion {
                Some(suggestion) => eprintln!(
                    "⚠ Unknown config key '{}' (did you mean '{}'?)",
                    warning.key, suggestion
                ),
                None => eprintln!("⚠ Unknown config key '{}'", warning.key),
            }
        }
    }
}

fn render_event(event: &DeployEvent, verbose: u8) {
    match event {
        DeployEvent::Connecting { url } => println!("\n🔗 Connecting: {}", url),
        DeployEvent::Connected { .. } => {
            if verbose > 0 {
                println!("  ✓ Connected");
            }
        }
        DeployEvent::CatalogReady { .. } => {
            if verbose > 0 {
                println!("  ✓ App catalog ready");
            }
        }
        DeployEvent::Uploading { file, .. } => println!("  ⬆ Uploading {}", file),
        DeployEvent::Uploaded { file, handle } => {
            if verbose > 0 {
                println!("  ✓ Uploaded {} (id {})", file, handle);
            }
        }
        DeployEvent::AlreadyInstalled { file, .. } => {
            println!("  • {} already installed, skipping", file);
        }
        DeployEvent::Installed { file, .. } => println!("  ✓ Installed {}", file),
        DeployEvent::Disconnected { .. } => {
            if verbose > 0 {
                println!("  ✓ Disconnected");
            }
        }
        DeployEvent::WouldDeploy { file, url, scope } => {
            println!("  → would deploy {} to {} ({:?} scope)", file, url, scope);
        }
    }
}

fn event_json(event: &DeployEvent) -> String {
    let value = match event {
        DeployEvent::Connecting { url } => {
            serde_json::json!({ "event": "connecting", "url": url })
        }
        DeployEvent::Connected { url } => {
            serde_json::json!({ "event": "connected", "url": url })
        }
        DeployEvent::CatalogReady { url } => {
            serde_json::json!({ "event": "catalog_ready", "url": url })
        }
        DeployEvent::Uploading { file, url } => {
            serde_json::json!({ "event": "uploading", "file": file, "url": url })
        }
        DeployEvent::Uploaded { file, handle } => {
            serde_json::json!({ "event": "uploaded", "file": file, "handle": handle })
        }
        DeployEvent::AlreadyInstalled { file, url } => {
            serde_json::json!({ "event": "already_installed", "file": file, "url": url })
        }
        DeployEvent::Installed { file, url } => {
            serde_json::json!({ "event": "installed", "file": file, "url": url })
        }
        DeployEvent::Disconnected { url } => {
            serde_json::json!({ "event": "disconnected", "url": url })
        }
        DeployEvent::WouldDeploy { file, url, scope } => {
            serde_json::json!({ "event": "would_deploy", "file": file, "url": url, "scope": scope })
        }
    };
    value.to_string()
}

fn print_report(report: &DeployReport, dry_run: bool, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "event": "done",
                "dry_run": dry_run,
                "targets": report.targets_processed,
                "uploaded": report.uploaded.len(),
                "installed": report.installed.len(),
                "already_installed": report.already_installed.len(),
            })
        );
        return;
    }

    println!("\n📊 Deploy Results:");
    println!("  Targets processed: {}", report.targets_processed);
    if dry_run {
        println!("  (dry run - nothing was deployed)");
        return;
    }
    println!("  ⬆ Uploaded: {}", report.uploaded.len());
    if !report.installed.is_empty() {
        println!("  ✓ Installed: {}", report.installed.len());
        for item in &report.installed {
            println!("    - {}", item);
        }
    }
    if !report.already_installed.is_empty() {
        println!("  • Already installed: {}", report.already_installed.len());
    }
}
