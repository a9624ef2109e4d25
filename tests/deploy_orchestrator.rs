//! Integration tests for the deployment orchestrator
//!
//! Drives `deploy_tenant` and `deploy_sites` against a scripted in-memory
//! client to pin the failure policy: fail-fast on connection errors,
//! suppression of catalog-exists and lookup failures, and the tenant mode
//! never installing anything.

mod common;

use common::*;

use spdeploy::deploy::{deploy_sites, deploy_tenant, plan_sites, plan_tenant, DeployEvent};
use spdeploy::models::AppScope;
use spdeploy::SpDeployError;

fn no_events(_event: DeployEvent) {}

#[test]
fn empty_selection_makes_no_client_calls() {
    let config = sample_config(vec![]);
    let mut client = ScriptedClient::new();

    let report = deploy_sites(
        &mut client,
        &config,
        &[],
        &["/sites/foo".to_string()],
        &credential(),
        no_events,
    )
    .unwrap();

    assert!(report.is_noop());
    assert_eq!(report.targets_processed, 0);
    assert!(client.calls.is_empty());

    let report = deploy_tenant(
        &mut client,
        &config,
        &[],
        &credential(),
        no_events,
    )
    .unwrap();

    assert!(report.is_noop());
    assert!(client.calls.is_empty());
}

#[test]
fn tenant_mode_uploads_to_admin_url_and_never_installs() {
    let files = vec![entry("header.sppkg", true), entry("footer.sppkg", true)];
    let config = sample_config(files.clone());
    let mut client = ScriptedClient::new();

    let report = deploy_tenant(
        &mut client,
        &config,
        &files,
        &credential(),
        no_events,
    )
    .unwrap();

    assert_eq!(
        client.connect_urls(),
        vec!["https://contoso-admin.sharepoint.com"]
    );
    assert_eq!(client.upload_count(), 2);
    assert_eq!(client.install_count(), 0);
    assert!(!client.calls.contains(&Call::EnsureCatalog));
    assert_eq!(client.calls.last(), Some(&Call::Disconnect));
    assert_eq!(report.uploaded.len(), 2);
    assert_eq!(report.targets_processed, 1);
}

#[test]
fn tenant_connect_failure_aborts_run() {
    let files = vec![entry("header.sppkg", true)];
    let config = sample_config(files.clone());
    let mut client = ScriptedClient {
        fail_connect_on: Some(0),
        ..Default::default()
    };

    let err = deploy_tenant(
        &mut client,
        &config,
        &files,
        &credential(),
        no_events,
    )
    .unwrap_err();

    assert!(matches!(err, SpDeployError::Connection { .. }));
    assert_eq!(client.upload_count(), 0);
}

#[test]
fn site_flow_runs_full_lifecycle_per_target() {
    let files = vec![entry("news-feed.sppkg", false)];
    let config = sample_config(files.clone());
    let mut client = ScriptedClient::new();

    let report = deploy_sites(
        &mut client,
        &config,
        &files,
        &["/sites/marketing".to_string()],
        &credential(),
        no_events,
    )
    .unwrap();

    assert_eq!(
        client.calls,
        vec![
            Call::Connect("https://contoso.sharepoint.com/sites/marketing".to_string()),
            Call::EnsureCatalog,
            Call::Upload("news-feed.sppkg".to_string(), AppScope::Site),
            Call::GetApp("app-news-feed.sppkg".to_string()),
            Call::Install("app-news-feed.sppkg".to_string(), AppScope::Site),
            Call::Disconnect,
        ]
    );
    assert_eq!(report.installed.len(), 1);
    assert_eq!(report.targets_processed, 1);
}

#[test]
fn relative_targets_are_normalized_before_connect() {
    let files = vec![entry("a.sppkg", false)];
    let config = sample_config(files.clone());
    let mut client = ScriptedClient::new();

    deploy_sites(
        &mut client,
        &config,
        &files,
        &[
            "sites/foo".to_string(),
            "https://contoso.sharepoint.com/teams/bar".to_string(),
        ],
        &credential(),
        no_events,
    )
    .unwrap();

    assert_eq!(
        client.connect_urls(),
        vec![
            "https://contoso.sharepoint.com/sites/foo",
            "https://contoso.sharepoint.com/teams/bar",
        ]
    );
}

#[test]
fn connect_failure_on_second_target_aborts_remaining_targets() {
    let files = vec![entry("a.sppkg", false)];
    let config = sample_config(files.clone());
    let mut client = ScriptedClient {
        fail_connect_on: Some(1),
        ..Default::default()
    };

    let targets = vec![
        "/sites/one".to_string(),
        "/sites/two".to_string(),
        "/sites/three".to_string(),
    ];
    let err = deploy_sites(
        &mut client,
        &config,
        &files,
        &targets,
        &credential(),
        no_events,
    )
    .unwrap_err();

    assert!(matches!(err, SpDeployError::Connection { .. }));

    // Target one was processed fully, target two stopped at connect, target
    // three was never attempted.
    assert_eq!(
        client.connect_urls(),
        vec![
            "https://contoso.sharepoint.com/sites/one",
            "https://contoso.sharepoint.com/sites/two",
        ]
    );
    let disconnects = client
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Disconnect))
        .count();
    assert_eq!(disconnects, 1);
    assert_eq!(client.upload_count(), 1);
}

#[test]
fn existing_catalog_is_treated_as_success() {
    let files = vec![entry("a.sppkg", false)];
    let config = sample_config(files.clone());
    let mut client = ScriptedClient {
        catalog_exists: true,
        ..Default::default()
    };

    let report = deploy_sites(
        &mut client,
        &config,
        &files,
        &["/sites/foo".to_string()],
        &credential(),
        no_events,
    )
    .unwrap();

    assert_eq!(report.installed.len(), 1);
    assert_eq!(report.targets_processed, 1);
}

#[test]
fn already_installed_app_is_skipped_and_logged_once() {
    let files = vec![entry("a.sppkg", false), entry("b.sppkg", false)];
    let config = sample_config(files.clone());
    let mut client = ScriptedClient::new();
    client.installed.insert("app-a.sppkg".to_string());

    let mut events = Vec::new();
    let report = deploy_sites(
        &mut client,
        &config,
        &files,
        &["/sites/foo".to_string()],
        &credential(),
        |event| events.push(event),
    )
    .unwrap();

    // a.sppkg skipped, b.sppkg installed
    assert_eq!(client.install_count(), 1);
    assert!(client
        .calls
        .contains(&Call::Install("app-b.sppkg".to_string(), AppScope::Site)));

    let already = events
        .iter()
        .filter(|e| matches!(e, DeployEvent::AlreadyInstalled { file, .. } if file == "a.sppkg"))
        .count();
    assert_eq!(already, 1);
    assert_eq!(report.already_installed.len(), 1);
    assert_eq!(report.installed.len(), 1);
}

#[test]
fn lookup_failure_is_treated_as_not_installed() {
    let files = vec![entry("a.sppkg", false)];
    let config = sample_config(files.clone());
    let mut client = ScriptedClient {
        lookup_fails: true,
        ..Default::default()
    };

    let report = deploy_sites(
        &mut client,
        &config,
        &files,
        &["/sites/foo".to_string()],
        &credential(),
        no_events,
    )
    .unwrap();

    assert_eq!(client.install_count(), 1);
    assert!(report.already_installed.is_empty());
}

#[test]
fn planning_emits_the_walk_without_any_client() {
    let files = vec![entry("a.sppkg", false)];
    let config = sample_config(files.clone());

    let mut events = Vec::new();
    let report = plan_sites(
        &config,
        &files,
        &["/sites/foo".to_string(), "teams/bar".to_string()],
        |event| events.push(event),
    );

    assert_eq!(report.targets_processed, 2);
    assert_eq!(
        events,
        vec![
            DeployEvent::WouldDeploy {
                file: "a.sppkg".to_string(),
                url: "https://contoso.sharepoint.com/sites/foo".to_string(),
                scope: AppScope::Site,
            },
            DeployEvent::WouldDeploy {
                file: "a.sppkg".to_string(),
                url: "https://contoso.sharepoint.com/teams/bar".to_string(),
                scope: AppScope::Site,
            },
        ]
    );

    let tenant_files = vec![entry("t.sppkg", true)];
    let mut events = Vec::new();
    let report = plan_tenant(&config, &tenant_files, |event| events.push(event));

    assert_eq!(report.targets_processed, 1);
    assert_eq!(
        events,
        vec![DeployEvent::WouldDeploy {
            file: "t.sppkg".to_string(),
            url: "https://contoso-admin.sharepoint.com".to_string(),
            scope: AppScope::Tenant,
        }]
    );

    let report = plan_sites(&config, &[], &["/sites/foo".to_string()], no_events);
    assert!(report.is_noop());
    assert_eq!(report.targets_processed, 0);
}
