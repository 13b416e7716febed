//! End-to-end sync scenarios
//!
//! Versions are resolved from a real local git repository through
//! `RemoteTagSource`; the remote host and the downloader are in-memory
//! fakes. Each scenario checks the observable outcome: stage sequence,
//! transfers, document and persisted state.

use mirror_core::{
    MirrorConfig, Platform, SyncOptions, SyncOrchestrator, SyncStage, SyncStatus, Version,
};
use mirror_git::RemoteTagSource;
use mirror_remote::Credentials;
use mirror_test_utils::git::upstream_with_tags;
use mirror_test_utils::{FakeDownloader, FakeRemoteHost, HostCall, MirrorWorkspace};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Mirror checkout, upstream repository and the fakes one run talks to.
struct Scenario {
    workspace: MirrorWorkspace,
    _upstream: TempDir,
    host: FakeRemoteHost,
    downloader: FakeDownloader,
    orchestrator: SyncOrchestrator,
}

impl Scenario {
    fn new(upstream_tags: &[&str], stored: Option<&str>) -> Self {
        Self::with_host(upstream_tags, stored, FakeRemoteHost::new())
    }

    fn with_host(upstream_tags: &[&str], stored: Option<&str>, host: FakeRemoteHost) -> Self {
        let upstream = TempDir::new().unwrap();
        upstream_with_tags(upstream.path(), upstream_tags);

        let workspace = match stored {
            Some(version) => MirrorWorkspace::new().with_state(version),
            None => MirrorWorkspace::new(),
        };

        let mut config = MirrorConfig::default();
        config.upstream.repository = upstream.path().to_str().unwrap().to_string();

        let downloader = FakeDownloader::new();
        let orchestrator = SyncOrchestrator::from_config(
            &config,
            workspace.root(),
            Box::new(RemoteTagSource::new(&config.upstream.repository)),
            Box::new(downloader.clone()),
            Box::new(host.clone()),
        );

        Self {
            workspace,
            _upstream: upstream,
            host,
            downloader,
            orchestrator,
        }
    }

    async fn run(&self, explicit: Option<&str>) -> mirror_core::SyncOutcome {
        self.orchestrator
            .run(explicit, Some(&credentials()), &SyncOptions::default())
            .await
            .unwrap()
    }
}

fn credentials() -> Credentials {
    Credentials::new("mirror@example.com", "secret")
}

const REMOTE_NAMES: [&str; 4] = [
    "flutter_linux.tar.xz",
    "flutter_macos.zip",
    "flutter_macos_arm64.zip",
    "flutter_windows.zip",
];

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_newer_upstream_is_mirrored() {
    let scenario = Scenario::new(&["1.2.0", "1.3.0", "1.4.0-0.1.pre"], Some("1.2.0"));
    let before = scenario.workspace.read("README.md");

    let outcome = scenario.run(None).await;

    assert_eq!(outcome.status, SyncStatus::Synced);
    assert_eq!(outcome.version, Version::new(1, 3, 0));
    assert_eq!(
        outcome.stages,
        vec![
            SyncStage::Idle,
            SyncStage::ResolvingVersion,
            SyncStage::CheckingNeed,
            SyncStage::Fetching,
            SyncStage::Replacing,
            SyncStage::Publishing,
            SyncStage::Persisting,
            SyncStage::Done,
        ]
    );

    let urls = scenario.downloader.urls();
    assert_eq!(urls.len(), 4);
    assert!(urls.iter().all(|url| url.contains("1.3.0")));
    assert_eq!(scenario.host.uploads(), REMOTE_NAMES.to_vec());

    let after = scenario.workspace.read("README.md");
    let changed: Vec<(&str, &str)> = before
        .lines()
        .zip(after.lines())
        .filter(|(old, new)| old != new)
        .collect();
    assert_eq!(changed.len(), 4);
    for (platform, name) in Platform::ALL.iter().zip(REMOTE_NAMES) {
        let expected = format!("{}({})", platform.marker(), scenario.host.link_for(name).unwrap());
        assert!(after.lines().any(|line| line == expected), "missing {expected}");
    }

    assert_eq!(scenario.workspace.state().as_deref(), Some("1.3.0"));
    scenario.workspace.assert_file_missing("sdks/1.3.0");
}

#[tokio::test]
async fn test_current_upstream_is_up_to_date() {
    let scenario = Scenario::new(&["1.2.0", "1.3.0"], Some("1.3.0"));
    let before = scenario.workspace.read("README.md");

    let outcome = scenario.run(None).await;

    assert_eq!(outcome.status, SyncStatus::UpToDate);
    assert_eq!(
        outcome.stages,
        vec![
            SyncStage::Idle,
            SyncStage::ResolvingVersion,
            SyncStage::CheckingNeed,
            SyncStage::UpToDate,
        ]
    );
    assert!(scenario.downloader.urls().is_empty());
    assert!(scenario.host.calls().is_empty());
    assert_eq!(scenario.workspace.read("README.md"), before);
    assert_eq!(scenario.workspace.state().as_deref(), Some("1.3.0"));
    assert!(outcome.changed_paths.is_empty());
}

#[tokio::test]
async fn test_explicit_version_bypasses_idempotency() {
    let scenario = Scenario::new(&["1.3.0"], Some("1.3.0"));

    let outcome = scenario.run(Some("1.3.0")).await;

    assert_eq!(outcome.status, SyncStatus::Synced);
    assert_eq!(outcome.final_stage(), Some(SyncStage::Done));
    assert_eq!(scenario.downloader.urls().len(), 4);
    assert_eq!(scenario.host.uploads().len(), 4);
    // Version unchanged, so only the document is reported.
    assert_eq!(outcome.changed_paths, vec![scenario.workspace.path("README.md")]);
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let scenario = Scenario::new(&["1.3.0"], Some("1.2.0"));

    let first = scenario.run(None).await;
    let calls_after_first = scenario.host.calls().len();
    let second = scenario.run(None).await;

    assert_eq!(first.status, SyncStatus::Synced);
    assert_eq!(second.status, SyncStatus::UpToDate);
    assert_eq!(scenario.host.calls().len(), calls_after_first);
    assert_eq!(scenario.downloader.urls().len(), 4);
}

#[tokio::test]
async fn test_previous_files_replaced_on_host() {
    let host = FakeRemoteHost::new()
        .with_file("flutter_linux.tar.xz", b"1.2.0 archive")
        .with_file("flutter_windows.zip", b"1.2.0 archive");
    let scenario = Scenario::with_host(&["1.3.0"], Some("1.2.0"), host);

    scenario.run(None).await;

    assert_eq!(scenario.host.file_names().len(), 4);
    let deleted: Vec<String> = scenario
        .host
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            HostCall::Delete { name, permanent } => {
                assert!(permanent);
                Some(name)
            }
            _ => None,
        })
        .collect();
    assert_eq!(deleted, vec!["flutter_linux.tar.xz", "flutter_windows.zip"]);
    assert_ne!(
        scenario.host.contents("flutter_linux.tar.xz").unwrap(),
        b"1.2.0 archive".to_vec()
    );
}

#[tokio::test]
async fn test_first_sync_with_no_state() {
    let scenario = Scenario::new(&["0.9.0", "1.0.0", "not-a-release"], None);

    let outcome = scenario.run(None).await;

    assert_eq!(outcome.previous, None);
    assert_eq!(outcome.version, Version::new(1, 0, 0));
    assert_eq!(scenario.workspace.state().as_deref(), Some("1.0.0"));
    assert_eq!(
        outcome.changed_paths,
        vec![
            scenario.workspace.path("README.md"),
            scenario.workspace.path("latest_version.txt"),
        ]
    );
}

#[tokio::test]
async fn test_upstream_without_release_tags_fails() {
    let scenario = Scenario::new(&["beta", "1.0"], Some("1.2.0"));

    let err = scenario
        .orchestrator
        .run(None, Some(&credentials()), &SyncOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, mirror_core::Error::UnknownUpstreamVersion { .. }));
    assert!(scenario.host.calls().is_empty());
    assert_eq!(scenario.workspace.state().as_deref(), Some("1.2.0"));
}
