//! A sync run followed by the git handoff of its changed paths

use std::fs;
use std::path::PathBuf;

use git2::Repository;
use mirror_core::{MirrorConfig, SyncOptions, SyncOrchestrator, SyncStatus};
use mirror_git::{ChangePublisher, CommitOutcome};
use mirror_remote::Credentials;
use mirror_test_utils::git::{branch_head_message, commit_all, working_repo_with_origin};
use mirror_test_utils::{FakeDownloader, FakeRemoteHost, SAMPLE_DOCUMENT, StaticTagSource};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct Checkout {
    _temp: TempDir,
    work: PathBuf,
    bare: PathBuf,
}

/// Working tree with the sample document and stored `1.2.0` committed,
/// plus a bare `origin`.
fn checkout() -> Checkout {
    let temp = TempDir::new().unwrap();
    let work = temp.path().join("work");
    let bare = temp.path().join("origin.git");
    fs::create_dir_all(&work).unwrap();

    let repo = working_repo_with_origin(&work, &bare);
    fs::write(work.join("README.md"), SAMPLE_DOCUMENT).unwrap();
    fs::write(work.join("latest_version.txt"), "1.2.0").unwrap();
    commit_all(&repo, "Mirror flutter 1.2.0");

    Checkout {
        _temp: temp,
        work,
        bare,
    }
}

async fn sync(checkout: &Checkout, config: &MirrorConfig) -> mirror_core::SyncOutcome {
    let orchestrator = SyncOrchestrator::from_config(
        config,
        &checkout.work,
        Box::new(StaticTagSource::tags(&["1.2.0", "1.3.0"])),
        Box::new(FakeDownloader::new()),
        Box::new(FakeRemoteHost::new()),
    );
    orchestrator
        .run(
            None,
            Some(&Credentials::new("mirror@example.com", "secret")),
            &SyncOptions::default(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_changed_paths_are_committed_and_pushed() {
    let checkout = checkout();
    let config = MirrorConfig::default();

    let outcome = sync(&checkout, &config).await;
    assert_eq!(outcome.status, SyncStatus::Synced);
    assert_eq!(outcome.changed_paths.len(), 2);

    let message = config
        .vcs
        .commit_message(&config.upstream.name, outcome.version);
    let commit = ChangePublisher::discover(&checkout.work)
        .unwrap()
        .with_remote(&config.vcs.remote)
        .publish(&outcome.changed_paths, &message)
        .unwrap();

    assert!(matches!(commit, CommitOutcome::Committed { pushed: true, .. }));
    let origin = Repository::open_bare(&checkout.bare).unwrap();
    assert_eq!(
        branch_head_message(&origin, "main").as_deref(),
        Some("Mirror flutter 1.3.0")
    );

    // Scratch storage is cleaned and never staged.
    let work = Repository::open(&checkout.work).unwrap();
    let head_tree = work.head().unwrap().peel_to_tree().unwrap();
    assert!(head_tree.get_name("sdks").is_none());
    assert!(!checkout.work.join("sdks").join("1.3.0").exists());
}

#[tokio::test]
async fn test_republishing_same_paths_is_nothing_to_commit() {
    let checkout = checkout();
    let config = MirrorConfig::default();
    let outcome = sync(&checkout, &config).await;

    let publisher = ChangePublisher::discover(&checkout.work)
        .unwrap()
        .with_push(false);
    let first = publisher
        .publish(&outcome.changed_paths, "Mirror flutter 1.3.0")
        .unwrap();
    let second = publisher
        .publish(&outcome.changed_paths, "Mirror flutter 1.3.0")
        .unwrap();

    assert!(matches!(first, CommitOutcome::Committed { pushed: false, .. }));
    assert_eq!(second, CommitOutcome::NothingToCommit);
    // Nothing was pushed, origin still has no main branch.
    let origin = Repository::open_bare(&checkout.bare).unwrap();
    assert_eq!(branch_head_message(&origin, "main"), None);
}
