//! Git repository fixtures built with `git2`.
//!
//! All fixtures panic on failure; they are meant for test setup only.

use std::fs;
use std::path::Path;

use git2::{Repository, RepositoryInitOptions, Signature};

fn signature() -> Signature<'static> {
    Signature::now("Test User", "test@test.com")
        .unwrap_or_else(|e| panic!("failed to build signature: {e}"))
}

fn init_on_main(path: &Path, bare: bool) -> Repository {
    let mut options = RepositoryInitOptions::new();
    options.initial_head("main").bare(bare);
    Repository::init_opts(path, &options)
        .unwrap_or_else(|e| panic!("failed to init repository at {}: {e}", path.display()))
}

/// Commit every file currently in the working tree of `repo`.
///
/// # Panics
/// Panics if any git operation fails.
pub fn commit_all(repo: &Repository, message: &str) -> git2::Oid {
    let mut index = repo.index().unwrap_or_else(|e| panic!("commit_all: index: {e}"));
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap_or_else(|e| panic!("commit_all: add_all: {e}"));
    index.write().unwrap_or_else(|e| panic!("commit_all: write index: {e}"));
    let tree_id = index
        .write_tree()
        .unwrap_or_else(|e| panic!("commit_all: write tree: {e}"));
    let tree = repo
        .find_tree(tree_id)
        .unwrap_or_else(|e| panic!("commit_all: find tree: {e}"));

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    let sig = signature();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap_or_else(|e| panic!("commit_all: commit: {e}"))
}

/// Initialises an upstream repository with one commit and a lightweight
/// tag per entry of `tags`.
///
/// Use for: version resolution against a real reference advertisement.
///
/// # Panics
/// Panics if any git operation fails.
pub fn upstream_with_tags(path: &Path, tags: &[&str]) -> Repository {
    let repo = init_on_main(path, false);
    fs::write(path.join("VERSION"), "upstream\n")
        .unwrap_or_else(|e| panic!("upstream_with_tags: failed to write VERSION: {e}"));
    let head = commit_all(&repo, "Initial commit");

    {
        let target = repo
            .find_object(head, None)
            .unwrap_or_else(|e| panic!("upstream_with_tags: find head: {e}"));
        for tag in tags {
            repo.tag_lightweight(tag, &target, false)
                .unwrap_or_else(|e| panic!("upstream_with_tags: failed to tag {tag}: {e}"));
        }
    }
    repo
}

/// Adds an annotated tag to the current HEAD of `repo`.
///
/// The advertisement then carries both `refs/tags/<name>` and the peeled
/// `refs/tags/<name>^{}` entry.
pub fn tag_annotated(repo: &Repository, name: &str) {
    let head = repo
        .head()
        .and_then(|h| h.peel(git2::ObjectType::Commit))
        .unwrap_or_else(|e| panic!("tag_annotated: head: {e}"));
    repo.tag(name, &head, &signature(), &format!("Release {name}"), false)
        .unwrap_or_else(|e| panic!("tag_annotated: failed to tag {name}: {e}"));
}

/// Initialises a working repository on `main` with user identity configured,
/// an initial commit, and an `origin` remote pointing at a fresh bare
/// repository at `bare_path`.
///
/// Use for: publishing changed paths, including the push step.
///
/// # Panics
/// Panics if any git operation fails.
pub fn working_repo_with_origin(path: &Path, bare_path: &Path) -> Repository {
    init_on_main(bare_path, true);

    let repo = init_on_main(path, false);
    {
        let mut config = repo
            .config()
            .unwrap_or_else(|e| panic!("working_repo_with_origin: config: {e}"));
        config
            .set_str("user.name", "Test User")
            .unwrap_or_else(|e| panic!("working_repo_with_origin: user.name: {e}"));
        config
            .set_str("user.email", "test@test.com")
            .unwrap_or_else(|e| panic!("working_repo_with_origin: user.email: {e}"));
    }

    fs::write(path.join("README.md"), "# Mirror\n")
        .unwrap_or_else(|e| panic!("working_repo_with_origin: failed to write README.md: {e}"));
    commit_all(&repo, "Initial commit");

    let url = bare_path
        .to_str()
        .unwrap_or_else(|| panic!("non UTF-8 path {}", bare_path.display()));
    repo.remote("origin", url)
        .unwrap_or_else(|e| panic!("working_repo_with_origin: add remote: {e}"));
    repo
}

/// Message of the commit `branch` points at in `repo`, if any.
pub fn branch_head_message(repo: &Repository, branch: &str) -> Option<String> {
    let reference = repo.find_reference(&format!("refs/heads/{branch}")).ok()?;
    let commit = reference.peel_to_commit().ok()?;
    commit.message().map(str::to_string)
}
