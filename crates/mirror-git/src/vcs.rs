//! Commit and push the paths changed by a sync run

use std::path::{Path, PathBuf};

use git2::{Cred, CredentialType, PushOptions, RemoteCallbacks, Repository};

use crate::{Error, Result};

/// Result of publishing a set of changed paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The index already matched HEAD for every path
    NothingToCommit,
    /// A commit was created (and pushed when enabled)
    Committed { id: String, pushed: bool },
}

/// Stages, commits and optionally pushes changed paths of a working tree.
pub struct ChangePublisher {
    repo: Repository,
    remote: String,
    push: bool,
}

impl ChangePublisher {
    /// Open the repository containing `path`.
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)?;
        if repo.workdir().is_none() {
            return Err(Error::BareRepository {
                path: repo.path().to_path_buf(),
            });
        }

        Ok(Self {
            repo,
            remote: "origin".to_string(),
            push: true,
        })
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn with_push(mut self, push: bool) -> Self {
        self.push = push;
        self
    }

    /// Stage `paths`, commit them with `message`, then push if enabled.
    pub fn publish(&self, paths: &[PathBuf], message: &str) -> Result<CommitOutcome> {
        let mut index = self.repo.index()?;
        for path in paths {
            let relative = self.relative_to_workdir(path)?;
            tracing::debug!(path = %relative.display(), "Staging changed path");
            index.add_path(&relative)?;
        }
        index.write()?;

        let tree_id = index.write_tree()?;
        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = &parent
            && parent.tree_id() == tree_id
        {
            return Ok(CommitOutcome::NothingToCommit);
        }

        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.repo.signature()?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let id = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
        tracing::info!(commit = %id, "Committed mirrored changes");

        let pushed = if self.push {
            self.push_current_branch()?;
            true
        } else {
            false
        };

        Ok(CommitOutcome::Committed {
            id: id.to_string(),
            pushed,
        })
    }

    fn relative_to_workdir(&self, path: &Path) -> Result<PathBuf> {
        let workdir = self.repo.workdir().ok_or_else(|| Error::BareRepository {
            path: self.repo.path().to_path_buf(),
        })?;
        let workdir = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            workdir.join(path)
        };
        let absolute = absolute.canonicalize().unwrap_or(absolute);

        absolute
            .strip_prefix(&workdir)
            .map(Path::to_path_buf)
            .map_err(|_| Error::OutsideWorkdir {
                path: path.to_path_buf(),
            })
    }

    fn push_current_branch(&self) -> Result<()> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(Error::DetachedHead);
        }
        let branch = head.shorthand().unwrap_or("HEAD").to_string();

        let mut remote = self
            .repo
            .find_remote(&self.remote)
            .map_err(|_| Error::RemoteNotFound {
                name: self.remote.clone(),
            })?;

        let config = self.repo.config()?;
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username, allowed| {
            if allowed.contains(CredentialType::SSH_KEY) {
                Cred::ssh_key_from_agent(username.unwrap_or("git"))
            } else if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
                Cred::credential_helper(&config, url, username)
            } else {
                Cred::default()
            }
        });
        callbacks.push_update_reference(|refname, status| match status {
            Some(message) => Err(git2::Error::from_str(&format!(
                "{refname} rejected: {message}"
            ))),
            None => Ok(()),
        });

        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        remote
            .push(&[&refspec], Some(&mut options))
            .map_err(|e| Error::PushFailed {
                message: e.message().to_string(),
            })?;

        tracing::info!(remote = %self.remote, branch = %branch, "Pushed mirrored changes");
        Ok(())
    }
}
