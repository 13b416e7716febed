//! SyncOrchestrator implementation
//!
//! Runs strictly sequentially over the four platforms. Persisted state and
//! the document are only written once every transfer of the run succeeded;
//! remote files already replaced before a failure are not rolled back.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use mirror_git::TagSource;
use mirror_remote::{Credentials, Downloader, RemoteHost, Session};

use super::report::{SilentReporter, SyncOutcome, SyncReporter, SyncStatus};
use super::stage::SyncStage;
use crate::config::MirrorConfig;
use crate::{
    Artifact, ArtifactCatalog, ArtifactFetcher, Error, LinkPublisher, Result,
    SyncStateStore, Version, VersionResolver,
};

/// Options for a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Resolve and decide, then stop before authenticating or transferring
    pub dry_run: bool,
    /// Keep the fetched archives in scratch storage after `Done`
    pub keep_artifacts: bool,
}

/// Stage bookkeeping for one run
struct Progress<'a> {
    reporter: &'a dyn SyncReporter,
    stages: Mutex<Vec<SyncStage>>,
}

impl<'a> Progress<'a> {
    fn new(reporter: &'a dyn SyncReporter) -> Self {
        let progress = Self {
            reporter,
            stages: Mutex::new(Vec::new()),
        };
        progress.enter(SyncStage::Idle);
        progress
    }

    fn enter(&self, stage: SyncStage) {
        tracing::info!(%stage, "Sync stage");
        if let Ok(mut stages) = self.stages.lock() {
            stages.push(stage);
        }
        self.reporter.stage(stage);
    }

    fn step(&self, message: &str) {
        tracing::debug!(message, "Sync step");
        self.reporter.step(message);
    }

    fn current(&self) -> SyncStage {
        self.stages
            .lock()
            .ok()
            .and_then(|s| s.last().copied())
            .unwrap_or(SyncStage::Idle)
    }

    fn fail(&self, error: &Error) {
        let stage = self.current();
        tracing::error!(%stage, %error, "Sync failed");
        if let Ok(mut stages) = self.stages.lock() {
            stages.push(SyncStage::Failed);
        }
        self.reporter.failed(stage, error);
    }

    fn stages(&self) -> Vec<SyncStage> {
        self.stages.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

/// Composes resolver, state, catalog, fetcher, host and publisher into the
/// decide, fetch, replace, publish, persist cycle.
pub struct SyncOrchestrator {
    resolver: VersionResolver,
    state: SyncStateStore,
    catalog: ArtifactCatalog,
    fetcher: ArtifactFetcher,
    host: Box<dyn RemoteHost>,
    publisher: LinkPublisher,
    reporter: Box<dyn SyncReporter>,
}

impl SyncOrchestrator {
    pub fn new(
        resolver: VersionResolver,
        state: SyncStateStore,
        catalog: ArtifactCatalog,
        fetcher: ArtifactFetcher,
        host: Box<dyn RemoteHost>,
        publisher: LinkPublisher,
    ) -> Self {
        Self {
            resolver,
            state,
            catalog,
            fetcher,
            host,
            publisher,
            reporter: Box::new(SilentReporter),
        }
    }

    /// Wire every component from `config`, with paths relative to `root`.
    pub fn from_config(
        config: &MirrorConfig,
        root: &Path,
        tags: Box<dyn TagSource>,
        downloader: Box<dyn Downloader>,
        host: Box<dyn RemoteHost>,
    ) -> Self {
        Self::new(
            VersionResolver::new(tags).with_prefix(&config.upstream.tag_prefix),
            SyncStateStore::new(config.paths.state_path(root)),
            ArtifactCatalog::from_upstream(&config.upstream),
            ArtifactFetcher::new(downloader, config.paths.scratch_path(root)),
            host,
            LinkPublisher::new(config.paths.document_path(root)),
        )
    }

    pub fn with_reporter(mut self, reporter: Box<dyn SyncReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn state(&self) -> &SyncStateStore {
        &self.state
    }

    pub fn resolver(&self) -> &VersionResolver {
        &self.resolver
    }

    /// Run one sync cycle.
    ///
    /// `explicit` is the caller's version argument, if any; input that is
    /// not a triple is ignored with a warning. An explicit version is
    /// synced even when it is already stored, and an unreadable state file
    /// does not stop it; the file is overwritten once the run succeeds.
    /// `credentials` are only needed when the run reaches the transfer
    /// stages.
    ///
    /// Without an explicit version the run stops at `UpToDate` whenever the
    /// stored version is at least the upstream latest. A stored version
    /// newer than upstream is therefore left alone rather than synced back
    /// down to the upstream release.
    pub async fn run(
        &self,
        explicit: Option<&str>,
        credentials: Option<&Credentials>,
        options: &SyncOptions,
    ) -> Result<SyncOutcome> {
        let progress = Progress::new(self.reporter.as_ref());
        match self.drive(&progress, explicit, credentials, options).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                progress.fail(&e);
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        progress: &Progress<'_>,
        explicit: Option<&str>,
        credentials: Option<&Credentials>,
        options: &SyncOptions,
    ) -> Result<SyncOutcome> {
        progress.enter(SyncStage::ResolvingVersion);
        let explicit = explicit.and_then(|input| {
            let parsed = VersionResolver::resolve_from_input(input);
            if parsed.is_none() {
                tracing::warn!(input, "Ignoring explicit version that is not major.minor.patch");
                progress.step(&format!(
                    "Ignoring '{}': not a major.minor.patch version",
                    input.trim()
                ));
            }
            parsed
        });
        let target = match explicit {
            Some(version) => {
                progress.step(&format!("Using requested version {version}"));
                version
            }
            None => self.latest_upstream(progress)?,
        };

        progress.enter(SyncStage::CheckingNeed);
        let previous = match self.state.read_last() {
            Err(Error::InvalidState { path, content }) if explicit.is_some() => {
                tracing::warn!(path = %path.display(), content = %content, "Ignoring unreadable state for explicit version");
                progress.step(&format!(
                    "Ignoring unreadable state in {}",
                    path.display()
                ));
                None
            }
            read => read?,
        };
        let mut outcome = SyncOutcome {
            status: SyncStatus::UpToDate,
            version: target,
            previous,
            stages: Vec::new(),
            links: BTreeMap::new(),
            changed_paths: Vec::new(),
            artifacts: Vec::new(),
            planned: Vec::new(),
        };

        match (explicit, previous) {
            (None, Some(stored)) if stored >= target => {
                if stored > target {
                    tracing::warn!(%stored, %target, "Stored version is newer than upstream latest");
                }
                progress.step(&format!("Version {stored} is already mirrored"));
                progress.enter(SyncStage::UpToDate);
                outcome.stages = progress.stages();
                return Ok(outcome);
            }
            (Some(_), Some(stored)) if stored == target => {
                progress.step(&format!("Version {target} requested explicitly; syncing again"));
            }
            (_, Some(stored)) => progress.step(&format!("Mirroring {target} (stored {stored})")),
            (_, None) => progress.step(&format!("Mirroring {target} (nothing stored yet)")),
        }

        let artifacts = self.catalog.for_version(target);
        if options.dry_run {
            for artifact in &artifacts {
                progress.step(&format!(
                    "Would fetch {} and replace {}",
                    artifact.source_url, artifact.remote_file_name
                ));
            }
            outcome.status = SyncStatus::DryRun;
            outcome.planned = artifacts;
            outcome.stages = progress.stages();
            return Ok(outcome);
        }

        let credentials = credentials.ok_or(Error::MissingCredentials)?;
        progress.step(&format!("Authenticating with {}", self.host.kind()));
        let session = self.host.authenticate(credentials).await?;

        progress.enter(SyncStage::Fetching);
        let mut fetched = Vec::with_capacity(artifacts.len());
        for artifact in &artifacts {
            progress.step(&format!("Fetching {}", artifact.local_file_name));
            fetched.push(self.fetcher.fetch(artifact).await?);
        }

        progress.enter(SyncStage::Replacing);
        for (artifact, local) in artifacts.iter().zip(&fetched) {
            let link = self.replace(progress, &session, artifact, local).await?;
            outcome.links.insert(artifact.platform, link);
        }

        progress.enter(SyncStage::Publishing);
        if self.publisher.publish(&outcome.links)? {
            progress.step(&format!("Updated {}", self.publisher.path().display()));
            outcome.changed_paths.push(self.publisher.path().to_path_buf());
        } else {
            progress.step("Document links unchanged");
        }

        progress.enter(SyncStage::Persisting);
        self.state.write_last(target)?;
        if previous != Some(target) {
            outcome.changed_paths.push(self.state.path().to_path_buf());
        }

        progress.enter(SyncStage::Done);
        outcome.artifacts = self.finish_scratch(target, fetched, options);
        outcome.status = SyncStatus::Synced;
        outcome.planned = artifacts;
        outcome.stages = progress.stages();
        Ok(outcome)
    }

    fn latest_upstream(&self, progress: &Progress<'_>) -> Result<Version> {
        progress.step(&format!("Listing tags of {}", self.resolver.location()));
        let latest = self.resolver.resolve_latest()?;
        if latest.is_zero() {
            return Err(Error::UnknownUpstreamVersion {
                location: self.resolver.location().to_string(),
            });
        }
        progress.step(&format!("Upstream latest is {latest}"));
        Ok(latest)
    }

    /// Delete any file holding the artifact's remote name, upload the new
    /// one and return its public link.
    async fn replace(
        &self,
        progress: &Progress<'_>,
        session: &Session,
        artifact: &Artifact,
        local: &Path,
    ) -> Result<String> {
        let name = &artifact.remote_file_name;
        if let Some(existing) = self.host.find_by_name(session, name).await? {
            match self.host.delete(session, &existing, true).await {
                Ok(()) => progress.step(&format!("Deleted previous {name}")),
                Err(e) if e.is_not_found() => {
                    tracing::warn!(file = %name, "Previous remote file already gone");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let staged = self.fetcher.stage_for_upload(artifact, local)?;
        progress.step(&format!("Uploading {name}"));
        let handle = self.host.upload(session, &staged).await?;
        let link = self.host.public_link(session, &handle).await?;
        tracing::info!(platform = %artifact.platform, file = %name, %link, "Replaced remote file");
        Ok(link)
    }

    /// Drop the version's scratch directory unless asked to keep it.
    /// Returns the archives left on disk.
    fn finish_scratch(
        &self,
        version: Version,
        fetched: Vec<PathBuf>,
        options: &SyncOptions,
    ) -> Vec<PathBuf> {
        if options.keep_artifacts {
            return fetched;
        }
        if let Err(e) = self.fetcher.clean(version) {
            tracing::warn!(error = %e, "Failed to remove scratch directory");
            return fetched;
        }
        Vec::new()
    }
}
