//! In-memory capability fakes.
//!
//! Each fake is `Clone` over shared state: keep one clone for assertions and
//! hand another to the code under test.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mirror_git::TagSource;
use mirror_remote::{
    Credentials, Downloader, Error as RemoteError, HostKind, RemoteFileHandle, RemoteHost,
    Result as RemoteResult, Session,
};

const SESSION_TOKEN: &str = "fake-session";

/// One call received by [`FakeRemoteHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Authenticate,
    Find(String),
    Delete { name: String, permanent: bool },
    Upload(String),
    PublicLink(String),
}

#[derive(Debug, Clone)]
struct StoredFile {
    id: String,
    contents: Vec<u8>,
}

#[derive(Debug, Default)]
struct HostState {
    files: BTreeMap<String, StoredFile>,
    next_id: u64,
    calls: Vec<HostCall>,
    reject_credentials: bool,
    fail_upload: Option<String>,
    vanishing: Vec<String>,
}

impl HostState {
    fn store(&mut self, name: &str, contents: Vec<u8>) -> String {
        self.next_id += 1;
        let id = format!("id-{}", self.next_id);
        self.files.insert(
            name.to_string(),
            StoredFile {
                id: id.clone(),
                contents,
            },
        );
        id
    }
}

/// [`RemoteHost`] keeping files in memory and recording every call.
#[derive(Debug, Clone, Default)]
pub struct FakeRemoteHost {
    state: Arc<Mutex<HostState>>,
}

impl FakeRemoteHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state
            .lock()
            .unwrap_or_else(|e| panic!("fake host state poisoned: {e}"))
    }

    /// Pre-populate a file, as left behind by an earlier run.
    pub fn with_file(self, name: &str, contents: &[u8]) -> Self {
        self.lock().store(name, contents.to_vec());
        self
    }

    /// Reject every authentication attempt.
    pub fn rejecting_credentials(self) -> Self {
        self.lock().reject_credentials = true;
        self
    }

    /// Fail uploads of the file called `name`.
    pub fn failing_upload_of(self, name: &str) -> Self {
        self.lock().fail_upload = Some(name.to_string());
        self
    }

    /// Report `name` as present on lookup but gone by the time it is deleted.
    pub fn vanishing(self, name: &str) -> Self {
        self.lock().vanishing.push(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.lock().calls.clone()
    }

    /// Names of uploaded files, in upload order.
    pub fn uploads(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Upload(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.lock().files.get(name).map(|f| f.contents.clone())
    }

    /// The public link the fake hands out for a stored file.
    pub fn link_for(&self, name: &str) -> Option<String> {
        self.lock()
            .files
            .get(name)
            .map(|f| format!("https://files.example.test/{}/{name}", f.id))
    }

    fn check_session(session: &Session) -> RemoteResult<()> {
        if session.auth_token() == Some(SESSION_TOKEN) {
            Ok(())
        } else {
            Err(RemoteError::Auth {
                host: "fake".to_string(),
                message: "unknown session".to_string(),
            })
        }
    }
}

#[async_trait]
impl RemoteHost for FakeRemoteHost {
    fn kind(&self) -> HostKind {
        HostKind::Pcloud
    }

    async fn authenticate(&self, _credentials: &Credentials) -> RemoteResult<Session> {
        let mut state = self.lock();
        state.calls.push(HostCall::Authenticate);
        if state.reject_credentials {
            return Err(RemoteError::Auth {
                host: "fake".to_string(),
                message: "invalid username or password".to_string(),
            });
        }
        Ok(Session::token(SESSION_TOKEN))
    }

    async fn find_by_name(
        &self,
        session: &Session,
        name: &str,
    ) -> RemoteResult<Option<RemoteFileHandle>> {
        Self::check_session(session)?;
        let mut state = self.lock();
        state.calls.push(HostCall::Find(name.to_string()));
        if state.vanishing.iter().any(|n| n == name) {
            return Ok(Some(RemoteFileHandle::new("id-vanished", name)));
        }
        Ok(state
            .files
            .get(name)
            .map(|f| RemoteFileHandle::new(f.id.clone(), name)))
    }

    async fn delete(
        &self,
        session: &Session,
        handle: &RemoteFileHandle,
        permanent: bool,
    ) -> RemoteResult<()> {
        Self::check_session(session)?;
        let mut state = self.lock();
        state.calls.push(HostCall::Delete {
            name: handle.name.clone(),
            permanent,
        });
        let present = state
            .files
            .get(&handle.name)
            .is_some_and(|file| file.id == handle.id);
        if !present {
            return Err(RemoteError::NotFound {
                name: handle.name.clone(),
            });
        }
        state.files.remove(&handle.name);
        Ok(())
    }

    async fn upload(&self, session: &Session, local: &Path) -> RemoteResult<RemoteFileHandle> {
        Self::check_session(session)?;
        let name = local
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let contents = std::fs::read(local).map_err(|e| RemoteError::io(local, e))?;

        let mut state = self.lock();
        state.calls.push(HostCall::Upload(name.clone()));
        if state.fail_upload.as_deref() == Some(name.as_str()) {
            return Err(RemoteError::transfer(&name, "connection reset by peer"));
        }
        if state.files.contains_key(&name) {
            return Err(RemoteError::transfer(&name, "a file with this name already exists"));
        }
        let id = state.store(&name, contents);
        Ok(RemoteFileHandle::new(id, name))
    }

    async fn public_link(
        &self,
        session: &Session,
        handle: &RemoteFileHandle,
    ) -> RemoteResult<String> {
        Self::check_session(session)?;
        self.lock()
            .calls
            .push(HostCall::PublicLink(handle.name.clone()));
        self.link_for(&handle.name)
            .ok_or_else(|| RemoteError::NotFound {
                name: handle.name.clone(),
            })
    }
}

#[derive(Debug, Default)]
struct DownloadState {
    urls: Vec<String>,
    fail_on: Option<String>,
}

/// [`Downloader`] that writes a deterministic payload per URL.
#[derive(Debug, Clone, Default)]
pub struct FakeDownloader {
    state: Arc<Mutex<DownloadState>>,
}

impl FakeDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DownloadState> {
        self.state
            .lock()
            .unwrap_or_else(|e| panic!("fake downloader state poisoned: {e}"))
    }

    /// Fail every URL containing `fragment` with a transfer error.
    pub fn failing_on(self, fragment: &str) -> Self {
        self.lock().fail_on = Some(fragment.to_string());
        self
    }

    /// Requested URLs, in request order.
    pub fn urls(&self) -> Vec<String> {
        self.lock().urls.clone()
    }

    /// The bytes written for `url`.
    pub fn payload(url: &str) -> Vec<u8> {
        format!("payload of {url}").into_bytes()
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn download(&self, url: &str, destination: &Path) -> RemoteResult<()> {
        let failing = {
            let mut state = self.lock();
            state.urls.push(url.to_string());
            state
                .fail_on
                .as_deref()
                .is_some_and(|fragment| url.contains(fragment))
        };
        if failing {
            return Err(RemoteError::transfer(url, "HTTP 404 Not Found"));
        }

        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RemoteError::io(parent, e))?;
        }
        std::fs::write(destination, Self::payload(url))
            .map_err(|e| RemoteError::io(destination, e))
    }
}

/// [`TagSource`] returning a fixed reference list.
#[derive(Debug, Clone)]
pub struct StaticTagSource {
    refs: Option<Vec<String>>,
}

impl StaticTagSource {
    pub fn new(refs: &[&str]) -> Self {
        Self {
            refs: Some(refs.iter().map(|r| r.to_string()).collect()),
        }
    }

    /// Tags given without namespace, advertised under `refs/tags/`.
    pub fn tags(tags: &[&str]) -> Self {
        Self {
            refs: Some(tags.iter().map(|t| format!("refs/tags/{t}")).collect()),
        }
    }

    /// A source whose listing always fails.
    pub fn unreachable() -> Self {
        Self { refs: None }
    }
}

impl TagSource for StaticTagSource {
    fn location(&self) -> &str {
        "static://upstream"
    }

    fn list_refs(&self) -> mirror_git::Result<Vec<String>> {
        self.refs
            .clone()
            .ok_or_else(|| mirror_git::Error::ListRefsFailed {
                url: self.location().to_string(),
                message: "could not resolve host".to_string(),
            })
    }
}
