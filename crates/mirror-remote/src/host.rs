//! RemoteHost capability and the values threaded through it

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, PcloudHost, Result, WebDavHost};

/// Identity and secret for a remote host, resolved by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identity: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
enum SessionAuth {
    Token(String),
    Basic(Credentials),
}

/// Proof of authentication, passed explicitly to every host operation.
///
/// Token hosts keep the issued token; per-request hosts keep the
/// credentials they must attach to each call.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    auth: SessionAuth,
}

impl Session {
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            auth: SessionAuth::Token(token.into()),
        }
    }

    pub fn basic(credentials: Credentials) -> Self {
        Self {
            auth: SessionAuth::Basic(credentials),
        }
    }

    pub fn auth_token(&self) -> Option<&str> {
        match &self.auth {
            SessionAuth::Token(token) => Some(token),
            SessionAuth::Basic(_) => None,
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        match &self.auth {
            SessionAuth::Token(_) => None,
            SessionAuth::Basic(credentials) => Some(credentials),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.auth {
            SessionAuth::Token(_) => f.write_str("Session::Token(<redacted>)"),
            SessionAuth::Basic(credentials) => {
                write!(f, "Session::Basic({})", credentials.identity)
            }
        }
    }
}

/// A file as reported by a remote host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteFileHandle {
    /// Host-assigned identifier, only meaningful to the same host
    pub id: String,
    /// File name on the host
    pub name: String,
    /// Public link, when the host reported one alongside the file
    pub public_link: Option<String>,
}

impl RemoteFileHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            public_link: None,
        }
    }
}

/// Capability contract for a remote storage service.
///
/// `authenticate` must be called once before any other operation; the
/// returned [`Session`] is then passed to every call.
#[async_trait]
pub trait RemoteHost: Send + Sync {
    /// Which back end this is
    fn kind(&self) -> HostKind;

    /// Exchange credentials for a session. Fails with [`Error::Auth`].
    async fn authenticate(&self, credentials: &Credentials) -> Result<Session>;

    /// Look up a file by exact name. Absence is `Ok(None)`, never an error.
    async fn find_by_name(&self, session: &Session, name: &str)
    -> Result<Option<RemoteFileHandle>>;

    /// Delete a file. Fails with [`Error::NotFound`] when it is already gone.
    /// `permanent` also purges any trash retention the host applies.
    async fn delete(
        &self,
        session: &Session,
        handle: &RemoteFileHandle,
        permanent: bool,
    ) -> Result<()>;

    /// Upload a local file under its base name. Fails with [`Error::Transfer`].
    async fn upload(&self, session: &Session, local: &Path) -> Result<RemoteFileHandle>;

    /// Obtain a durable public link. Fails with [`Error::NotFound`].
    async fn public_link(&self, session: &Session, handle: &RemoteFileHandle) -> Result<String>;
}

/// Supported remote storage back ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKind {
    /// Token session obtained once, then passed as a query parameter
    Pcloud,
    /// WebDAV with Nextcloud sharing API, basic auth on every request
    Webdav,
}

impl HostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pcloud => "pcloud",
            Self::Webdav => "webdav",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Pcloud => "https://api.pcloud.com",
            Self::Webdav => "https://cloud.example.com",
        }
    }
}

impl fmt::Display for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pcloud" => Ok(Self::Pcloud),
            "webdav" | "nextcloud" => Ok(Self::Webdav),
            _ => Err(Error::UnknownHostKind {
                kind: s.to_string(),
            }),
        }
    }
}

fn default_kind() -> HostKind {
    HostKind::Pcloud
}

fn default_folder() -> String {
    "/mirror".to_string()
}

/// `[host]` section of the mirror configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_kind")]
    pub kind: HostKind,

    /// API base URL; the back end's public default when omitted
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Remote folder holding the mirrored files
    #[serde(default = "default_folder")]
    pub folder: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            endpoint: None,
            folder: default_folder(),
        }
    }
}

impl HostConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.kind.default_endpoint())
    }
}

/// Build the back end selected by `config`.
pub fn connect(config: &HostConfig) -> Result<Box<dyn RemoteHost>> {
    let endpoint = config.endpoint();
    tracing::debug!(kind = %config.kind, endpoint, folder = %config.folder, "Selecting remote host");

    let host: Box<dyn RemoteHost> = match config.kind {
        HostKind::Pcloud => Box::new(PcloudHost::new(endpoint, &config.folder)?),
        HostKind::Webdav => Box::new(WebDavHost::new(endpoint, &config.folder)?),
    };
    Ok(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = Credentials::new("mirror@example.com", "hunter2");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("mirror@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session::token("abc123");
        assert!(!format!("{session:?}").contains("abc123"));
        assert_eq!(session.auth_token(), Some("abc123"));
        assert!(session.credentials().is_none());
    }

    #[test]
    fn test_basic_session_exposes_credentials() {
        let session = Session::basic(Credentials::new("bot", "pw"));
        assert_eq!(session.credentials().map(|c| c.identity.as_str()), Some("bot"));
        assert!(session.auth_token().is_none());
        assert!(!format!("{session:?}").contains("pw"));
    }

    #[test]
    fn test_host_kind_parse() {
        assert_eq!("pcloud".parse::<HostKind>().unwrap(), HostKind::Pcloud);
        assert_eq!("WebDAV".parse::<HostKind>().unwrap(), HostKind::Webdav);
        assert_eq!("nextcloud".parse::<HostKind>().unwrap(), HostKind::Webdav);
        assert!("ftp".parse::<HostKind>().is_err());
    }

    #[test]
    fn test_host_config_defaults() {
        let config: HostConfig = toml::from_str("").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.endpoint(), "https://api.pcloud.com");
    }

    #[test]
    fn test_host_config_explicit_endpoint() {
        let config: HostConfig = toml::from_str(
            "kind = \"webdav\"\nendpoint = \"https://dav.example.org\"\nfolder = \"/sdk\"",
        )
        .unwrap();
        assert_eq!(config.kind, HostKind::Webdav);
        assert_eq!(config.endpoint(), "https://dav.example.org");
        assert_eq!(config.folder, "/sdk");
    }

    #[test]
    fn test_connect_builds_selected_kind() {
        let host = connect(&HostConfig::default()).unwrap();
        assert_eq!(host.kind(), HostKind::Pcloud);

        let config = HostConfig {
            kind: HostKind::Webdav,
            ..HostConfig::default()
        };
        assert_eq!(connect(&config).unwrap().kind(), HostKind::Webdav);
    }
}
