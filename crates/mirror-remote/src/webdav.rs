//! WebDAV back end (Nextcloud flavour)
//!
//! There is no session on the server side: every request carries the
//! credentials as HTTP basic auth. Files live under
//! `remote.php/dav/files/<user>/<folder>/`, public links come from the
//! OCS sharing API and permanent deletion purges the trashbin entry.

use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;

use crate::body;
use crate::host::{Credentials, HostKind, RemoteFileHandle, RemoteHost, Session};
use crate::multistatus;
use crate::{Error, Result};

const HOST: &str = "webdav";

const PROPFIND_FILE: &str = r#"<?xml version="1.0"?>
<d:propfind xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns">
  <d:prop><oc:fileid/></d:prop>
</d:propfind>"#;

const PROPFIND_TRASH: &str = r#"<?xml version="1.0"?>
<d:propfind xmlns:d="DAV:" xmlns:nc="http://nextcloud.org/ns">
  <d:prop><nc:trashbin-filename/><nc:trashbin-original-location/></d:prop>
</d:propfind>"#;

#[derive(Debug, Deserialize)]
struct OcsEnvelope {
    ocs: Ocs,
}

#[derive(Debug, Deserialize)]
struct Ocs {
    data: ShareData,
}

#[derive(Debug, Deserialize)]
struct ShareData {
    url: String,
}

/// Remote host speaking WebDAV plus the Nextcloud OCS sharing API.
pub struct WebDavHost {
    client: reqwest::Client,
    endpoint: Url,
    folder: Vec<String>,
}

impl WebDavHost {
    pub fn new(endpoint: &str, folder: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::protocol(HOST, format!("invalid endpoint {endpoint}: {e}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::protocol(HOST, format!("endpoint {endpoint} cannot be a base URL")));
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("release-mirror/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::protocol(HOST, e))?;

        Ok(Self {
            client,
            endpoint,
            folder: folder
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }

    fn url_with<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn folder_url(&self, user: &str, depth: usize) -> Url {
        let base = ["remote.php", "dav", "files", user];
        self.url_with(
            base.into_iter()
                .chain(self.folder.iter().take(depth).map(String::as_str)),
        )
    }

    fn file_url(&self, user: &str, name: &str) -> Url {
        let mut url = self.folder_url(user, self.folder.len());
        if let Ok(mut path) = url.path_segments_mut() {
            path.push(name);
        }
        url
    }

    fn href_url(&self, href: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.set_path(href);
        url
    }

    /// Location of `name` relative to the user's root, as the trashbin reports it
    fn original_location(&self, name: &str) -> String {
        self.folder
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join("/")
    }

    fn request(&self, method: Method, url: Url, credentials: &Credentials) -> RequestBuilder {
        tracing::debug!(%method, %url, "WebDAV request");
        self.client
            .request(method, url)
            .basic_auth(&credentials.identity, Some(&credentials.secret))
    }

    fn credentials<'a>(&self, session: &'a Session) -> Result<&'a Credentials> {
        session.credentials().ok_or_else(|| Error::Auth {
            host: HOST.to_string(),
            message: "session carries no credentials".to_string(),
        })
    }

    async fn propfind(
        &self,
        url: Url,
        depth: &str,
        body: &'static str,
        credentials: &Credentials,
    ) -> Result<(StatusCode, String)> {
        let response = self
            .request(propfind_method(), url.clone(), credentials)
            .header("Depth", depth)
            .header(CONTENT_TYPE, "application/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::transfer(url.to_string(), e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::transfer(url.to_string(), e))?;
        Ok((status, text))
    }

    async fn ensure_folder(&self, credentials: &Credentials) -> Result<()> {
        for depth in 1..=self.folder.len() {
            let url = self.folder_url(&credentials.identity, depth);
            let response = self
                .request(mkcol_method(), url.clone(), credentials)
                .send()
                .await
                .map_err(|e| Error::transfer(url.to_string(), e))?;
            match response.status() {
                StatusCode::CREATED | StatusCode::METHOD_NOT_ALLOWED => {}
                status => check_status(status, url.as_str())?,
            }
        }
        Ok(())
    }

    /// Hrefs of the trash entries in `listing` that were deleted from
    /// `name` in the mirror folder.
    fn trash_entries_of(&self, name: &str, listing: &str) -> Result<Vec<String>> {
        let location = self.original_location(name);
        Ok(multistatus::parse(listing)?
            .into_iter()
            .filter(|entry| entry.property("trashbin-original-location") == Some(location.as_str()))
            .map(|entry| entry.href)
            .collect())
    }

    async fn purge_trash(&self, name: &str, credentials: &Credentials) -> Result<()> {
        let url = self.url_with(["remote.php", "dav", "trashbin", &credentials.identity, "trash"]);
        let (status, body) = self.propfind(url, "1", PROPFIND_TRASH, credentials).await?;
        if status == StatusCode::NOT_FOUND {
            tracing::warn!(file = %name, "Trashbin not available, skipping purge");
            return Ok(());
        }
        check_status(status, "trashbin")?;

        for href in self.trash_entries_of(name, &body)? {
            let url = self.href_url(&href);
            let response = self
                .request(Method::DELETE, url.clone(), credentials)
                .send()
                .await
                .map_err(|e| Error::transfer(url.to_string(), e))?;
            match response.status() {
                StatusCode::NOT_FOUND => {
                    tracing::debug!(href = %href, "Trash entry already purged");
                }
                status => check_status(status, name)?,
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteHost for WebDavHost {
    fn kind(&self) -> HostKind {
        HostKind::Webdav
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<Session> {
        let url = self.url_with(["remote.php", "dav", "files", &credentials.identity, ""]);
        let (status, _) = self.propfind(url, "0", PROPFIND_FILE, credentials).await?;
        check_status(status, &credentials.identity)?;
        Ok(Session::basic(credentials.clone()))
    }

    async fn find_by_name(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<Option<RemoteFileHandle>> {
        let credentials = self.credentials(session)?;
        let url = self.file_url(&credentials.identity, name);
        let (status, body) = self.propfind(url.clone(), "0", PROPFIND_FILE, credentials).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        check_status(status, name)?;

        let href = multistatus::parse(&body)?
            .into_iter()
            .map(|entry| entry.href)
            .find(|href| !href.is_empty())
            .unwrap_or_else(|| url.path().to_string());
        Ok(Some(RemoteFileHandle::new(href, name)))
    }

    async fn delete(
        &self,
        session: &Session,
        handle: &RemoteFileHandle,
        permanent: bool,
    ) -> Result<()> {
        let credentials = self.credentials(session)?;
        let url = self.href_url(&handle.id);
        let response = self
            .request(Method::DELETE, url.clone(), credentials)
            .send()
            .await
            .map_err(|e| Error::transfer(url.to_string(), e))?;
        check_status(response.status(), &handle.name)?;

        if permanent {
            self.purge_trash(&handle.name, credentials).await?;
        }
        Ok(())
    }

    async fn upload(&self, session: &Session, local: &Path) -> Result<RemoteFileHandle> {
        let credentials = self.credentials(session)?;
        self.ensure_folder(credentials).await?;

        let file = body::open(local).await?;
        let url = self.file_url(&credentials.identity, &file.name);
        tracing::debug!(file = %file.name, bytes = file.len, "WebDAV upload");

        let response = self
            .request(Method::PUT, url.clone(), credentials)
            .header(CONTENT_LENGTH, file.len)
            .body(file.body)
            .send()
            .await
            .map_err(|e| Error::transfer(&file.name, e))?;

        match check_status(response.status(), &file.name) {
            Ok(()) => Ok(RemoteFileHandle::new(url.path(), file.name)),
            Err(Error::Protocol { message, .. }) => Err(Error::transfer(&file.name, message)),
            Err(e) => Err(e),
        }
    }

    async fn public_link(&self, session: &Session, handle: &RemoteFileHandle) -> Result<String> {
        if let Some(link) = &handle.public_link {
            return Ok(link.clone());
        }
        let credentials = self.credentials(session)?;
        let url = self.url_with(["ocs", "v2.php", "apps", "files_sharing", "api", "v1", "shares"]);
        let path = format!("/{}", self.original_location(&handle.name));

        let response = self
            .request(Method::POST, url.clone(), credentials)
            .header("OCS-APIRequest", "true")
            .header("Accept", "application/json")
            .form(&[("path", path.as_str()), ("shareType", "3")])
            .send()
            .await
            .map_err(|e| Error::transfer(url.to_string(), e))?;
        check_status(response.status(), &handle.name)?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::transfer(url.to_string(), e))?;
        share_download_link(&body)
    }
}

fn propfind_method() -> Method {
    Method::from_bytes(b"PROPFIND").unwrap_or(Method::GET)
}

fn mkcol_method() -> Method {
    Method::from_bytes(b"MKCOL").unwrap_or(Method::PUT)
}

/// Map an HTTP status onto the host error kinds.
fn check_status(status: StatusCode, subject: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Auth {
            host: HOST.to_string(),
            message: format!("HTTP {status} for {subject}"),
        }),
        StatusCode::NOT_FOUND => Err(Error::NotFound {
            name: subject.to_string(),
        }),
        _ => Err(Error::protocol(HOST, format!("HTTP {status} for {subject}"))),
    }
}

/// Extract a direct-download link from an OCS share creation response.
fn share_download_link(body: &str) -> Result<String> {
    let envelope: OcsEnvelope = serde_json::from_str(body)
        .map_err(|e| Error::protocol(HOST, format!("share response: {e}")))?;
    let url = envelope.ocs.data.url.trim_end_matches('/');
    Ok(format!("{url}/download"))
}
