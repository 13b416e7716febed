//! pCloud back end
//!
//! Authentication happens once: `userinfo?getauth=1` trades the
//! credentials for an auth token which every later call carries as the
//! `auth` parameter. Files are addressed by numeric `fileid`.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::body;
use crate::host::{Credentials, HostKind, RemoteFileHandle, RemoteHost, Session};
use crate::{Error, Result};

const HOST: &str = "pcloud";

/// Result codes documented by the pCloud API
const LOGIN_REQUIRED: u32 = 1000;
const LOGIN_FAILED: u32 = 2000;
const DIRECTORY_NOT_FOUND: u32 = 2005;
const FILE_NOT_FOUND: u32 = 2009;
const INVALID_ACCESS_TOKEN: u32 = 2094;
const TOO_MANY_LOGINS: u32 = 4000;

#[derive(Debug, Deserialize)]
struct Status {
    result: u32,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    auth: String,
}

#[derive(Debug, Deserialize)]
struct ListFolderResponse {
    metadata: FolderMetadata,
}

#[derive(Debug, Deserialize)]
struct FolderMetadata {
    #[serde(default)]
    contents: Vec<EntryMetadata>,
}

#[derive(Debug, Deserialize)]
struct EntryMetadata {
    name: String,
    #[serde(default)]
    isfolder: bool,
    #[serde(default)]
    fileid: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    metadata: Vec<EntryMetadata>,
}

#[derive(Debug, Deserialize)]
struct PublinkResponse {
    link: String,
}

/// Remote host speaking the pCloud HTTP JSON API.
pub struct PcloudHost {
    client: reqwest::Client,
    endpoint: String,
    folder: String,
}

impl PcloudHost {
    pub fn new(endpoint: &str, folder: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("release-mirror/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::protocol(HOST, e))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            folder: normalize_folder(folder),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.endpoint, method)
    }

    fn token<'a>(&self, session: &'a Session) -> Result<&'a str> {
        session.auth_token().ok_or_else(|| Error::Auth {
            host: HOST.to_string(),
            message: "session carries no auth token".to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
        subject: &str,
    ) -> Result<T> {
        tracing::debug!(method, subject, "pCloud request");
        let response = self
            .client
            .post(self.url(method))
            .form(params)
            .send()
            .await
            .map_err(|e| Error::transfer(format!("{HOST} {method}"), e))?;

        let value: Value = response
            .json()
            .await
            .map_err(|e| Error::protocol(HOST, format!("{method}: {e}")))?;
        decode(value, subject)
    }
}

#[async_trait]
impl RemoteHost for PcloudHost {
    fn kind(&self) -> HostKind {
        HostKind::Pcloud
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<Session> {
        let response: AuthResponse = self
            .call(
                "userinfo",
                &[
                    ("getauth", "1"),
                    ("logout", "1"),
                    ("username", credentials.identity.as_str()),
                    ("password", credentials.secret.as_str()),
                ],
                &credentials.identity,
            )
            .await?;
        Ok(Session::token(response.auth))
    }

    async fn find_by_name(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<Option<RemoteFileHandle>> {
        let token = self.token(session)?;
        let listing: ListFolderResponse = match self
            .call("listfolder", &[("auth", token), ("path", self.folder.as_str())], &self.folder)
            .await
        {
            Ok(listing) => listing,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        Ok(find_file(listing.metadata.contents, name))
    }

    async fn delete(
        &self,
        session: &Session,
        handle: &RemoteFileHandle,
        permanent: bool,
    ) -> Result<()> {
        let token = self.token(session)?;
        let _: Value = self
            .call("deletefile", &[("auth", token), ("fileid", handle.id.as_str())], &handle.name)
            .await?;

        if permanent {
            let purged: Result<Value> = self
                .call("trash_clear", &[("auth", token), ("fileid", handle.id.as_str())], &handle.name)
                .await;
            match purged {
                Ok(_) => {}
                Err(e) if e.is_not_found() => {
                    tracing::warn!(file = %handle.name, "Deleted file was not found in trash");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    async fn upload(&self, session: &Session, local: &Path) -> Result<RemoteFileHandle> {
        let token = self.token(session)?;
        let _: Value = self
            .call(
                "createfolderifnotexists",
                &[("auth", token), ("path", self.folder.as_str())],
                &self.folder,
            )
            .await?;

        let file = body::open(local).await?;
        let name = file.name.clone();
        let part = Part::stream_with_length(file.body, file.len).file_name(file.name);
        let form = Form::new().part("file", part);

        tracing::debug!(file = %name, bytes = file.len, "pCloud upload");
        let response = self
            .client
            .post(self.url("uploadfile"))
            .query(&[
                ("auth", token),
                ("path", self.folder.as_str()),
                ("filename", name.as_str()),
                ("nopartial", "1"),
            ])
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::transfer(&name, e))?;

        let value: Value = response
            .json()
            .await
            .map_err(|e| Error::transfer(&name, e))?;
        let uploaded: UploadResponse = decode(value, &name).map_err(|e| match e {
            Error::Protocol { message, .. } => Error::transfer(&name, message),
            other => other,
        })?;

        find_file(uploaded.metadata, &name)
            .ok_or_else(|| Error::transfer(&name, "upload response did not list the file"))
    }

    async fn public_link(&self, session: &Session, handle: &RemoteFileHandle) -> Result<String> {
        if let Some(link) = &handle.public_link {
            return Ok(link.clone());
        }
        let token = self.token(session)?;
        let response: PublinkResponse = self
            .call("getfilepublink", &[("auth", token), ("fileid", handle.id.as_str())], &handle.name)
            .await?;
        Ok(response.link)
    }
}

fn normalize_folder(folder: &str) -> String {
    let trimmed = folder.trim_matches('/');
    format!("/{trimmed}")
}

fn find_file(entries: Vec<EntryMetadata>, name: &str) -> Option<RemoteFileHandle> {
    entries
        .into_iter()
        .filter(|entry| !entry.isfolder && entry.name == name)
        .find_map(|entry| {
            entry
                .fileid
                .map(|id| RemoteFileHandle::new(id.to_string(), entry.name))
        })
}

/// Check the `result` code of a response and decode the payload.
fn decode<T: DeserializeOwned>(value: Value, subject: &str) -> Result<T> {
    let status: Status = serde_json::from_value(value.clone())
        .map_err(|e| Error::protocol(HOST, format!("missing result code: {e}")))?;
    classify(status, subject)?;
    serde_json::from_value(value).map_err(|e| Error::protocol(HOST, e))
}

fn classify(status: Status, subject: &str) -> Result<()> {
    let message = status.error.unwrap_or_default();
    match status.result {
        0 => Ok(()),
        LOGIN_REQUIRED | LOGIN_FAILED | INVALID_ACCESS_TOKEN | TOO_MANY_LOGINS => {
            Err(Error::Auth {
                host: HOST.to_string(),
                message,
            })
        }
        DIRECTORY_NOT_FOUND | FILE_NOT_FOUND => Err(Error::NotFound {
            name: subject.to_string(),
        }),
        code => Err(Error::protocol(HOST, format!("result {code}: {message}"))),
    }
}
