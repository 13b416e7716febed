//! Remote storage hosts and artifact downloads for the release mirror
//!
//! Every network operation of a sync run goes through the two capability
//! traits defined here:
//!
//! - [`RemoteHost`]: authenticate, find-by-name, delete, upload, public link.
//!   Implemented by [`PcloudHost`] (token session) and [`WebDavHost`]
//!   (credentials sent with every request).
//! - [`Downloader`]: fetch a URL into a local file, all-or-nothing.
//!   Implemented by [`HttpDownloader`].

pub mod download;
pub mod error;
pub mod host;
pub mod multistatus;
pub mod pcloud;
pub mod webdav;

mod body;

pub use download::{Downloader, HttpDownloader};
pub use error::{Error, Result};
pub use host::{Credentials, HostConfig, HostKind, RemoteFileHandle, RemoteHost, Session, connect};
pub use pcloud::PcloudHost;
pub use webdav::WebDavHost;
