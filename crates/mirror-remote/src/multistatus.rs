//! Minimal reader for WebDAV `207 Multi-Status` bodies
//!
//! Only what the WebDAV back end needs: each `<response>` becomes a
//! [`DavEntry`] with its `href` and the text of every property, keyed by
//! local name (namespace prefixes are dropped).

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::{Error, Result};

/// One `<d:response>` element of a multistatus body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DavEntry {
    pub href: String,
    pub properties: HashMap<String, String>,
}

impl DavEntry {
    pub fn property(&self, local_name: &str) -> Option<&str> {
        self.properties.get(local_name).map(String::as_str)
    }
}

/// Parse a multistatus document into its responses, in document order.
pub fn parse(xml: &str) -> Result<Vec<DavEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<DavEntry> = None;
    let mut element: Option<String> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::protocol("webdav", format!("malformed multistatus: {e}")))?;

        match event {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).to_string();
                if name == "response" {
                    current = Some(DavEntry::default());
                }
                element = Some(name);
            }
            Event::Text(text) => {
                let (Some(entry), Some(name)) = (current.as_mut(), element.as_deref()) else {
                    continue;
                };
                let value = text
                    .unescape()
                    .map_err(|e| Error::protocol("webdav", format!("bad text in {name}: {e}")))?
                    .to_string();
                if name == "href" {
                    entry.href = value;
                } else {
                    entry.properties.insert(name.to_string(), value);
                }
            }
            Event::End(end) => {
                if end.local_name().as_ref() == b"response"
                    && let Some(entry) = current.take()
                {
                    entries.push(entry);
                }
                element = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TRASH_LISTING: &str = r#"<?xml version="1.0"?>
<d:multistatus xmlns:d="DAV:" xmlns:nc="http://nextcloud.org/ns">
  <d:response>
    <d:href>/remote.php/dav/trashbin/bot/trash/</d:href>
    <d:propstat><d:prop></d:prop><d:status>HTTP/1.1 200 OK</d:status></d:propstat>
  </d:response>
  <d:response>
    <d:href>/remote.php/dav/trashbin/bot/trash/flutter_linux.tar.xz.d1700000000</d:href>
    <d:propstat>
      <d:prop>
        <nc:trashbin-filename>flutter_linux.tar.xz</nc:trashbin-filename>
        <nc:trashbin-original-location>mirror/flutter_linux.tar.xz</nc:trashbin-original-location>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

    #[test]
    fn test_parse_trash_listing() {
        let entries = parse(TRASH_LISTING).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[1].href,
            "/remote.php/dav/trashbin/bot/trash/flutter_linux.tar.xz.d1700000000"
        );
        assert_eq!(
            entries[1].property("trashbin-original-location"),
            Some("mirror/flutter_linux.tar.xz")
        );
        assert_eq!(entries[0].property("trashbin-filename"), None);
    }

    #[test]
    fn test_parse_unescapes_entities() {
        let xml = r#"<d:multistatus xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns">
  <d:response>
    <d:href>/remote.php/dav/files/bot/a%26b.zip</d:href>
    <d:propstat><d:prop><d:displayname>a&amp;b.zip</d:displayname><oc:fileid>42</oc:fileid></d:prop></d:propstat>
  </d:response>
</d:multistatus>"#;

        let entries = parse(xml).unwrap();

        assert_eq!(entries[0].property("displayname"), Some("a&b.zip"));
        assert_eq!(entries[0].property("fileid"), Some("42"));
    }

    #[test]
    fn test_parse_empty_multistatus() {
        let entries = parse(r#"<d:multistatus xmlns:d="DAV:"></d:multistatus>"#).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse("<d:multistatus><d:response></d:multistatus>").is_err());
    }
}
