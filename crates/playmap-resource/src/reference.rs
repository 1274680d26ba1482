//! Ephemeral resource references.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use playmap_core::MediaType;

use crate::error::{ResourceError, ResourceResult};

/// Opaque locator of an ephemeral resource, such as
/// `blob:playmap/4f0c...`.
///
/// References are minted by a [`ResourceStore`](crate::ResourceStore) and
/// are only meaningful for the run that created them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceRef(Arc<str>);

impl ResourceRef {
    /// Wrap a locator string.
    pub fn new(locator: impl Into<Arc<str>>) -> Self {
        Self(locator.into())
    }

    /// Get the locator as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for ResourceRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ResourceRef {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Serialize for ResourceRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ResourceRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Content held behind a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    media: MediaType,
    content: Bytes,
}

impl Resource {
    /// Create a resource.
    pub fn new(content: impl Into<Bytes>, media: MediaType) -> Self {
        Self {
            media,
            content: content.into(),
        }
    }

    /// Inferred media type.
    pub fn media(&self) -> MediaType {
        self.media
    }

    /// MIME type served for the resource, if the media type has one.
    pub fn mime(&self) -> Option<&'static str> {
        self.media.mime()
    }

    /// Raw content.
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Content size in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Check if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Content as UTF-8 text.
    pub fn text(&self, reference: &ResourceRef) -> ResourceResult<&str> {
        std::str::from_utf8(&self.content)
            .map_err(|_| ResourceError::NotText(reference.to_string()))
    }
}
