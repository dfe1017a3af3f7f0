//! Classified input references.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use url::Url;

/// Which acquisition strategy handles a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorKind {
    Web,
    WikiOrTicket,
    Directory,
    Image,
    PlainFile,
}

impl LocatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::WikiOrTicket => "wiki_or_ticket",
            Self::Directory => "directory",
            Self::Image => "image",
            Self::PlainFile => "plain_file",
        }
    }

    /// Whether the reference is a local filesystem path.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Directory | Self::Image | Self::PlainFile)
    }
}

impl fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific data resolved during classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorMetadata {
    /// Parsed HTTP(S) URL
    Url(Url),
    /// Has an HTTP(S) scheme but does not parse as a URL
    UnparsedUrl { reason: String },
    /// Local filesystem path
    Path(PathBuf),
}

/// An input reference after classification. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    raw: String,
    kind: LocatorKind,
    metadata: LocatorMetadata,
}

impl Locator {
    pub(crate) fn new(raw: impl Into<String>, kind: LocatorKind, metadata: LocatorMetadata) -> Self {
        Self {
            raw: raw.into(),
            kind,
            metadata,
        }
    }

    /// The reference exactly as it was given.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> LocatorKind {
        self.kind
    }

    pub fn metadata(&self) -> &LocatorMetadata {
        &self.metadata
    }

    pub fn url(&self) -> Option<&Url> {
        match &self.metadata {
            LocatorMetadata::Url(url) => Some(url),
            _ => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.metadata {
            LocatorMetadata::Path(path) => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
