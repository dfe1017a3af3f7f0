//! Reference classification.
//!
//! Maps a raw reference string to a [`Locator`]. Classification is total:
//! every string gets a kind, and problems with the reference surface later
//! as acquisition errors. Rules are checked in order, first match wins:
//!
//! 1. HTTP(S) URL whose host matches a tracker pattern: `WikiOrTicket`
//! 2. HTTP(S) URL: `Web`
//! 3. Existing directory: `Directory`
//! 4. `.jpg`, `.jpeg` or `.png` extension (any case): `Image`
//! 5. Anything else: `PlainFile`

use std::path::{Path, PathBuf};

use url::Url;

use crate::types::config::ClassifierConfig;
use crate::types::locator::{Locator, LocatorKind, LocatorMetadata};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Classify with the default tracker host patterns.
pub fn classify(raw: &str) -> Locator {
    Classifier::default().classify(raw)
}

/// Classifies raw references against a set of tracker host patterns.
#[derive(Debug, Clone)]
pub struct Classifier {
    tracker_hosts: Vec<Vec<String>>,
}

impl Classifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        let tracker_hosts = config
            .tracker_hosts
            .iter()
            .map(|pattern| split_labels(pattern))
            .filter(|labels| !labels.is_empty())
            .collect();
        Self { tracker_hosts }
    }

    pub fn classify(&self, raw: &str) -> Locator {
        if has_http_scheme(raw) {
            return match Url::parse(raw) {
                Ok(url) => {
                    let kind = match url.host_str() {
                        Some(host) if self.is_tracker_host(host) => LocatorKind::WikiOrTicket,
                        _ => LocatorKind::Web,
                    };
                    Locator::new(raw, kind, LocatorMetadata::Url(url))
                }
                Err(e) => Locator::new(
                    raw,
                    LocatorKind::Web,
                    LocatorMetadata::UnparsedUrl {
                        reason: e.to_string(),
                    },
                ),
            };
        }

        Self::local(raw.to_string(), PathBuf::from(raw))
    }

    /// Classify a path found on disk, keeping it byte-for-byte.
    ///
    /// Names that are not valid UTF-8 get a lossy `raw` for display, but
    /// acquisition reads the original path.
    pub fn classify_path(&self, path: &Path) -> Locator {
        Self::local(path.to_string_lossy().into_owned(), path.to_path_buf())
    }

    fn local(raw: String, path: PathBuf) -> Locator {
        // Best effort: the directory may vanish or appear before acquisition.
        let kind = if path.is_dir() {
            LocatorKind::Directory
        } else if has_image_extension(&path) {
            LocatorKind::Image
        } else {
            LocatorKind::PlainFile
        };
        Locator::new(raw, kind, LocatorMetadata::Path(path))
    }

    /// Whether `host` contains any tracker pattern as a run of whole labels.
    pub fn is_tracker_host(&self, host: &str) -> bool {
        let labels = split_labels(host);
        self.tracker_hosts.iter().any(|pattern| {
            pattern.len() <= labels.len()
                && labels
                    .windows(pattern.len())
                    .any(|window| window == pattern.as_slice())
        })
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

fn has_http_scheme(raw: &str) -> bool {
    let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

fn split_labels(host: &str) -> Vec<String> {
    host.trim_matches('.')
        .split('.')
        .filter(|label| !label.is_empty())
        .map(|label| label.to_ascii_lowercase())
        .collect()
}
