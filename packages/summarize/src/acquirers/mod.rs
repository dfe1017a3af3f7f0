//! Acquisition strategies, one per locator kind.
//!
//! Directories have no strategy here: the pipeline expands them into child
//! locators and folds the children's summaries.

pub mod atlassian;
pub mod file;
pub mod html;
pub mod image;
pub mod web;

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;

use crate::error::{AcquisitionError, ConfigurationError};
use crate::security::AtlassianCredentials;
use crate::traits::acquirer::Acquirer;
use crate::types::locator::LocatorKind;

pub use atlassian::{AtlassianAcquirer, WikiTarget};
pub use file::FileAcquirer;
pub use image::ImageAcquirer;
pub use web::WebAcquirer;

pub const DEFAULT_USER_AGENT: &str = concat!("summarize/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// The strategy registry the pipeline routes through.
#[derive(Clone)]
pub struct Acquirers {
    web: Arc<dyn Acquirer>,
    wiki: Arc<dyn Acquirer>,
    file: Arc<dyn Acquirer>,
    image: Arc<dyn Acquirer>,
}

impl Acquirers {
    /// Build the real strategies sharing one HTTP client.
    ///
    /// Wiki credentials are read from the environment here but only
    /// required when a wiki or ticket reference is acquired.
    pub fn standard() -> Result<Self, ConfigurationError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| ConfigurationError::Invalid(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self::from_parts(
            Arc::new(WebAcquirer::new(client.clone())),
            Arc::new(AtlassianAcquirer::new(client, AtlassianCredentials::from_env())),
            Arc::new(FileAcquirer),
            Arc::new(ImageAcquirer),
        ))
    }

    pub fn from_parts(
        web: Arc<dyn Acquirer>,
        wiki: Arc<dyn Acquirer>,
        file: Arc<dyn Acquirer>,
        image: Arc<dyn Acquirer>,
    ) -> Self {
        Self {
            web,
            wiki,
            file,
            image,
        }
    }

    /// Route every kind to the same acquirer. Handy with a mock.
    pub fn uniform(acquirer: Arc<dyn Acquirer>) -> Self {
        Self::from_parts(acquirer.clone(), acquirer.clone(), acquirer.clone(), acquirer)
    }

    pub fn with_web(mut self, acquirer: Arc<dyn Acquirer>) -> Self {
        self.web = acquirer;
        self
    }

    pub fn with_wiki(mut self, acquirer: Arc<dyn Acquirer>) -> Self {
        self.wiki = acquirer;
        self
    }

    pub fn with_file(mut self, acquirer: Arc<dyn Acquirer>) -> Self {
        self.file = acquirer;
        self
    }

    pub fn with_image(mut self, acquirer: Arc<dyn Acquirer>) -> Self {
        self.image = acquirer;
        self
    }

    /// Strategy for a kind. `None` for directories.
    pub fn for_kind(&self, kind: LocatorKind) -> Option<&dyn Acquirer> {
        match kind {
            LocatorKind::Web => Some(self.web.as_ref()),
            LocatorKind::WikiOrTicket => Some(self.wiki.as_ref()),
            LocatorKind::PlainFile => Some(self.file.as_ref()),
            LocatorKind::Image => Some(self.image.as_ref()),
            LocatorKind::Directory => None,
        }
    }
}

/// Map a non-success HTTP status to an acquisition error.
pub(crate) fn status_error(status: StatusCode, what: &str) -> AcquisitionError {
    let message = format!("{} returned HTTP {}", what, status);
    match status.as_u16() {
        401 | 403 => AcquisitionError::unauthorized(message),
        404 | 410 => AcquisitionError::not_found(message),
        408 | 429 => AcquisitionError::network(message),
        s if s >= 500 => AcquisitionError::network(message),
        _ => AcquisitionError::not_found(message),
    }
}

/// Map a transport failure.
pub(crate) fn request_error(err: reqwest::Error, what: &str) -> AcquisitionError {
    AcquisitionError::network(format!("request to {} failed", what)).with_cause(err)
}
