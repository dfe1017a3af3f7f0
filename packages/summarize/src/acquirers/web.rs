//! Web page acquisition.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};
use url::Url;

use super::html::{extract_title, html_to_markdown, is_html};
use super::{request_error, status_error};
use crate::error::AcquisitionError;
use crate::traits::acquirer::Acquirer;
use crate::types::{
    content::AcquiredContent,
    locator::{Locator, LocatorMetadata},
};

/// Fetches a URL with GET. HTML bodies are flattened to text.
pub struct WebAcquirer {
    client: reqwest::Client,
}

impl WebAcquirer {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: &Url) -> Result<String, AcquisitionError> {
        debug!(url = %url, "HTTP fetch starting");
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            request_error(e, url.as_str())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, url.as_str()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response
            .text()
            .await
            .map_err(|e| request_error(e, url.as_str()))?;
        debug!(url = %url, bytes = body.len(), content_type = ?content_type, "HTTP fetch done");

        Ok(page_text(&body, content_type.as_deref()))
    }
}

/// Text handed to the backend for a fetched body.
fn page_text(body: &str, content_type: Option<&str>) -> String {
    if !is_html(content_type) {
        return body.to_string();
    }
    let text = html_to_markdown(body);
    match extract_title(body) {
        Some(title) => format!("Title: {}\n\n{}", title, text),
        None => text,
    }
}

/// Resolve the URL a web-like locator points at.
pub(crate) fn locator_url(locator: &Locator) -> Result<&Url, AcquisitionError> {
    match locator.metadata() {
        LocatorMetadata::Url(url) => Ok(url),
        LocatorMetadata::UnparsedUrl { reason } => Err(AcquisitionError::malformed(format!(
            "{} is not a valid URL: {}",
            locator, reason
        ))),
        LocatorMetadata::Path(_) => Err(AcquisitionError::malformed(format!(
            "{} is not a URL",
            locator
        ))),
    }
}

#[async_trait]
impl Acquirer for WebAcquirer {
    async fn acquire(&self, locator: &Locator) -> Result<AcquiredContent, AcquisitionError> {
        let url = locator_url(locator)?;
        let text = self.fetch(url).await?;
        Ok(AcquiredContent::Text(text))
    }
}
