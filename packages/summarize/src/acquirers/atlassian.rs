//! Jira ticket and Confluence page acquisition.
//!
//! Supported references:
//! - `https://host[/context]/browse/KEY-1`: ticket summary, description and comments
//! - `https://host[/context]/spaces/SPACE/pages/ID[/title]`: one page
//! - `https://host[/context]/spaces/SPACE[/...]`: every page in the space
//!
//! Anything else is a malformed locator.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::html::html_to_markdown;
use super::web::locator_url;
use super::{request_error, status_error};
use crate::error::AcquisitionError;
use crate::security::AtlassianCredentials;
use crate::traits::acquirer::Acquirer;
use crate::types::{content::AcquiredContent, locator::Locator};

const SPACE_PAGE_LIMIT: u32 = 100;

/// What a wiki/ticket URL resolves to.
///
/// `prefix` is the context path the REST API lives under: the segments
/// before `browse` or `spaces`, e.g. `/wiki` on Cloud or `/jira` on a
/// server install. Empty at the host root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WikiTarget {
    Ticket { prefix: String, key: String },
    Page { prefix: String, id: String },
    Space { prefix: String, key: String },
}

impl WikiTarget {
    pub fn parse(url: &Url) -> Result<Self, AcquisitionError> {
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        let position = |name: &str| segments.iter().position(|seg| *seg == name);
        let prefix = |end: usize| {
            segments[..end]
                .iter()
                .map(|seg| format!("/{}", seg))
                .collect::<String>()
        };
        let next = |i: usize| segments.get(i + 1).map(|seg| seg.to_string());

        if let Some(i) = position("browse") {
            return next(i)
                .map(|key| Self::Ticket {
                    prefix: prefix(i),
                    key,
                })
                .ok_or_else(|| AcquisitionError::malformed(format!("{} has no ticket key", url)));
        }

        if let Some(i) = position("spaces") {
            let prefix = prefix(i);
            if let Some(p) = position("pages") {
                return next(p)
                    .map(|id| Self::Page { prefix, id })
                    .ok_or_else(|| AcquisitionError::malformed(format!("{} has no page id", url)));
            }
            return next(i)
                .map(|key| Self::Space { prefix, key })
                .ok_or_else(|| AcquisitionError::malformed(format!("{} has no space key", url)));
        }

        Err(AcquisitionError::malformed(format!(
            "{} is neither a ticket nor a wiki space/page",
            url
        )))
    }

    /// REST endpoint returning this target's content.
    pub fn endpoint(&self, base: &str) -> String {
        match self {
            Self::Ticket { prefix, key } => format!("{}{}/rest/api/2/issue/{}", base, prefix, key),
            Self::Page { prefix, id } => {
                format!("{}{}/rest/api/content/{}?expand=body.storage", base, prefix, id)
            }
            Self::Space { prefix, key } => format!(
                "{}{}/rest/api/content?spaceKey={}&type=page&start=0&limit={}&expand=body.storage",
                base, prefix, key, SPACE_PAGE_LIMIT
            ),
        }
    }
}

/// Fetches tickets and wiki pages over the Atlassian REST APIs.
pub struct AtlassianAcquirer {
    client: reqwest::Client,
    credentials: Option<AtlassianCredentials>,
}

impl AtlassianAcquirer {
    pub fn new(client: reqwest::Client, credentials: Option<AtlassianCredentials>) -> Self {
        Self {
            client,
            credentials,
        }
    }

    async fn get_json(
        &self,
        credentials: &AtlassianCredentials,
        endpoint: &str,
    ) -> Result<Value, AcquisitionError> {
        debug!(endpoint = %endpoint, "Atlassian request");
        let response = self
            .client
            .get(endpoint)
            .basic_auth(&credentials.username, Some(credentials.api_key.expose()))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| request_error(e, endpoint))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, endpoint));
        }

        response.json::<Value>().await.map_err(|e| {
            AcquisitionError::network(format!("invalid JSON from {}", endpoint)).with_cause(e)
        })
    }

    async fn ticket_text(
        &self,
        credentials: &AtlassianCredentials,
        base: &str,
        target: &WikiTarget,
    ) -> Result<String, AcquisitionError> {
        let endpoint = target.endpoint(base);
        let issue = self.get_json(credentials, &endpoint).await?;
        let fields = &issue["fields"];
        let mut text = format!(
            "{} {}",
            fields["summary"].as_str().unwrap_or_default(),
            fields["description"].as_str().unwrap_or_default()
        );

        let has_comments = fields["comment"]["total"].as_u64().unwrap_or(0) > 0
            || fields["comment"]["comments"]
                .as_array()
                .map(|c| !c.is_empty())
                .unwrap_or(false);
        if has_comments {
            let comments = self
                .get_json(credentials, &format!("{}/comment", endpoint))
                .await?;
            let bodies = join_bodies(&comments["comments"], |c| c["body"].as_str());
            if !bodies.is_empty() {
                text.push(' ');
                text.push_str(&bodies);
            }
        }
        Ok(text)
    }
}

fn storage_value(page: &Value) -> Option<&str> {
    page["body"]["storage"]["value"].as_str()
}

fn join_bodies<'a>(items: &'a Value, body: impl Fn(&'a Value) -> Option<&'a str>) -> String {
    items
        .as_array()
        .map(|items| items.iter().filter_map(body).collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

#[async_trait]
impl Acquirer for AtlassianAcquirer {
    async fn acquire(&self, locator: &Locator) -> Result<AcquiredContent, AcquisitionError> {
        let url = locator_url(locator)?;
        let target = WikiTarget::parse(url)?;
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            AcquisitionError::unauthorized(
                "CONFLUENCE_API_USERNAME and CONFLUENCE_API_KEY must be set for wiki and ticket links",
            )
        })?;
        let base = url.origin().ascii_serialization();
        info!(uri = %locator, wiki_target = ?target, "fetching wiki/ticket content");

        let text = match &target {
            WikiTarget::Ticket { .. } => self.ticket_text(credentials, &base, &target).await?,
            WikiTarget::Page { .. } => {
                let page = self.get_json(credentials, &target.endpoint(&base)).await?;
                let html = storage_value(&page).ok_or_else(|| {
                    AcquisitionError::not_found(format!("{} has no page body", locator))
                })?;
                html_to_markdown(html)
            }
            WikiTarget::Space { .. } => {
                let listing = self.get_json(credentials, &target.endpoint(&base)).await?;
                html_to_markdown(&join_bodies(&listing["results"], storage_value))
            }
        };

        Ok(AcquiredContent::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::error::AcquisitionErrorKind;

    fn parse(raw: &str) -> Result<WikiTarget, AcquisitionError> {
        WikiTarget::parse(&Url::parse(raw).unwrap())
    }

    #[test]
    fn test_parse_ticket() {
        assert_eq!(
            parse("https://acme.atlassian.net/browse/OPS-42").unwrap(),
            WikiTarget::Ticket { prefix: String::new(), key: "OPS-42".into() }
        );
    }

    #[test]
    fn test_parse_page_with_and_without_wiki_prefix() {
        assert_eq!(
            parse("https://acme.atlassian.net/wiki/spaces/ENG/pages/98765/Runbook").unwrap(),
            WikiTarget::Page { prefix: "/wiki".into(), id: "98765".into() }
        );
        assert_eq!(
            parse("https://wiki.example.com/spaces/X/pages/123").unwrap(),
            WikiTarget::Page { prefix: String::new(), id: "123".into() }
        );
    }

    #[test]
    fn test_parse_space() {
        let target = parse("https://acme.atlassian.net/wiki/spaces/ENG/overview").unwrap();
        assert_eq!(target, WikiTarget::Space { prefix: "/wiki".into(), key: "ENG".into() });
        assert_eq!(
            target.endpoint("https://acme.atlassian.net"),
            "https://acme.atlassian.net/wiki/rest/api/content?spaceKey=ENG&type=page&start=0&limit=100&expand=body.storage"
        );
    }

    #[test]
    fn test_context_path_is_kept() {
        let ticket = parse("https://tracker.example.com/jira/browse/OPS-7").unwrap();
        assert_eq!(
            ticket,
            WikiTarget::Ticket { prefix: "/jira".into(), key: "OPS-7".into() }
        );
        assert_eq!(
            ticket.endpoint("https://tracker.example.com"),
            "https://tracker.example.com/jira/rest/api/2/issue/OPS-7"
        );

        let page = parse("https://docs.example.com/tools/confluence/spaces/ENG/pages/5/Intro").unwrap();
        assert_eq!(
            page.endpoint("https://docs.example.com"),
            "https://docs.example.com/tools/confluence/rest/api/content/5?expand=body.storage"
        );
    }

    #[test]
    fn test_parse_rejects_other_paths() {
        let err = parse("https://acme.atlassian.net/jira/dashboards").unwrap_err();
        assert_eq!(err.kind, AcquisitionErrorKind::MalformedLocator);
        assert!(!err.is_transient());

        let err = parse("https://acme.atlassian.net/browse/").unwrap_err();
        assert_eq!(err.kind, AcquisitionErrorKind::MalformedLocator);
    }

    #[test]
    fn test_endpoints() {
        let base = "https://acme.atlassian.net";
        assert_eq!(
            WikiTarget::Ticket { prefix: String::new(), key: "A-1".into() }.endpoint(base),
            "https://acme.atlassian.net/rest/api/2/issue/A-1"
        );
        assert_eq!(
            WikiTarget::Page { prefix: "/wiki".into(), id: "7".into() }.endpoint(base),
            "https://acme.atlassian.net/wiki/rest/api/content/7?expand=body.storage"
        );
    }

    #[tokio::test]
    async fn test_missing_credentials_is_unauthorized() {
        let acquirer = AtlassianAcquirer::new(reqwest::Client::new(), None);
        let err = acquirer
            .acquire(&classify("https://acme.atlassian.net/browse/OPS-1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, AcquisitionErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_malformed_path_checked_before_credentials() {
        let acquirer = AtlassianAcquirer::new(reqwest::Client::new(), None);
        let err = acquirer
            .acquire(&classify("https://acme.atlassian.net/secure/Dashboard.jspa"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, AcquisitionErrorKind::MalformedLocator);
    }

    #[test]
    fn test_join_bodies() {
        let listing = serde_json::json!({
            "results": [
                {"body": {"storage": {"value": "<p>one</p>"}}},
                {"body": {}},
                {"body": {"storage": {"value": "<p>two</p>"}}}
            ]
        });
        assert_eq!(join_bodies(&listing["results"], storage_value), "<p>one</p> <p>two</p>");
    }
}
