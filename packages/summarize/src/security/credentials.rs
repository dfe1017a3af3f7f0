//! Credentials that must never reach logs.
//!
//! Uses the `secrecy` crate so keys and tokens print as `[REDACTED]`.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

pub const CONFLUENCE_USERNAME_VAR: &str = "CONFLUENCE_API_USERNAME";
pub const CONFLUENCE_API_KEY_VAR: &str = "CONFLUENCE_API_KEY";

/// A string that is redacted in `Debug` and `Display`.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(value.into().into_boxed_str()))
    }

    /// Only call this where the value goes on the wire.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Basic-auth credentials for Jira and Confluence.
#[derive(Clone)]
pub struct AtlassianCredentials {
    pub username: String,
    pub api_key: SecretString,
}

impl AtlassianCredentials {
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: SecretString::new(api_key),
        }
    }

    /// Read `CONFLUENCE_API_USERNAME` and `CONFLUENCE_API_KEY`.
    ///
    /// Returns `None` when either is unset or blank.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let present = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let username = present(CONFLUENCE_USERNAME_VAR)?;
        let api_key = present(CONFLUENCE_API_KEY_VAR)?;
        Some(Self::new(username, api_key))
    }
}

impl fmt::Debug for AtlassianCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtlassianCredentials")
            .field("username", &self.username)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_not_in_debug_or_display() {
        let secret = SecretString::new("sk-super-secret-key");
        assert_eq!(format!("{:?}", secret), "[REDACTED]");
        assert_eq!(format!("{}", secret), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-super-secret-key");
    }

    #[test]
    fn test_atlassian_credentials_debug() {
        let creds = AtlassianCredentials::new("ops@example.com", "atl-token");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("ops@example.com"));
        assert!(!debug.contains("atl-token"));
    }

    #[test]
    fn test_lookup_requires_both_values() {
        let creds = AtlassianCredentials::from_lookup(|name| match name {
            CONFLUENCE_USERNAME_VAR => Some("me".into()),
            CONFLUENCE_API_KEY_VAR => Some("key".into()),
            _ => None,
        });
        assert_eq!(creds.map(|c| c.username), Some("me".to_string()));

        let missing = AtlassianCredentials::from_lookup(|name| match name {
            CONFLUENCE_USERNAME_VAR => Some("me".into()),
            _ => Some("  ".into()),
        });
        assert!(missing.is_none());
    }
}
