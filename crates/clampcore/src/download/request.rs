use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use url::Url;

use crate::core::error::{AppError, AppResult};

/// Cached regex for matching URLs inside free-form message text
#[allow(clippy::expect_used)]
static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("Failed to compile URL regex"));

/// One inbound media request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRequest {
    url: Url,
}

impl MediaRequest {
    /// Parse and validate an absolute http(s) URL.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let url = Url::parse(raw.trim())?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(AppError::Validation(format!("unsupported URL scheme: {}", other))),
        }
        if url.host_str().is_none() {
            return Err(AppError::Validation(format!("URL has no host: {}", raw)));
        }
        Ok(Self { url })
    }

    /// Take the first http(s) URL found in a chat message.
    pub fn from_text(text: &str) -> AppResult<Self> {
        let found = URL_REGEX
            .find(text)
            .ok_or_else(|| AppError::Validation("no URL found in message".to_string()))?;
        Self::parse(found.as_str())
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for MediaRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
