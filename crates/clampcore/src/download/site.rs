//! Coarse classification of the hosting platform behind a URL.

use serde::Serialize;
use std::fmt;

/// Hosting platform family; drives format selection and cookie lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SiteKind {
    YouTubeLike,
    InstagramLike,
    TwitterLike,
    Other,
}

const YOUTUBE_FRAGMENTS: &[&str] = &["youtube.com", "youtu.be", "youtube-nocookie.com"];
const INSTAGRAM_FRAGMENTS: &[&str] = &["instagram.com", "instagr.am"];
// "x.com" is anchored so that hosts like netflix.com don't match.
const TWITTER_FRAGMENTS: &[&str] = &["twitter.com", "://x.com", ".x.com"];

/// Classify a URL by case-insensitive substring match. Never fails.
pub fn classify(url: &str) -> SiteKind {
    let lower = url.to_lowercase();
    let matches = |fragments: &[&str]| fragments.iter().any(|f| lower.contains(f));

    if matches(YOUTUBE_FRAGMENTS) {
        SiteKind::YouTubeLike
    } else if matches(INSTAGRAM_FRAGMENTS) {
        SiteKind::InstagramLike
    } else if matches(TWITTER_FRAGMENTS) {
        SiteKind::TwitterLike
    } else {
        SiteKind::Other
    }
}

impl SiteKind {
    /// Whether the site serves separate video-only and audio-only streams
    /// that the extractor can merge.
    pub fn supports_split_streams(self) -> bool {
        matches!(self, SiteKind::YouTubeLike)
    }

    /// Stable label for logs.
    pub fn label(self) -> &'static str {
        match self {
            SiteKind::YouTubeLike => "youtube",
            SiteKind::InstagramLike => "instagram",
            SiteKind::TwitterLike => "twitter",
            SiteKind::Other => "other",
        }
    }
}

impl fmt::Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
