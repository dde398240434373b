//! Per-site cookie files for yt-dlp
//!
//! Cookie files are opaque Netscape-format files that yt-dlp reads via
//! `--cookies`. They are optional: a missing file just means extraction is
//! attempted anonymously.

use std::path::{Path, PathBuf};

use crate::core::config;
use crate::download::site::SiteKind;

/// Resolves the cookie file for a site kind, if one exists on disk.
///
/// Lookup happens on every call, so files dropped in while the process is
/// running are picked up by the next request.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    dir: PathBuf,
    youtube_override: Option<PathBuf>,
}

impl CredentialResolver {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            youtube_override: None,
        }
    }

    /// Resolver configured from COOKIES_DIR and YTDL_COOKIES_FILE.
    pub fn from_env() -> Self {
        let dir = shellexpand::tilde(config::COOKIES_DIR.as_str()).into_owned();
        let mut resolver = Self::new(dir);
        if let Some(ref file) = *config::YTDL_COOKIES_FILE {
            resolver = resolver.with_youtube_file(shellexpand::tilde(file).as_ref());
        }
        resolver
    }

    /// Use an explicit file for YouTube instead of `<dir>/youtube_cookies.txt`.
    pub fn with_youtube_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.youtube_override = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fixed file name for a site kind. `Other` has none.
    pub fn file_name(kind: SiteKind) -> Option<&'static str> {
        match kind {
            SiteKind::YouTubeLike => Some("youtube_cookies.txt"),
            SiteKind::InstagramLike => Some("instagram_cookies.txt"),
            SiteKind::TwitterLike => Some("twitter_cookies.txt"),
            SiteKind::Other => None,
        }
    }

    /// Where the file for `kind` would be, whether or not it exists.
    pub fn expected_path(&self, kind: SiteKind) -> Option<PathBuf> {
        if kind == SiteKind::YouTubeLike {
            if let Some(ref path) = self.youtube_override {
                return Some(path.clone());
            }
        }
        Self::file_name(kind).map(|name| self.dir.join(name))
    }

    /// The cookie file for `kind`, only if it is present right now.
    pub fn resolve(&self, kind: SiteKind) -> Option<PathBuf> {
        let path = self.expected_path(kind)?;
        if path.is_file() {
            log::debug!("Using cookies for {}: {}", kind, path.display());
            Some(path)
        } else {
            None
        }
    }
}
