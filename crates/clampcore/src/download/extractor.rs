//! Media extractor abstraction.
//!
//! The pipeline only needs "fetch this URL with this format constraint into
//! this directory". The production backend is [`crate::download::ytdlp`];
//! tests plug in scripted fakes.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::download::format::FormatExpression;

/// What the extractor produced for one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    /// Local file inside the requested output directory
    pub path: PathBuf,
    /// Clip duration, if the extractor knows it
    pub duration_secs: Option<f64>,
    /// Height of the selected stream, if known
    pub height: Option<u32>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractorError {
    /// The extractor itself recognised a login/auth wall
    #[error("{0}")]
    AuthRequired(String),

    /// Any other failure; the message is the extractor's diagnostic
    #[error("{0}")]
    Failed(String),
}

impl ExtractorError {
    pub fn message(&self) -> &str {
        match self {
            ExtractorError::AuthRequired(msg) | ExtractorError::Failed(msg) => msg,
        }
    }
}

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Human-readable name of this backend (e.g., "yt-dlp")
    fn name(&self) -> &str;

    /// Download `url` using `format` into `output_dir`.
    async fn extract(
        &self,
        url: &str,
        format: &FormatExpression,
        cookies: Option<&Path>,
        output_dir: &Path,
    ) -> Result<Extracted, ExtractorError>;
}
