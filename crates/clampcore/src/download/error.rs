use thiserror::Error;

use crate::download::cookies::CredentialResolver;
use crate::download::site::SiteKind;

/// Longest diagnostic shown to the user, in characters.
pub const MAX_DIAGNOSTIC_CHARS: usize = 300;

/// Structured failure of one pipeline run.
///
/// An oversize final artifact is *not* an error; see
/// [`crate::download::pipeline::PipelineOutcome::TooLarge`].
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Extractor failed (network, unsupported URL, site-side block)
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Extractor hit a login/authentication wall
    #[error("authentication required for {site}: {message}")]
    AuthRequired { site: SiteKind, message: String },

    /// External encoder failed (spawn, non-zero exit, timeout, no output)
    #[error("transcode failed: {0}")]
    Transcode(String),

    /// Scratch directory could not be created
    #[error("workspace error: {0}")]
    Workspace(#[from] std::io::Error),

    /// The caller abandoned the request
    #[error("request cancelled")]
    Cancelled,

    /// The request's task died (panic) before producing a result
    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            PipelineError::Extraction(_) => "extraction",
            PipelineError::AuthRequired { .. } => "auth_required",
            PipelineError::Transcode(_) => "transcode",
            PipelineError::Workspace(_) => "workspace",
            PipelineError::Cancelled => "cancelled",
            PipelineError::Internal(_) => "internal",
        }
    }

    /// Text for the person who sent the URL.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Extraction(msg) => {
                format!("❌ Download failed:\n{}", truncate_diagnostic(msg, MAX_DIAGNOSTIC_CHARS))
            }
            PipelineError::AuthRequired { site, .. } => match CredentialResolver::file_name(*site) {
                Some(file) => format!(
                    "🔒 This {} link needs a logged-in session.\n\nExport your browser cookies to {} and try again.",
                    site, file
                ),
                None => "🔒 This link needs a logged-in session, which isn't supported for this site.".to_string(),
            },
            PipelineError::Transcode(msg) => format!(
                "❌ Couldn't shrink the video to fit:\n{}",
                truncate_diagnostic(msg, MAX_DIAGNOSTIC_CHARS)
            ),
            PipelineError::Workspace(_) => "❌ Server error while preparing the download. Try again later.".to_string(),
            PipelineError::Cancelled => "⏹ Download cancelled.".to_string(),
            PipelineError::Internal(_) => "❌ Something went wrong on our side. Try again later.".to_string(),
        }
    }
}

/// Cut `msg` to at most `max_chars` characters, marking the cut with "…".
pub fn truncate_diagnostic(msg: &str, max_chars: usize) -> String {
    let trimmed = msg.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// True when an extractor message points at a login/auth wall.
///
/// Best-effort text heuristic; a structured signal from the extractor wins.
pub fn looks_like_auth_wall(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("login") || lower.contains("authentication")
}
