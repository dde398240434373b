//! Descending quality ladder.
//!
//! Rungs are tried strictly in order. The first candidate at or under the
//! ceiling wins. Oversize candidates are deleted before the next rung runs,
//! except on the final rung, whose candidate is handed back (marked
//! exhausted) for re-encoding. An extractor failure on any rung ends the
//! request: it signals an auth wall, a bad URL or a network problem, not a
//! missing quality.

use std::path::PathBuf;
use std::sync::Arc;

use crate::conversion::budget::effective_duration;
use crate::conversion::get_file_size;
use crate::download::cookies::CredentialResolver;
use crate::download::error::{looks_like_auth_wall, PipelineError};
use crate::download::extractor::{Extractor, ExtractorError};
use crate::download::format::{select_format, QualityRung};
use crate::download::request::MediaRequest;
use crate::download::scratch::{remove_file_quietly, ScratchDir};
use crate::download::site::SiteKind;

/// A downloaded, not yet accepted file for one rung.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedCandidate {
    pub path: PathBuf,
    /// Size on disk, measured after the download
    pub size_bytes: u64,
    /// Clip duration, floored to one second. Falls back to the duration an
    /// earlier rung reported when this rung reported none.
    pub duration_secs: f64,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LadderResult {
    pub candidate: FetchedCandidate,
    /// Rung that produced `candidate`
    pub rung: QualityRung,
    /// True when no rung fit and `candidate` is the final rung's oversize file
    pub exhausted: bool,
    /// Number of extractor invocations made
    pub attempts: usize,
}

pub struct DownloadLadder {
    extractor: Arc<dyn Extractor>,
    credentials: CredentialResolver,
    rungs: Vec<QualityRung>,
    ceiling_bytes: u64,
}

impl DownloadLadder {
    /// An empty rung list degrades to a single unconstrained rung.
    pub fn new(
        extractor: Arc<dyn Extractor>,
        credentials: CredentialResolver,
        rungs: &[QualityRung],
        ceiling_bytes: u64,
    ) -> Self {
        let rungs = if rungs.is_empty() {
            vec![QualityRung::Unconstrained]
        } else {
            rungs.to_vec()
        };
        Self {
            extractor,
            credentials,
            rungs,
            ceiling_bytes,
        }
    }

    pub fn rungs(&self) -> &[QualityRung] {
        &self.rungs
    }

    pub async fn fetch(
        &self,
        request: &MediaRequest,
        site: SiteKind,
        scratch: &ScratchDir,
    ) -> Result<LadderResult, PipelineError> {
        let cookies = self.credentials.resolve(site);
        let last_index = self.rungs.len() - 1;
        let mut attempts = 0;
        // Last duration any rung reported; later rungs may not report one.
        let mut known_duration: Option<f64> = None;

        for (index, &rung) in self.rungs.iter().enumerate() {
            let format = select_format(site, rung);
            log::info!(
                "Ladder [{}/{}] {} via {} for {}",
                index + 1,
                self.rungs.len(),
                rung,
                self.extractor.name(),
                request
            );

            attempts += 1;
            let extracted = self
                .extractor
                .extract(request.as_str(), &format, cookies.as_deref(), scratch.path())
                .await
                .map_err(|e| classify_extractor_error(e, site))?;

            let size_bytes = get_file_size(&extracted.path).await.map_err(|e| {
                PipelineError::Extraction(format!(
                    "downloaded file {} is unreadable: {}",
                    extracted.path.display(),
                    e
                ))
            })?;

            known_duration = extracted.duration_secs.or(known_duration);
            let candidate = FetchedCandidate {
                path: extracted.path,
                size_bytes,
                duration_secs: effective_duration(known_duration.unwrap_or(0.0)),
                height: extracted.height,
            };

            if size_bytes <= self.ceiling_bytes {
                log::info!(
                    "Ladder accepted {} at {} ({} <= {} bytes)",
                    request,
                    rung,
                    size_bytes,
                    self.ceiling_bytes
                );
                return Ok(LadderResult {
                    candidate,
                    rung,
                    exhausted: false,
                    attempts,
                });
            }

            if index == last_index {
                log::info!(
                    "Ladder exhausted for {}: last candidate {} bytes > {}",
                    request,
                    size_bytes,
                    self.ceiling_bytes
                );
                return Ok(LadderResult {
                    candidate,
                    rung,
                    exhausted: true,
                    attempts,
                });
            }

            log::info!(
                "Ladder rejected {} ({} > {} bytes), trying next rung",
                rung,
                size_bytes,
                self.ceiling_bytes
            );
            remove_file_quietly(&candidate.path).await;
        }

        // Rungs are never empty (see `new`), so the loop always returns.
        Err(PipelineError::Extraction("quality ladder has no rungs".to_string()))
    }
}

/// Structured auth signal first, then the login/authentication text hint.
pub fn classify_extractor_error(err: ExtractorError, site: SiteKind) -> PipelineError {
    match err {
        ExtractorError::AuthRequired(message) => PipelineError::AuthRequired { site, message },
        ExtractorError::Failed(message) if looks_like_auth_wall(&message) => {
            PipelineError::AuthRequired { site, message }
        }
        ExtractorError::Failed(message) => PipelineError::Extraction(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_structured_auth() {
        let err = classify_extractor_error(ExtractorError::AuthRequired("nope".into()), SiteKind::YouTubeLike);
        assert!(matches!(
            err,
            PipelineError::AuthRequired {
                site: SiteKind::YouTubeLike,
                ..
            }
        ));
    }

    #[test]
    fn test_classify_text_hint() {
        let err = classify_extractor_error(
            ExtractorError::Failed("ERROR: login required".into()),
            SiteKind::InstagramLike,
        );
        assert!(matches!(err, PipelineError::AuthRequired { .. }));

        let err = classify_extractor_error(ExtractorError::Failed("HTTP Error 500".into()), SiteKind::Other);
        assert!(matches!(err, PipelineError::Extraction(ref m) if m == "HTTP Error 500"));
    }
}
