//! Per-request orchestration.
//!
//! scratch dir → classify → ladder → (accepted | transcode once) → size gate
//!
//! The scratch directory is owned by the run. It is dropped on every error
//! path, dropped after a `TooLarge` verdict, and handed to the caller inside
//! [`Delivery`] on success, so the delivered file lives exactly as long as
//! the `Delivery` value.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::conversion::fit::FitTranscoder;
use crate::conversion::transcoder::{FfmpegTranscoder, Transcoder};
use crate::core::config::{PipelineConfig, MIB};
use crate::download::cookies::CredentialResolver;
use crate::download::error::PipelineError;
use crate::download::extractor::Extractor;
use crate::download::format::QualityRung;
use crate::download::gate::{GateOutcome, SizeGate};
use crate::download::ladder::DownloadLadder;
use crate::download::request::MediaRequest;
use crate::download::scratch::{remove_file_quietly, ScratchDir};
use crate::download::site::{classify, SiteKind};
use crate::download::ytdlp::YtDlpExtractor;

/// A file that passed the size gate, plus the directory keeping it alive.
#[derive(Debug)]
pub struct Delivery {
    path: PathBuf,
    size_bytes: u64,
    transcoded: bool,
    rung: QualityRung,
    site: SiteKind,
    scratch: ScratchDir,
}

/// Serializable description of a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliverySummary {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub transcoded: bool,
    pub rung: String,
    pub site: SiteKind,
}

impl Delivery {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Whether the file went through the fit transcoder.
    pub fn transcoded(&self) -> bool {
        self.transcoded
    }

    pub fn rung(&self) -> QualityRung {
        self.rung
    }

    pub fn site(&self) -> SiteKind {
        self.site
    }

    /// Directory the delivered file lives in.
    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }

    pub fn summary(&self) -> DeliverySummary {
        DeliverySummary {
            path: self.path.clone(),
            size_bytes: self.size_bytes,
            transcoded: self.transcoded,
            rung: self.rung.to_string(),
            site: self.site,
        }
    }

    /// Copy the file into `dest_dir`, then release the scratch directory.
    pub async fn persist_to(self, dest_dir: &Path) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(dest_dir).await?;
        let name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "media.mp4".into());
        let dest = dest_dir.join(name);
        tokio::fs::copy(&self.path, &dest).await?;
        self.scratch.close();
        Ok(dest)
    }
}

/// Every non-error way a run can end.
#[derive(Debug)]
pub enum PipelineOutcome {
    Delivered(Delivery),
    /// Still over the ceiling after the one permitted transcode
    TooLarge { size_bytes: u64, ceiling_bytes: u64 },
}

impl PipelineOutcome {
    pub fn user_message(&self) -> String {
        match self {
            PipelineOutcome::Delivered(d) => {
                format!("✅ Ready: {:.1} MB", d.size_bytes as f64 / MIB as f64)
            }
            PipelineOutcome::TooLarge {
                size_bytes,
                ceiling_bytes,
            } => format!(
                "⚠️ The file is still too large to send ({:.1} MB, limit {:.1} MB).\n\nTry a shorter clip or lower quality.",
                *size_bytes as f64 / MIB as f64,
                *ceiling_bytes as f64 / MIB as f64
            ),
        }
    }
}

pub struct Pipeline {
    config: Arc<PipelineConfig>,
    ladder: DownloadLadder,
    fit: FitTranscoder,
    gate: SizeGate,
}

impl Pipeline {
    pub fn new(
        config: Arc<PipelineConfig>,
        extractor: Arc<dyn Extractor>,
        transcoder: Arc<dyn Transcoder>,
        credentials: CredentialResolver,
    ) -> Self {
        let ladder = DownloadLadder::new(extractor, credentials, config.ladder(), config.size_ceiling_bytes());
        let fit = FitTranscoder::new(transcoder, &config);
        let gate = SizeGate::new(config.size_ceiling_bytes());
        Self {
            config,
            ladder,
            fit,
            gate,
        }
    }

    /// Pipeline wired to yt-dlp, ffmpeg and the env-configured cookies dir.
    pub fn with_defaults(config: Arc<PipelineConfig>) -> Self {
        Self::new(
            config,
            Arc::new(YtDlpExtractor::new()),
            Arc::new(FfmpegTranscoder::new()),
            CredentialResolver::from_env(),
        )
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(&self, request: &MediaRequest) -> Result<PipelineOutcome, PipelineError> {
        let scratch = ScratchDir::create(self.config.scratch_root()).await?;
        let site = classify(request.as_str());
        log::info!("Pipeline: {} classified as {}", request, site);

        let found = match self.ladder.fetch(request, site, &scratch).await {
            Ok(found) => found,
            Err(e) => {
                log::error!("Pipeline: {} failed [{}]: {}", request, e.subcategory(), e);
                return Err(e);
            }
        };

        let (path, size_bytes, transcoded) = if found.exhausted {
            let result = self
                .fit
                .transcode_to_fit(
                    &found.candidate,
                    found.candidate.duration_secs,
                    self.config.transcode_max_height(),
                    &scratch,
                )
                .await
                .inspect_err(|e| log::error!("Pipeline: {} failed [{}]: {}", request, e.subcategory(), e))?;
            (result.path, result.size_bytes, true)
        } else {
            (found.candidate.path, found.candidate.size_bytes, false)
        };

        match self.gate.gate(&path, size_bytes) {
            GateOutcome::Deliverable(path) => {
                log::info!(
                    "Pipeline: delivering {} ({} bytes, rung {}, transcoded: {})",
                    path.display(),
                    size_bytes,
                    found.rung,
                    transcoded
                );
                Ok(PipelineOutcome::Delivered(Delivery {
                    path,
                    size_bytes,
                    transcoded,
                    rung: found.rung,
                    site,
                    scratch,
                }))
            }
            GateOutcome::TooLarge {
                size_bytes,
                ceiling_bytes,
            } => {
                log::warn!(
                    "Pipeline: {} still too large after transcode ({} > {} bytes)",
                    request,
                    size_bytes,
                    ceiling_bytes
                );
                remove_file_quietly(&path).await;
                scratch.close();
                Ok(PipelineOutcome::TooLarge {
                    size_bytes,
                    ceiling_bytes,
                })
            }
        }
    }

    /// Like [`run`](Self::run), but abandons the request when `token` fires.
    ///
    /// Dropping the in-flight future kills the running subprocess
    /// (`kill_on_drop`) and drops the scratch directory with its contents.
    pub async fn run_until_cancelled(
        &self,
        request: &MediaRequest,
        token: &CancellationToken,
    ) -> Result<PipelineOutcome, PipelineError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                log::warn!("Pipeline: {} cancelled", request);
                Err(PipelineError::Cancelled)
            }
            result = self.run(request) => result,
        }
    }

    /// Run independent requests concurrently, one task each. Results come
    /// back in input order.
    pub async fn run_many(
        self: &Arc<Self>,
        requests: Vec<MediaRequest>,
    ) -> Vec<Result<PipelineOutcome, PipelineError>> {
        let count = requests.len();
        let mut tasks = JoinSet::new();
        for (index, request) in requests.into_iter().enumerate() {
            let pipeline = Arc::clone(self);
            tasks.spawn(async move { (index, pipeline.run(&request).await) });
        }

        let mut slots: Vec<Option<Result<PipelineOutcome, PipelineError>>> = (0..count).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => log::error!("Pipeline task died: {}", e),
            }
        }

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err(PipelineError::Internal("request task panicked".to_string()))))
            .collect()
    }
}
