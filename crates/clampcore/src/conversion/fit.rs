use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::budget::BitrateBudget;
use super::get_file_size;
use super::transcoder::{TranscodeJob, Transcoder};
use crate::core::config::PipelineConfig;
use crate::download::error::PipelineError;
use crate::download::ladder::FetchedCandidate;
use crate::download::scratch::{remove_file_quietly, ScratchDir};

/// Re-encoded file that replaced a ladder candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeResult {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Single budgeted re-encode of an oversize candidate.
///
/// The bitrate is aimed at the target budget, not the ceiling; whether the
/// result actually fits is left to the size gate.
pub struct FitTranscoder {
    transcoder: Arc<dyn Transcoder>,
    budget: BitrateBudget,
    target_bytes: u64,
    audio_channels: u8,
}

impl FitTranscoder {
    pub fn new(transcoder: Arc<dyn Transcoder>, config: &PipelineConfig) -> Self {
        Self {
            transcoder,
            budget: BitrateBudget::new(config.audio_bitrate_bps(), config.video_floor_bps()),
            target_bytes: config.target_budget_bytes(),
            audio_channels: config.audio_channels(),
        }
    }

    /// Aim at `target_bytes` instead of the configured budget.
    pub fn with_target_bytes(mut self, target_bytes: u64) -> Self {
        self.target_bytes = target_bytes;
        self
    }

    pub fn target_bytes(&self) -> u64 {
        self.target_bytes
    }

    /// Encoder settings for `input` → `output`. Pure.
    pub fn plan(&self, input: &Path, output: &Path, duration_secs: f64, max_height: u32) -> TranscodeJob {
        let video_bps = self.budget.video_bitrate(self.target_bytes, duration_secs);
        TranscodeJob {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            video_bps,
            max_rate_bps: video_bps.saturating_mul(6) / 5,
            buffer_bps: video_bps.saturating_mul(2),
            max_height,
            audio_bps: self.budget.audio_bps,
            audio_channels: self.audio_channels,
        }
    }

    /// Encode `candidate` into the scratch directory.
    ///
    /// On success the candidate's file is removed. On failure any partial
    /// output is removed and the candidate is left for the scratch cleanup.
    pub async fn transcode_to_fit(
        &self,
        candidate: &FetchedCandidate,
        duration_secs: f64,
        max_height: u32,
        scratch: &ScratchDir,
    ) -> Result<TranscodeResult, PipelineError> {
        let mut output = scratch.join("fit.mp4");
        if output == candidate.path {
            output = scratch.join("fit-1.mp4");
        }

        let job = self.plan(&candidate.path, &output, duration_secs, max_height);
        log::info!(
            "Transcoding {} ({} bytes, {:.1}s) with {}: video {} b/s, max {}px",
            candidate.path.display(),
            candidate.size_bytes,
            duration_secs,
            self.transcoder.name(),
            job.video_bps,
            max_height
        );

        if let Err(e) = self.transcoder.transcode(&job).await {
            remove_file_quietly(&output).await;
            return Err(PipelineError::Transcode(e.to_string()));
        }

        let size_bytes = match get_file_size(&output).await {
            Ok(size) => size,
            Err(e) => {
                remove_file_quietly(&output).await;
                return Err(PipelineError::Transcode(format!(
                    "encoder reported success but {} is unreadable: {}",
                    output.display(),
                    e
                )));
            }
        };

        remove_file_quietly(&candidate.path).await;
        log::info!("Transcoded to {} bytes", size_bytes);

        Ok(TranscodeResult {
            path: output,
            size_bytes,
        })
    }
}
