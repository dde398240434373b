//! Transcoder seam and its ffmpeg implementation.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

use super::{ConversionResult, TranscodeError};
use crate::core::config;
use crate::core::process::{run_with_timeout, stderr_tail};

/// Everything one encode needs. Bitrates are bits per second.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub video_bps: u64,
    /// Rate-control ceiling (`-maxrate`)
    pub max_rate_bps: u64,
    /// Rate-control buffer (`-bufsize`)
    pub buffer_bps: u64,
    /// Cap for the longer output side, aspect ratio preserved
    pub max_height: u32,
    pub audio_bps: u64,
    pub audio_channels: u8,
}

#[async_trait]
pub trait Transcoder: Send + Sync {
    fn name(&self) -> &str;

    /// Encode `job.input` into `job.output`.
    async fn transcode(&self, job: &TranscodeJob) -> ConversionResult<()>;
}

/// Scale filter capping the longer side at `max` without upscaling.
pub fn scale_filter(max: u32) -> String {
    format!(
        "scale='min({max},iw)':'min({max},ih)':force_original_aspect_ratio=decrease:force_divisible_by=2"
    )
}

fn kbps(bps: u64) -> String {
    format!("{}k", (bps / 1000).max(1))
}

pub struct FfmpegTranscoder {
    bin: String,
    timeout: Duration,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegTranscoder {
    /// Transcoder using FFMPEG_BIN and FFMPEG_TIMEOUT_SECS.
    pub fn new() -> Self {
        Self {
            bin: config::FFMPEG_BIN.clone(),
            timeout: config::timeouts::ffmpeg_timeout(),
        }
    }

    pub fn with_bin(mut self, bin: impl Into<String>) -> Self {
        self.bin = bin.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build_args(job: &TranscodeJob) -> Vec<String> {
        vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-i".into(),
            job.input.to_string_lossy().into_owned(),
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            "veryfast".into(),
            "-b:v".into(),
            kbps(job.video_bps),
            "-maxrate".into(),
            kbps(job.max_rate_bps),
            "-bufsize".into(),
            kbps(job.buffer_bps),
            "-vf".into(),
            scale_filter(job.max_height),
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            kbps(job.audio_bps),
            "-ac".into(),
            job.audio_channels.to_string(),
            "-movflags".into(),
            "+faststart".into(),
            job.output.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn transcode(&self, job: &TranscodeJob) -> ConversionResult<()> {
        if !job.input.exists() {
            return Err(TranscodeError::InputNotFound(job.input.display().to_string()));
        }

        let args = Self::build_args(job);
        log::debug!("{} {}", self.bin, args.join(" "));

        let mut cmd = Command::new(&self.bin);
        cmd.args(&args);
        let output = run_with_timeout(&mut cmd, self.timeout).await?;

        if !output.status.success() {
            let tail = stderr_tail(&output, 5);
            log::error!("FFmpeg fit encode error: {}", tail);
            return Err(TranscodeError::FfmpegError(tail));
        }

        if !job.output.is_file() {
            return Err(TranscodeError::OutputMissing(job.output.display().to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn job() -> TranscodeJob {
        TranscodeJob {
            input: PathBuf::from("/tmp/in.mp4"),
            output: PathBuf::from("/tmp/fit.mp4"),
            video_bps: 3_119_633,
            max_rate_bps: 3_743_559,
            buffer_bps: 6_239_266,
            max_height: 720,
            audio_bps: 96_000,
            audio_channels: 2,
        }
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> &'a str {
        let i = args.iter().position(|a| a == flag).unwrap();
        &args[i + 1]
    }

    #[test]
    fn test_build_args_rate_control() {
        let args = FfmpegTranscoder::build_args(&job());
        assert_eq!(value_after(&args, "-b:v"), "3119k");
        assert_eq!(value_after(&args, "-maxrate"), "3743k");
        assert_eq!(value_after(&args, "-bufsize"), "6239k");
        assert_eq!(value_after(&args, "-b:a"), "96k");
        assert_eq!(value_after(&args, "-ac"), "2");
        assert_eq!(args.last().unwrap(), "/tmp/fit.mp4");
    }

    #[test]
    fn test_scale_filter_caps_longer_side() {
        let f = scale_filter(720);
        assert!(f.contains("min(720,iw)"));
        assert!(f.contains("min(720,ih)"));
        assert!(f.contains("force_original_aspect_ratio=decrease"));
    }

    #[tokio::test]
    async fn test_missing_input_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut j = job();
        j.input = dir.path().join("missing.mp4");
        j.output = dir.path().join("fit.mp4");
        let err = FfmpegTranscoder::new().transcode(&j).await.unwrap_err();
        assert!(matches!(err, TranscodeError::InputNotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut j = job();
        j.input = dir.path().join("in.mp4");
        j.output = dir.path().join("fit.mp4");
        std::fs::write(&j.input, b"not really a video").unwrap();
        let result = FfmpegTranscoder::new()
            .with_bin("definitely-not-a-real-ffmpeg-4f1c")
            .transcode(&j)
            .await;
        assert!(matches!(result, Err(TranscodeError::IoError(_))));
    }
}
