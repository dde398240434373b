//! Re-encoding to fit a byte budget.
//!
//! - `budget`: bitrate arithmetic (pure)
//! - `transcoder`: the `Transcoder` seam and its ffmpeg implementation
//! - `fit`: one budgeted encode of a ladder candidate

pub mod budget;
pub mod fit;
pub mod transcoder;

use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

use crate::core::config;
use crate::core::error::AppError;
use crate::core::process::{run_with_timeout, FFPROBE_TIMEOUT};

/// Errors that can occur during transcoding
#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    #[error("Input file not found: {0}")]
    InputNotFound(String),

    #[error("Encoder produced no output file: {0}")]
    OutputMissing(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type ConversionResult<T> = Result<T, TranscodeError>;

impl From<AppError> for TranscodeError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Io(e) => TranscodeError::IoError(e),
            other => TranscodeError::Process(other.to_string()),
        }
    }
}

/// Get media duration in seconds using ffprobe
pub async fn probe_duration<P: AsRef<Path>>(path: P) -> ConversionResult<f64> {
    let mut cmd = Command::new(config::FFPROBE_BIN.as_str());
    cmd.args([
        "-v",
        "error",
        "-show_entries",
        "format=duration",
        "-of",
        "default=noprint_wrappers=1:nokey=1",
    ])
    .arg(path.as_ref());

    let output = run_with_timeout(&mut cmd, FFPROBE_TIMEOUT).await?;
    if !output.status.success() {
        return Err(TranscodeError::FfmpegError(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    parse_duration_output(&String::from_utf8_lossy(&output.stdout))
        .ok_or_else(|| TranscodeError::FfmpegError("Failed to parse duration".to_string()))
}

fn parse_duration_output(stdout: &str) -> Option<f64> {
    stdout
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
}

/// Get file size in bytes
pub async fn get_file_size<P: AsRef<Path>>(path: P) -> std::io::Result<u64> {
    let metadata = tokio::fs::metadata(path).await?;
    Ok(metadata.len())
}
