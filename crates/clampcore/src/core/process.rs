//! Process execution utilities with timeout support
//!
//! Provides helpers for running external processes (yt-dlp, ffmpeg, ffprobe)
//! with configurable timeouts so a hung process cannot stall a request.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::core::error::AppError;

/// Default timeout for ffprobe metadata queries (30 seconds)
pub const FFPROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Run an async Command with a timeout.
///
/// The child is spawned with `kill_on_drop`, so both a timeout and an
/// abandoned future (request cancelled) terminate the process.
pub async fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output, AppError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(AppError::Io(e)),
        Err(_) => Err(AppError::Process(format!(
            "Process timed out after {}s",
            timeout.as_secs()
        ))),
    }
}

/// Check whether a binary answers `<flag>` with a zero exit status.
pub async fn binary_available(bin: &str, version_flag: &str) -> bool {
    let mut cmd = Command::new(bin);
    cmd.arg(version_flag);
    run_with_timeout(&mut cmd, Duration::from_secs(10))
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Last `max_lines` non-empty stderr lines, or the exit status if there are none.
pub fn stderr_tail(output: &Output, max_lines: usize) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    let tail = lines[start..].join("\n");
    if tail.is_empty() {
        format!("exited with {}", output.status)
    } else {
        tail
    }
}
