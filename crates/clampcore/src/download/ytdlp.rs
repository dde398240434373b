//! yt-dlp backed [`Extractor`](crate::download::extractor::Extractor).
//!
//! One call = one yt-dlp run with a single format expression. yt-dlp prints
//! the final file path, duration and height after post-processing; when the
//! print is missing or stale the output directory is searched instead.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use crate::conversion::probe_duration;
use crate::core::config;
use crate::core::error::AppError;
use crate::core::process::run_with_timeout;
use crate::download::extractor::{Extracted, Extractor, ExtractorError};
use crate::download::format::FormatExpression;
use crate::download::ytdlp_errors::{analyze_ytdlp_error, primary_error_line, YtDlpErrorType};

/// Printed after the file has been moved to its final name.
const PRINT_TEMPLATE: &str = "after_move:%(filepath)s|%(duration)s|%(height)s";

/// Output name template inside the request's scratch directory.
const OUTPUT_TEMPLATE: &str = "%(title).80s.%(ext)s";

/// Fields yt-dlp reported through `--print`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintedInfo {
    pub filepath: PathBuf,
    pub duration_secs: Option<f64>,
    pub height: Option<u32>,
}

pub struct YtDlpExtractor {
    bin: String,
    timeout: Duration,
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlpExtractor {
    /// Extractor using YTDL_BIN and YTDLP_TIMEOUT_SECS.
    pub fn new() -> Self {
        Self {
            bin: config::YTDL_BIN.clone(),
            timeout: config::timeouts::ytdlp_timeout(),
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

    /// Full yt-dlp argument list for one attempt.
    pub fn build_args(url: &str, format: &FormatExpression, cookies: Option<&Path>, output_dir: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--no-playlist".into(),
            "--no-progress".into(),
            "--quiet".into(),
            "--no-warnings".into(),
            "--no-check-certificate".into(),
            // Skips the consent interstitial on some regions
            "--add-header".into(),
            "Cookie:CONSENT=YES+1".into(),
            "-f".into(),
            format.as_arg(),
            "--merge-output-format".into(),
            "mp4".into(),
            "-o".into(),
            output_dir.join(OUTPUT_TEMPLATE).to_string_lossy().into_owned(),
            "--no-simulate".into(),
            "--print".into(),
            PRINT_TEMPLATE.into(),
        ];
        if let Some(path) = cookies {
            args.push("--cookies".into());
            args.push(path.to_string_lossy().into_owned());
        }
        args.push(url.to_string());
        args
    }
}

/// Parse the last `path|duration|height` line from yt-dlp stdout.
///
/// The path is split from the right so titles containing `|` survive.
pub fn parse_print_line(stdout: &str) -> Option<PrintedInfo> {
    let line = stdout.lines().map(str::trim).rev().find(|l| !l.is_empty())?;
    let mut parts = line.rsplitn(3, '|');
    let height = parts.next()?;
    let duration = parts.next()?;
    let filepath = parts.next()?;
    if filepath.is_empty() {
        return None;
    }

    Some(PrintedInfo {
        filepath: PathBuf::from(filepath),
        duration_secs: duration.trim().parse::<f64>().ok().filter(|d| d.is_finite() && *d > 0.0),
        height: height.trim().parse::<f64>().ok().filter(|h| *h > 0.0).map(|h| h as u32),
    })
}

/// Locate the downloaded file.
///
/// Tries the printed path, then the same path with `.mp4` (merges rename
/// the container), then the largest finished file in `output_dir`.
pub async fn find_output_file(printed: Option<&Path>, output_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = printed {
        if is_file(path).await {
            return Some(path.to_path_buf());
        }
        let mp4 = path.with_extension("mp4");
        if is_file(&mp4).await {
            log::debug!("Printed path missing, using merged {}", mp4.display());
            return Some(mp4);
        }
        log::warn!("yt-dlp reported {} but it does not exist", path.display());
    }

    let mut entries = tokio::fs::read_dir(output_dir).await.ok()?;
    let mut largest: Option<(u64, PathBuf)> = None;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let unfinished = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("part" | "ytdl" | "temp")
        );
        let Ok(meta) = entry.metadata().await else {
            continue;
        };
        if !meta.is_file() || unfinished {
            continue;
        }
        match &largest {
            Some((len, _)) if *len >= meta.len() => {}
            _ => largest = Some((meta.len(), path)),
        }
    }
    largest.map(|(_, path)| path)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn extract(
        &self,
        url: &str,
        format: &FormatExpression,
        cookies: Option<&Path>,
        output_dir: &Path,
    ) -> Result<Extracted, ExtractorError> {
        let args = Self::build_args(url, format, cookies, output_dir);
        log::info!("yt-dlp: -f {} (cookies: {})", format, cookies.is_some());
        log::debug!("{} {}", self.bin, args.join(" "));

        let mut cmd = Command::new(&self.bin);
        cmd.args(&args);
        let output = run_with_timeout(&mut cmd, self.timeout).await.map_err(|e| match e {
            AppError::Io(io) => ExtractorError::Failed(format!("failed to run {}: {}", self.bin, io)),
            other => ExtractorError::Failed(format!("yt-dlp: {}", other)),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let line = primary_error_line(&stderr)
                .map(str::to_string)
                .unwrap_or_else(|| format!("yt-dlp exited with {}", output.status));
            let kind = analyze_ytdlp_error(&stderr);
            log::error!("yt-dlp failed ({:?}): {}", kind, line);
            return Err(match kind {
                YtDlpErrorType::AuthRequired => ExtractorError::AuthRequired(line),
                _ => ExtractorError::Failed(line),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let printed = parse_print_line(&stdout);
        let path = find_output_file(printed.as_ref().map(|p| p.filepath.as_path()), output_dir)
            .await
            .ok_or_else(|| ExtractorError::Failed("yt-dlp finished but produced no file".to_string()))?;

        let mut duration_secs = printed.as_ref().and_then(|p| p.duration_secs);
        if duration_secs.is_none() {
            match probe_duration(&path).await {
                Ok(d) => duration_secs = Some(d),
                Err(e) => log::warn!("Duration unknown for {}: {}", path.display(), e),
            }
        }

        Ok(Extracted {
            path,
            duration_secs,
            height: printed.and_then(|p| p.height),
        })
    }
}
