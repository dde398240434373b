//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Cookie file presence check per site kind
//! - External tool availability check

use simplelog::*;
use std::fs::File;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::process::binary_available;
use crate::download::cookies::CredentialResolver;
use crate::download::site::SiteKind;

/// Map a level name ("debug", "warn", ...) to a filter, defaulting to Info.
pub fn parse_level(name: &str) -> LevelFilter {
    match name.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
/// * `level` - Minimum level for both sinks
pub fn init_logger(log_file_path: &str, level: LevelFilter) -> AppResult<()> {
    let log_file = File::create(log_file_path)?;

    CombinedLogger::init(vec![
        TermLogger::new(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto),
        WriteLogger::new(level, Config::default(), log_file),
    ])
    .map_err(|e| AppError::Logger(e.to_string()))?;

    Ok(())
}

/// Logs which per-site cookie files will be used.
///
/// Missing files are not errors: extraction is attempted without
/// credentials and only auth-walled content fails.
pub fn log_credentials_configuration(resolver: &CredentialResolver) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🍪 Cookies Configuration Check ({})", resolver.dir().display());
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for kind in [SiteKind::YouTubeLike, SiteKind::InstagramLike, SiteKind::TwitterLike] {
        let Some(candidate) = resolver.expected_path(kind) else {
            continue;
        };
        match resolver.resolve(kind) {
            Some(path) => log::info!("✅ {}: {}", kind.label(), path.display()),
            None => log::warn!(
                "⚠️  {}: {} not found, extraction runs without cookies",
                kind.label(),
                candidate.display()
            ),
        }
    }
}

/// Logs whether yt-dlp, ffmpeg and ffprobe can be executed.
///
/// Returns false when a required tool (yt-dlp or ffmpeg) is missing.
pub async fn log_tools_availability() -> bool {
    let ytdlp = binary_available(&config::YTDL_BIN, "--version").await;
    let ffmpeg = binary_available(&config::FFMPEG_BIN, "-version").await;
    let ffprobe = binary_available(&config::FFPROBE_BIN, "-version").await;

    for (name, bin, ok) in [
        ("yt-dlp", config::YTDL_BIN.as_str(), ytdlp),
        ("ffmpeg", config::FFMPEG_BIN.as_str(), ffmpeg),
        ("ffprobe", config::FFPROBE_BIN.as_str(), ffprobe),
    ] {
        if ok {
            log::info!("✅ {} available ({})", name, bin);
        } else {
            log::error!("❌ {} not runnable ({})", name, bin);
        }
    }
    if !ffprobe {
        log::warn!("ffprobe missing: clips without a reported duration fall back to 1s budgeting");
    }

    ytdlp && ffmpeg
}
