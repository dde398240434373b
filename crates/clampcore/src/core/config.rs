use once_cell::sync::Lazy;
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{AppError, AppResult};
use crate::download::format::QualityRung;

/// One mebibyte, the unit every size knob is expressed in.
pub const MIB: u64 = 1024 * 1024;

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// ffmpeg binary path (FFMPEG_BIN, default "ffmpeg")
pub static FFMPEG_BIN: Lazy<String> = Lazy::new(|| env::var("FFMPEG_BIN").unwrap_or_else(|_| "ffmpeg".to_string()));

/// ffprobe binary path (FFPROBE_BIN, default "ffprobe")
pub static FFPROBE_BIN: Lazy<String> =
    Lazy::new(|| env::var("FFPROBE_BIN").unwrap_or_else(|_| "ffprobe".to_string()));

/// Directory holding the per-site cookie files
/// Read from COOKIES_DIR environment variable
/// Default: current directory. Supports tilde (~) expansion
pub static COOKIES_DIR: Lazy<String> = Lazy::new(|| env::var("COOKIES_DIR").unwrap_or_else(|_| ".".to_string()));

/// Explicit path to the YouTube cookies file
/// Read from YTDL_COOKIES_FILE environment variable
/// If set, this takes priority over COOKIES_DIR/youtube_cookies.txt
pub static YTDL_COOKIES_FILE: Lazy<Option<String>> =
    Lazy::new(|| env::var("YTDL_COOKIES_FILE").ok().filter(|v| !v.trim().is_empty()));

/// Root under which every request creates its private scratch directory
/// Read from TEMP_FILES_DIR environment variable, defaults to the OS temp dir
pub static TEMP_FILES_DIR: Lazy<String> = Lazy::new(|| {
    env::var("TEMP_FILES_DIR").unwrap_or_else(|_| env::temp_dir().to_string_lossy().into_owned())
});

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: clampdl.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "clampdl.log".to_string()));

/// Log level name (RUST_LOG_LEVEL), default "info"
pub static LOG_LEVEL: Lazy<String> =
    Lazy::new(|| env::var("RUST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

/// Size limits of the delivery transport
pub mod limits {
    use once_cell::sync::Lazy;
    use std::env;

    /// Practical ceiling for a direct upload (48 MB)
    pub const DEFAULT_SIZE_CEILING_MB: u64 = 48;

    /// Re-encode target, kept below the ceiling for container overhead
    pub const DEFAULT_TARGET_BUDGET_MB: u64 = 46;

    /// Read from SIZE_CEILING_MB environment variable
    pub static SIZE_CEILING_MB: Lazy<u64> = Lazy::new(|| {
        env::var("SIZE_CEILING_MB")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_SIZE_CEILING_MB)
    });

    /// Read from TARGET_BUDGET_MB environment variable
    pub static TARGET_BUDGET_MB: Lazy<u64> = Lazy::new(|| {
        env::var("TARGET_BUDGET_MB")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_TARGET_BUDGET_MB)
    });
}

/// Re-encode parameters
pub mod encode {
    use once_cell::sync::Lazy;
    use std::env;

    /// Fixed audio target for re-encodes (kbit/s)
    pub const DEFAULT_AUDIO_BITRATE_KBPS: u64 = 96;

    /// Video bitrate below which output is unwatchable (kbit/s)
    pub const DEFAULT_VIDEO_FLOOR_KBPS: u64 = 200;

    /// Audio channel count for re-encodes
    pub const AUDIO_CHANNELS: u8 = 2;

    /// Longer output side is capped at this many pixels
    pub const DEFAULT_TRANSCODE_MAX_HEIGHT: u32 = 720;

    /// Read from AUDIO_BITRATE_KBPS environment variable
    pub static AUDIO_BITRATE_KBPS: Lazy<u64> = Lazy::new(|| {
        env::var("AUDIO_BITRATE_KBPS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_AUDIO_BITRATE_KBPS)
    });

    /// Read from VIDEO_FLOOR_KBPS environment variable
    pub static VIDEO_FLOOR_KBPS: Lazy<u64> = Lazy::new(|| {
        env::var("VIDEO_FLOOR_KBPS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_VIDEO_FLOOR_KBPS)
    });

    /// Read from TRANSCODE_MAX_HEIGHT environment variable
    pub static TRANSCODE_MAX_HEIGHT: Lazy<u32> = Lazy::new(|| {
        env::var("TRANSCODE_MAX_HEIGHT")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_TRANSCODE_MAX_HEIGHT)
    });
}

/// Quality ladder configuration
pub mod ladder {
    use once_cell::sync::Lazy;
    use std::env;

    /// Heights tried before the unconstrained rung
    pub const DEFAULT_HEIGHTS: &[u32] = &[720, 480, 360];

    /// Parse a comma/space separated list of heights, dropping junk and zeros.
    pub fn parse_heights(raw: &str) -> Vec<u32> {
        raw.split([',', ' ', '\n', '\t'])
            .filter_map(|part| part.trim().trim_end_matches('p').parse::<u32>().ok())
            .filter(|h| *h > 0)
            .collect()
    }

    /// Read from LADDER_HEIGHTS environment variable (e.g. "720,480,360")
    pub static HEIGHTS: Lazy<Vec<u32>> = Lazy::new(|| {
        env::var("LADDER_HEIGHTS")
            .ok()
            .map(|raw| parse_heights(&raw))
            .filter(|heights| !heights.is_empty())
            .unwrap_or_else(|| DEFAULT_HEIGHTS.to_vec())
    });
}

/// External process timeouts
pub mod timeouts {
    use super::Duration;
    use once_cell::sync::Lazy;
    use std::env;

    /// Read from YTDLP_TIMEOUT_SECS environment variable (default 10 minutes)
    pub static YTDLP_TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("YTDLP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(600)
    });

    /// Read from FFMPEG_TIMEOUT_SECS environment variable (default 15 minutes)
    pub static FFMPEG_TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("FFMPEG_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(900)
    });

    /// yt-dlp command timeout duration
    pub fn ytdlp_timeout() -> Duration {
        Duration::from_secs(*YTDLP_TIMEOUT_SECS)
    }

    /// ffmpeg command timeout duration
    pub fn ffmpeg_timeout() -> Duration {
        Duration::from_secs(*FFMPEG_TIMEOUT_SECS)
    }
}

/// Immutable per-process pipeline configuration.
///
/// Built once (usually via [`PipelineConfig::from_env`]) and shared by every
/// request behind an `Arc`. Fields are private so that
/// `target_budget < size_ceiling` holds for the lifetime of the value.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    size_ceiling_bytes: u64,
    target_budget_bytes: u64,
    ladder: Vec<QualityRung>,
    audio_bitrate_bps: u64,
    video_floor_bps: u64,
    audio_channels: u8,
    transcode_max_height: u32,
    scratch_root: PathBuf,
}

impl PipelineConfig {
    /// Create a config with the given limits and default everything else.
    ///
    /// Fails if the budget is zero or not strictly below the ceiling.
    pub fn new(size_ceiling_bytes: u64, target_budget_bytes: u64) -> AppResult<Self> {
        if target_budget_bytes == 0 {
            return Err(AppError::Validation("target budget must be positive".to_string()));
        }
        if target_budget_bytes >= size_ceiling_bytes {
            return Err(AppError::Validation(format!(
                "target budget ({} bytes) must be strictly below the size ceiling ({} bytes)",
                target_budget_bytes, size_ceiling_bytes
            )));
        }

        Ok(Self {
            size_ceiling_bytes,
            target_budget_bytes,
            ladder: build_ladder(ladder::DEFAULT_HEIGHTS),
            audio_bitrate_bps: encode::DEFAULT_AUDIO_BITRATE_KBPS * 1000,
            video_floor_bps: encode::DEFAULT_VIDEO_FLOOR_KBPS * 1000,
            audio_channels: encode::AUDIO_CHANNELS,
            transcode_max_height: encode::DEFAULT_TRANSCODE_MAX_HEIGHT,
            scratch_root: env::temp_dir(),
        })
    }

    /// Build the config from environment variables (see the statics above).
    pub fn from_env() -> AppResult<Self> {
        let config = Self::new(
            limits::SIZE_CEILING_MB.saturating_mul(MIB),
            limits::TARGET_BUDGET_MB.saturating_mul(MIB),
        )?
        .with_ladder_heights(&ladder::HEIGHTS)
        .with_audio_bitrate_bps(encode::AUDIO_BITRATE_KBPS.saturating_mul(1000))
        .with_video_floor_bps(encode::VIDEO_FLOOR_KBPS.saturating_mul(1000))
        .with_transcode_max_height(*encode::TRANSCODE_MAX_HEIGHT)
        .with_scratch_root(shellexpand::tilde(TEMP_FILES_DIR.as_str()).as_ref());

        if config.transcode_max_height == 0 {
            return Err(AppError::Validation("TRANSCODE_MAX_HEIGHT must be positive".to_string()));
        }
        Ok(config)
    }

    /// Replace the ladder heights. Heights are sorted descending and
    /// deduplicated; the unconstrained rung is always appended.
    pub fn with_ladder_heights(mut self, heights: &[u32]) -> Self {
        self.ladder = build_ladder(heights);
        self
    }

    pub fn with_audio_bitrate_bps(mut self, bps: u64) -> Self {
        self.audio_bitrate_bps = bps;
        self
    }

    pub fn with_video_floor_bps(mut self, bps: u64) -> Self {
        self.video_floor_bps = bps;
        self
    }

    pub fn with_transcode_max_height(mut self, height: u32) -> Self {
        self.transcode_max_height = height;
        self
    }

    pub fn with_scratch_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.scratch_root = root.as_ref().to_path_buf();
        self
    }

    pub fn size_ceiling_bytes(&self) -> u64 {
        self.size_ceiling_bytes
    }

    pub fn target_budget_bytes(&self) -> u64 {
        self.target_budget_bytes
    }

    pub fn ladder(&self) -> &[QualityRung] {
        &self.ladder
    }

    pub fn audio_bitrate_bps(&self) -> u64 {
        self.audio_bitrate_bps
    }

    pub fn video_floor_bps(&self) -> u64 {
        self.video_floor_bps
    }

    pub fn audio_channels(&self) -> u8 {
        self.audio_channels
    }

    pub fn transcode_max_height(&self) -> u32 {
        self.transcode_max_height
    }

    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }
}

fn build_ladder(heights: &[u32]) -> Vec<QualityRung> {
    let mut sorted: Vec<u32> = heights.iter().copied().filter(|h| *h > 0).collect();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();

    let mut rungs: Vec<QualityRung> = sorted.into_iter().map(QualityRung::Height).collect();
    rungs.push(QualityRung::Unconstrained);
    rungs
}
