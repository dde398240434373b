//! clampcore - fetch a media URL as one file that fits under a size ceiling
//!
//! A request is downloaded with yt-dlp at descending quality caps until a
//! file fits. When none does, the last candidate is re-encoded once with
//! ffmpeg at a bitrate derived from the byte budget, then checked again.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, subprocess helpers
//! - `download`: site classification, cookies, the quality ladder, the pipeline
//! - `conversion`: bitrate budget and the fit transcoder

pub mod conversion;
pub mod core;
pub mod download;

// Re-export commonly used types for convenience
pub use self::core::{config, AppError, AppResult, PipelineConfig};
pub use download::{Delivery, MediaRequest, Pipeline, PipelineError, PipelineOutcome};
