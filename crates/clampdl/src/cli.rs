use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "clampdl")]
#[command(author, version, about = "Fetch media as a single file that fits under a size ceiling", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download one or more URLs, shrinking each until it fits
    Fetch {
        /// Media URLs (or free text with --text)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Treat each argument as a message and use the first URL found in it
        #[arg(long)]
        text: bool,

        /// Directory the delivered files are copied into
        #[arg(short, long, default_value = ".")]
        output: String,

        /// Print one JSON summary per request instead of human-readable lines
        #[arg(long)]
        json: bool,
    },

    /// Show the video bitrate the fit transcoder would use
    Budget {
        /// Target size in MiB
        mb: u64,

        /// Clip duration in seconds
        seconds: f64,
    },

    /// Show the yt-dlp format expression for every ladder rung of a URL
    Formats {
        url: String,
    },

    /// Check external tools and cookie files
    Check,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
