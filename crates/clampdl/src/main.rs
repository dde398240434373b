use anyhow::Result;
use dotenvy::dotenv;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use clampcore::conversion::fit::FitTranscoder;
use clampcore::conversion::transcoder::FfmpegTranscoder;
use clampcore::core::config::{self, MIB};
use clampcore::core::logging::parse_level;
use clampcore::core::{init_logger, log_credentials_configuration, log_tools_availability, PipelineConfig};
use clampcore::download::{classify, select_format, CredentialResolver, MediaRequest, Pipeline, PipelineOutcome};

mod cli;
mod report;

use cli::{Cli, Commands};
use report::{FetchPlan, FetchReport};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH, parse_level(&config::LOG_LEVEL))?;

    match cli.command {
        Commands::Fetch {
            urls,
            text,
            output,
            json,
        } => run_fetch(urls, text, output, json).await,
        Commands::Budget { mb, seconds } => run_budget(mb, seconds),
        Commands::Formats { url } => run_formats(url),
        Commands::Check => run_check().await,
    }
}

async fn run_fetch(inputs: Vec<String>, text: bool, output: String, json: bool) -> Result<()> {
    let config = Arc::new(PipelineConfig::from_env()?);
    log_credentials_configuration(&CredentialResolver::from_env());
    if !log_tools_availability().await {
        log::warn!("Required tools are missing, downloads will fail");
    }

    let output_dir = PathBuf::from(shellexpand::tilde(&output).as_ref());
    let mut plan = FetchPlan::new(inputs, text);
    let requests = plan.take_requests();

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            log::info!("Received Ctrl-C, cancelling downloads");
            ctrl_c_token.cancel();
        }
    });

    let pipeline = Arc::new(Pipeline::with_defaults(Arc::clone(&config)));
    let results = tokio::select! {
        results = pipeline.run_many(requests) => results,
        _ = token.cancelled() => {
            // Dropping run_many aborts every task, which kills the subprocesses
            // and removes their scratch directories.
            println!("⏹ Download cancelled.");
            return Err(anyhow::anyhow!("cancelled"));
        }
    };

    let positions = plan.positions().to_vec();
    for (index, result) in positions.into_iter().zip(results) {
        let input = plan.input(index).to_string();
        let report = match result {
            Ok(outcome) => {
                let line = outcome.user_message();
                match outcome {
                    PipelineOutcome::Delivered(delivery) => {
                        let mut summary = delivery.summary();
                        match delivery.persist_to(&output_dir).await {
                            Ok(dest) => {
                                summary.path = dest;
                                FetchReport::delivered(&input, summary, line)
                            }
                            Err(e) => FetchReport::failed(&input, "workspace", format!("failed to save file: {}", e)),
                        }
                    }
                    PipelineOutcome::TooLarge { .. } => FetchReport::failed(&input, "too_large", line),
                }
            }
            Err(e) => FetchReport::failed(&input, e.subcategory(), e.user_message()),
        };
        plan.fill(index, report);
    }

    let reports = plan.finish();
    let failures = reports.iter().filter(|r| !r.is_delivered()).count();

    for report in &reports {
        if json {
            println!("{}", serde_json::to_string(report)?);
        } else {
            match &report.delivery {
                Some(d) => println!(
                    "{}: ✅ {} ({:.1} MB, {}{})",
                    report.input,
                    d.path.display(),
                    d.size_bytes as f64 / MIB as f64,
                    d.rung,
                    if d.transcoded { ", re-encoded" } else { "" }
                ),
                None => println!("{}: {}", report.input, report.message.as_deref().unwrap_or("failed")),
            }
        }
    }

    if failures > 0 {
        return Err(anyhow::anyhow!("{} of {} requests failed", failures, reports.len()));
    }
    Ok(())
}

fn run_budget(mb: u64, seconds: f64) -> Result<()> {
    let config = PipelineConfig::from_env()?;
    let fit = FitTranscoder::new(Arc::new(FfmpegTranscoder::new()), &config).with_target_bytes(mb.saturating_mul(MIB));
    let job = fit.plan(
        Path::new("input.mp4"),
        Path::new("fit.mp4"),
        seconds,
        config.transcode_max_height(),
    );

    println!("Target:   {} MiB over {:.1}s", mb, seconds);
    println!("Video:    {} kb/s", job.video_bps / 1000);
    println!("Maxrate:  {} kb/s", job.max_rate_bps / 1000);
    println!("Bufsize:  {} kb/s", job.buffer_bps / 1000);
    println!("Height:   {}p max", job.max_height);
    println!("Audio:    {} kb/s, {} channels", job.audio_bps / 1000, job.audio_channels);
    Ok(())
}

fn run_formats(url: String) -> Result<()> {
    let config = PipelineConfig::from_env()?;
    let request = MediaRequest::parse(&url)?;
    let site = classify(request.as_str());

    println!("Site: {}", site);
    for &rung in config.ladder() {
        let label = rung.to_string();
        println!("{label:>5}  {}", select_format(site, rung));
    }
    Ok(())
}

async fn run_check() -> Result<()> {
    let config = PipelineConfig::from_env()?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    log_credentials_configuration(&CredentialResolver::from_env());
    if !log_tools_availability().await {
        return Err(anyhow::anyhow!("yt-dlp or ffmpeg is not available"));
    }
    Ok(())
}
