//! Mock collaborators shared across integration tests
//!
//! Files are created with `set_len`, so multi-megabyte candidates are sparse
//! and cost nothing on disk.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clampcore::conversion::transcoder::{TranscodeJob, Transcoder};
use clampcore::conversion::{ConversionResult, TranscodeError};
use clampcore::core::config::MIB;
use clampcore::download::{CredentialResolver, Extracted, Extractor, ExtractorError, FormatExpression, Pipeline};
use clampcore::PipelineConfig;

pub fn mib(n: u64) -> u64 {
    n * MIB
}

pub fn sized_file(path: &Path, bytes: u64) {
    let file = std::fs::File::create(path).unwrap();
    file.set_len(bytes).unwrap();
}

/// Number of entries directly under `dir`.
pub fn entries(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(rd) => rd.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

/// One scripted extractor response.
#[derive(Debug, Clone)]
pub enum Step {
    /// Write a file of this size
    File(u64),
    /// Write a file of this size and report this duration
    Timed(u64, Option<f64>),
    /// Fail with this error
    Fail(ExtractorError),
    /// Write a partial file and never finish
    Hang,
}

/// Calls made against a [`ScriptedExtractor`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub format: String,
    pub cookies: Option<PathBuf>,
    pub output_dir: PathBuf,
}

/// Replays `steps` in order, one per `extract` call.
pub struct ScriptedExtractor {
    steps: Vec<Step>,
    duration_secs: Option<f64>,
    next: AtomicUsize,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedExtractor {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            duration_secs: Some(120.0),
            next: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn sizes(sizes: &[u64]) -> Self {
        Self::new(sizes.iter().map(|&s| Step::File(s)).collect())
    }

    pub fn with_duration(mut self, duration_secs: Option<f64>) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn extract(
        &self,
        _url: &str,
        format: &FormatExpression,
        cookies: Option<&Path>,
        output_dir: &Path,
    ) -> Result<Extracted, ExtractorError> {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(Call {
            format: format.as_arg(),
            cookies: cookies.map(Path::to_path_buf),
            output_dir: output_dir.to_path_buf(),
        });

        let step = self
            .steps
            .get(index)
            .cloned()
            .unwrap_or_else(|| Step::Fail(ExtractorError::Failed("script exhausted".to_string())));

        let path = output_dir.join(format!("clip-{}.mp4", index));
        match step {
            Step::File(bytes) => {
                sized_file(&path, bytes);
                Ok(Extracted {
                    path,
                    duration_secs: self.duration_secs,
                    height: None,
                })
            }
            Step::Timed(bytes, duration_secs) => {
                sized_file(&path, bytes);
                Ok(Extracted {
                    path,
                    duration_secs,
                    height: None,
                })
            }
            Step::Fail(err) => Err(err),
            Step::Hang => {
                sized_file(&path.with_extension("mp4.part"), 1024);
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ExtractorError::Failed("woke up".to_string()))
            }
        }
    }
}

/// Writes an output of a fixed size, or fails after a partial write.
pub struct MockTranscoder {
    output_bytes: Option<u64>,
    jobs: Mutex<Vec<TranscodeJob>>,
}

impl MockTranscoder {
    pub fn writing(bytes: u64) -> Self {
        Self {
            output_bytes: Some(bytes),
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            output_bytes: None,
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn jobs(&self) -> Vec<TranscodeJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcode(&self, job: &TranscodeJob) -> ConversionResult<()> {
        self.jobs.lock().unwrap().push(job.clone());
        match self.output_bytes {
            Some(bytes) => {
                sized_file(&job.output, bytes);
                Ok(())
            }
            None => {
                sized_file(&job.output, 4096);
                Err(TranscodeError::FfmpegError("Conversion failed: exit status 1".to_string()))
            }
        }
    }
}

/// 48 MiB ceiling, 46 MiB budget, default ladder, scratch under `root`.
pub fn config(root: &Path) -> Arc<PipelineConfig> {
    Arc::new(
        PipelineConfig::new(mib(48), mib(46))
            .unwrap()
            .with_scratch_root(root),
    )
}

/// Directories used by one test: scratch root and cookies dir.
pub struct TestEnv {
    pub scratch_root: tempfile::TempDir,
    pub cookies_dir: tempfile::TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            scratch_root: tempfile::tempdir().unwrap(),
            cookies_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn scratch_path(&self) -> &Path {
        self.scratch_root.path()
    }

    pub fn credentials(&self) -> CredentialResolver {
        CredentialResolver::new(self.cookies_dir.path())
    }

    pub fn pipeline(&self, extractor: Arc<ScriptedExtractor>, transcoder: Arc<MockTranscoder>) -> Pipeline {
        Pipeline::new(config(self.scratch_path()), extractor, transcoder, self.credentials())
    }
}
