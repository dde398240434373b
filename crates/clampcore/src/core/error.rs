use thiserror::Error;

/// Errors raised while setting up the application (config, logging, IO).
///
/// Per-request failures live in [`crate::download::error::PipelineError`];
/// this type covers everything that happens outside a single request.
///
/// # Example
///
/// ```no_run
/// use clampcore::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Validation errors (bad config values, malformed input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// External process errors (spawn failure, timeout)
    #[error("Process error: {0}")]
    Process(String),

    /// Logger could not be installed
    #[error("Logger error: {0}")]
    Logger(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Validation(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Validation(err.to_string())
    }
}
