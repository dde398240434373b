//! yt-dlp stderr analysis
//!
//! Maps yt-dlp diagnostics onto a small set of failure kinds so the
//! extractor can report auth walls as a structured error.

/// Types of yt-dlp errors
#[derive(Debug, Clone, PartialEq)]
pub enum YtDlpErrorType {
    /// Content needs a logged-in session (missing or stale cookies)
    AuthRequired,
    /// Site flagged the request as automated
    BotDetection,
    /// Video unavailable (private, removed, geo-blocked)
    VideoUnavailable,
    /// URL not handled by any extractor
    Unsupported,
    /// Network trouble (timeouts, connection resets)
    NetworkError,
    /// Anything else
    Unknown,
}

/// Analyzes yt-dlp stderr and determines the error type
pub fn analyze_ytdlp_error(stderr: &str) -> YtDlpErrorType {
    let stderr_lower = stderr.to_lowercase();

    if stderr_lower.contains("log in")
        || stderr_lower.contains("login")
        || stderr_lower.contains("please sign in")
        || stderr_lower.contains("authentication")
        || stderr_lower.contains("use --cookies")
        || stderr_lower.contains("cookies are no longer valid")
        || stderr_lower.contains("sign in to confirm your age")
    {
        return YtDlpErrorType::AuthRequired;
    }

    if stderr_lower.contains("confirm you're not a bot")
        || stderr_lower.contains("confirm you’re not a bot")
        || stderr_lower.contains("http error 403")
        || stderr_lower.contains("unusual traffic")
    {
        return YtDlpErrorType::BotDetection;
    }

    if stderr_lower.contains("private video")
        || stderr_lower.contains("video unavailable")
        || stderr_lower.contains("is not available")
        || stderr_lower.contains("has been removed")
        || stderr_lower.contains("does not exist")
        || stderr_lower.contains("http error 404")
    {
        return YtDlpErrorType::VideoUnavailable;
    }

    if stderr_lower.contains("unsupported url") || stderr_lower.contains("no video formats found") {
        return YtDlpErrorType::Unsupported;
    }

    if stderr_lower.contains("timed out")
        || stderr_lower.contains("timeout")
        || stderr_lower.contains("connection")
        || stderr_lower.contains("network")
        || stderr_lower.contains("name resolution")
        || stderr_lower.contains("failed to connect")
    {
        return YtDlpErrorType::NetworkError;
    }

    YtDlpErrorType::Unknown
}

/// Pick the most telling line out of yt-dlp stderr: the last `ERROR:` line,
/// else the last non-empty line.
pub fn primary_error_line(stderr: &str) -> Option<&str> {
    let lines = stderr.lines().map(str::trim).filter(|l| !l.is_empty());
    let mut last = None;
    let mut last_error = None;
    for line in lines {
        if line.starts_with("ERROR:") {
            last_error = Some(line);
        }
        last = Some(line);
    }
    last_error.or(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_wall_detection() {
        assert_eq!(
            analyze_ytdlp_error("ERROR: [Instagram] abc: Login required to access this post"),
            YtDlpErrorType::AuthRequired
        );
        assert_eq!(
            analyze_ytdlp_error("ERROR: Sign in to confirm your age. This video may be inappropriate"),
            YtDlpErrorType::AuthRequired
        );
        assert_eq!(
            analyze_ytdlp_error("Use --cookies-from-browser or --cookies for the authentication"),
            YtDlpErrorType::AuthRequired
        );
    }

    #[test]
    fn test_other_kinds() {
        assert_eq!(
            analyze_ytdlp_error("ERROR: Sign in to confirm you're not a bot"),
            YtDlpErrorType::BotDetection
        );
        assert_eq!(
            analyze_ytdlp_error("ERROR: [youtube] x: Private video"),
            YtDlpErrorType::VideoUnavailable
        );
        assert_eq!(
            analyze_ytdlp_error("ERROR: Unsupported URL: https://example.com"),
            YtDlpErrorType::Unsupported
        );
        assert_eq!(
            analyze_ytdlp_error("ERROR: Unable to download webpage: The read operation timed out"),
            YtDlpErrorType::NetworkError
        );
        assert_eq!(analyze_ytdlp_error("something odd"), YtDlpErrorType::Unknown);
    }

    #[test]
    fn test_primary_error_line() {
        let stderr = "WARNING: foo\nERROR: first\n\nERROR: second\nsome trailer\n";
        assert_eq!(primary_error_line(stderr), Some("ERROR: second"));
        assert_eq!(primary_error_line("just a line\n"), Some("just a line"));
        assert_eq!(primary_error_line("  \n"), None);
    }
}
