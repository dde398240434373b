//! Acquisition: classify, resolve cookies, walk the quality ladder, gate

pub mod cookies;
pub mod error;
pub mod extractor;
pub mod format;
pub mod gate;
pub mod ladder;
pub mod pipeline;
pub mod request;
pub mod scratch;
pub mod site;
pub mod ytdlp;
pub mod ytdlp_errors;

// Re-exports for convenience
pub use cookies::CredentialResolver;
pub use error::PipelineError;
pub use extractor::{Extracted, Extractor, ExtractorError};
pub use format::{select_format, FormatExpression, QualityRung};
pub use gate::{GateOutcome, SizeGate};
pub use ladder::{DownloadLadder, FetchedCandidate, LadderResult};
pub use pipeline::{Delivery, DeliverySummary, Pipeline, PipelineOutcome};
pub use request::MediaRequest;
pub use scratch::ScratchDir;
pub use site::{classify, SiteKind};
pub use ytdlp::YtDlpExtractor;
