//! yt-dlp format-selection expressions for each ladder rung.
//!
//! Every expression ends in an unconstrained `best` tier so the extractor
//! returns *something* even when the height filter matches nothing; the
//! ladder's size check decides what to do with it.

use serde::Serialize;
use std::fmt;

use crate::download::site::SiteKind;

/// One entry of the quality ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QualityRung {
    /// Prefer streams at or below this height
    Height(u32),
    /// Final sentinel: no height constraint
    Unconstrained,
}

impl QualityRung {
    pub fn height(self) -> Option<u32> {
        match self {
            QualityRung::Height(h) => Some(h),
            QualityRung::Unconstrained => None,
        }
    }
}

impl fmt::Display for QualityRung {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityRung::Height(h) => write!(f, "{}p", h),
            QualityRung::Unconstrained => f.write_str("best"),
        }
    }
}

/// An ordered list of format tiers, rendered as `tier1/tier2/...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatExpression {
    tiers: Vec<String>,
}

impl FormatExpression {
    pub fn tiers(&self) -> &[String] {
        &self.tiers
    }

    /// Expression in yt-dlp `-f` syntax.
    pub fn as_arg(&self) -> String {
        self.tiers.join("/")
    }
}

impl fmt::Display for FormatExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_arg())
    }
}

/// Build the format expression for a site kind and rung.
pub fn select_format(kind: SiteKind, rung: QualityRung) -> FormatExpression {
    let tiers = match rung.height() {
        None => vec!["best[ext=mp4]".to_string(), "best".to_string()],
        Some(h) if kind.supports_split_streams() => vec![
            format!("bestvideo[height<={h}]+bestaudio"),
            format!("best[height<={h}]"),
            "best".to_string(),
        ],
        Some(h) => vec![format!("best[height<={h}]"), "best".to_string()],
    };
    FormatExpression { tiers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unconstrained_is_container_native_then_best() {
        for kind in [
            SiteKind::YouTubeLike,
            SiteKind::InstagramLike,
            SiteKind::TwitterLike,
            SiteKind::Other,
        ] {
            assert_eq!(select_format(kind, QualityRung::Unconstrained).as_arg(), "best[ext=mp4]/best");
        }
    }

    #[test]
    fn test_youtube_height_has_three_tiers() {
        let expr = select_format(SiteKind::YouTubeLike, QualityRung::Height(480));
        assert_eq!(
            expr.tiers(),
            &["bestvideo[height<=480]+bestaudio", "best[height<=480]", "best"]
        );
        assert_eq!(expr.to_string(), "bestvideo[height<=480]+bestaudio/best[height<=480]/best");
    }

    #[test]
    fn test_combined_only_sites_have_two_tiers() {
        for kind in [SiteKind::InstagramLike, SiteKind::TwitterLike, SiteKind::Other] {
            let expr = select_format(kind, QualityRung::Height(720));
            assert_eq!(expr.as_arg(), "best[height<=720]/best");
        }
    }

    #[test]
    fn test_selection_is_deterministic() {
        let a = select_format(SiteKind::YouTubeLike, QualityRung::Height(360));
        let b = select_format(SiteKind::YouTubeLike, QualityRung::Height(360));
        assert_eq!(a, b);
    }

    #[test]
    fn test_rung_display() {
        assert_eq!(QualityRung::Height(720).to_string(), "720p");
        assert_eq!(QualityRung::Unconstrained.to_string(), "best");
    }
}
