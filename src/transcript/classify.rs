use serde::Serialize;

const UNOFFICIAL_MARKER: &str = "unofficial transcript";

/// The transcript layouts the parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptDialect {
    /// Registrar-issued layout: course codes sit inside narrative lines and
    /// titles come from the course name directory.
    Official,
    /// Student-portal layout: one tabular row per course with an inline title.
    Unofficial,
}

impl TranscriptDialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Official => "official",
            Self::Unofficial => "unofficial",
        }
    }
}

/// Picks the dialect from the raw text. Anything without the unofficial
/// marker is treated as official.
pub fn classify(text: &str) -> TranscriptDialect {
    if text.to_lowercase().contains(UNOFFICIAL_MARKER) {
        TranscriptDialect::Unofficial
    } else {
        TranscriptDialect::Official
    }
}
