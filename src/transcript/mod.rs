//! Transcript ingestion: PDF text layer to a normalized course table.
//!
//! The raw text is classified into a [`TranscriptDialect`], handed to that
//! dialect's line extractor, and the candidates pass through the shared
//! normalizer. Lookup tables are borrowed by the parser so callers decide
//! how and when they are loaded.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use crate::model::{CourseRecord, CourseTable};

mod classify;
mod directory;
mod extract;
mod grade_scale;
mod normalize;
mod official;
#[cfg(test)]
mod tests;
mod unofficial;

pub use classify::{TranscriptDialect, classify};
pub use directory::CourseDirectory;
pub use extract::{ExtractionError, TextBackend, extract_text, extract_text_from_path};
pub use grade_scale::{GradeScale, counts_toward_gpa};
pub use normalize::normalize_records;

const MIN_EXPECTED_UNITS: f64 = 0.5;
const MAX_EXPECTED_UNITS: f64 = 10.0;

/// Per-line accounting for one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineStats {
    pub lines_scanned: usize,
    pub lines_prefiltered: usize,
    pub lines_matched: usize,
    pub lines_skipped: usize,
    pub outlier_unit_records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedTranscript {
    pub dialect: TranscriptDialect,
    pub table: CourseTable,
    pub stats: LineStats,
    pub records_dropped: usize,
}

/// Result of a parse that got past text extraction. Extraction failures are
/// reported separately as [`ExtractionError`].
#[derive(Debug, Clone)]
pub enum TranscriptOutcome {
    Courses(ParsedTranscript),
    NoCourseData(ParsedTranscript),
}

impl TranscriptOutcome {
    pub fn transcript(&self) -> &ParsedTranscript {
        match self {
            Self::Courses(transcript) | Self::NoCourseData(transcript) => transcript,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Courses(_) => "completed",
            Self::NoCourseData(_) => "no_course_data",
        }
    }
}

type DialectExtractor = fn(&TranscriptParser<'_>, &str, &mut LineStats) -> Vec<CourseRecord>;

impl TranscriptDialect {
    fn extractor(self) -> DialectExtractor {
        match self {
            Self::Official => official::extract,
            Self::Unofficial => unofficial::extract,
        }
    }
}

pub struct TranscriptParser<'a> {
    scale: &'a GradeScale,
    directory: &'a CourseDirectory,
    official_line: Regex,
    unofficial_line: Regex,
    page_marker: Regex,
}

impl<'a> TranscriptParser<'a> {
    pub fn new(scale: &'a GradeScale, directory: &'a CourseDirectory) -> Result<Self> {
        Ok(Self {
            scale,
            directory,
            official_line: Regex::new(official::LINE_PATTERN)
                .context("failed to compile official transcript line regex")?,
            unofficial_line: Regex::new(unofficial::LINE_PATTERN)
                .context("failed to compile unofficial transcript line regex")?,
            page_marker: Regex::new(unofficial::PAGE_MARKER_PATTERN)
                .context("failed to compile page marker regex")?,
        })
    }

    /// Runs text extraction and parsing over PDF bytes.
    pub fn parse_pdf(
        &self,
        bytes: &[u8],
        backend: TextBackend,
    ) -> Result<TranscriptOutcome, ExtractionError> {
        let text = extract_text(bytes, backend)?;
        Ok(self.parse_text(&text))
    }

    pub fn parse_text(&self, text: &str) -> TranscriptOutcome {
        let dialect = classify(text);
        let mut stats = LineStats::default();

        let candidates = (dialect.extractor())(self, text, &mut stats);
        let (table, records_dropped) = normalize_records(candidates);

        info!(
            dialect = dialect.as_str(),
            lines_scanned = stats.lines_scanned,
            lines_matched = stats.lines_matched,
            lines_skipped = stats.lines_skipped,
            records = table.len(),
            records_dropped,
            "parsed transcript"
        );

        let transcript = ParsedTranscript {
            dialect,
            table,
            stats,
            records_dropped,
        };

        if transcript.table.is_empty() {
            warn!(dialect = dialect.as_str(), "no course records extracted from transcript");
            TranscriptOutcome::NoCourseData(transcript)
        } else {
            TranscriptOutcome::Courses(transcript)
        }
    }
}

/// Flags unit counts outside the expected range. Such records are kept.
fn check_units(stats: &mut LineStats, line_no: usize, course_code: &str, units: f64) {
    if !(MIN_EXPECTED_UNITS..=MAX_EXPECTED_UNITS).contains(&units) {
        stats.outlier_unit_records += 1;
        warn!(line_no, course_code = %course_code, units, "units outside expected range");
    }
}
