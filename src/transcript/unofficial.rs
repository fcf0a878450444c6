use tracing::debug;

use super::grade_scale::is_non_gpa_grade;
use super::{LineStats, TranscriptParser, check_units};
use crate::model::CourseRecord;
use crate::util::round1;

/// Full tabular row: code, title, attempted units, earned units, grade, points.
pub(super) const LINE_PATTERN: &str = concat!(
    r"^(?P<dept>[A-Z]{2,4})\s(?P<number>\d{1,3}[A-Z]?)\s+(?P<title>.+?)\s+",
    r"(?P<attempted>[\d.]+)\s+(?P<earned>[\d.]+)\s+",
    r"(?P<grade>CR|[A-DF][+-]?|P|W|I)\s+(?P<points>[\d.]+)$",
);

pub(super) const PAGE_MARKER_PATTERN: &str = r"(?i)\bpage\s+\d+(\s+of\s+\d+)?\b";

const MIN_LINE_CHARS: usize = 20;
const MIN_TITLE_CHARS: usize = 3;

/// Header, footer and summary fragments that never belong to a course row.
const BOILERPLATE_PHRASES: [&str; 16] = [
    "unofficial transcript",
    "term gpa",
    "cum gpa",
    "cumulative gpa",
    "term totals",
    "cum totals",
    "transfer totals",
    "combined totals",
    "beginning of undergraduate record",
    "end of unofficial",
    "print date",
    "student id",
    "course description attempted",
    "academic standing",
    "office of the registrar",
    "this is not an official",
];

pub(super) fn extract(
    parser: &TranscriptParser<'_>,
    text: &str,
    stats: &mut LineStats,
) -> Vec<CourseRecord> {
    let mut records = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        stats.lines_scanned += 1;
        let line_no = index + 1;
        let line = raw_line.trim();

        if is_structural_line(parser, line) {
            stats.lines_prefiltered += 1;
            continue;
        }

        let Some(captures) = parser.unofficial_line.captures(line) else {
            continue;
        };
        stats.lines_matched += 1;

        let course_code = format!("{} {}", &captures["dept"], &captures["number"]);
        let course_title = captures["title"].trim().to_string();
        if course_title.chars().count() < MIN_TITLE_CHARS {
            stats.lines_skipped += 1;
            debug!(
                line_no,
                course_code = %course_code,
                "skipping unofficial line with short title"
            );
            continue;
        }

        let units = match (
            captures["attempted"].parse::<f64>(),
            captures["earned"].parse::<f64>(),
        ) {
            (Ok(_), Ok(earned)) => earned,
            _ => {
                stats.lines_skipped += 1;
                debug!(line_no, line = %line, "skipping unofficial line with unparseable units");
                continue;
            }
        };

        let grade = captures["grade"].to_string();
        let grade_points = parser.scale.points_for(&grade).unwrap_or(0.0);
        let total_points = if is_non_gpa_grade(&grade) {
            0.0
        } else {
            grade_points * units
        };

        check_units(stats, line_no, &course_code, units);

        records.push(CourseRecord {
            course_code,
            course_title,
            grade,
            grade_points: round1(grade_points),
            units: round1(units),
            total_points: round1(total_points),
        });
    }

    records
}

fn is_structural_line(parser: &TranscriptParser<'_>, line: &str) -> bool {
    if line.chars().count() < MIN_LINE_CHARS {
        return true;
    }

    let lowered = line.to_lowercase();
    BOILERPLATE_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
        || parser.page_marker.is_match(line)
}
