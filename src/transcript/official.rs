use tracing::debug;

use super::grade_scale::{IN_PROGRESS_GRADE, is_non_gpa_grade};
use super::{LineStats, TranscriptParser, check_units};
use crate::model::CourseRecord;
use crate::util::round1;

/// A course code introduced by "and", followed by " - ", a free-text
/// remainder and four trailing fields: grade, grade points, units, total.
pub(super) const LINE_PATTERN: &str = concat!(
    r"\band\s+(?P<dept>[A-Z]{2,4})\s(?P<number>\d{1,3}[A-Z]?)\s+-\s+(?:.*?\s+)?",
    r"(?P<grade>In Progress|CR|[A-DF][+-]?|P|W|I)\s+",
    r"(?P<grade_points>[\d.]+)\s+(?P<units>\d+)\s+(?P<total_points>[\d.]+)\s*$",
);

pub(super) fn extract(
    parser: &TranscriptParser<'_>,
    text: &str,
    stats: &mut LineStats,
) -> Vec<CourseRecord> {
    let mut records = Vec::new();

    for (index, line) in text.lines().enumerate() {
        stats.lines_scanned += 1;
        let line_no = index + 1;

        let Some(captures) = parser.official_line.captures(line) else {
            continue;
        };
        stats.lines_matched += 1;

        let course_code = format!("{} {}", &captures["dept"], &captures["number"]);
        let grade = captures["grade"].to_string();

        let parsed = (
            captures["grade_points"].parse::<f64>(),
            captures["units"].parse::<u32>(),
            captures["total_points"].parse::<f64>(),
        );
        let (grade_points, units, total_points) = match parsed {
            (Ok(grade_points), Ok(units), Ok(total_points)) => {
                (grade_points, f64::from(units), total_points)
            }
            _ => {
                stats.lines_skipped += 1;
                debug!(line_no, line = %line, "skipping official line with unparseable numbers");
                continue;
            }
        };

        let grade_points = if is_non_gpa_grade(&grade) || grade == IN_PROGRESS_GRADE {
            0.0
        } else {
            grade_points
        };

        check_units(stats, line_no, &course_code, units);

        let course_title = match parser.directory.title_for(&course_code) {
            Some(title) => title.to_string(),
            None => format!("Unknown Course ({course_code})"),
        };

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
