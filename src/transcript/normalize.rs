use tracing::debug;

use crate::model::{CourseRecord, CourseTable};
use crate::util::round1;

/// Titles this short are extraction noise.
const MIN_TITLE_CHARS: usize = 4;

/// `DEPT NUM[L]`: 2-4 uppercase letters, one space, 1-3 digits, optional
/// uppercase suffix letter.
pub fn is_canonical_course_code(code: &str) -> bool {
    let Some((dept, number)) = code.split_once(' ') else {
        return false;
    };

    if !(2..=4).contains(&dept.len()) || !dept.bytes().all(|b| b.is_ascii_uppercase()) {
        return false;
    }

    let digits = number.bytes().take_while(u8::is_ascii_digit).count();
    let suffix = &number.as_bytes()[digits..];
    (1..=3).contains(&digits)
        && match suffix {
            [] => true,
            [letter] => letter.is_ascii_uppercase(),
            _ => false,
        }
}

/// Final quality gate shared by every dialect. Keeps extraction order and
/// returns the number of dropped candidates alongside the table.
pub fn normalize_records(candidates: Vec<CourseRecord>) -> (CourseTable, usize) {
    let total = candidates.len();
    let mut rows = Vec::with_capacity(total);

    for mut record in candidates {
        if !is_canonical_course_code(&record.course_code) {
            debug!(course_code = %record.course_code, "dropping record with malformed course code");
            continue;
        }

        let title = record.course_title.trim();
        if title.chars().count() < MIN_TITLE_CHARS {
            debug!(
                course_code = %record.course_code,
                title = %title,
                "dropping record with short title"
            );
            continue;
        }

        record.course_title = title.to_string();
        record.grade_points = round1(record.grade_points);
        record.units = round1(record.units);
        record.total_points = round1(record.total_points);
        rows.push(record);
    }

    let dropped = total - rows.len();
    (CourseTable::from_rows(rows), dropped)
}
