use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::model::CourseRecord;

pub(super) fn write_json_response<T: Serialize>(response: &T) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, response)
        .context("failed to serialize json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

pub(super) fn write_course_rows(header: &str, rows: &[CourseRecord]) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "{header}")?;
    writeln!(output, "Courses: {}", rows.len())?;

    for (index, row) in rows.iter().enumerate() {
        writeln!(
            output,
            "{}.\t{}\t{}\t{}\tgrade_points={:.1}\tunits={:.1}\ttotal_points={:.1}",
            index + 1,
            row.course_code,
            row.course_title,
            row.grade,
            row.grade_points,
            row.units,
            row.total_points,
        )?;
    }

    output.flush()?;
    Ok(())
}

pub(super) fn write_message(message: &str) -> Result<()> {
    let mut output = io::stdout().lock();
    writeln!(output, "{message}")?;
    Ok(())
}

pub(super) const READ_FAILURE_MESSAGE: &str = "could not read file";
pub(super) const NO_COURSE_DATA_MESSAGE: &str = "no course data found";
