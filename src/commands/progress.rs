use std::io::{self, Write};

use anyhow::{Result, bail};
use tracing::info;

use super::output::write_json_response;
use crate::cli::ProgressArgs;
use crate::progress::{CourseRequirements, DegreeRequirements, compute_progress};
use crate::store::{find_student, load_student_records, open_store};
use crate::transcript::GradeScale;
use crate::util::normalize_email;

pub fn run(args: ProgressArgs) -> Result<()> {
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| args.data_root.join("transcripts.sqlite"));
    let requirements_path = args
        .requirements
        .clone()
        .unwrap_or_else(|| args.data_root.join("degree_requirements.csv"));
    let course_requirements_path = args
        .course_requirements
        .clone()
        .unwrap_or_else(|| args.data_root.join("course_requirements.csv"));
    let email = normalize_email(&args.email);

    let connection = open_store(&db_path)?;
    let Some(student) = find_student(&connection, &email)? else {
        bail!("no student found with email {email}");
    };

    let table = load_student_records(&connection, student.student_id)?;
    let requirements = DegreeRequirements::load(&requirements_path)?;
    let courses = CourseRequirements::load(&course_requirements_path)?;
    let major = student.major.clone().unwrap_or_default();
    let progress = compute_progress(
        &table,
        &major,
        &requirements,
        &courses,
        &GradeScale::standard(),
    );

    info!(
        email = %email,
        completed_units = progress.completed_units,
        required_units = progress.required_units,
        completion_ratio = progress.completion_ratio,
        missing_courses = progress.requirements.missing_courses.len(),
        "computed degree progress"
    );

    if args.json {
        return write_json_response(&progress);
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "Student: {email}")?;
    writeln!(output, "Major: {}", progress.major)?;
    writeln!(
        output,
        "Units: completed={:.1} required={:.1} remaining={:.1} ({:.1}%)",
        progress.completed_units,
        progress.required_units,
        progress.remaining_units,
        progress.completion_ratio * 100.0
    )?;
    match progress.gpa {
        Some(gpa) => writeln!(output, "GPA: {gpa:.2} over {:.1} units", progress.gpa_units)?,
        None => writeln!(output, "GPA: n/a")?,
    }

    let status = &progress.requirements;
    writeln!(
        output,
        "Required courses: completed={} missing={}",
        status.completed_courses.len(),
        status.missing_courses.len()
    )?;
    for (category, summary) in &status.category_summary {
        writeln!(
            output,
            "  {category}: {}/{} remaining={} missing=[{}]",
            summary.completed,
            summary.total,
            summary.remaining,
            summary.missing_courses.join(", ")
        )?;
    }
    output.flush()?;
    Ok(())
}
