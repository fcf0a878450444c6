use std::fs;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use super::output::{
    NO_COURSE_DATA_MESSAGE, READ_FAILURE_MESSAGE, write_course_rows, write_json_response,
    write_message,
};
use crate::cli::ParseArgs;
use crate::model::CourseTable;
use crate::transcript::{
    CourseDirectory, GradeScale, LineStats, TextBackend, TranscriptDialect, TranscriptOutcome,
    TranscriptParser,
};

#[derive(Debug, Serialize)]
struct ParseResponse<'a> {
    status: &'static str,
    message: Option<&'static str>,
    dialect: TranscriptDialect,
    returned: usize,
    records_dropped: usize,
    stats: &'a LineStats,
    records: &'a CourseTable,
}

pub fn run(args: ParseArgs) -> Result<()> {
    let course_names_path = args
        .course_names
        .clone()
        .unwrap_or_else(|| args.data_root.join("course_names.txt"));

    let scale = GradeScale::standard();
    let directory = CourseDirectory::load(&course_names_path)?;
    let parser = TranscriptParser::new(&scale, &directory)?;
    let backend = TextBackend::from(args.backend);

    info!(
        input = %args.input.display(),
        backend = backend.as_str(),
        text_input = args.text_input,
        "parsing transcript"
    );

    let outcome = if args.text_input {
        let text = fs::read_to_string(&args.input)
            .with_context(|| format!("failed to read {}", args.input.display()))
            .context(READ_FAILURE_MESSAGE)?;
        parser.parse_text(&text)
    } else {
        let bytes = fs::read(&args.input)
            .with_context(|| format!("failed to read {}", args.input.display()))
            .context(READ_FAILURE_MESSAGE)?;
        parser
            .parse_pdf(&bytes, backend)
            .context(READ_FAILURE_MESSAGE)?
    };

    report_outcome(&outcome, args.json)
}

fn report_outcome(outcome: &TranscriptOutcome, json: bool) -> Result<()> {
    let transcript = outcome.transcript();

    if json {
        return write_json_response(&ParseResponse {
            status: outcome.status(),
            message: matches!(outcome, TranscriptOutcome::NoCourseData(_))
                .then_some(NO_COURSE_DATA_MESSAGE),
            dialect: transcript.dialect,
            returned: transcript.table.len(),
            records_dropped: transcript.records_dropped,
            stats: &transcript.stats,
            records: &transcript.table,
        });
    }

    match outcome {
        TranscriptOutcome::NoCourseData(_) => write_message(NO_COURSE_DATA_MESSAGE),
        TranscriptOutcome::Courses(transcript) => write_course_rows(
            &format!("Dialect: {}", transcript.dialect.as_str()),
            transcript.table.rows(),
        ),
    }
}
