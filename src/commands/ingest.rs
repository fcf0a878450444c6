use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::output::{
    NO_COURSE_DATA_MESSAGE, READ_FAILURE_MESSAGE, write_course_rows, write_json_response,
    write_message,
};
use crate::cli::IngestArgs;
use crate::model::{CourseTable, IngestCounts, IngestPaths, IngestRunManifest};
use crate::store::{DB_SCHEMA_VERSION, open_store, replace_student_records, upsert_student};
use crate::transcript::{
    CourseDirectory, GradeScale, TextBackend, TranscriptDialect, TranscriptOutcome,
    TranscriptParser, extract_text_from_path,
};
use crate::util::{
    normalize_email, now_utc_string, sha256_bytes, utc_compact_string, write_json_pretty,
};

#[derive(Debug, Serialize)]
struct IngestResponse<'a> {
    status: &'static str,
    message: Option<&'static str>,
    run_id: &'a str,
    student_email: &'a str,
    student_id: Option<i64>,
    dialect: TranscriptDialect,
    records_persisted: usize,
    records: &'a CourseTable,
}

pub fn run(args: IngestArgs) -> Result<()> {
    let started_ts = Utc::now();
    let run_id = format!("run-{}", utc_compact_string(started_ts));
    let email = normalize_email(&args.email);
    let backend = TextBackend::from(args.backend);

    let data_root = args.data_root.clone();
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| data_root.join("transcripts.sqlite"));
    let course_names_path = args
        .course_names
        .clone()
        .unwrap_or_else(|| data_root.join("course_names.txt"));
    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        data_root.join("manifests").join(format!(
            "ingest_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });

    let mut manifest = IngestRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        db_schema_version: DB_SCHEMA_VERSION.to_string(),
        status: "running".to_string(),
        started_at: now_utc_string(),
        updated_at: String::new(),
        student_email: email.clone(),
        student_id: None,
        backend: backend.as_str().to_string(),
        dialect: None,
        source_sha256: None,
        paths: IngestPaths {
            data_root: data_root.display().to_string(),
            input_path: args.input.display().to_string(),
            db_path: db_path.display().to_string(),
            course_names_path: course_names_path.display().to_string(),
        },
        counts: IngestCounts::default(),
        warnings: Vec::new(),
    };

    info!(
        run_id = %run_id,
        input = %args.input.display(),
        email = %email,
        backend = backend.as_str(),
        "starting transcript ingest"
    );

    let scale = GradeScale::standard();
    let directory = CourseDirectory::load(&course_names_path)?;
    let parser = TranscriptParser::new(&scale, &directory)?;
    info!(grades = scale.len(), courses = directory.len(), "lookup tables ready");
    manifest.counts.directory_entries = directory.len();
    if directory.is_empty() {
        manifest.warnings.push(format!(
            "course name directory {} is empty or missing",
            course_names_path.display()
        ));
    }

    let (bytes, text) = match extract_text_from_path(&args.input, backend) {
        Ok(extracted) => extracted,
        Err(error) => {
            warn!(run_id = %run_id, error = %error, "text extraction failed");
            manifest.status = "failed".to_string();
            manifest.warnings.push(error.to_string());
            finish_manifest(&manifest_path, &mut manifest)?;
            return Err(error).context(READ_FAILURE_MESSAGE);
        }
    };
    manifest.source_sha256 = Some(sha256_bytes(&bytes));
    manifest.counts.pdf_bytes = bytes.len();
    manifest.counts.text_chars = text.chars().count();
    drop(bytes);

    let outcome = parser.parse_text(&text);
    let status = outcome.status();

    let (student_id, records_persisted) = match &outcome {
        TranscriptOutcome::Courses(transcript) => {
            let mut connection = open_store(&db_path)?;
            let student_id = upsert_student(
                &connection,
                &email,
                args.full_name.as_deref(),
                args.major.as_deref(),
            )?;
            let persisted =
                replace_student_records(&mut connection, student_id, transcript.table.rows())?;
            (Some(student_id), persisted)
        }
        TranscriptOutcome::NoCourseData(_) => {
            warn!(
                email = %email,
                "transcript produced no course data; stored records left unchanged"
            );
            manifest.warnings.push(NO_COURSE_DATA_MESSAGE.to_string());
            (None, 0)
        }
    };

    let transcript = outcome.transcript();
    if transcript.stats.outlier_unit_records > 0 {
        manifest.warnings.push(format!(
            "{} records have units outside the expected range",
            transcript.stats.outlier_unit_records
        ));
    }

    manifest.status = status.to_string();
    manifest.student_id = student_id;
    manifest.dialect = Some(transcript.dialect.as_str().to_string());
    manifest.counts.lines_scanned = transcript.stats.lines_scanned;
    manifest.counts.lines_prefiltered = transcript.stats.lines_prefiltered;
    manifest.counts.lines_matched = transcript.stats.lines_matched;
    manifest.counts.lines_skipped = transcript.stats.lines_skipped;
    manifest.counts.outlier_unit_records = transcript.stats.outlier_unit_records;
    manifest.counts.records_dropped = transcript.records_dropped;
    manifest.counts.records_persisted = records_persisted;
    finish_manifest(&manifest_path, &mut manifest)?;
    info!(run_id = %run_id, status, records_persisted, "ingest completed");

    if args.json {
        return write_json_response(&IngestResponse {
            status,
            message: student_id.is_none().then_some(NO_COURSE_DATA_MESSAGE),
            run_id: &run_id,
            student_email: &email,
            student_id,
            dialect: transcript.dialect,
            records_persisted,
            records: &transcript.table,
        });
    }

    match &outcome {
        TranscriptOutcome::NoCourseData(_) => write_message(NO_COURSE_DATA_MESSAGE),
        TranscriptOutcome::Courses(transcript) => write_course_rows(
            &format!(
                "Stored {} courses for {} (dialect: {})",
                records_persisted,
                email,
                transcript.dialect.as_str()
            ),
            transcript.table.rows(),
        ),
    }
}

fn finish_manifest(path: &Path, manifest: &mut IngestRunManifest) -> Result<()> {
    manifest.updated_at = now_utc_string();
    write_json_pretty(path, manifest)?;
    info!(path = %path.display(), status = %manifest.status, "wrote ingest run manifest");
    Ok(())
}
