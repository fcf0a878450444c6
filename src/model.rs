use serde::{Deserialize, Serialize};

/// One course row recovered from a transcript or loaded back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub course_code: String,
    pub course_title: String,
    pub grade: String,
    pub grade_points: f64,
    pub units: f64,
    pub total_points: f64,
}

/// Ordered course rows. An empty table is a valid result, not an absence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CourseTable {
    rows: Vec<CourseRecord>,
}

impl CourseTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<CourseRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[CourseRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentRow {
    pub student_id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub major: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestPaths {
    pub data_root: String,
    pub input_path: String,
    pub db_path: String,
    pub course_names_path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestCounts {
    pub pdf_bytes: usize,
    pub text_chars: usize,
    pub lines_scanned: usize,
    pub lines_prefiltered: usize,
    pub lines_matched: usize,
    pub lines_skipped: usize,
    pub outlier_unit_records: usize,
    pub records_dropped: usize,
    pub records_persisted: usize,
    pub directory_entries: usize,
}

/// Written for every ingest run, including runs whose text extraction failed.
#[derive(Debug, Clone, Serialize)]
pub struct IngestRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub db_schema_version: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub student_email: String,
    pub student_id: Option<i64>,
    pub backend: String,
    pub dialect: Option<String>,
    pub source_sha256: Option<String>,
    pub paths: IngestPaths,
    pub counts: IngestCounts,
    pub warnings: Vec<String>,
}
