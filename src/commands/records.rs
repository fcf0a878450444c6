use anyhow::Result;
use serde::Serialize;
use tracing::info;

use super::output::{NO_COURSE_DATA_MESSAGE, write_course_rows, write_json_response, write_message};
use crate::cli::RecordsArgs;
use crate::model::CourseTable;
use crate::store::{find_records_by_email, open_store};
use crate::util::normalize_email;

#[derive(Debug, Serialize)]
struct RecordsResponse<'a> {
    student_email: &'a str,
    returned: usize,
    records: &'a CourseTable,
}

pub fn run(args: RecordsArgs) -> Result<()> {
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| args.data_root.join("transcripts.sqlite"));
    let email = normalize_email(&args.email);

    let connection = open_store(&db_path)?;
    let table = find_records_by_email(&connection, &email)?;
    info!(email = %email, records = table.len(), "loaded stored transcript records");

    if args.json {
        return write_json_response(&RecordsResponse {
            student_email: &email,
            returned: table.len(),
            records: &table,
        });
    }

    if table.is_empty() {
        return write_message(NO_COURSE_DATA_MESSAGE);
    }
    write_course_rows(&format!("Student: {email}"), table.rows())
}
