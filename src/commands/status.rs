use anyhow::Result;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::store::{count_rows, open_store};

pub fn run(args: StatusArgs) -> Result<()> {
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| args.data_root.join("transcripts.sqlite"));

    info!(data_root = %args.data_root.display(), "status requested");

    if !db_path.exists() {
        warn!(path = %db_path.display(), "database file missing");
        return Ok(());
    }

    let connection = open_store(&db_path)?;
    let students = count_rows(&connection, "SELECT COUNT(*) FROM students").unwrap_or(0);
    let records = count_rows(&connection, "SELECT COUNT(*) FROM transcript_courses").unwrap_or(0);
    let students_with_records = count_rows(
        &connection,
        "SELECT COUNT(DISTINCT student_id) FROM transcript_courses",
    )
    .unwrap_or(0);

    info!(
        path = %db_path.display(),
        students,
        students_with_records,
        records,
        "database status"
    );

    Ok(())
}
