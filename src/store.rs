//! SQLite persistence for students and their transcript course rows.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{info, warn};

use crate::model::{CourseRecord, CourseTable, StudentRow};
use crate::util::{ensure_directory, normalize_email, now_utc_string};

pub const DB_SCHEMA_VERSION: &str = "0.1.0";

#[cfg(test)]
mod tests;

pub fn open_store(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }

    let connection = Connection::open(db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    Ok(connection)
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS students (
              student_id INTEGER PRIMARY KEY AUTOINCREMENT,
              email TEXT NOT NULL UNIQUE,
              full_name TEXT,
              major TEXT,
              created_at TEXT NOT NULL,
              updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS transcript_courses (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              student_id INTEGER NOT NULL,
              seq INTEGER NOT NULL,
              course_code TEXT NOT NULL,
              course_title TEXT NOT NULL,
              grade TEXT,
              grade_points REAL,
              units REAL,
              total_points REAL,
              FOREIGN KEY(student_id) REFERENCES students(student_id)
            );

            CREATE INDEX IF NOT EXISTS idx_transcript_courses_student
              ON transcript_courses(student_id, seq);
            ",
        )
        .context("failed to initialize transcript schema")?;

    let now = now_utc_string();
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [now],
    )?;

    Ok(())
}

/// Creates the student if needed and returns its id. Provided profile fields
/// overwrite stored ones; omitted fields are left alone.
pub fn upsert_student(
    connection: &Connection,
    email: &str,
    full_name: Option<&str>,
    major: Option<&str>,
) -> Result<i64> {
    let email = normalize_email(email);
    let now = now_utc_string();

    connection
        .execute(
            "
            INSERT INTO students(email, full_name, major, created_at, updated_at)
            VALUES(?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(email) DO UPDATE SET
              full_name=COALESCE(excluded.full_name, students.full_name),
              major=COALESCE(excluded.major, students.major),
              updated_at=excluded.updated_at
            ",
            params![email, full_name, major, now],
        )
        .with_context(|| format!("failed to upsert student {email}"))?;

    let student_id = connection.query_row(
        "SELECT student_id FROM students WHERE email = ?1",
        [&email],
        |row| row.get(0),
    )?;
    Ok(student_id)
}

pub fn find_student(connection: &Connection, email: &str) -> Result<Option<StudentRow>> {
    let email = normalize_email(email);
    let student = connection
        .query_row(
            "SELECT student_id, email, full_name, major FROM students WHERE email = ?1",
            [&email],
            |row| {
                Ok(StudentRow {
                    student_id: row.get(0)?,
                    email: row.get(1)?,
                    full_name: row.get(2)?,
                    major: row.get(3)?,
                })
            },
        )
        .optional()
        .with_context(|| format!("failed to look up student {email}"))?;
    Ok(student)
}

/// Deletes every stored row for the student and inserts `records` in order,
/// inside one transaction.
pub fn replace_student_records(
    connection: &mut Connection,
    student_id: i64,
    records: &[CourseRecord],
) -> Result<usize> {
    let transaction = connection.transaction()?;

    let removed = transaction.execute(
        "DELETE FROM transcript_courses WHERE student_id = ?1",
        [student_id],
    )?;

    {
        let mut statement = transaction.prepare(
            "
            INSERT INTO transcript_courses(
              student_id, seq, course_code, course_title, grade, grade_points, units, total_points
            )
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )?;

        for (seq, record) in records.iter().enumerate() {
            statement.execute(params![
                student_id,
                seq as i64,
                record.course_code,
                record.course_title,
                record.grade,
                record.grade_points,
                record.units,
                record.total_points,
            ])?;
        }
    }

    transaction
        .commit()
        .with_context(|| format!("failed to commit records for student {student_id}"))?;

    info!(
        student_id,
        removed,
        inserted = records.len(),
        "replaced stored transcript records"
    );
    Ok(records.len())
}

pub fn load_student_records(connection: &Connection, student_id: i64) -> Result<CourseTable> {
    let mut statement = connection.prepare(
        "
        SELECT
          course_code,
          course_title,
          COALESCE(grade, ''),
          COALESCE(grade_points, 0.0),
          COALESCE(units, 0.0),
          COALESCE(total_points, 0.0)
        FROM transcript_courses
        WHERE student_id = ?1
        ORDER BY seq ASC
        ",
    )?;

    let mut rows = statement.query([student_id])?;
    let mut out = Vec::<CourseRecord>::new();

    while let Some(row) = rows.next()? {
        out.push(CourseRecord {
            course_code: row.get(0)?,
            course_title: row.get(1)?,
            grade: row.get(2)?,
            grade_points: row.get(3)?,
            units: row.get(4)?,
            total_points: row.get(5)?,
        });
    }

    Ok(CourseTable::from_rows(out))
}

/// Stored records for the student with this email. Unknown students and
/// students without records both produce an empty table.
pub fn find_records_by_email(connection: &Connection, email: &str) -> Result<CourseTable> {
    let Some(student) = find_student(connection, email)? else {
        warn!(email = %normalize_email(email), "no student found for email");
        return Ok(CourseTable::empty());
    };

    let table = load_student_records(connection, student.student_id)?;
    if table.is_empty() {
        warn!(
            email = %student.email,
            student_id = student.student_id,
            "student has no stored transcript records"
        );
    }
    Ok(table)
}

pub fn count_rows(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}
