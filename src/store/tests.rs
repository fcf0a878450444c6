use super::*;

fn memory_store() -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    ensure_schema(&connection).unwrap();
    connection
}

fn record(code: &str, title: &str, grade: &str, units: f64, total_points: f64) -> CourseRecord {
    CourseRecord {
        course_code: code.to_string(),
        course_title: title.to_string(),
        grade: grade.to_string(),
        grade_points: if units > 0.0 { total_points / units } else { 0.0 },
        units,
        total_points,
    }
}

#[test]
fn ensure_schema_is_idempotent_and_records_version() {
    let connection = memory_store();
    ensure_schema(&connection).unwrap();

    let version: String = connection
        .query_row(
            "SELECT value FROM metadata WHERE key = 'db_schema_version'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(version, DB_SCHEMA_VERSION);
}

#[test]
fn upsert_student_normalizes_email_and_keeps_profile_fields() {
    let connection = memory_store();

    let first = upsert_student(
        &connection,
        " Ada@Example.edu ",
        Some("Ada L"),
        Some("Computer Science"),
    )
    .unwrap();
    let second = upsert_student(&connection, "ada@example.edu", None, None).unwrap();
    assert_eq!(first, second);

    let student = find_student(&connection, "ADA@example.edu").unwrap().unwrap();
    assert_eq!(student.email, "ada@example.edu");
    assert_eq!(student.full_name.as_deref(), Some("Ada L"));
    assert_eq!(student.major.as_deref(), Some("Computer Science"));
    assert_eq!(count_rows(&connection, "SELECT COUNT(*) FROM students").unwrap(), 1);
}

#[test]
fn replace_student_records_discards_previous_batch() {
    let mut connection = memory_store();
    let student_id = upsert_student(&connection, "ada@example.edu", None, None).unwrap();

    let first_batch = vec![
        record("CSEN 10", "Introduction to Programming", "A", 4.0, 16.0),
        record("MATH 11", "Calculus I", "B", 4.0, 12.0),
    ];
    replace_student_records(&mut connection, student_id, &first_batch).unwrap();

    let second_batch = vec![record("CSEN 140", "Machine Learning", "A", 4.0, 16.0)];
    replace_student_records(&mut connection, student_id, &second_batch).unwrap();

    let table = find_records_by_email(&connection, "ada@example.edu").unwrap();
    assert_eq!(table.rows(), second_batch.as_slice());
}

#[test]
fn replace_only_touches_the_given_student() {
    let mut connection = memory_store();
    let ada = upsert_student(&connection, "ada@example.edu", None, None).unwrap();
    let grace = upsert_student(&connection, "grace@example.edu", None, None).unwrap();

    replace_student_records(
        &mut connection,
        ada,
        &[record("CSEN 10", "Introduction to Programming", "A", 4.0, 16.0)],
    )
    .unwrap();
    replace_student_records(
        &mut connection,
        grace,
        &[record("COEN 20", "Embedded Systems", "B", 4.0, 12.0)],
    )
    .unwrap();
    replace_student_records(&mut connection, grace, &[]).unwrap();

    assert_eq!(find_records_by_email(&connection, "ada@example.edu").unwrap().len(), 1);
    assert!(find_records_by_email(&connection, "grace@example.edu").unwrap().is_empty());
}

#[test]
fn stored_rows_keep_extraction_order() {
    let mut connection = memory_store();
    let student_id = upsert_student(&connection, "ada@example.edu", None, None).unwrap();

    let batch = vec![
        record("MATH 53", "Linear Algebra", "A-", 4.0, 14.8),
        record("CSEN 10", "Introduction to Programming", "P", 4.0, 0.0),
        record("AMTH 108", "Probability and Statistics", "B+", 4.0, 13.2),
    ];
    replace_student_records(&mut connection, student_id, &batch).unwrap();

    let table = load_student_records(&connection, student_id).unwrap();
    let codes = table
        .rows()
        .iter()
        .map(|row| row.course_code.as_str())
        .collect::<Vec<_>>();
    assert_eq!(codes, vec!["MATH 53", "CSEN 10", "AMTH 108"]);
}

#[test]
fn unknown_email_yields_empty_table() {
    let connection = memory_store();
    let table = find_records_by_email(&connection, "nobody@example.edu").unwrap();
    assert!(table.is_empty());
    assert!(find_student(&connection, "nobody@example.edu").unwrap().is_none());
}

#[test]
fn known_student_without_records_yields_empty_table() {
    let connection = memory_store();
    upsert_student(&connection, "ada@example.edu", None, None).unwrap();
    assert!(find_records_by_email(&connection, "ada@example.edu").unwrap().is_empty());
}
