use super::grade_scale::is_non_gpa_grade;
use super::normalize::is_canonical_course_code;
use super::*;

fn scale() -> GradeScale {
    GradeScale::standard()
}

fn directory() -> CourseDirectory {
    CourseDirectory::from_entries([
        ("CSEN 140", "Machine Learning and Data Mining"),
        ("MATH 14L", "Calculus Lab"),
    ])
}

fn parse(text: &str, directory: &CourseDirectory) -> TranscriptOutcome {
    let scale = scale();
    let parser = TranscriptParser::new(&scale, directory).unwrap();
    parser.parse_text(text)
}

const UNOFFICIAL_SAMPLE: &str = "\
Santa Clara University Unofficial Transcript
Beginning of Undergraduate Record
Fall 2023
CSEN 10 Introduction to Programming 4.000 4.000 B+ 0.000
MATH 11 Calculus and Analytic Geometry I 4.000 4.000 A- 14.800
ENGL 1A Critical Thinking and Writing 4.000 4.000 P 0.000
COEN 19 Discrete Mathematics 4.000 0.000 W 0.000
Term GPA 3.500 Term Totals 16.000 12.000 42.000
Page 1 of 2
";

const OFFICIAL_SAMPLE: &str = "\
Office of the Registrar
Degree requirement satisfied - Core Engineering and CSEN 140 - Machine Learning A 4.000 4 16.000
Core Pathway - Applied Math and MATH 14L - Lab B 3.000 1 3.000
Elective - Seminar and ELEN 50 - Circuits In Progress 0.000 4 0.000
Narrative text with CSEN 140 but no grade fields
";

#[test]
fn classifier_detects_unofficial_marker_case_insensitively() {
    assert_eq!(classify("UNOFFICIAL TRANSCRIPT\n"), TranscriptDialect::Unofficial);
    assert_eq!(classify("... unofficial transcript ..."), TranscriptDialect::Unofficial);
}

#[test]
fn classifier_falls_back_to_official() {
    assert_eq!(classify(""), TranscriptDialect::Official);
    assert_eq!(classify("Transcript of Records"), TranscriptDialect::Official);
    assert_eq!(classify("Unofficial\nTranscript"), TranscriptDialect::Official);
}

#[test]
fn classifier_is_a_pure_function_of_text() {
    for text in [UNOFFICIAL_SAMPLE, OFFICIAL_SAMPLE, ""] {
        assert_eq!(classify(text), classify(text));
    }
}

#[test]
fn unofficial_scenario_line_computes_points_from_scale() {
    let text = "Unofficial Transcript\nCSEN 10 Introduction to Programming 4.000 4.000 B+ 0.000\n";
    let outcome = parse(text, &directory());
    let transcript = outcome.transcript();

    assert_eq!(transcript.dialect, TranscriptDialect::Unofficial);
    assert_eq!(
        transcript.table.rows(),
        &[CourseRecord {
            course_code: "CSEN 10".to_string(),
            course_title: "Introduction to Programming".to_string(),
            grade: "B+".to_string(),
            grade_points: 3.3,
            units: 4.0,
            total_points: 13.2,
        }]
    );
}

#[test]
fn unofficial_non_gpa_grades_earn_zero_total_points() {
    let outcome = parse(UNOFFICIAL_SAMPLE, &directory());
    let rows = outcome.transcript().table.rows();

    let codes = rows.iter().map(|row| row.course_code.as_str()).collect::<Vec<_>>();
    assert_eq!(codes, vec!["CSEN 10", "MATH 11", "ENGL 1A", "COEN 19"]);

    for row in rows.iter().filter(|row| is_non_gpa_grade(&row.grade)) {
        assert_eq!(row.total_points, 0.0, "{} should earn no points", row.course_code);
    }
    assert_eq!(rows[1].total_points, 14.8);
}

#[test]
fn unofficial_skips_short_lines_regardless_of_content() {
    let text = "Unofficial Transcript\nAB 1 Xyz 1 1 A 4\n";
    assert!("AB 1 Xyz 1 1 A 4".len() < 20);

    let outcome = parse(text, &directory());
    assert!(matches!(outcome, TranscriptOutcome::NoCourseData(_)));
    assert_eq!(outcome.transcript().stats.lines_prefiltered, 2);
}

#[test]
fn unofficial_keeps_outlier_units_with_warning() {
    let text = "Unofficial Transcript\nPHYS 31 Physics Research Seminar 12.000 12.000 A 48.000\n";
    let outcome = parse(text, &directory());
    let transcript = outcome.transcript();

    assert_eq!(transcript.table.len(), 1);
    assert_eq!(transcript.table.rows()[0].units, 12.0);
    assert_eq!(transcript.stats.outlier_unit_records, 1);
}

#[test]
fn official_unparseable_numbers_skip_only_that_line() {
    let text = "\
Core - Programming and CSEN 10 - Intro A 4..0 4 16.000
Core - Data Structures and CSEN 11 - Lists A 4.000 99999999999 16.000
Core - Abstract Data Types and CSEN 12 - Trees B 3.000 4 12.000
";
    let outcome = parse(text, &CourseDirectory::default());
    let transcript = outcome.transcript();

    assert_eq!(transcript.dialect, TranscriptDialect::Official);
    assert_eq!(transcript.stats.lines_scanned, 3);
    assert_eq!(transcript.stats.lines_matched, 3);
    assert_eq!(transcript.stats.lines_skipped, 2);
    let codes = transcript
        .table
        .rows()
        .iter()
        .map(|row| row.course_code.as_str())
        .collect::<Vec<_>>();
    assert_eq!(codes, vec!["CSEN 12"]);
}

#[test]
fn unofficial_unparseable_units_skip_only_that_line() {
    let text = "\
Unofficial Transcript
CSEN 12 Abstract Data Types 4..0 4..0 A 16.000
CSEN 20 Embedded Systems 4.000 4.000 A 16.000
";
    let outcome = parse(text, &directory());
    let transcript = outcome.transcript();

    assert_eq!(transcript.stats.lines_skipped, 1);
    assert_eq!(transcript.table.len(), 1);
    assert_eq!(transcript.table.rows()[0].course_code, "CSEN 20");
}

#[test]
fn official_scenario_line_uses_directory_or_placeholder_title() {
    let line = "...and CSEN 140 - Machine Learning A 4.000 4 16.000";

    let with_directory = parse(line, &directory());
    let row = &with_directory.transcript().table.rows()[0];
    assert_eq!(with_directory.transcript().dialect, TranscriptDialect::Official);
    assert_eq!(row.course_code, "CSEN 140");
    assert_eq!(row.course_title, "Machine Learning and Data Mining");
    assert_eq!(row.grade, "A");
    assert_eq!(row.grade_points, 4.0);
    assert_eq!(row.units, 4.0);
    assert_eq!(row.total_points, 16.0);

    let without_directory = parse(line, &CourseDirectory::default());
    assert_eq!(
        without_directory.transcript().table.rows()[0].course_title,
        "Unknown Course (CSEN 140)"
    );
}

#[test]
fn official_in_progress_and_non_gpa_grades_have_zero_grade_points() {
    let outcome = parse(OFFICIAL_SAMPLE, &directory());
    let rows = outcome.transcript().table.rows();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].course_code, "MATH 14L");
    assert_eq!(rows[1].course_title, "Calculus Lab");
    assert_eq!(rows[2].grade, "In Progress");
    assert_eq!(rows[2].grade_points, 0.0);
    assert_eq!(rows[2].course_title, "Unknown Course (ELEN 50)");
}

#[test]
fn official_rows_without_trailing_fields_are_ignored() {
    let text = "Satisfies Core - Writing and CSEN 140 - Machine Learning\nA 4.0 4 16.0\n";
    let outcome = parse(text, &directory());
    assert!(matches!(outcome, TranscriptOutcome::NoCourseData(_)));
    assert_eq!(outcome.transcript().stats.lines_matched, 0);
}

#[test]
fn text_without_course_lines_is_empty_not_an_error() {
    for text in ["", "Unofficial Transcript\n", "Just some prose\nwith lines\n"] {
        let outcome = parse(text, &directory());
        assert!(matches!(outcome, TranscriptOutcome::NoCourseData(_)));
        assert!(outcome.transcript().table.is_empty());
        assert_eq!(outcome.status(), "no_course_data");
    }
}

#[test]
fn emitted_records_satisfy_code_and_title_invariants() {
    for text in [UNOFFICIAL_SAMPLE, OFFICIAL_SAMPLE] {
        let outcome = parse(text, &directory());
        for row in outcome.transcript().table.rows() {
            assert!(is_canonical_course_code(&row.course_code), "{}", row.course_code);
            assert!(row.course_title.trim().chars().count() > 3, "{}", row.course_title);
        }
    }
}

#[test]
fn parsing_is_deterministic() {
    let first = parse(UNOFFICIAL_SAMPLE, &directory()).transcript().clone();
    let second = parse(UNOFFICIAL_SAMPLE, &directory()).transcript().clone();
    assert_eq!(first.table, second.table);
    assert_eq!(first.stats, second.stats);
}

#[test]
fn normalizer_drops_short_titles_and_bad_codes_in_order() {
    let record = |code: &str, title: &str| CourseRecord {
        course_code: code.to_string(),
        course_title: title.to_string(),
        grade: "A".to_string(),
        grade_points: 4.0,
        units: 4.04,
        total_points: 16.16,
    };

    let (table, dropped) = normalize_records(vec![
        record("CSEN 140", "  Machine Learning  "),
        record("CSEN 141", "Lab"),
        record("csen 142", "Lowercase Code"),
        record("MATH 14L", "Calculus Lab"),
    ]);

    assert_eq!(dropped, 2);
    let rows = table.rows();
    assert_eq!(rows[0].course_title, "Machine Learning");
    assert_eq!(rows[0].units, 4.0);
    assert_eq!(rows[0].total_points, 16.2);
    assert_eq!(rows[1].course_code, "MATH 14L");
}

#[test]
fn normalizer_returns_empty_table_for_no_candidates() {
    let (table, dropped) = normalize_records(Vec::new());
    assert!(table.is_empty());
    assert_eq!(dropped, 0);
}

#[test]
fn canonical_course_code_shape() {
    for code in ["CSEN 140", "MATH 14L", "EN 1", "ABCD 999Z"] {
        assert!(is_canonical_course_code(code), "{code}");
    }
    for code in [
        "C 1",
        "ABCDE 1",
        "CSEN 1400",
        "CSEN  140",
        "CSEN140",
        "CSEN 14LL",
        "CSEN 14l",
        "CSEN ",
    ] {
        assert!(!is_canonical_course_code(code), "{code}");
    }
}

#[test]
fn directory_parse_skips_malformed_lines() {
    let directory = CourseDirectory::parse(
        "CSEN 140 - Machine Learning and Data Mining\n\
         not a directory line\n\
         \n\
         MATH  11 - Calculus I\n\
         BAD - Title\n",
    );
    assert_eq!(directory.len(), 2);
    assert_eq!(directory.title_for("MATH 11"), Some("Calculus I"));
    assert_eq!(directory.title_for("CSEN 999"), None);
}

#[test]
fn directory_load_of_missing_file_is_empty() {
    let path = std::env::temp_dir().join("transcript_ingest_no_such_course_names.txt");
    let directory = CourseDirectory::load(&path).unwrap();
    assert!(directory.is_empty());
}

#[test]
fn grade_scale_lookups() {
    let scale = scale();
    assert_eq!(scale.points_for("A"), Some(4.0));
    assert_eq!(scale.points_for("B+"), Some(3.3));
    assert_eq!(scale.points_for("Z"), None);
    assert!(counts_toward_gpa(&scale, "F"));
    assert!(!counts_toward_gpa(&scale, "CR"));
    assert!(!counts_toward_gpa(&scale, "In Progress"));
}
