use std::collections::HashMap;

/// Grades that earn no quality points and stay out of GPA computation.
pub const NON_GPA_GRADES: [&str; 4] = ["P", "CR", "W", "I"];

pub const IN_PROGRESS_GRADE: &str = "In Progress";

/// Letter grade to grade-point mapping.
#[derive(Debug, Clone)]
pub struct GradeScale {
    points: HashMap<String, f64>,
}

impl GradeScale {
    /// The institution's four-point scale.
    pub fn standard() -> Self {
        Self::from_pairs([
            ("A", 4.0),
            ("A-", 3.7),
            ("B+", 3.3),
            ("B", 3.0),
            ("B-", 2.7),
            ("C+", 2.3),
            ("C", 2.0),
            ("C-", 1.7),
            ("D+", 1.3),
            ("D", 1.0),
            ("D-", 0.7),
            ("F", 0.0),
            ("P", 0.0),
            ("CR", 0.0),
            ("W", 0.0),
            ("I", 0.0),
        ])
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self {
            points: pairs
                .into_iter()
                .map(|(grade, points)| (grade.to_string(), points))
                .collect(),
        }
    }

    pub fn points_for(&self, grade: &str) -> Option<f64> {
        self.points.get(grade).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

pub fn is_non_gpa_grade(grade: &str) -> bool {
    NON_GPA_GRADES.contains(&grade)
}

/// True for grades that count toward GPA: on the scale and not pass/credit/withdraw/incomplete.
pub fn counts_toward_gpa(scale: &GradeScale, grade: &str) -> bool {
    !is_non_gpa_grade(grade) && grade != IN_PROGRESS_GRADE && scale.points_for(grade).is_some()
}
