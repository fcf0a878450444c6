//! Degree progress computed from a student's course table.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::model::CourseTable;
use crate::transcript::{GradeScale, counts_toward_gpa};
use crate::util::{round1, round2};

pub const DEFAULT_REQUIRED_UNITS: f64 = 175.0;

/// Grades that earn no credit toward the degree.
const NO_CREDIT_GRADES: [&str; 3] = ["W", "I", "In Progress"];

#[derive(Debug, Deserialize)]
struct RequirementRow {
    #[serde(rename = "Major")]
    major: String,
    #[serde(rename = "Total Units Required")]
    total_units_required: f64,
}

/// Units required per major, keyed by lower-cased major name.
#[derive(Debug, Clone, Default)]
pub struct DegreeRequirements {
    units_by_major: HashMap<String, f64>,
}

impl DegreeRequirements {
    /// Loads `Major,Total Units Required` rows. A missing file yields no
    /// requirements, so every major uses the default.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "degree requirements file missing");
            return Ok(Self::default());
        }

        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let requirements = Self::from_reader(file)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        info!(
            path = %path.display(),
            majors = requirements.units_by_major.len(),
            "loaded degree requirements"
        );
        Ok(requirements)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut units_by_major = HashMap::new();
        for result in reader.deserialize::<RequirementRow>() {
            let row = result?;
            units_by_major.insert(row.major.to_lowercase(), row.total_units_required);
        }

        Ok(Self { units_by_major })
    }

    pub fn required_units(&self, major: &str) -> f64 {
        match self.units_by_major.get(&major.trim().to_lowercase()) {
            Some(units) => *units,
            None => {
                warn!(
                    major = %major,
                    fallback = DEFAULT_REQUIRED_UNITS,
                    "major not found in degree requirements"
                );
                DEFAULT_REQUIRED_UNITS
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CourseRequirementRow {
    #[serde(rename = "DEPARTMENT")]
    department: String,
    #[serde(rename = "COURSE_NUMBER")]
    course_number: String,
    #[serde(rename = "CATEGORY")]
    category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredCourse {
    pub course_code: String,
    pub category: String,
}

/// Courses the major requires, in file order, each tagged with a category.
#[derive(Debug, Clone, Default)]
pub struct CourseRequirements {
    courses: Vec<RequiredCourse>,
}

impl CourseRequirements {
    /// Loads `DEPARTMENT,COURSE_NUMBER,CATEGORY` rows. A missing file yields
    /// no required courses.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "course requirements file missing");
            return Ok(Self::default());
        }

        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let requirements = Self::from_reader(file)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        info!(
            path = %path.display(),
            courses = requirements.courses.len(),
            "loaded course requirements"
        );
        Ok(requirements)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut courses = Vec::new();
        for result in reader.deserialize::<CourseRequirementRow>() {
            let row = result?;
            courses.push(RequiredCourse {
                course_code: normalize_course_code(&format!(
                    "{} {}",
                    row.department, row.course_number
                )),
                category: row.category,
            });
        }

        Ok(Self { courses })
    }

    pub fn courses(&self) -> &[RequiredCourse] {
        &self.courses
    }
}

fn normalize_course_code(code: &str) -> String {
    code.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryProgress {
    pub completed: usize,
    pub total: usize,
    pub remaining: usize,
    pub missing_courses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequirementStatus {
    pub completed_courses: Vec<String>,
    pub missing_courses: Vec<String>,
    pub category_summary: BTreeMap<String, CategoryProgress>,
}

/// Matches required courses against the table by code. Rows graded W, I or
/// In Progress do not satisfy a requirement.
pub fn evaluate_requirements(
    table: &CourseTable,
    requirements: &CourseRequirements,
) -> RequirementStatus {
    let taken = table
        .rows()
        .iter()
        .filter(|row| !NO_CREDIT_GRADES.contains(&row.grade.as_str()))
        .map(|row| normalize_course_code(&row.course_code))
        .collect::<HashSet<_>>();

    let mut status = RequirementStatus::default();
    for course in requirements.courses() {
        let summary = status
            .category_summary
            .entry(course.category.clone())
            .or_default();
        summary.total += 1;

        if taken.contains(&course.course_code) {
            summary.completed += 1;
            status.completed_courses.push(course.course_code.clone());
        } else {
            summary.remaining += 1;
            summary.missing_courses.push(course.course_code.clone());
            status.missing_courses.push(course.course_code.clone());
        }
    }

    status
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreeProgress {
    pub major: String,
    pub course_count: usize,
    pub completed_units: f64,
    pub required_units: f64,
    pub remaining_units: f64,
    pub completion_ratio: f64,
    pub gpa_units: f64,
    pub gpa: Option<f64>,
    pub requirements: RequirementStatus,
}

pub fn compute_progress(
    table: &CourseTable,
    major: &str,
    requirements: &DegreeRequirements,
    courses: &CourseRequirements,
    scale: &GradeScale,
) -> DegreeProgress {
    let required_units = requirements.required_units(major);

    let mut completed_units = 0.0;
    let mut gpa_units = 0.0;
    let mut quality_points = 0.0;

    for row in table.rows() {
        if !NO_CREDIT_GRADES.contains(&row.grade.as_str()) {
            completed_units += row.units;
        }
        if counts_toward_gpa(scale, &row.grade) {
            gpa_units += row.units;
            quality_points += row.total_points;
        }
    }

    let remaining_units = (required_units - completed_units).max(0.0);
    let completion_ratio = if required_units > 0.0 {
        round2(completed_units / required_units)
    } else {
        0.0
    };
    let gpa = (gpa_units > 0.0).then(|| round2(quality_points / gpa_units));

    DegreeProgress {
        major: major.to_string(),
        course_count: table.len(),
        completed_units: round1(completed_units),
        required_units,
        remaining_units: round1(remaining_units),
        completion_ratio,
        gpa_units: round1(gpa_units),
        gpa,
        requirements: evaluate_requirements(table, courses),
    }
}
