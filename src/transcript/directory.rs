use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::normalize::is_canonical_course_code;

/// Course code to canonical title, read once from a `CODE - Title` list.
#[derive(Debug, Clone, Default)]
pub struct CourseDirectory {
    titles: HashMap<String, String>,
}

impl CourseDirectory {
    /// Loads the directory file. A missing file yields an empty directory.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "course name directory missing; titles will fall back to placeholders"
                );
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(error).with_context(|| {
                    format!("failed to read course name directory {}", path.display())
                });
            }
        };

        let directory = Self::parse(&raw);
        info!(
            path = %path.display(),
            entries = directory.len(),
            "loaded course name directory"
        );
        Ok(directory)
    }

    pub fn parse(raw: &str) -> Self {
        let mut titles = HashMap::new();

        for (index, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_directory_line(line) {
                Some((code, title)) => {
                    titles.insert(code, title);
                }
                None => {
                    warn!(line_no = index + 1, line = %line, "skipping malformed directory line");
                }
            }
        }

        Self { titles }
    }

    #[cfg(test)]
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            titles: entries
                .into_iter()
                .map(|(code, title)| (code.to_string(), title.to_string()))
                .collect(),
        }
    }

    pub fn title_for(&self, course_code: &str) -> Option<&str> {
        self.titles.get(course_code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

fn parse_directory_line(line: &str) -> Option<(String, String)> {
    let (code, title) = line.split_once(" - ")?;
    let code = code.split_whitespace().collect::<Vec<_>>().join(" ");
    let title = title.trim();

    if !is_canonical_course_code(&code) || title.is_empty() {
        return None;
    }

    Some((code, title.to_string()))
}
