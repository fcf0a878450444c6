use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Utc;
use tracing::{debug, warn};

/// Where the text layer comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBackend {
    /// In-process `pdf-extract`.
    Native,
    /// Poppler's `pdftotext` on a temporary copy of the document.
    Pdftotext,
}

impl TextBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Pdftotext => "pdftotext",
        }
    }
}

/// Document-level failure to obtain a text layer. Aborts the whole batch.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("failed to read transcript file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("PDF text extraction failed: {0}")]
    TextLayer(String),

    #[error("PDF text extraction panicked (malformed document)")]
    Malformed,

    #[error("pdftotext failed: {0}")]
    Pdftotext(String),

    #[error("temporary copy of the PDF could not be written: {0}")]
    TempCopy(#[from] io::Error),
}

/// Reads a PDF from disk and returns its text stream. The file handle is
/// closed before text extraction starts.
pub fn extract_text_from_path(
    path: &Path,
    backend: TextBackend,
) -> Result<(Vec<u8>, String), ExtractionError> {
    let bytes = fs::read(path).map_err(|source| ExtractionError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let text = extract_text(&bytes, backend)?;
    Ok((bytes, text))
}

/// Converts PDF bytes into one text stream: each page's text in page order,
/// each followed by a newline.
pub fn extract_text(bytes: &[u8], backend: TextBackend) -> Result<String, ExtractionError> {
    let pages = match backend {
        TextBackend::Native => extract_pages_native(bytes)?,
        TextBackend::Pdftotext => extract_pages_with_pdftotext(bytes)?,
    };

    let empty_pages = pages.iter().filter(|page| page.trim().is_empty()).count();
    if empty_pages > 0 {
        warn!(
            backend = backend.as_str(),
            pages = pages.len(),
            empty_pages,
            "some pages produced no text"
        );
    }

    let text = join_pages(&pages);
    debug!(
        backend = backend.as_str(),
        pages = pages.len(),
        chars = text.len(),
        "extracted text layer"
    );
    Ok(text)
}

pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page.as_ref());
        text.push('\n');
    }
    text
}

fn extract_pages_native(bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(error)) => Err(ExtractionError::TextLayer(error.to_string())),
        Err(_) => Err(ExtractionError::Malformed),
    }
}

/// A uniquely named on-disk copy of the PDF, removed when dropped.
struct TempPdf {
    path: PathBuf,
}

impl TempPdf {
    fn write(bytes: &[u8]) -> io::Result<Self> {
        let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let path = std::env::temp_dir().join(format!(
            "transcript_ingest_{}_{}.pdf",
            std::process::id(),
            stamp
        ));
        fs::write(&path, bytes)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempPdf {
    fn drop(&mut self) {
        if let Err(error) = fs::remove_file(&self.path) {
            if error.kind() != io::ErrorKind::NotFound {
                warn!(
                    path = %self.path.display(),
                    error = %error,
                    "failed to remove temporary PDF copy"
                );
            }
        }
    }
}

fn extract_pages_with_pdftotext(bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let temp = TempPdf::write(bytes)?;

    let output = Command::new("pdftotext")
        .arg("-enc")
        .arg("UTF-8")
        .arg(temp.path())
        .arg("-")
        .output()
        .map_err(|error| {
            ExtractionError::Pdftotext(format!("failed to execute pdftotext: {error}"))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractionError::Pdftotext(format!(
            "non-zero exit status: {}",
            stderr.trim()
        )));
    }

    Ok(split_form_feed_pages(&String::from_utf8_lossy(&output.stdout)))
}

fn split_form_feed_pages(raw: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    while let Some(last_page) = pages.last() {
        if last_page.trim().is_empty() {
            pages.pop();
            continue;
        }
        break;
    }

    pages
}
