use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::transcript::TextBackend;

#[derive(Parser, Debug)]
#[command(
    name = "transcript-ingest",
    version,
    about = "Academic transcript ingestion and degree-progress tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a transcript and print the normalized course records.
    Parse(ParseArgs),
    /// Parse a transcript and replace the stored records for a student; a
    /// transcript with no course data leaves stored records unchanged.
    Ingest(IngestArgs),
    /// Print the stored course records for a student.
    Records(RecordsArgs),
    /// Summarize degree progress for a student.
    Progress(ProgressArgs),
    Status(StatusArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum BackendArg {
    Native,
    Pdftotext,
}

impl From<BackendArg> for TextBackend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Native => Self::Native,
            BackendArg::Pdftotext => Self::Pdftotext,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    #[arg(long, default_value = ".cache/transcripts")]
    pub data_root: PathBuf,

    /// Transcript PDF, or plain text when --text-input is set.
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, default_value_t = false)]
    pub text_input: bool,

    #[arg(long)]
    pub course_names: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = BackendArg::Native)]
    pub backend: BackendArg,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[arg(long, default_value = ".cache/transcripts")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub major: Option<String>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub course_names: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = BackendArg::Native)]
    pub backend: BackendArg,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RecordsArgs {
    #[arg(long, default_value = ".cache/transcripts")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub email: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ProgressArgs {
    #[arg(long, default_value = ".cache/transcripts")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Units per major (`Major,Total Units Required`).
    #[arg(long)]
    pub requirements: Option<PathBuf>,

    /// Required courses (`DEPARTMENT,COURSE_NUMBER,CATEGORY`).
    #[arg(long)]
    pub course_requirements: Option<PathBuf>,

    #[arg(long)]
    pub email: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/transcripts")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}
