pub mod ingest;
pub mod parse;
pub mod progress;
pub mod records;
pub mod status;

mod output;
