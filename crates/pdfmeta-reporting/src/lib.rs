use thiserror::Error;

pub mod export;
pub mod table;

pub use export::{
    ExportFormat, export, export_csv, export_filename, export_json, serialize_csv, write_export,
};
pub use table::{MetadataTable, build_table};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
