use std::path::PathBuf;
use thiserror::Error;

pub type SortResult<T> = Result<T, SortError>;

#[derive(Error, Debug)]
pub enum SortError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Marker not found. Tried: {markers}")]
    MarkerNotFound { markers: String },

    #[error("Header row not found under start markers: {markers}")]
    HeaderNotFound { markers: String },

    #[error("Could not resolve column '{column}'. Tried aliases: {aliases}")]
    ColumnNotResolved { column: String, aliases: String },

    #[error("{0} is missing in Inputs")]
    MissingInput(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A file named {} already exists", .0.display())]
    NameCollision(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for SortError {
    fn from(err: tokio::task::JoinError) -> Self {
        SortError::Task(err.to_string())
    }
}
