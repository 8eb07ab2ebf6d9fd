use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Missing required environment variable: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid value for {name}: {details}")]
    InvalidConfig { name: &'static str, details: String },

    #[error("Invalid cron expression '{expr}': {details}")]
    InvalidSchedule { expr: String, details: String },

    #[error("Store query failed: {0}")]
    StoreError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
