use thiserror::Error;

pub type Result<T> = std::result::Result<T, VendError>;

#[derive(Error, Debug)]
pub enum VendError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}
