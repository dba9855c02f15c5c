use thiserror::Error;

pub type LensResult<T> = Result<T, LensError>;

#[derive(Error, Debug)]
pub enum LensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unable to locate Zemax OpticStudio: {0}")]
    Initialization(String),

    #[error("license is not valid for API use: {0}")]
    License(String),

    #[error("unable to acquire the primary optical system")]
    SystemNotPresent,

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
