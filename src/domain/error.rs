use std::fmt;

#[derive(Debug)]
pub enum AppError {
    ConfigError(String),
    ValidationError(String),
    ParseError(String),
    EncodingError(String),
    DatabaseError(String),
    IoError(String),
    /// A row that cannot supply the two fields the merge and the table need.
    MalformedRow { index: usize, fields: Vec<String> },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
            AppError::MalformedRow { index, fields } => write!(
                f,
                "Malformed row {}: expected at least 2 fields, got {} ({:?})",
                index,
                fields.len(),
                fields
            ),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
