//! Load-time errors. Per the error handling design, these are the only fatal
//! errors in the pipeline; everything past load time recovers locally.

use super::error_code::{self, BlockcutErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("no file entity matches {filename:?}")]
    NoFileFound { filename: String },

    #[error("{count} file entities match {filename:?}, expected exactly one")]
    AmbiguousFile { filename: String, count: usize },

    #[error("sqlite error: {message}")]
    SqliteError { message: String },
}

impl BlockcutErrorCode for LoadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoFileFound { .. } => error_code::NO_FILE_FOUND,
            Self::AmbiguousFile { .. } => error_code::AMBIGUOUS_FILE,
            Self::SqliteError { .. } => error_code::SQLITE_ERROR,
        }
    }
}
