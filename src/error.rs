use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("cannot access {}: {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("version control error: {0}")]
    VersionControl(String),
    #[error("classification task failed: {0}")]
    Task(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    pub fn access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AppError::Access {
            path: path.into(),
            source,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
