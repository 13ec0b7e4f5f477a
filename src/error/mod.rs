use std::io;
use std::path::PathBuf;

use crate::config::ConfigPathError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    ConfigPath(#[from] ConfigPathError),
    #[error("failed to read custom theme: {path}")]
    ReadCustomTheme { path: PathBuf, source: io::Error },
    #[error("invalid custom theme: {path}")]
    ParseCustomTheme {
        path: PathBuf,
        source: serde_json::Error,
    },
}
