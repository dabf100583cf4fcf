use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Failure to produce or consume one of the two JSON artifacts.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("{} failed: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} is not valid: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ArtifactError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ArtifactError::Io { path, .. } | ArtifactError::Json { path, .. } => path,
        }
    }
}
