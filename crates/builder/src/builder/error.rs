//! Error types for the SpiderMonkey builder.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    CommandFailed { program: String, status: String },

    #[error("build artifact not found: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("no version line found in {}", .0.display())]
    NoVersion(PathBuf),

    #[error("missing required tools: {}", .0.join(", "))]
    MissingTools(Vec<String>),

    #[error("architecture {arch} is not built for {platform}")]
    UnsupportedArch { platform: String, arch: String },

    #[error("{0}")]
    InvalidSelection(String),

    #[error("failed to parse config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BuildError>;

/// Attach a path to an `io::Error`.
pub(crate) trait IoContext<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| BuildError::Io {
            path: path.into(),
            source,
        })
    }
}
