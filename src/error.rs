use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a whole menu build. No partial model is produced.
#[derive(Debug, Error)]
pub enum MenuBuildError {
    #[error("folder {path} is unavailable: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reading a shortcut failed. Only seen inside resolvers; callers get an
/// absent target instead.
#[derive(Debug, Error)]
pub enum LinkResolutionError {
    #[error("shell link facility failed for {path}: {message}")]
    Facility { path: PathBuf, message: String },
    #[error("shortcut {0} has no target path")]
    EmptyTarget(PathBuf),
    #[error("shortcuts are not supported on this platform")]
    Unsupported,
}

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("failed to open {path}: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("open worker is no longer running")]
    WorkerGone,
}
