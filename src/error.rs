use std::io;

use thiserror::Error;

/// Typed failures raised by the path engine.
///
/// Every OS-level failure is converted at the point of the OS call into one
/// of these variants, preserving the original `std::io::Error` as `source`.
/// Path algebra never fails on malformed strings; `VolumeMismatch` is its
/// single typed failure.
#[derive(Debug, Error)]
pub enum FsError {
    /// `merge_paths` was given two paths carrying different volumes.
    #[error("volume mismatch: '{base}' vs '{extra}'")]
    VolumeMismatch { base: String, extra: String },

    /// The target is unknown to the OS (stat failed).
    #[error("unable to stat '{path}': {source}")]
    StatFailed { path: String, source: io::Error },

    /// Opening, reading or writing a file or directory handle failed.
    #[error("unable to open '{path}': {source}")]
    OpenFailed { path: String, source: io::Error },

    /// Creating a file or directory failed.
    #[error("unable to create '{path}': {source}")]
    CreateFailed { path: String, source: io::Error },

    /// Deleting a file or directory failed.
    #[error("unable to delete '{path}': {source}")]
    DeleteFailed { path: String, source: io::Error },

    /// No such file or directory.
    #[error("'{path}' does not exist")]
    NotFound { path: String },
}

impl FsError {
    /// The path the failed operation was addressed to.
    pub fn path(&self) -> &str {
        match self {
            FsError::VolumeMismatch { base, .. } => base,
            FsError::StatFailed { path, .. }
            | FsError::OpenFailed { path, .. }
            | FsError::CreateFailed { path, .. }
            | FsError::DeleteFailed { path, .. }
            | FsError::NotFound { path } => path,
        }
    }
}
