use std::io;
use thiserror::Error;

/// Errors returned by filesystem backends and their handles.
///
/// Running out of data is not an error; reads report it through
/// [`Transfer::EndOfData`](crate::Transfer::EndOfData).
#[derive(Debug, Error)]
pub enum FsError {
    /// No entry registered under the path.
    #[error("not found: {0}")]
    NotFound(String),

    /// The handle was closed before the operation.
    #[error("file already closed")]
    ClosedHandle,

    /// Seek target or positioned-read offset is negative (or overflows).
    #[error("invalid offset: {0}")]
    InvalidOffset(i64),

    /// Seek origin is not start, current or end.
    #[error("invalid whence: {0}")]
    InvalidWhence(i32),

    /// Directory listing requested on something that is not a directory.
    #[error("not a directory: {0}")]
    InvalidDirectory(String),

    /// More directory entries requested than the directory holds.
    #[error("invalid count: requested {requested}, directory has {available}")]
    InvalidCount { requested: usize, available: usize },

    /// Host I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FsError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn invalid_directory(name: impl Into<String>) -> Self {
        Self::InvalidDirectory(name.into())
    }

    /// Maps a host I/O error, turning `NotFound` into [`FsError::NotFound`]
    /// for the given path so both backends report misses the same way.
    pub fn from_io(path: &str, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::not_found(path)
        } else {
            Self::Io(err)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound(_))
    }
}

impl From<FsError> for io::Error {
    fn from(e: FsError) -> Self {
        match e {
            FsError::NotFound(path) => io::Error::new(io::ErrorKind::NotFound, path),
            FsError::ClosedHandle => io::Error::other("file already closed"),
            FsError::InvalidOffset(off) => io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid offset: {}", off),
            ),
            FsError::InvalidWhence(whence) => io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid whence: {}", whence),
            ),
            FsError::InvalidDirectory(name) => {
                io::Error::new(io::ErrorKind::NotADirectory, name)
            }
            e @ FsError::InvalidCount { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
            }
            FsError::Io(e) => e,
        }
    }
}

pub type FsResult<T> = Result<T, FsError>;
