//! Error types.
//!
//! Every runtime failure is an [`FsError`]: the operation, the public path it
//! was applied to and the [`ErrorKind`] that caused it. Building a store fails
//! with a [`BuildError`] instead; no partially built store is ever returned.

use std::io;

use thiserror::Error;

/// Cause of a failed filesystem operation.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Malformed path, bad seek target or bad whence.
    #[error("invalid argument")]
    Invalid,

    /// The path does not resolve to a file or directory.
    #[error("file does not exist")]
    NotExist,

    /// The handle was already closed.
    #[error("file already closed")]
    Closed,

    /// `stat` on a closed directory handle.
    #[error("use of closed file")]
    StatClosed,

    /// No more bytes or directory entries.
    #[error("EOF")]
    Eof,

    /// `read_at` offset lies beyond the end of the file.
    #[error("unexpected EOF")]
    UnexpectedEof,

    /// Byte read attempted on a directory.
    #[error("is a directory")]
    IsADirectory,

    /// Directory listing attempted on a regular file.
    #[error("not a directory")]
    NotADirectory,

    /// An entry inside a sub-tree view no longer shares the view's prefix.
    #[error("subfs changed root directory")]
    ChangedRoot,

    /// The glob pattern could not be compiled.
    #[error("syntax error in pattern: {0}")]
    BadPattern(#[from] glob::PatternError),

    /// The sink of `write_to` failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A failed operation on a path.
#[derive(Debug, Error)]
#[error("{op} {path}: {kind}")]
pub struct FsError {
    /// Operation name, e.g. `"open"` or `"readdir"`.
    pub op: &'static str,
    /// Public path (or base name for handle operations).
    pub path: String,
    #[source]
    pub kind: ErrorKind,
}

impl FsError {
    pub fn new(op: &'static str, path: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            op,
            path: path.into(),
            kind,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// End of a lazy sequence rather than a real failure.
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, ErrorKind::Eof)
    }

    pub fn is_not_exist(&self) -> bool {
        matches!(self.kind, ErrorKind::NotExist)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.kind, ErrorKind::Closed | ErrorKind::StatClosed)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self.kind, ErrorKind::Invalid)
    }
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        let kind = match &err.kind {
            ErrorKind::Invalid | ErrorKind::BadPattern(_) => io::ErrorKind::InvalidInput,
            ErrorKind::NotExist => io::ErrorKind::NotFound,
            ErrorKind::Eof | ErrorKind::UnexpectedEof => io::ErrorKind::UnexpectedEof,
            ErrorKind::IsADirectory => io::ErrorKind::IsADirectory,
            ErrorKind::NotADirectory => io::ErrorKind::NotADirectory,
            ErrorKind::Io(e) => e.kind(),
            ErrorKind::Closed | ErrorKind::StatClosed | ErrorKind::ChangedRoot => {
                io::ErrorKind::Other
            }
        };
        io::Error::new(kind, err)
    }
}

/// Why a store could not be built from a set of entries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("unsupported file name {0:?}")]
    InvalidPath(String),

    #[error("file ending with / is directory but has content: {0:?}")]
    DirectoryWithContent(String),

    #[error("file names must be unique: {0:?} occurs more than once")]
    DuplicatePath(String),

    #[error("file names must be unique: {0:?} is both a file and a directory")]
    NameCollision(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_has_op_path_and_cause() {
        let err = FsError::new("open", "a/b", ErrorKind::NotExist);
        assert_eq!(err.to_string(), "open a/b: file does not exist");
    }

    #[test]
    fn io_error_keeps_kind() {
        let err: io::Error = FsError::new("read", "x", ErrorKind::IsADirectory).into();
        assert_eq!(err.kind(), io::ErrorKind::IsADirectory);

        let err: io::Error = FsError::new("stat", "x", ErrorKind::NotExist).into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn predicates() {
        assert!(FsError::new("readdir", ".", ErrorKind::Eof).is_eof());
        assert!(FsError::new("stat", ".", ErrorKind::StatClosed).is_closed());
        assert!(!FsError::new("stat", ".", ErrorKind::Invalid).is_closed());
    }
}
