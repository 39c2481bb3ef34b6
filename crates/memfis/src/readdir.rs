//! Open directory handles and their paginated listing state.

use crate::dir::DirInfo;
use crate::entry::Entry;
use crate::error::{ErrorKind, FsError};
use crate::memfs::MemFs;
use crate::path::SEPARATOR;
use crate::traits::{DirEntry, File, ReadDirFile, Whence};

/// Progress of a directory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DirCursor {
    /// Last emitted child segment (`"name"` or `"name/"`), empty for none.
    pub(crate) prev: String,
    /// Next index into the listed view's entries; the view's length once
    /// everything has been listed.
    pub(crate) idx: usize,
}

/// An open directory.
///
/// Mirrors an OS directory handle: byte reads fail with
/// [`ErrorKind::IsADirectory`], seeking restarts the listing, and unlike
/// [`FileHandle`](crate::FileHandle) a second `close` is an error.
pub struct DirHandle<E> {
    fs: MemFs<E>,
    /// `None` once closed.
    cursor: Option<DirCursor>,
}

impl<E: Entry> DirHandle<E> {
    pub(crate) fn new(fs: MemFs<E>) -> Self {
        Self {
            fs,
            cursor: Some(DirCursor::default()),
        }
    }

    /// The filesystem rooted at this directory.
    pub fn as_fs(&self) -> &MemFs<E> {
        &self.fs
    }

    pub fn is_closed(&self) -> bool {
        self.cursor.is_none()
    }

    /// Base name of the directory, used in error paths.
    fn cwd(&self) -> &str {
        let Some(dir) = self.fs.rootpath().strip_suffix(SEPARATOR) else {
            return ".";
        };
        dir.rfind(SEPARATOR).map_or(dir, |i| &dir[i + 1..])
    }

    fn err(&self, op: &'static str, kind: ErrorKind) -> FsError {
        FsError::new(op, self.cwd(), kind)
    }
}

impl<E: Entry> File for DirHandle<E> {
    fn stat(&self) -> Result<DirEntry, FsError> {
        if self.is_closed() {
            return Err(self.err("stat", ErrorKind::StatClosed));
        }
        Ok(DirInfo::root(self.fs.rootpath()).to_entry())
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, FsError> {
        if self.is_closed() {
            return Err(self.err("read", ErrorKind::Closed));
        }
        Err(self.err("read", ErrorKind::IsADirectory))
    }

    /// Restarts the listing; offset and whence are ignored.
    fn seek(&mut self, _offset: i64, _whence: Whence) -> Result<u64, FsError> {
        if self.is_closed() {
            return Err(self.err("seek", ErrorKind::Closed));
        }
        self.cursor = Some(DirCursor::default());
        Ok(0)
    }

    fn close(&mut self) -> Result<(), FsError> {
        if self.cursor.take().is_none() {
            return Err(self.err("close", ErrorKind::Closed));
        }
        Ok(())
    }
}

impl<E: Entry> ReadDirFile for DirHandle<E> {
    fn read_dir(&mut self, n: isize) -> Result<Vec<DirEntry>, FsError> {
        let Some(cursor) = self.cursor.clone() else {
            return Err(self.err("readdir", ErrorKind::Closed));
        };
        match self.fs.dir_entries(cursor, n) {
            Ok((entries, cursor)) => {
                self.cursor = Some(cursor);
                Ok(entries)
            }
            Err(kind) => Err(self.err("readdir", kind)),
        }
    }
}

impl<E> std::fmt::Debug for DirHandle<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirHandle")
            .field("fs", &self.fs)
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Filesystem;

    fn dir(pairs: &[(&'static str, &'static str)], name: &str) -> DirHandle<(&'static str, &'static str)> {
        let fs = MemFs::new(pairs.iter().copied()).unwrap();
        match fs.open(name).unwrap() {
            crate::Handle::Dir(d) => d,
            crate::Handle::File(_) => panic!("{name} is not a directory"),
        }
    }

    fn names(entries: Vec<DirEntry>) -> Vec<String> {
        entries.into_iter().map(|e| e.name).collect()
    }

    const TREE: &[(&str, &str)] = &[("a/x", ""), ("a/y", ""), ("b", ""), ("c/d/e", "")];

    #[test]
    fn paginates_one_at_a_time() {
        let mut d = dir(TREE, ".");
        assert_eq!(names(d.read_dir(1).unwrap()), ["a"]);
        assert_eq!(names(d.read_dir(1).unwrap()), ["b"]);
        assert_eq!(names(d.read_dir(1).unwrap()), ["c"]);
        assert!(d.read_dir(1).unwrap_err().is_eof());
        assert!(d.read_dir(-1).unwrap().is_empty());
        assert!(d.read_dir(0).unwrap().is_empty());
        assert!(d.read_dir(2).unwrap_err().is_eof());
    }

    #[test]
    fn unbounded_returns_the_rest() {
        let mut d = dir(TREE, ".");
        assert_eq!(names(d.read_dir(2).unwrap()), ["a", "b"]);
        assert_eq!(names(d.read_dir(-1).unwrap()), ["c"]);
    }

    #[test]
    fn seek_restarts_listing() {
        let mut d = dir(TREE, ".");
        d.read_dir(2).unwrap();
        assert_eq!(d.seek(42, Whence::End).unwrap(), 0);
        assert_eq!(names(d.read_dir(-1).unwrap()), ["a", "b", "c"]);
    }

    #[test]
    fn read_is_a_directory() {
        let mut d = dir(TREE, "a");
        let err = d.read(&mut [0u8; 4]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::IsADirectory));
        assert_eq!(err.to_string(), "read a: is a directory");
    }

    #[test]
    fn stat_names_the_directory() {
        let d = dir(TREE, "c/d");
        let info = d.stat().unwrap();
        assert_eq!(info.name, "d");
        assert!(info.is_dir());
        assert_eq!(dir(TREE, ".").stat().unwrap().name, ".");
    }

    #[test]
    fn closed_directory_rejects_everything() {
        let mut d = dir(TREE, "c");
        d.close().unwrap();
        assert!(d.close().unwrap_err().is_closed());
        assert!(d.read_dir(-1).unwrap_err().is_closed());
        assert!(d.read(&mut [0u8; 1]).unwrap_err().is_closed());
        assert!(d.seek(0, Whence::Start).unwrap_err().is_closed());
        let err = d.stat().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::StatClosed));
        assert_eq!(err.path, "c");
    }
}
