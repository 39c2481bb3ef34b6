//! The filesystem contract and the metadata types it hands out.

use std::borrow::Cow;
use std::fmt;
use std::time::SystemTime;

use crate::error::{ErrorKind, FsError};

/// Kind of directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DirEntryKind {
    File,
    Directory,
}

/// Unix-style mode bits: file type plus permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FileMode(u32);

impl FileMode {
    const TYPE_MASK: u32 = 0o170000;
    const TYPE_DIR: u32 = 0o040000;
    const TYPE_FILE: u32 = 0o100000;

    /// Directory, `rwx` for the owner and `r-x` for the group.
    pub const DIR: FileMode = FileMode(Self::TYPE_DIR | 0o750);
    /// Regular file, `rw-` for the owner and `r--` for the group.
    pub const FILE: FileMode = FileMode(Self::TYPE_FILE | 0o640);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn permissions(self) -> u32 {
        self.0 & 0o777
    }

    pub const fn is_dir(self) -> bool {
        self.0 & Self::TYPE_MASK == Self::TYPE_DIR
    }

    pub const fn is_file(self) -> bool {
        self.0 & Self::TYPE_MASK == Self::TYPE_FILE
    }
}

impl fmt::Display for FileMode {
    /// `ls -l` style, e.g. `drwxr-x---`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_dir() { 'd' } else { '-' };
        let mut out = String::with_capacity(10);
        out.push(kind);
        for shift in [6, 3, 0] {
            let bits = (self.0 >> shift) & 0o7;
            out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        f.write_str(&out)
    }
}

/// A directory entry, the unified metadata type.
///
/// Returned by `stat` and by directory listings alike.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DirEntry {
    /// Base name of the entry (not full path); `"."` for a root.
    pub name: String,
    /// Kind of entry.
    pub kind: DirEntryKind,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Mode bits.
    pub mode: FileMode,
    /// Last modification time. Always `UNIX_EPOCH` for in-memory entries.
    pub modified: SystemTime,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DirEntryKind::Directory,
            size: 0,
            mode: FileMode::DIR,
            modified: SystemTime::UNIX_EPOCH,
        }
    }

    /// Create a new file entry.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: DirEntryKind::File,
            size,
            mode: FileMode::FILE,
            modified: SystemTime::UNIX_EPOCH,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == DirEntryKind::Directory
    }
}

/// Reference point for [`File::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Start,
    Current,
    End,
}

impl TryFrom<i32> for Whence {
    type Error = ErrorKind;

    /// Raw whence values as used by `lseek`: 0, 1 and 2.
    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Whence::Start),
            1 => Ok(Whence::Current),
            2 => Ok(Whence::End),
            _ => Err(ErrorKind::Invalid),
        }
    }
}

/// Outcome of a positioned read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadAt {
    /// Bytes copied into the buffer.
    pub n: usize,
    /// The file ended before the buffer was filled.
    pub eof: bool,
}

/// An open file or directory.
pub trait File {
    /// Metadata of the open file.
    fn stat(&self) -> Result<DirEntry, FsError>;

    /// Read into `buf`. Exhaustion is reported as [`ErrorKind::Eof`].
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError>;

    /// Move the read position and return the new absolute offset.
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, FsError>;

    fn close(&mut self) -> Result<(), FsError>;
}

/// An open handle that can also list directory entries.
pub trait ReadDirFile: File {
    /// List up to `n` further entries; `n <= 0` lists everything that is
    /// left. With `n > 0` an exhausted directory fails with
    /// [`ErrorKind::Eof`]; with `n <= 0` it returns an empty list.
    fn read_dir(&mut self, n: isize) -> Result<Vec<DirEntry>, FsError>;
}

/// Abstract read-only filesystem interface.
///
/// All operations take public paths relative to the filesystem root:
/// `/`-separated, no leading `/`, and `"."` for the root itself.
pub trait Filesystem: Sized {
    type Handle: ReadDirFile;

    /// Open a file or directory.
    fn open(&self, name: &str) -> Result<Self::Handle, FsError>;

    /// Get metadata for a file or directory.
    fn stat(&self, name: &str) -> Result<DirEntry, FsError>;

    /// Read the entire contents of a file.
    fn read_file(&self, name: &str) -> Result<Cow<'_, [u8]>, FsError>;

    /// List the entries of a directory.
    fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>, FsError>;

    /// A filesystem rooted at the directory `dir`.
    fn sub(&self, dir: &str) -> Result<Self, FsError>;

    /// Paths matching a shell pattern, in lexical walk order.
    fn glob(&self, pattern: &str) -> Result<Vec<String>, FsError>;

    /// Check if a path exists.
    fn exists(&self, name: &str) -> bool {
        self.stat(name).is_ok()
    }
}
