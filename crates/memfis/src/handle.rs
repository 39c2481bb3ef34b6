//! The handle returned by `open`.

use crate::entry::Entry;
use crate::error::{ErrorKind, FsError};
use crate::file::FileHandle;
use crate::readdir::DirHandle;
use crate::traits::{DirEntry, File, ReadDirFile, Whence};

/// An open file or directory.
#[derive(Debug)]
pub enum Handle<E> {
    File(FileHandle<E>),
    Dir(DirHandle<E>),
}

impl<E: Entry> Handle<E> {
    pub fn is_dir(&self) -> bool {
        matches!(self, Handle::Dir(_))
    }

    pub fn as_file(&self) -> Option<&FileHandle<E>> {
        match self {
            Handle::File(f) => Some(f),
            Handle::Dir(_) => None,
        }
    }

    pub fn as_file_mut(&mut self) -> Option<&mut FileHandle<E>> {
        match self {
            Handle::File(f) => Some(f),
            Handle::Dir(_) => None,
        }
    }

    pub fn into_file(self) -> Option<FileHandle<E>> {
        match self {
            Handle::File(f) => Some(f),
            Handle::Dir(_) => None,
        }
    }

    pub fn into_dir(self) -> Option<DirHandle<E>> {
        match self {
            Handle::Dir(d) => Some(d),
            Handle::File(_) => None,
        }
    }
}

impl<E: Entry> File for Handle<E> {
    fn stat(&self) -> Result<DirEntry, FsError> {
        match self {
            Handle::File(f) => f.stat(),
            Handle::Dir(d) => d.stat(),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        match self {
            Handle::File(f) => File::read(f, buf),
            Handle::Dir(d) => d.read(buf),
        }
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, FsError> {
        match self {
            Handle::File(f) => File::seek(f, offset, whence),
            Handle::Dir(d) => d.seek(offset, whence),
        }
    }

    fn close(&mut self) -> Result<(), FsError> {
        match self {
            Handle::File(f) => f.close(),
            Handle::Dir(d) => d.close(),
        }
    }
}

impl<E: Entry> ReadDirFile for Handle<E> {
    fn read_dir(&mut self, n: isize) -> Result<Vec<DirEntry>, FsError> {
        match self {
            Handle::Dir(d) => d.read_dir(n),
            Handle::File(f) => Err(FsError::new("readdir", f.name(), ErrorKind::NotADirectory)),
        }
    }
}
