//! Open file handles.

use std::io::{self, Write};
use std::sync::Arc;

use crate::entry::Entry;
use crate::error::{ErrorKind, FsError};
use crate::path::SEPARATOR;
use crate::traits::{DirEntry, File, ReadAt, Whence};

/// Base name of an internal file path.
fn base_name(path: &str) -> &str {
    path.rfind(SEPARATOR).map_or(path, |i| &path[i + 1..])
}

/// Listing/stat metadata for a stored file.
pub(crate) fn file_entry<E: Entry>(entry: &E) -> DirEntry {
    DirEntry::file(base_name(entry.path()), entry.size())
}

/// A readable, seekable handle over one entry.
///
/// The handle keeps the store's entries alive and owns its read offset.
/// Closing is idempotent: every operation except `close` fails with
/// [`ErrorKind::Closed`] afterwards.
pub struct FileHandle<E> {
    entries: Arc<[E]>,
    idx: usize,
    name: String,
    /// Read offset into the content; `None` once closed.
    pos: Option<usize>,
}

impl<E: Entry> FileHandle<E> {
    pub(crate) fn new(entries: Arc<[E]>, idx: usize) -> Self {
        let name = base_name(entries[idx].path()).to_string();
        Self {
            entries,
            idx,
            name,
            pos: Some(0),
        }
    }

    fn entry(&self) -> &E {
        &self.entries[self.idx]
    }

    /// Base name of the file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path of the underlying entry, relative to the store's root.
    pub fn path(&self) -> &str {
        self.entry().path()
    }

    pub fn content(&self) -> &[u8] {
        self.entry().content()
    }

    pub fn is_closed(&self) -> bool {
        self.pos.is_none()
    }

    fn err(&self, op: &'static str, kind: ErrorKind) -> FsError {
        FsError::new(op, self.name.clone(), kind)
    }

    fn position(&self, op: &'static str) -> Result<usize, FsError> {
        self.pos.ok_or_else(|| self.err(op, ErrorKind::Closed))
    }

    /// Read at an absolute offset without touching the read position.
    ///
    /// `eof` is set when the content ended before `buf` was filled.
    pub fn read_at(&self, buf: &mut [u8], offset: i64) -> Result<ReadAt, FsError> {
        let Ok(offset) = usize::try_from(offset) else {
            return Err(self.err("readat", ErrorKind::Invalid));
        };
        // closed reads report "read" even from read_at
        self.position("read")?;
        let data = self.content();
        if offset > data.len() {
            return Err(self.err("read", ErrorKind::UnexpectedEof));
        }
        let rest = &data[offset..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        Ok(ReadAt {
            n,
            eof: n < buf.len(),
        })
    }

    /// Write everything from the read position onwards to `sink`, advancing
    /// the position by the number of bytes written.
    pub fn write_to<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<u64, FsError> {
        let start = self.position("read")?;
        let rest = &self.entries[self.idx].content()[start..];
        let mut written = 0;
        let mut failure = None;
        while written < rest.len() {
            match sink.write(&rest[written..]) {
                Ok(0) => {
                    failure = Some(io::Error::from(io::ErrorKind::WriteZero));
                    break;
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        self.pos = Some(start + written);
        match failure {
            Some(e) => Err(self.err("read", ErrorKind::Io(e))),
            None => Ok(written as u64),
        }
    }
}

impl<E: Entry> File for FileHandle<E> {
    fn stat(&self) -> Result<DirEntry, FsError> {
        self.position("stat")?;
        Ok(file_entry(self.entry()))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        let pos = self.position("read")?;
        let data = self.entries[self.idx].content();
        if pos >= data.len() {
            return Err(self.err("read", ErrorKind::Eof));
        }
        let n = (data.len() - pos).min(buf.len());
        buf[..n].copy_from_slice(&data[pos..pos + n]);
        self.pos = Some(pos + n);
        Ok(n)
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, FsError> {
        let pos = self.position("seek")?;
        let len = self.content().len() as i64;
        let target = match whence {
            Whence::Start => Some(offset),
            Whence::Current => (pos as i64).checked_add(offset),
            Whence::End => len.checked_add(offset),
        };
        match target {
            Some(t) if (0..=len).contains(&t) => {
                self.pos = Some(t as usize);
                Ok(t as u64)
            }
            _ => Err(self.err("seek", ErrorKind::Invalid)),
        }
    }

    fn close(&mut self) -> Result<(), FsError> {
        self.pos = None;
        Ok(())
    }
}

impl<E: Entry> io::Read for FileHandle<E> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match File::read(self, buf) {
            Err(e) if e.is_eof() => Ok(0),
            res => res.map_err(io::Error::from),
        }
    }
}

impl<E: Entry> io::Seek for FileHandle<E> {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            io::SeekFrom::Start(n) => match i64::try_from(n) {
                Ok(n) => (n, Whence::Start),
                Err(_) => return Err(self.err("seek", ErrorKind::Invalid).into()),
            },
            io::SeekFrom::Current(n) => (n, Whence::Current),
            io::SeekFrom::End(n) => (n, Whence::End),
        };
        File::seek(self, offset, whence).map_err(io::Error::from)
    }
}

impl<E> std::fmt::Debug for FileHandle<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("pos", &self.pos)
            .finish()
    }
}
