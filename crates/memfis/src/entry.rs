//! Entries: the records a store is built from.

use std::sync::Arc;

use crate::path::to_dir;

/// A read-only file given by its root-relative path and its content.
///
/// The path uses `/` as separator and must not contain `.` or `..`
/// segments, empty segments or a leading `/`. A path ending in `/` is a
/// directory marker and must have empty content.
///
/// Content is always handed out whole, so this is a poor fit for large
/// files whose content is expensive to produce.
pub trait Entry {
    /// Root-relative path of the entry.
    fn path(&self) -> &str;

    /// The data contained in the file.
    fn content(&self) -> &[u8];

    /// Size in bytes. Implementations with a cheaper way to know the size
    /// may override this; it must equal `content().len()`.
    fn size(&self) -> u64 {
        self.content().len() as u64
    }
}

impl<P: AsRef<str>, C: AsRef<[u8]>> Entry for (P, C) {
    fn path(&self) -> &str {
        self.0.as_ref()
    }

    fn content(&self) -> &[u8] {
        self.1.as_ref()
    }
}

impl<E: Entry + ?Sized> Entry for Box<E> {
    fn path(&self) -> &str {
        (**self).path()
    }

    fn content(&self) -> &[u8] {
        (**self).content()
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}

impl<E: Entry + ?Sized> Entry for Arc<E> {
    fn path(&self) -> &str {
        (**self).path()
    }

    fn content(&self) -> &[u8] {
        (**self).content()
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}

/// An owned entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemEntry {
    path: String,
    content: Vec<u8>,
}

impl MemEntry {
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// A directory marker for an otherwise empty directory.
    pub fn dir(path: &str) -> Self {
        Self {
            path: to_dir(path),
            content: Vec::new(),
        }
    }
}

impl Entry for MemEntry {
    fn path(&self) -> &str {
        &self.path
    }

    fn content(&self) -> &[u8] {
        &self.content
    }
}
