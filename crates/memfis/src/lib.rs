//! memfis: an immutable, read-only filesystem held entirely in memory.
//!
//! A [`MemFs`] is built once from (path, content) pairs and then behaves
//! like a directory tree: files can be opened, read, seeked and stat'ed,
//! directories listed page by page, sub-trees split off with
//! [`Filesystem::sub`] and paths matched with [`Filesystem::glob`].
//!
//! ```
//! use memfis::{Filesystem, MemFs};
//!
//! let fs = MemFs::new([("a/a", "Hello"), ("a/b/c", ""), ("b", "")])?;
//! assert!(fs.stat("a/b")?.is_dir());
//! assert_eq!(&*fs.read_file("a/a")?, b"Hello");
//! assert_eq!(fs.glob("a/*")?, ["a/a", "a/b"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Design
//!
//! There are no tree nodes. Entries live in a single slice sorted by path;
//! directories exist only as shared path prefixes and are resolved with
//! binary search. Handles replicate OS edge cases exactly: a second `close`
//! on a file is fine while on a directory it is an error, bounded directory
//! reads report [`ErrorKind::Eof`] when nothing is left, and seeking a
//! directory restarts its listing.

mod dir;
mod entry;
mod error;
mod file;
mod handle;
mod memfs;
pub mod path;
mod readdir;
mod traits;
mod walk;

pub use entry::{Entry, MemEntry};
pub use error::{BuildError, ErrorKind, FsError};
pub use file::FileHandle;
pub use handle::Handle;
pub use memfs::MemFs;
pub use readdir::DirHandle;
pub use traits::{DirEntry, DirEntryKind, File, FileMode, Filesystem, ReadAt, ReadDirFile, Whence};
pub use walk::{join, walk_dir, WalkControl};
