//! The store: an immutable filesystem over a sorted slice of entries.
//!
//! There are no tree nodes. Entries are kept in one `Arc<[E]>` sorted by
//! path; a directory is the contiguous range of entries sharing its prefix,
//! found with two binary searches. A sub-filesystem is the same slice with a
//! narrower range and a longer `rootpath`, so deriving one never copies.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use glob::{MatchOptions, Pattern, PatternError};

use crate::dir::DirInfo;
use crate::entry::Entry;
use crate::error::{BuildError, ErrorKind, FsError};
use crate::file::{file_entry, FileHandle};
use crate::handle::Handle;
use crate::path::{
    fs_path, increment, is_dir, next_segment, to_dir, valid_fs_path, valid_path, walk,
};
use crate::readdir::{DirCursor, DirHandle};
use crate::traits::{DirEntry, Filesystem};

/// `*`, `?` and `[...]` never match `/`; leading dots need no literal match.
const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compile a shell-style pattern for [`Filesystem::glob`].
///
/// A run of `*` is a single `*`, `[^...]` negates like `[!...]` and `\c`
/// matches `c` literally. Everything else is handed to `glob` unchanged.
fn compile_pattern(pattern: &str) -> Result<Pattern, PatternError> {
    let mut out = String::with_capacity(pattern.len() + 2);
    let mut chars = pattern.char_indices().peekable();
    let mut in_class = false;
    // length of `out` just after the opening `[` or `[!` of the current class
    let mut class_start = 0;
    let mut prev_star = false;
    while let Some((pos, c)) = chars.next() {
        let star = c == '*' && !in_class;
        match c {
            '\\' => {
                let Some((_, lit)) = chars.next() else {
                    return Err(PatternError {
                        pos,
                        msg: "trailing backslash",
                    });
                };
                match lit {
                    ']' if in_class && out.len() > class_start => {
                        return Err(PatternError {
                            pos,
                            msg: "escaped ] inside a character class",
                        });
                    }
                    '*' | '?' | '[' | ']' if !in_class => {
                        out.push('[');
                        out.push(lit);
                        out.push(']');
                    }
                    _ => out.push(lit),
                }
            }
            '*' if prev_star => {}
            '[' if !in_class => {
                in_class = true;
                out.push('[');
                if chars.next_if(|&(_, n)| n == '^' || n == '!').is_some() {
                    out.push('!');
                }
                class_start = out.len();
            }
            ']' if in_class && out.len() > class_start => {
                in_class = false;
                out.push(']');
            }
            _ => out.push(c),
        }
        prev_star = star;
    }
    Pattern::new(&out)
}

/// An immutable in-memory filesystem.
///
/// Built once from a set of [`Entry`] values with [`MemFs::new`]; cheap to
/// clone and safe to share between threads when `E` is.
pub struct MemFs<E> {
    /// Every entry of the whole tree, sorted ascending by path.
    entries: Arc<[E]>,
    /// The part of `entries` this view covers.
    range: Range<usize>,
    /// Internal path of this view's root: empty, or ending in `/`.
    rootpath: String,
}

/// What an internal path resolved to.
pub(crate) enum Resolved<E> {
    /// Absolute index into the shared entries.
    File(usize),
    Dir(MemFs<E>),
}

impl<E: Entry> MemFs<E> {
    /// Build a filesystem from unordered entries.
    ///
    /// Fails if a path is invalid, a directory marker has content, a path
    /// occurs twice, or a name is used both as a file and as a directory.
    pub fn new(entries: impl IntoIterator<Item = E>) -> Result<Self, BuildError> {
        let mut entries: Vec<E> = entries.into_iter().collect();
        let result = Self::check_paths(&entries).and_then(|()| {
            entries.sort_by(|a, b| a.path().cmp(b.path()));
            if entries.len() > 1 {
                Self::check_names(&entries)?;
            }
            Ok(())
        });
        if let Err(err) = result {
            tracing::debug!(error = %err, "rejected memfs entries");
            return Err(err);
        }

        tracing::debug!(entries = entries.len(), "built memfs");
        let len = entries.len();
        Ok(Self {
            entries: Arc::from(entries),
            range: 0..len,
            rootpath: String::new(),
        })
    }

    fn check_paths(entries: &[E]) -> Result<(), BuildError> {
        for entry in entries {
            let path = entry.path();
            if is_dir(path) && !entry.content().is_empty() {
                return Err(BuildError::DirectoryWithContent(path.to_string()));
            }
            if !valid_path(path) {
                return Err(BuildError::InvalidPath(path.to_string()));
            }
        }
        Ok(())
    }

    /// Duplicate and file/directory collision detection on sorted entries.
    fn check_names(sorted: &[E]) -> Result<(), BuildError> {
        if let Some(pair) = sorted.windows(2).find(|w| w[0].path() == w[1].path()) {
            return Err(BuildError::DuplicatePath(pair[0].path().to_string()));
        }
        let mut collision = None;
        walk("", sorted, |path| {
            if collision.is_some() || !is_dir(path) {
                return;
            }
            // "a/" collides with a file "a"; entries like "a.txt" may sort
            // between the two, so look the file up instead of peeking back
            let file = &path[..path.len() - 1];
            if sorted.binary_search_by(|e| e.path().cmp(file)).is_ok() {
                collision = Some(file.to_string());
            }
        });
        match collision {
            Some(name) => Err(BuildError::NameCollision(name)),
            None => Ok(()),
        }
    }

    /// Entries of this view, sorted by their full path.
    pub fn entries(&self) -> &[E] {
        &self.entries[self.range.clone()]
    }

    /// Number of entries below this view's root, directory markers included.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Public path of this view's root relative to the whole tree.
    pub fn root_path(&self) -> &str {
        fs_path(&self.rootpath)
    }

    pub(crate) fn rootpath(&self) -> &str {
        &self.rootpath
    }

    /// Internal path for a public name.
    fn root(&self, name: &str) -> String {
        if name == "." {
            self.rootpath.clone()
        } else {
            format!("{}{}", self.rootpath, name)
        }
    }

    /// Binary search in this view; the index is relative to the view.
    fn find(&self, seek: &[u8]) -> Result<usize, usize> {
        self.entries()
            .binary_search_by(|e| e.path().as_bytes().cmp(seek))
    }

    /// Resolve an internal path to a file or a directory view.
    pub(crate) fn resolve(&self, path: &str) -> Result<Resolved<E>, ErrorKind> {
        // the view's own root, which may also be stored as a marker entry
        if path.is_empty() || path == self.rootpath {
            return Ok(Resolved::Dir(self.clone()));
        }
        if !is_dir(path) {
            if let Ok(i) = self.find(path.as_bytes()) {
                return Ok(Resolved::File(self.range.start + i));
            }
        }

        let dir = to_dir(path);
        let low = self.find(dir.as_bytes()).unwrap_or_else(|i| i);
        let inside = self
            .entries()
            .get(low)
            .is_some_and(|e| e.path().starts_with(dir.as_str()));
        if !inside {
            return Err(ErrorKind::NotExist);
        }
        let high = match increment(dir.as_bytes()) {
            Some(upper) => self.find(&upper).unwrap_or_else(|i| i),
            None => self.len(),
        };
        Ok(Resolved::Dir(MemFs {
            entries: Arc::clone(&self.entries),
            range: self.range.start + low..self.range.start + high,
            rootpath: dir,
        }))
    }

    /// Validate a public name and resolve it.
    fn lookup(&self, op: &'static str, name: &str) -> Result<Resolved<E>, FsError> {
        if !valid_fs_path(name) {
            return Err(FsError::new(op, name, ErrorKind::Invalid));
        }
        self.resolve(&self.root(name))
            .map_err(|kind| FsError::new(op, name, kind))
    }

    /// Listing of this view's root, starting from `cursor`.
    ///
    /// Child directories are collapsed: every entry below `a/` yields the
    /// segment `a/`, which is emitted once, at its first occurrence.
    pub(crate) fn dir_entries(
        &self,
        mut cursor: DirCursor,
        n: isize,
    ) -> Result<(Vec<DirEntry>, DirCursor), ErrorKind> {
        let files = self.entries();
        if cursor.idx > files.len() {
            return Err(ErrorKind::Invalid);
        }
        let limit = usize::try_from(n).ok().filter(|&n| n > 0);
        if cursor.idx == files.len() {
            return match limit {
                Some(_) => Err(ErrorKind::Eof),
                None => Ok((Vec::new(), cursor)),
            };
        }

        let rp = self.rootpath.as_str();
        let mut out = Vec::new();
        while cursor.idx < files.len() {
            if limit.is_some_and(|l| out.len() == l) {
                break;
            }
            let entry = &files[cursor.idx];
            cursor.idx += 1;
            let name = entry.path();
            let Some(rest) = name.strip_prefix(rp) else {
                return Err(ErrorKind::ChangedRoot);
            };
            let next = next_segment(rest);
            // empty: the marker of the listed directory itself
            if next.is_empty() || cursor.prev == next {
                continue;
            }
            cursor.prev = next.to_string();
            if is_dir(next) {
                out.push(DirInfo::child(&name[..rp.len() + next.len()], rp.len()).to_entry());
            } else {
                out.push(file_entry(entry));
            }
        }
        if limit.is_some() && out.is_empty() {
            return Err(ErrorKind::Eof);
        }
        Ok((out, cursor))
    }
}

impl<E: Entry> Filesystem for MemFs<E> {
    type Handle = Handle<E>;

    fn open(&self, name: &str) -> Result<Handle<E>, FsError> {
        Ok(match self.lookup("open", name)? {
            Resolved::File(i) => Handle::File(FileHandle::new(Arc::clone(&self.entries), i)),
            Resolved::Dir(d) => Handle::Dir(DirHandle::new(d)),
        })
    }

    fn stat(&self, name: &str) -> Result<DirEntry, FsError> {
        Ok(match self.lookup("stat", name)? {
            Resolved::File(i) => file_entry(&self.entries[i]),
            Resolved::Dir(d) => DirInfo::root(d.rootpath()).to_entry(),
        })
    }

    fn read_file(&self, name: &str) -> Result<Cow<'_, [u8]>, FsError> {
        match self.lookup("readfile", name) {
            Ok(Resolved::File(i)) => Ok(Cow::Borrowed(self.entries[i].content())),
            Ok(Resolved::Dir(_)) => Err(FsError::new("readfile", name, ErrorKind::NotExist)),
            Err(err) => Err(err),
        }
    }

    fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>, FsError> {
        match self.lookup("readdir", name)? {
            Resolved::Dir(d) => d
                .dir_entries(DirCursor::default(), 0)
                .map(|(entries, _)| entries)
                .map_err(|kind| FsError::new("readdir", name, kind)),
            Resolved::File(_) => Err(FsError::new("readdir", name, ErrorKind::NotExist)),
        }
    }

    fn sub(&self, dir: &str) -> Result<Self, FsError> {
        if dir == "." {
            return Ok(self.clone());
        }
        match self.lookup("sub", dir)? {
            Resolved::Dir(d) => {
                tracing::trace!(root = d.root_path(), entries = d.len(), "sub filesystem");
                Ok(d)
            }
            Resolved::File(_) => Err(FsError::new("sub", dir, ErrorKind::NotExist)),
        }
    }

    #[tracing::instrument(level = "trace", skip(self), fields(root = self.root_path()))]
    fn glob(&self, pattern: &str) -> Result<Vec<String>, FsError> {
        // a bad pattern is reported before anything is walked
        let matcher = compile_pattern(pattern).map_err(|e| FsError::new("glob", ".", e.into()))?;
        let rpl = self.rootpath.len();
        let mut matches = Vec::new();
        walk(&self.rootpath, self.entries(), |path| {
            let name = fs_path(&path[rpl..]);
            if matcher.matches_with(name, GLOB_OPTIONS) {
                matches.push(name.to_string());
            }
        });
        Ok(matches)
    }
}

impl<E> Clone for MemFs<E> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            range: self.range.clone(),
            rootpath: self.rootpath.clone(),
        }
    }
}

impl<E> Default for MemFs<E> {
    fn default() -> Self {
        Self {
            entries: Arc::from(Vec::new()),
            range: 0..0,
            rootpath: String::new(),
        }
    }
}

impl<E> fmt::Debug for MemFs<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemFs")
            .field("rootpath", &self.rootpath)
            .field("range", &self.range)
            .finish()
    }
}

impl<E: Entry> TryFrom<Vec<E>> for MemFs<E> {
    type Error = BuildError;

    fn try_from(entries: Vec<E>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}
