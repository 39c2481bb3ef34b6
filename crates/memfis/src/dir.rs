//! Synthetic directories.
//!
//! Directories are implied by the paths of the entries below them and are
//! never stored. A [`DirInfo`] names one by its internal path and the offset
//! at which its own name starts.

use crate::path::{next_segment, SEPARATOR};
use crate::traits::DirEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DirInfo {
    /// Internal directory path, ending in `/` unless it is the root.
    rootpath: String,
    /// Start of the directory's own name in `rootpath`.
    pidx: usize,
}

impl DirInfo {
    /// A child directory `rootpath[pidx..]` found while listing a parent.
    pub(crate) fn child(rootpath: &str, pidx: usize) -> Self {
        Self {
            rootpath: rootpath.to_string(),
            pidx,
        }
    }

    /// The directory a store view is rooted at.
    pub(crate) fn root(rootpath: &str) -> Self {
        let Some(trimmed) = rootpath.strip_suffix(SEPARATOR) else {
            return Self::child("", 0);
        };
        let pidx = trimmed.rfind(SEPARATOR).map_or(0, |i| i + 1);
        Self::child(rootpath, pidx)
    }

    #[cfg(test)]
    pub(crate) fn is_valid(&self) -> bool {
        self.pidx < self.rootpath.len() && crate::path::valid_path(&self.rootpath)
    }

    /// Base name, `"."` for the root.
    pub(crate) fn name(&self) -> &str {
        let seg = next_segment(&self.rootpath[self.pidx..]);
        match seg.strip_suffix(SEPARATOR) {
            Some(name) => name,
            None => ".",
        }
    }

    pub(crate) fn to_entry(&self) -> DirEntry {
        DirEntry::directory(self.name())
    }
}
