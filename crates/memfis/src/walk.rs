//! Recursive traversal over any [`Filesystem`].

use crate::error::FsError;
use crate::traits::{DirEntry, Filesystem};

/// What [`walk_dir`] should do after visiting an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    /// On a directory: do not descend into it. On a file: skip the
    /// remaining entries of the containing directory.
    SkipDir,
    /// End the walk without an error.
    Stop,
}

/// Join a public directory path and a child name.
pub fn join(dir: &str, name: &str) -> String {
    if dir == "." {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Visit `root` and everything below it in lexical order.
///
/// `visit` receives each public path with its metadata. An error returned
/// by `visit`, or by listing a directory, ends the walk and is returned.
pub fn walk_dir<F, V>(fs: &F, root: &str, mut visit: V) -> Result<(), FsError>
where
    F: Filesystem,
    V: FnMut(&str, &DirEntry) -> Result<WalkControl, FsError>,
{
    let info = fs.stat(root)?;
    walk_entry(fs, root, &info, &mut visit).map(|_| ())
}

fn walk_entry<F, V>(fs: &F, path: &str, info: &DirEntry, visit: &mut V) -> Result<WalkControl, FsError>
where
    F: Filesystem,
    V: FnMut(&str, &DirEntry) -> Result<WalkControl, FsError>,
{
    let control = visit(path, info)?;
    if !info.is_dir() || control != WalkControl::Continue {
        return Ok(control);
    }
    for child in fs.read_dir(path)? {
        let child_path = join(path, &child.name);
        match walk_entry(fs, &child_path, &child, visit)? {
            WalkControl::Stop => return Ok(WalkControl::Stop),
            WalkControl::SkipDir if !child.is_dir() => break,
            _ => {}
        }
    }
    Ok(WalkControl::Continue)
}
