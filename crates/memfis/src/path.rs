//! Path helpers for the internal path representation.
//!
//! Internally the root is `""` and every directory path ends in `/`
//! (`"a/b/"`). The public representation follows the usual rules instead:
//! the root is `"."` and no path ends in `/`. [`fs_path`] converts from the
//! internal to the public form.

use crate::entry::Entry;

pub(crate) const SEPARATOR: char = '/';
const SEPARATOR_BYTE: u8 = b'/';

/// The next part of `path` up to and including the first `/`, or the whole
/// string when there is none.
pub fn next_segment(path: &str) -> &str {
    match path.find(SEPARATOR) {
        Some(i) => &path[..=i],
        None => path,
    }
}

/// True for the root (`""`) and for paths ending in `/`.
pub fn is_dir(path: &str) -> bool {
    path.is_empty() || path.ends_with(SEPARATOR)
}

/// Appends a trailing `/` unless `path` is empty or already has one.
pub fn to_dir(path: &str) -> String {
    if is_dir(path) {
        path.to_string()
    } else {
        format!("{path}{SEPARATOR}")
    }
}

/// Translates an internal path to its public form.
pub fn fs_path(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    path.strip_suffix(SEPARATOR).unwrap_or(path)
}

/// Public path validity: `"."` or a non-empty sequence of `/`-separated
/// names, none of them empty, `"."` or `".."`.
pub fn valid_fs_path(name: &str) -> bool {
    if name == "." {
        return true;
    }
    !name.is_empty()
        && name
            .split(SEPARATOR)
            .all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}

/// Internal path validity. `"."` is never valid internally since the root
/// is spelled `""`.
pub fn valid_path(path: &str) -> bool {
    path != "." && valid_fs_path(fs_path(path))
}

/// Index of the first byte that differs between `a` and `b`.
fn len_common(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}

/// The longest directory prefix of `a` shared with `b`, including its
/// trailing `/`.
pub fn common_path<'a>(a: &'a str, b: &str) -> &'a str {
    let common = &a.as_bytes()[..len_common(a, b)];
    match common.iter().rposition(|&c| c == SEPARATOR_BYTE) {
        Some(i) => &a[..=i],
        None => "",
    }
}

/// The smallest byte string that sorts after every string starting with `s`.
///
/// Returns `None` when no such bound exists (`s` is empty or all `0xFF`),
/// in which case the range of strings prefixed by `s` is open-ended.
pub fn increment(s: &[u8]) -> Option<Vec<u8>> {
    let mut b = s.to_vec();
    while let Some(last) = b.pop() {
        if last != u8::MAX {
            b.push(last + 1);
            return Some(b);
        }
    }
    None
}

/// Visits every directory and file below `rootpath`.
///
/// `entries` must be sorted and share the `rootpath` prefix. `f` is called
/// once per distinct directory (internal form, trailing `/`) the first time
/// it is reached and once per file, in ascending order. A directory marker
/// entry is reported only as its directory.
pub fn walk<'a, E: Entry>(rootpath: &'a str, entries: &'a [E], mut f: impl FnMut(&'a str)) {
    let mut prevdir = rootpath;
    for entry in entries {
        let name = entry.path();
        prevdir = common_path(prevdir, name);
        let mut offset = prevdir.len();
        while let Some(i) = name[offset..].find(SEPARATOR) {
            offset += i + 1;
            prevdir = &name[..offset];
            f(prevdir);
        }
        if !is_dir(name) {
            f(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("abc", "abc")]
    #[case::nested("a/b/c", "a/")]
    #[case::dir("a/", "a/")]
    #[case::empty("", "")]
    fn next_segment_cases(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(next_segment(path), expected);
    }

    #[test]
    fn dir_helpers() {
        assert!(is_dir(""));
        assert!(is_dir("a/"));
        assert!(!is_dir("a"));
        assert_eq!(to_dir(""), "");
        assert_eq!(to_dir("a"), "a/");
        assert_eq!(to_dir("a/"), "a/");
        assert_eq!(fs_path(""), ".");
        assert_eq!(fs_path("a/b/"), "a/b");
        assert_eq!(fs_path("a/b"), "a/b");
    }

    #[rstest]
    #[case::root_internal("", true)]
    #[case::dot_internal(".", false)]
    #[case::file("a/b", true)]
    #[case::dir_marker("a/b/", true)]
    #[case::double_slash("a//b", false)]
    #[case::trailing_double("a//", false)]
    #[case::leading_slash("/a", false)]
    #[case::only_slash("/", false)]
    #[case::dot_segment("a/./b", false)]
    #[case::dotdot_segment("a/../b", false)]
    #[case::dotfile("a/.hidden", true)]
    fn valid_path_cases(#[case] path: &str, #[case] valid: bool) {
        assert_eq!(valid_path(path), valid, "{path:?}");
    }

    #[test]
    fn valid_fs_path_rejects_internal_forms() {
        assert!(valid_fs_path("."));
        assert!(valid_fs_path("a/b"));
        assert!(!valid_fs_path(""));
        assert!(!valid_fs_path("a/"));
        assert!(!valid_fs_path("./a"));
    }

    #[rstest]
    #[case::siblings("a/b/c", "a/b/d", "a/b/")]
    #[case::diverge_in_dir("a/bc/x", "a/bd/x", "a/")]
    #[case::nothing_shared("a/x", "b/x", "")]
    #[case::no_separator("abc", "abd", "")]
    #[case::prefix("a/", "a/b", "a/")]
    fn common_path_cases(#[case] a: &str, #[case] b: &str, #[case] expected: &str) {
        assert_eq!(common_path(a, b), expected);
    }

    #[test]
    fn common_path_multibyte() {
        // differs inside a multi-byte char; must not slice through it
        assert_eq!(common_path("d/é", "d/è"), "d/");
    }

    #[test]
    fn increment_bounds() {
        assert_eq!(increment(b"a/"), Some(b"a0".to_vec()));
        assert_eq!(increment(b"ab"), Some(b"ac".to_vec()));
        assert_eq!(increment(b"a\xff"), Some(b"b".to_vec()));
        assert_eq!(increment(b"\xff\xff"), None);
        assert_eq!(increment(b""), None);
    }

    #[test]
    fn walk_reports_each_directory_once() {
        let entries = [
            ("a/a", ""),
            ("a/b/c", ""),
            ("a/b/d", ""),
            ("b", ""),
            ("c/", ""),
        ];
        let mut seen = Vec::new();
        walk("", &entries, |p| seen.push(p));
        assert_eq!(seen, ["a/", "a/a", "a/b/", "a/b/c", "a/b/d", "b", "c/"]);
    }

    #[test]
    fn walk_below_rootpath() {
        let entries = [("a/b/c", ""), ("a/d", "")];
        let mut seen = Vec::new();
        walk("a/", &entries, |p| seen.push(p));
        assert_eq!(seen, ["a/b/", "a/b/c", "a/d"]);
    }
}
