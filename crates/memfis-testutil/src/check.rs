//! Conformance checks run against a filesystem.

use std::collections::BTreeSet;

use memfis::{
    join, walk_dir, DirEntry, Entry, ErrorKind, File, Filesystem, FsError, MemFs, ReadDirFile,
    WalkControl, Whence,
};

use crate::{TestResult, TestSummary};

type Check = Result<(), TestResult>;

fn outcome(check: Check) -> TestResult {
    check.err().unwrap_or(TestResult::Pass)
}

fn ok<T>(res: Result<T, FsError>) -> Result<T, TestResult> {
    res.map_err(TestResult::error)
}

fn expect_eq<T: std::fmt::Debug + PartialEq>(expected: T, actual: T) -> Check {
    if expected == actual {
        Ok(())
    } else {
        Err(TestResult::mismatch(expected, actual))
    }
}

fn expect_err<T: std::fmt::Debug>(
    res: Result<T, FsError>,
    wanted: &str,
    pred: impl FnOnce(&FsError) -> bool,
) -> Check {
    match res {
        Err(err) if pred(&err) => Ok(()),
        Err(err) => Err(TestResult::mismatch(wanted, err.to_string())),
        Ok(v) => Err(TestResult::mismatch(wanted, v)),
    }
}

fn listing(entries: &[DirEntry]) -> Vec<(String, bool)> {
    entries.iter().map(|e| (e.name.clone(), e.is_dir())).collect()
}

fn has_glob_meta(s: &str) -> bool {
    s.contains(['*', '?', '[', ']', '\\'])
}

/// Run the handle contract against `fs`.
///
/// Every path in `expected` must exist. Every directory and file reachable
/// from the root is then cross-checked through `stat`, `open`, `read_file`,
/// `read_dir`, `glob` and `sub`.
pub fn check_fs<F: Filesystem>(fs: &F, expected: &[&str]) -> TestSummary {
    let mut summary = TestSummary::new();

    for path in expected {
        let result = outcome(ok(fs.stat(path)).map(|_| ()));
        summary.record("expected path exists", *path, result);
    }

    let mut seen = Vec::new();
    let walked = walk_dir(fs, ".", |path, info| {
        seen.push((path.to_string(), info.clone()));
        Ok(WalkControl::Continue)
    });
    if let Err(err) = walked {
        summary.record("walk", ".", TestResult::error(err));
        return summary;
    }

    for (path, info) in &seen {
        if info.is_dir() {
            check_dir(fs, path, &mut summary);
        } else {
            check_file(fs, path, info, &mut summary);
        }
    }
    tracing::debug!(
        total = summary.total(),
        failed = summary.failed + summary.errors,
        "conformance check finished"
    );
    summary
}

fn check_dir<F: Filesystem>(fs: &F, path: &str, summary: &mut TestSummary) {
    summary.record("stat is a directory", path, outcome(stat_is_dir(fs, path)));

    let full = match fs.read_dir(path) {
        Ok(full) => full,
        Err(err) => {
            summary.record("read_dir", path, TestResult::error(err));
            return;
        }
    };
    summary.record("listing in path order", path, outcome(sorted(&full)));
    summary.record("read on directory", path, outcome(read_on_dir(fs, path)));
    summary.record("paginated read_dir", path, outcome(paginate(fs, path, &full)));
    summary.record("seek resets listing", path, outcome(seek_resets(fs, path, &full)));
    summary.record("directory close", path, outcome(dir_close(fs, path)));
    summary.record("read_file on directory", path, outcome(read_file_on_dir(fs, path)));
    summary.record("sub lists the same", path, outcome(sub_matches(fs, path, &full)));

    let glob = if has_glob_meta(path) || full.iter().any(|e| has_glob_meta(&e.name)) {
        TestResult::Skip {
            reason: "name contains pattern characters".into(),
        }
    } else {
        outcome(glob_matches(fs, path, &full))
    };
    summary.record("glob lists children", path, glob);
}

fn stat_is_dir<F: Filesystem>(fs: &F, path: &str) -> Check {
    let info = ok(fs.stat(path))?;
    expect_eq(true, info.is_dir() && info.mode.is_dir())
}

/// Listing order follows the sorted entry paths: each child is keyed by its
/// first path segment, so `foo.txt` lists before a directory `foo` (`'.' < '/'`).
fn sorted(entries: &[DirEntry]) -> Check {
    let keys: Vec<String> = entries
        .iter()
        .map(|e| if e.is_dir() { format!("{}/", e.name) } else { e.name.clone() })
        .collect();
    if keys.windows(2).all(|w| w[0] < w[1]) {
        Ok(())
    } else {
        Err(TestResult::mismatch("strictly ascending segments", keys))
    }
}

fn read_on_dir<F: Filesystem>(fs: &F, path: &str) -> Check {
    let mut h = ok(fs.open(path))?;
    expect_err(h.read(&mut [0u8; 8]), "is a directory", |e| {
        matches!(e.kind(), ErrorKind::IsADirectory)
    })
}

fn paginate<F: Filesystem>(fs: &F, path: &str, full: &[DirEntry]) -> Check {
    let mut h = ok(fs.open(path))?;
    let mut paged = Vec::new();
    loop {
        match h.read_dir(1) {
            Ok(batch) if batch.len() == 1 => paged.extend(batch),
            Ok(batch) => return Err(TestResult::mismatch(1, batch.len())),
            Err(err) if err.is_eof() => break,
            Err(err) => return Err(TestResult::error(err)),
        }
        if paged.len() > full.len() {
            break;
        }
    }
    expect_eq(listing(full), listing(&paged))?;
    expect_eq(0, ok(h.read_dir(-1))?.len())
}

fn seek_resets<F: Filesystem>(fs: &F, path: &str, full: &[DirEntry]) -> Check {
    let mut h = ok(fs.open(path))?;
    ok(h.read_dir(-1))?;
    expect_eq(0, ok(h.seek(0, Whence::Start))?)?;
    expect_eq(listing(full), listing(&ok(h.read_dir(0))?))
}

fn dir_close<F: Filesystem>(fs: &F, path: &str) -> Check {
    let mut h = ok(fs.open(path))?;
    ok(h.close())?;
    expect_err(h.stat(), "closed", FsError::is_closed)?;
    expect_err(h.read_dir(-1), "closed", FsError::is_closed)?;
    expect_err(h.close(), "closed", FsError::is_closed)
}

fn read_file_on_dir<F: Filesystem>(fs: &F, path: &str) -> Check {
    expect_err(fs.read_file(path).map(|c| c.len()), "not a file", |_| true)
}

fn sub_matches<F: Filesystem>(fs: &F, path: &str, full: &[DirEntry]) -> Check {
    let sub = ok(fs.sub(path))?;
    expect_eq(listing(full), listing(&ok(sub.read_dir("."))?))
}

fn glob_matches<F: Filesystem>(fs: &F, path: &str, full: &[DirEntry]) -> Check {
    let found: BTreeSet<String> = ok(fs.glob(&join(path, "*")))?.into_iter().collect();
    let expected: BTreeSet<String> = full.iter().map(|e| join(path, &e.name)).collect();
    expect_eq(expected, found)
}

fn check_file<F: Filesystem>(fs: &F, path: &str, info: &DirEntry, summary: &mut TestSummary) {
    let content = match fs.read_file(path) {
        Ok(c) => c.into_owned(),
        Err(err) => {
            summary.record("read_file", path, TestResult::error(err));
            return;
        }
    };
    summary.record(
        "size matches content",
        path,
        outcome(expect_eq(content.len() as u64, info.size)),
    );
    summary.record("stat agrees", path, outcome(stat_agrees(fs, path, info)));
    summary.record("read matches read_file", path, outcome(read_all(fs, path, &content)));
    summary.record("seek then read", path, outcome(seek_then_read(fs, path, &content)));
    summary.record("file close", path, outcome(file_close(fs, path)));
    summary.record("read_dir on file", path, outcome(read_dir_on_file(fs, path)));
}

fn stat_agrees<F: Filesystem>(fs: &F, path: &str, info: &DirEntry) -> Check {
    let via_fs = ok(fs.stat(path))?;
    let via_handle = ok(ok(fs.open(path))?.stat())?;
    expect_eq(info, &via_fs)?;
    expect_eq(info, &via_handle)?;
    expect_eq(true, info.mode.is_file())
}

fn read_to_end<H: File>(h: &mut H) -> Result<Vec<u8>, TestResult> {
    let mut out = Vec::new();
    let mut buf = [0u8; 7];
    loop {
        match h.read(&mut buf) {
            Ok(n) => out.extend_from_slice(&buf[..n]),
            Err(err) if err.is_eof() => return Ok(out),
            Err(err) => return Err(TestResult::error(err)),
        }
    }
}

fn read_all<F: Filesystem>(fs: &F, path: &str, content: &[u8]) -> Check {
    let mut h = ok(fs.open(path))?;
    expect_eq(content, read_to_end(&mut h)?.as_slice())
}

fn seek_then_read<F: Filesystem>(fs: &F, path: &str, content: &[u8]) -> Check {
    let mut h = ok(fs.open(path))?;
    let mid = content.len() / 2;
    expect_eq(mid as u64, ok(h.seek(mid as i64, Whence::Start))?)?;
    expect_eq(&content[mid..], read_to_end(&mut h)?.as_slice())?;
    expect_eq(content.len() as u64, ok(h.seek(0, Whence::End))?)?;
    expect_err(h.seek(-1, Whence::Start), "invalid", FsError::is_invalid)
}

fn file_close<F: Filesystem>(fs: &F, path: &str) -> Check {
    let mut h = ok(fs.open(path))?;
    ok(h.close())?;
    expect_err(h.read(&mut [0u8; 1]), "closed", FsError::is_closed)?;
    expect_err(h.stat(), "closed", FsError::is_closed)?;
    // a second close on a file is not an error
    ok(h.close())
}

fn read_dir_on_file<F: Filesystem>(fs: &F, path: &str) -> Check {
    let mut h = ok(fs.open(path))?;
    expect_err(h.read_dir(-1), "not a directory", |e| {
        matches!(e.kind(), ErrorKind::NotADirectory)
    })
}

/// [`check_fs`] plus positional reads and `write_to` on every stored file.
pub fn check_memfs<E: Entry>(fs: &MemFs<E>, expected: &[&str]) -> TestSummary {
    let mut summary = check_fs(fs, expected);
    let root = fs.root_path();
    let prefix = if root == "." { 0 } else { root.len() + 1 };
    for entry in fs.entries() {
        let Some(path) = entry.path().get(prefix..) else {
            continue;
        };
        if path.is_empty() || path.ends_with('/') {
            continue;
        }
        summary.record("read_at", path, outcome(read_at(fs, path, entry.content())));
        summary.record("write_to", path, outcome(write_to(fs, path, entry.content())));
    }
    summary
}

fn read_at<E: Entry>(fs: &MemFs<E>, path: &str, content: &[u8]) -> Check {
    let h = ok(fs.open(path))?
        .into_file()
        .ok_or_else(|| TestResult::error(format!("{path} opened as a directory")))?;
    let mut buf = vec![0u8; content.len() + 1];
    let got = ok(h.read_at(&mut buf, 0))?;
    expect_eq((content.len(), true), (got.n, got.eof))?;
    expect_eq(content, &buf[..got.n])?;
    let tail = ok(h.read_at(&mut buf[..1], content.len() as i64))?;
    expect_eq((0, true), (tail.n, tail.eof))?;
    expect_err(h.read_at(&mut buf, -1), "invalid", FsError::is_invalid)?;
    expect_err(
        h.read_at(&mut buf, content.len() as i64 + 1),
        "unexpected eof",
        |e| matches!(e.kind(), ErrorKind::UnexpectedEof),
    )
}

fn write_to<E: Entry>(fs: &MemFs<E>, path: &str, content: &[u8]) -> Check {
    let mut h = ok(fs.open(path))?
        .into_file()
        .ok_or_else(|| TestResult::error(format!("{path} opened as a directory")))?;
    let mut sink = Vec::new();
    expect_eq(content.len() as u64, ok(h.write_to(&mut sink))?)?;
    expect_eq(content, sink.as_slice())?;
    // position is at the end now; a second copy writes nothing
    let mut again = Vec::new();
    expect_eq(0, ok(h.write_to(&mut again))?)
}
