//! memfis-probe: load a real directory into a [`MemFs`] and inspect it.
//!
//! The loader walks the directory with `ignore`, so hidden files and
//! anything matched by `.gitignore`/`.ignore` are left out unless asked
//! for. Every directory is stored as a marker entry, so empty directories
//! survive the trip.

use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use ignore::WalkBuilder;
use memfis::{
    walk_dir, DirEntry, ErrorKind, File, Filesystem, FsError, MemEntry, MemFs, ReadDirFile,
    WalkControl, Whence,
};
use serde::Serialize;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "memfis-probe",
    version,
    about = "Load a directory into an in-memory filesystem and inspect it"
)]
pub struct Args {
    /// Directory to load.
    #[arg(env = "MEMFIS_ROOT")]
    pub root: PathBuf,

    /// Include hidden files and directories.
    #[arg(long)]
    pub hidden: bool,

    /// Do not honour .gitignore and .ignore files.
    #[arg(long)]
    pub no_ignore: bool,

    /// Print the paths matching PATTERN.
    #[arg(long = "glob", value_name = "PATTERN")]
    pub globs: Vec<String>,

    /// List the whole tree. This is the default when no other action is given.
    #[arg(long)]
    pub list: bool,

    /// List as JSON lines.
    #[arg(long)]
    pub json: bool,

    /// Run the directory handle probe sequence against the root.
    #[arg(long)]
    pub probe: bool,

    /// Run the conformance checker and fail if any check fails.
    #[arg(long)]
    pub check: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub hidden: bool,
    pub respect_ignore: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            hidden: false,
            respect_ignore: true,
        }
    }
}

/// "/"-joined path of `path` below `root`, or `None` if it is not valid UTF-8.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(s) => parts.push(s.to_str()?),
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Read every file below `root` into memory.
pub fn load_dir(root: &Path, opts: &LoadOptions) -> Result<MemFs<MemEntry>> {
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }
    let walker = WalkBuilder::new(root)
        .hidden(!opts.hidden)
        .ignore(opts.respect_ignore)
        .git_ignore(opts.respect_ignore)
        .git_global(opts.respect_ignore)
        .git_exclude(opts.respect_ignore)
        .parents(opts.respect_ignore)
        .require_git(false)
        .follow_links(false)
        .build();

    let mut entries = Vec::new();
    for result in walker {
        let dent = result.context("walking directory")?;
        if dent.depth() == 0 {
            continue;
        }
        let Some(name) = relative_path(root, dent.path()) else {
            tracing::warn!(path = %dent.path().display(), "skipping path that is not valid UTF-8");
            continue;
        };
        match dent.file_type() {
            Some(ft) if ft.is_dir() => entries.push(MemEntry::dir(&name)),
            Some(ft) if ft.is_file() => {
                let content = std::fs::read(dent.path())
                    .with_context(|| format!("reading {}", dent.path().display()))?;
                entries.push(MemEntry::new(name, content));
            }
            _ => tracing::debug!(path = %name, "skipping special file"),
        }
    }

    let fs = MemFs::new(entries).with_context(|| format!("loading {}", root.display()))?;
    tracing::info!(root = %root.display(), entries = fs.len(), "loaded directory");
    Ok(fs)
}

#[derive(Serialize)]
struct Row<'a> {
    path: &'a str,
    #[serde(flatten)]
    entry: &'a DirEntry,
}

/// Write one line per directory and file, `ls -l` style or as JSON.
pub fn list<F: Filesystem>(fs: &F, json: bool, out: &mut dyn Write) -> Result<()> {
    walk_dir(fs, ".", |path, info| {
        let written = if json {
            serde_json::to_string(&Row { path, entry: info })
                .map_err(io::Error::from)
                .and_then(|line| writeln!(out, "{line}"))
        } else {
            writeln!(out, "{} {:>8} {}", info.mode, info.size, path)
        };
        written
            .map(|()| WalkControl::Continue)
            .map_err(|e| FsError::new("list", path, ErrorKind::Io(e)))
    })?;
    Ok(())
}

/// Write the matches of each pattern, one path per line.
pub fn glob<F: Filesystem>(fs: &F, patterns: &[String], out: &mut dyn Write) -> Result<()> {
    for pattern in patterns {
        let matches = fs
            .glob(pattern)
            .with_context(|| format!("glob {pattern:?}"))?;
        tracing::debug!(%pattern, matches = matches.len(), "glob");
        for path in matches {
            writeln!(out, "{path}")?;
        }
    }
    Ok(())
}

fn show_entries(entries: &[DirEntry]) -> String {
    let names: Vec<String> = entries
        .iter()
        .map(|e| {
            if e.is_dir() {
                format!("{}/", e.name)
            } else {
                e.name.clone()
            }
        })
        .collect();
    format!("[{}]", names.join(", "))
}

struct Probe<'a> {
    out: &'a mut dyn Write,
}

impl Probe<'_> {
    fn step<T>(
        &mut self,
        label: &str,
        res: Result<T, FsError>,
        show: impl FnOnce(&T) -> String,
    ) -> io::Result<()> {
        match res {
            Ok(v) => writeln!(self.out, "{label}: {}", show(&v)),
            Err(err) => writeln!(self.out, "{label}: error: {err}"),
        }
    }

    fn entries(&mut self, label: &str, res: Result<Vec<DirEntry>, FsError>) -> io::Result<()> {
        self.step(label, res, |e| show_entries(e))
    }

    fn unit(&mut self, label: &str, res: Result<(), FsError>) -> io::Result<()> {
        self.step(label, res, |()| "ok".to_string())
    }
}

/// Drive a directory handle through the open/read/list/seek/close sequence
/// and write what each call returned.
pub fn probe<F: Filesystem>(fs: &F, dir: &str, out: &mut dyn Write) -> Result<()> {
    let mut p = Probe { out };
    let mut buf = [0u8; 1024];

    let mut h = fs.open(dir).with_context(|| format!("open {dir}"))?;
    writeln!(p.out, "open {dir}: ok")?;
    p.step("stat", h.stat(), |i| format!("{} {}", i.mode, i.name))?;
    p.step("read", h.read(&mut buf), |n| n.to_string())?;
    p.entries("read_dir(-1) #1.1", h.read_dir(-1))?;
    p.entries("read_dir(1) #1.2", h.read_dir(1))?;
    p.entries("read_dir(1) #1.3", h.read_dir(1))?;
    p.entries("read_dir(2) #1.4", h.read_dir(2))?;
    p.unit("close #1", h.close())?;
    p.step("read", h.read(&mut buf), |n| n.to_string())?;
    p.step("stat", h.stat(), |i| format!("{} {}", i.mode, i.name))?;
    p.unit("close #2", h.close())?;

    let mut h = fs.open(dir).with_context(|| format!("open {dir}"))?;
    p.entries("read_dir(1) #2.1", h.read_dir(1))?;
    p.entries("read_dir(1) #2.2", h.read_dir(1))?;
    p.entries("read_dir(-1) #2.3", h.read_dir(-1))?;
    p.entries("read_dir(1) #2.4", h.read_dir(1))?;
    p.entries("read_dir(-1) #2.5", h.read_dir(-1))?;
    p.entries("read_dir(1) #2.6", h.read_dir(1))?;
    h.close()?;

    let mut h = fs.open(dir).with_context(|| format!("open {dir}"))?;
    p.step("seek(0, current)", h.seek(0, Whence::Current), |n| n.to_string())?;
    p.entries("read_dir(2) #3.1", h.read_dir(2))?;
    p.step("seek(0, start)", h.seek(0, Whence::Start), |n| n.to_string())?;
    p.entries("read_dir(0) #4.1", h.read_dir(0))?;
    h.close()?;
    Ok(())
}

/// Run the actions selected in `args`, writing results to `out`.
pub fn run(args: &Args, out: &mut dyn Write) -> Result<()> {
    let opts = LoadOptions {
        hidden: args.hidden,
        respect_ignore: !args.no_ignore,
    };
    let fs = load_dir(&args.root, &opts)?;

    let default_action = args.globs.is_empty() && !args.probe && !args.check;
    if args.list || args.json || default_action {
        list(&fs, args.json, out)?;
    }
    glob(&fs, &args.globs, out)?;
    if args.probe {
        probe(&fs, ".", out)?;
    }
    if args.check {
        let summary = memfis_testutil::check_memfs(&fs, &[]);
        write!(out, "{summary}")?;
        if !summary.all_passed() {
            bail!("{} conformance checks failed", summary.failed + summary.errors);
        }
    }
    Ok(())
}
