//! Behavioural tests for MemFs through the public contract.

use memfis::{
    walk_dir, BuildError, DirEntry, ErrorKind, File, Filesystem, Handle, MemEntry, MemFs,
    ReadDirFile, WalkControl, Whence,
};
use rstest::rstest;

type Pair = (&'static str, &'static str);

const EXAMPLE: &[Pair] = &[("a/a", "Hello"), ("a/b/c", ""), ("b", "")];

const TREE: &[Pair] = &[
    ("a/a", "Hello"),
    ("a/b/c", ""),
    ("a/b/d", "123"),
    ("a/c/a", "Hi"),
    ("b", ""),
    ("c/a/b/c/d/e", ""),
    ("c/a/b/d/d/e", ""),
    ("c/a/b/d/f", ""),
];

fn build(pairs: &[Pair]) -> MemFs<Pair> {
    MemFs::new(pairs.iter().copied()).unwrap()
}

fn names(entries: &[DirEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| {
            if e.is_dir() {
                format!("{}/", e.name)
            } else {
                e.name.clone()
            }
        })
        .collect()
}

/// `ls -lR` style listing of the whole tree.
fn listing<F: Filesystem>(fs: &F) -> String {
    let mut out = Vec::new();
    walk_dir(fs, ".", |path, info| {
        out.push(format!("{} {:>3} {}", info.mode, info.size, path));
        Ok(WalkControl::Continue)
    })
    .unwrap();
    out.join("\n")
}

#[test]
fn example_tree() {
    let fs = build(EXAMPLE);
    assert!(fs.stat("a/b").unwrap().is_dir());
    assert_eq!(&*fs.read_file("a/a").unwrap(), b"Hello");
    assert_eq!(fs.glob("a/*").unwrap(), ["a/a", "a/b"]);
}

#[test]
fn round_trip_every_entry() {
    let fs = build(TREE);
    for (path, content) in TREE {
        assert_eq!(&*fs.read_file(path).unwrap(), content.as_bytes(), "{path}");
        assert_eq!(fs.stat(path).unwrap().size, content.len() as u64, "{path}");
    }
}

#[test]
fn whole_tree_listing() {
    insta::assert_snapshot!(listing(&build(TREE)), @r"
    drwxr-x---   0 .
    drwxr-x---   0 a
    -rw-r-----   5 a/a
    drwxr-x---   0 a/b
    -rw-r-----   0 a/b/c
    -rw-r-----   3 a/b/d
    drwxr-x---   0 a/c
    -rw-r-----   2 a/c/a
    -rw-r-----   0 b
    drwxr-x---   0 c
    drwxr-x---   0 c/a
    drwxr-x---   0 c/a/b
    drwxr-x---   0 c/a/b/c
    drwxr-x---   0 c/a/b/c/d
    -rw-r-----   0 c/a/b/c/d/e
    drwxr-x---   0 c/a/b/d
    drwxr-x---   0 c/a/b/d/d
    -rw-r-----   0 c/a/b/d/d/e
    -rw-r-----   0 c/a/b/d/f
    ");
}

#[test]
fn sub_listing_matches_parent() {
    let fs = build(TREE);
    let sub = fs.sub("c/a").unwrap();
    insta::assert_snapshot!(listing(&sub), @r"
    drwxr-x---   0 .
    drwxr-x---   0 b
    drwxr-x---   0 b/c
    drwxr-x---   0 b/c/d
    -rw-r-----   0 b/c/d/e
    drwxr-x---   0 b/d
    drwxr-x---   0 b/d/d
    -rw-r-----   0 b/d/d/e
    -rw-r-----   0 b/d/f
    ");
}

#[rstest]
#[case::duplicate(&[("a", "Hi"), ("a", "Ho")], BuildError::DuplicatePath("a".into()))]
#[case::file_is_dir(&[("a", "x"), ("a/b", "y")], BuildError::NameCollision("a".into()))]
#[case::deep_collision(&[("x/y", ""), ("x/y/z", "")], BuildError::NameCollision("x/y".into()))]
#[case::leading_slash(&[("/a", "")], BuildError::InvalidPath("/a".into()))]
#[case::dot_segment(&[("a/./b", "")], BuildError::InvalidPath("a/./b".into()))]
#[case::marker_with_content(&[("d/", "data")], BuildError::DirectoryWithContent("d/".into()))]
fn construction_rejected(#[case] pairs: &[Pair], #[case] expected: BuildError) {
    assert_eq!(MemFs::new(pairs.iter().copied()).unwrap_err(), expected);
}

#[rstest]
#[case::root(".", &["a/", "b", "c/"])]
#[case::collapsed("a", &["a", "b/", "c/"])]
#[case::nested("a/b", &["c", "d"])]
#[case::deep("c/a/b/d", &["d/", "f"])]
fn read_dir_children(#[case] dir: &str, #[case] expected: &[&str]) {
    let fs = build(TREE);
    assert_eq!(names(&fs.read_dir(dir).unwrap()), expected);
}

#[rstest]
#[case::star("*", &["a", "b", "c"])]
#[case::one_level("a/*", &["a/a", "a/b", "a/c"])]
#[case::two_levels("*/*/a", &["a/c/a"])]
#[case::question("a/?", &["a/a", "a/b", "a/c"])]
#[case::class("a/[ab]", &["a/a", "a/b"])]
#[case::literal("b", &["b"])]
#[case::nothing("zzz", &[])]
#[case::double_star_stays_in_segment("**", &["a", "b", "c"])]
#[case::trailing_star_run("a**", &["a"])]
#[case::caret_negation("a/[^a]", &["a/b", "a/c"])]
#[case::escaped_letter("\\b", &["b"])]
#[case::escaped_meta("a/\\*", &[])]
fn glob_matches(#[case] pattern: &str, #[case] expected: &[&str]) {
    assert_eq!(build(TREE).glob(pattern).unwrap(), expected);
}

#[test]
fn glob_rejects_bad_pattern_up_front() {
    let err = build(TREE).glob("a/[").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::BadPattern(_)));
}

#[test]
fn directory_collapsing() {
    let fs = build(&[("a/x", ""), ("a/y", ""), ("b", "")]);
    let entries = fs.read_dir(".").unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].is_dir());
    assert_eq!(entries[0].name, "a");
    assert!(!entries[1].is_dir());
    assert_eq!(entries[1].name, "b");
}

#[test]
fn pagination_resumes() {
    let fs = build(TREE);
    let mut dir = fs.open("a").unwrap();
    let mut seen = Vec::new();
    loop {
        match dir.read_dir(1) {
            Ok(batch) => {
                assert_eq!(batch.len(), 1);
                seen.extend(names(&batch));
            }
            Err(err) => {
                assert!(err.is_eof(), "{err}");
                break;
            }
        }
    }
    assert_eq!(seen, ["a", "b/", "c/"]);
    assert!(dir.read_dir(-1).unwrap().is_empty());
}

#[test]
fn seek_resets_iteration() {
    let fs = build(TREE);
    let mut dir = fs.open(".").unwrap();
    assert_eq!(names(&dir.read_dir(2).unwrap()), ["a/", "b"]);
    assert_eq!(dir.seek(0, Whence::Current).unwrap(), 0);
    assert_eq!(names(&dir.read_dir(-1).unwrap()), ["a/", "b", "c/"]);
}

#[test]
fn closed_file_contract() {
    let fs = build(TREE);
    let mut file = fs.open("a/a").unwrap();
    file.close().unwrap();
    assert!(file.stat().unwrap_err().is_closed());
    assert!(file.read(&mut [0u8; 2]).unwrap_err().is_closed());
    assert!(file.seek(0, Whence::Start).unwrap_err().is_closed());
    let Handle::File(mut inner) = file else {
        panic!("a/a is a file");
    };
    assert!(inner.read_at(&mut [0u8; 2], 0).unwrap_err().is_closed());
    assert!(inner.write_to(&mut Vec::<u8>::new()).unwrap_err().is_closed());
    inner.close().unwrap();
}

#[test]
fn closed_dir_contract() {
    let fs = build(TREE);
    let mut dir = fs.open("a").unwrap();
    dir.close().unwrap();
    assert!(dir.stat().unwrap_err().is_closed());
    assert!(dir.read(&mut [0u8; 2]).unwrap_err().is_closed());
    assert!(dir.seek(0, Whence::Start).unwrap_err().is_closed());
    assert!(dir.read_dir(-1).unwrap_err().is_closed());
    assert!(dir.close().unwrap_err().is_closed());
}

#[test]
fn sub_tree_isolation() {
    let fs = build(&[("a/b", "1"), ("c", "2")]);
    let sub = fs.sub("a").unwrap();
    assert_eq!(names(&sub.read_dir(".").unwrap()), ["b"]);
    assert!(sub.stat("c").unwrap_err().is_not_exist());
    assert!(sub.read_file("../c").unwrap_err().is_invalid());
    assert_eq!(sub.stat(".").unwrap().name, "a");
    let again = sub.sub(".").unwrap();
    assert_eq!(names(&again.read_dir(".").unwrap()), ["b"]);
}

#[test]
fn sub_of_sub() {
    let fs = build(TREE);
    let direct = fs.sub("c/a/b").unwrap();
    let stepwise = fs.sub("c").unwrap().sub("a").unwrap().sub("b").unwrap();
    assert_eq!(direct.glob("*/*").unwrap(), stepwise.glob("*/*").unwrap());
    assert_eq!(stepwise.root_path(), "c/a/b");
}

#[rstest]
#[case::file("b")]
#[case::missing("nope")]
fn sub_needs_a_directory(#[case] dir: &str) {
    assert!(build(TREE).sub(dir).unwrap_err().is_not_exist());
}

#[test]
fn read_file_on_directory() {
    let err = build(TREE).read_file("a/b").unwrap_err();
    assert!(err.is_not_exist());
    assert_eq!(err.op, "readfile");
}

#[test]
fn error_paths_use_public_names() {
    let err = build(TREE).open("a/zz").unwrap_err();
    assert_eq!(err.to_string(), "open a/zz: file does not exist");
}

#[test]
fn mem_entries_and_markers() {
    let fs = MemFs::new(vec![
        MemEntry::new("docs/readme.md", "# hi"),
        MemEntry::dir("empty"),
        MemEntry::new("bin", vec![0u8, 159, 146, 150]),
    ])
    .unwrap();
    assert_eq!(names(&fs.read_dir(".").unwrap()), ["bin", "docs/", "empty/"]);
    assert!(fs.stat("empty").unwrap().is_dir());
    assert_eq!(fs.read_file("bin").unwrap().len(), 4);
}

#[test]
fn sub_of_marked_directory() {
    let fs = MemFs::new([MemEntry::dir("full"), MemEntry::new("full/f", "x")]).unwrap();
    let sub = fs.sub("full").unwrap();
    let root = sub.stat(".").unwrap();
    assert!(root.is_dir());
    assert_eq!(root.name, "full");
    assert_eq!(names(&sub.read_dir(".").unwrap()), ["f"]);
    assert!(sub.open(".").unwrap().is_dir());
    assert_eq!(&*sub.read_file("f").unwrap(), b"x");
}

#[test]
fn file_handle_reads_like_a_file() {
    use std::io::Read;

    let fs = build(TREE);
    let mut handle = fs.open("a/b/d").unwrap().into_file().unwrap();
    let mut s = String::new();
    handle.read_to_string(&mut s).unwrap();
    assert_eq!(s, "123");
}

#[test]
fn store_is_shareable_across_threads() {
    let fs = build(TREE);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let fs = fs.clone();
            std::thread::spawn(move || fs.read_dir("a").unwrap().len())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), 3);
    }
}
