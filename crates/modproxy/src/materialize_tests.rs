//! Unit tests for proxy directory assembly.

use super::*;
use crate::archive::list_entries;
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    source: Utf8PathBuf,
    root: Utf8PathBuf,
}

#[fixture]
fn workspace() -> Workspace {
    let dir = TempDir::new().expect("temp dir creation succeeds");
    let base = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("temp dir is UTF-8");
    let source = base.join("src");
    let root = base.join("proxy");
    fs::create_dir_all(&source).expect("mkdir src");
    fs::create_dir_all(&root).expect("mkdir proxy");
    Workspace {
        _dir: dir,
        source,
        root,
    }
}

fn write(root: &Utf8Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("file has a parent")).expect("mkdir");
    fs::write(path, contents).expect("write file");
}

fn module(path: &str, version: &str) -> ModuleVersion {
    ModuleVersion::parse(path, version).expect("valid identity")
}

fn fixed_info(version: &str) -> InfoRecord {
    let time = Utc
        .with_ymd_and_hms(2023, 1, 1, 12, 0, 0)
        .single()
        .expect("unambiguous timestamp");
    InfoRecord::new(version, time)
}

fn tree_len(dir: &Utf8Path) -> usize {
    fs::read_dir(dir).expect("read dir").count()
}

#[rstest]
fn release_version_produces_four_files(workspace: Workspace) {
    write(&workspace.source, "go.mod", "module example.com/foo\n");
    write(&workspace.source, "main.go", "package main\n");
    let module = module("example.com/foo", "v1.0.0");

    let proxy = materialize_with(
        &workspace.root,
        &module,
        &workspace.source,
        &fixed_info("v1.0.0"),
    )
    .expect("materialize");

    let layout = proxy.layout();
    assert_eq!(
        proxy.written(),
        [
            layout.list_path(),
            layout.mod_path(),
            layout.info_path(),
            layout.zip_path(),
        ]
    );
    assert_eq!(
        fs::read_to_string(layout.list_path()).expect("list"),
        "v1.0.0\n"
    );
    assert_eq!(
        fs::read_to_string(layout.mod_path()).expect("mod"),
        "module example.com/foo\n"
    );
    assert_eq!(
        fs::read_to_string(layout.info_path()).expect("info"),
        r#"{"Version": "v1.0.0", "Time":"2023-01-01T12:00:00Z"}"#
    );
    assert_eq!(
        list_entries(&layout.zip_path()).expect("zip"),
        vec!["example.com/foo@v1.0.0/go.mod", "example.com/foo@v1.0.0/main.go"]
    );
    assert!(!layout.latest_path().exists());
}

#[rstest]
fn pseudo_version_produces_five_files(workspace: Workspace) {
    let version = "v0.0.0-20230101120000-abcdefabcdef";
    write(&workspace.source, "go.mod", "module example.com/foo\n");
    let module = module("example.com/foo", version);

    let proxy = materialize_with(
        &workspace.root,
        &module,
        &workspace.source,
        &fixed_info(version),
    )
    .expect("materialize");

    assert_eq!(proxy.written().len(), 5);
    let latest = fs::read_to_string(proxy.layout().latest_path()).expect("latest");
    assert_eq!(
        latest,
        format!(r#"{{"Version": "{version}", "Time":"2023-01-01T12:00:00Z"}}"#)
    );
}

#[rstest]
fn versions_accumulate_in_one_root(workspace: Workspace) {
    write(&workspace.source, "go.mod", "module example.com/foo\n");
    materialize_into(&workspace.root, &module("example.com/foo", "v1.0.0"), &workspace.source)
        .expect("first version");
    let proxy = materialize_into(
        &workspace.root,
        &module("example.com/foo", "v1.1.0"),
        &workspace.source,
    )
    .expect("second version");

    let layout = proxy.layout();
    assert_eq!(
        fs::read_to_string(layout.list_path()).expect("list"),
        "v1.0.0\nv1.1.0\n"
    );
    assert_eq!(tree_len(&layout.version_dir()), 7);
}

#[rstest]
fn uppercase_identities_are_escaped_on_disk(workspace: Workspace) {
    write(&workspace.source, "go.mod", "module github.com/Org/Tool\n");
    let module = module("github.com/Org/Tool", "v1.0.0-RC1");

    let proxy = materialize_into(&workspace.root, &module, &workspace.source)
        .expect("materialize");

    let version_dir = workspace.root.join("github.com/!org/!tool/@v");
    assert_eq!(proxy.layout().version_dir(), version_dir);
    assert!(version_dir.join("v1.0.0-!r!c1.zip").is_file());
    assert!(version_dir.join("v1.0.0-!r!c1.info").is_file());
    assert_eq!(
        fs::read_to_string(version_dir.join("list")).expect("list"),
        "v1.0.0-RC1\n"
    );
}

#[rstest]
fn missing_manifest_writes_nothing(workspace: Workspace) {
    write(&workspace.source, "main.go", "package main\n");

    let err = materialize_into(
        &workspace.root,
        &module("example.com/foo", "v1.0.0"),
        &workspace.source,
    )
    .expect_err("go.mod is required");

    assert!(
        matches!(err, ProxyError::MissingManifest { ref path } if path == &workspace.source.join("go.mod"))
    );
    assert_eq!(tree_len(&workspace.root), 0);
}

#[cfg(unix)]
#[rstest]
fn invalid_tree_writes_nothing(workspace: Workspace) {
    write(&workspace.source, "go.mod", "module example.com/foo\n");
    write(&workspace.source, "bad\"name.go", "package foo\n");

    let err = materialize_into(
        &workspace.root,
        &module("example.com/foo", "v1.0.0"),
        &workspace.source,
    )
    .expect_err("file name is rejected");

    assert!(matches!(err, ProxyError::InvalidFilePath { .. }));
    assert_eq!(tree_len(&workspace.root), 0);
}

#[rstest]
fn non_canonical_version_writes_nothing(workspace: Workspace) {
    write(&workspace.source, "go.mod", "module example.com/foo\n");

    let err = materialize_into(
        &workspace.root,
        &module("example.com/foo", "v1.2"),
        &workspace.source,
    )
    .expect_err("shorthand version");

    assert!(matches!(err, ProxyError::NonCanonicalVersion { .. }));
    assert_eq!(tree_len(&workspace.root), 0);
}

#[test]
fn create_root_makes_a_fresh_directory_each_time() {
    let first = create_root().expect("first root");
    let second = create_root().expect("second root");
    assert_ne!(first, second);
    assert!(first.is_dir());
    assert!(
        first
            .file_name()
            .is_some_and(|name| name.starts_with(ROOT_PREFIX))
    );
    fs::remove_dir(&first).expect("cleanup first");
    fs::remove_dir(&second).expect("cleanup second");
}
