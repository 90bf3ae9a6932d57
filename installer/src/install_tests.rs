//! Tests for the install flow against a stub executor.

use super::*;
use crate::golist::LIST_FORMAT;
use crate::test_utils::{ExpectedCall, StubExecutor, failure_output, output_with};
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use std::fs;
use tempfile::TempDir;

struct Project {
    _dir: TempDir,
    module_dir: Utf8PathBuf,
    proxy_root: Utf8PathBuf,
}

#[fixture]
fn project() -> Project {
    let dir = TempDir::new().expect("temp dir creation succeeds");
    let base = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("temp dir is UTF-8");
    let module_dir = base.join("foo");
    let proxy_root = base.join("proxy");
    fs::create_dir_all(module_dir.join("cmd/bar")).expect("mkdir module");
    fs::create_dir_all(&proxy_root).expect("mkdir proxy");
    fs::write(module_dir.join("go.mod"), "module example.com/foo\n").expect("write go.mod");
    fs::write(module_dir.join("cmd/bar/main.go"), "package main\n").expect("write main.go");
    Project {
        _dir: dir,
        module_dir,
        proxy_root,
    }
}

fn go_list(package: &'static str, module_dir: &Utf8Path) -> ExpectedCall {
    let stdout = format!("example.com/foo/cmd/bar\nexample.com/foo\n{module_dir}");
    ExpectedCall::new(
        "go",
        ["list", "-f", LIST_FORMAT, package],
        Ok(output_with(0, &stdout)),
    )
}

fn no_env(_: &str) -> Option<String> {
    None
}

fn args(values: &[&str]) -> Cli {
    Cli {
        args: values.iter().map(|value| (*value).to_owned()).collect(),
    }
}

#[rstest]
#[case::success(0)]
#[case::failure(2)]
fn forwards_the_go_install_exit_code(project: Project, #[case] code: i32) {
    let executor = StubExecutor::new(vec![
        go_list("./cmd/bar", &project.module_dir),
        ExpectedCall::new(
            "go",
            ["install", "-trimpath", "example.com/foo/cmd/bar@v1.0.0"],
            Ok(output_with(code, "")),
        ),
    ]);
    let context = InstallContext {
        executor: &executor,
        lookup: &no_env,
        proxy_root: Some(&project.proxy_root),
    };
    let mut stdout = Vec::new();

    let exit = run(
        &args(&["-trimpath", "./cmd/bar@v1.0.0"]),
        &context,
        &mut stdout,
    )
    .expect("install runs");

    assert_eq!(exit, code);
    assert_eq!(
        String::from_utf8(stdout).expect("UTF-8 stdout"),
        "Running go install -trimpath example.com/foo/cmd/bar@v1.0.0\n"
    );
    executor.assert_finished();
}

#[rstest]
fn go_install_sees_the_composed_environment(project: Project) {
    let executor = StubExecutor::new(vec![
        go_list(".", &project.module_dir),
        ExpectedCall::new(
            "go",
            ["install", "example.com/foo/cmd/bar@v0.0.1"],
            Ok(output_with(0, "")),
        ),
    ]);
    let lookup = |key: &str| (key == "GONOSUMDB").then(|| "corp.example".to_owned());
    let context = InstallContext {
        executor: &executor,
        lookup: &lookup,
        proxy_root: Some(&project.proxy_root),
    };

    run(&args(&["@v0.0.1"]), &context, &mut Vec::new()).expect("install runs");

    let envs = executor.recorded_envs();
    assert_eq!(envs.len(), 1, "expected one go install invocation");
    let env = envs.first().expect("recorded environment");
    let expected_url = modproxy::chain::file_url(&project.proxy_root).expect("absolute root");
    assert_eq!(
        env,
        &vec![
            (
                "GOPROXY".to_owned(),
                format!(
                    "{},https://proxy.golang.org,direct",
                    expected_url.as_str().trim_end_matches('/')
                ),
            ),
            ("GONOSUMDB".to_owned(), "example.com/foo,corp.example".to_owned()),
        ]
    );
    assert!(
        project
            .proxy_root
            .join("example.com/foo/@v/v0.0.1.zip")
            .is_file()
    );
}

#[rstest]
fn missing_manifest_stops_before_go_install(project: Project) {
    fs::remove_file(project.module_dir.join("go.mod")).expect("remove go.mod");
    let executor = StubExecutor::new(vec![go_list(".", &project.module_dir)]);
    let context = InstallContext {
        executor: &executor,
        lookup: &no_env,
        proxy_root: Some(&project.proxy_root),
    };

    let err = run(&args(&["@v1.0.0"]), &context, &mut Vec::new()).expect_err("no go.mod");

    assert!(matches!(
        err,
        InstallerError::Proxy(modproxy::ProxyError::MissingManifest { .. })
    ));
    assert!(executor.recorded_envs().is_empty());
    executor.assert_finished();
}

#[rstest]
fn major_version_must_match_the_module_path(project: Project) {
    let executor = StubExecutor::new(vec![go_list(".", &project.module_dir)]);
    let context = InstallContext {
        executor: &executor,
        lookup: &no_env,
        proxy_root: Some(&project.proxy_root),
    };

    let err = run(&args(&["@v2.0.0"]), &context, &mut Vec::new()).expect_err("needs /v2");

    assert!(matches!(
        err,
        InstallerError::Proxy(modproxy::ProxyError::VersionPathMismatch { .. })
    ));
}

#[test]
fn go_list_failure_is_reported() {
    let executor = StubExecutor::new(vec![ExpectedCall::new(
        "go",
        ["list", "-f", LIST_FORMAT, "."],
        Ok(failure_output("go: go.mod file not found")),
    )]);
    let context = InstallContext {
        executor: &executor,
        lookup: &no_env,
        proxy_root: None,
    };

    let err = run(&args(&["@v1.0.0"]), &context, &mut Vec::new()).expect_err("go list fails");
    assert!(matches!(err, InstallerError::GoList { .. }));
}

#[rstest]
#[case::empty(&[])]
#[case::no_separator(&["./cmd/bar"])]
fn bad_targets_run_nothing(#[case] values: &[&str]) {
    let executor = StubExecutor::new(Vec::new());
    let context = InstallContext {
        executor: &executor,
        lookup: &no_env,
        proxy_root: None,
    };

    let err = run(&args(values), &context, &mut Vec::new()).expect_err("invalid target");
    assert!(err.shows_usage());
    executor.assert_finished();
}

#[rstest]
fn launch_failures_propagate(project: Project) {
    let executor = StubExecutor::new(vec![
        go_list(".", &project.module_dir),
        ExpectedCall::new(
            "go",
            ["install", "example.com/foo/cmd/bar@v1.0.0"],
            Err(InstallerError::Launch {
                command: "go".to_owned(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        ),
    ]);
    let context = InstallContext {
        executor: &executor,
        lookup: &no_env,
        proxy_root: Some(&project.proxy_root),
    };

    let err = run(&args(&["@v1.0.0"]), &context, &mut Vec::new()).expect_err("go missing");
    assert!(matches!(err, InstallerError::Launch { .. }));
}
