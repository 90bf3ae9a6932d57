//! installas CLI entrypoint.
//!
//! Serves the current Go module at a chosen version from a temporary local
//! proxy and runs `go install` against it, exiting with its exit code.

use clap::Parser;
use installas::cli::Cli;
use installas::error::Result;
use installas::exec::SystemCommandExecutor;
use installas::install::{InstallContext, run};
use installas::output::{usage, write_line};
use modproxy::chain::process_env;
use std::io::Write;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "INSTALLAS_LOG";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = i32::from(err.use_stderr());
            if err.print().is_err() {
                // Nothing left to report to.
            }
            std::process::exit(code);
        }
    };

    let context = InstallContext {
        executor: &SystemCommandExecutor,
        lookup: &process_env,
        proxy_root: None,
    };
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let result = run(&cli, &context, &mut stdout);
    let exit_code = exit_code_for_run_result(result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn exit_code_for_run_result(result: Result<i32>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(code) => code,
        Err(err) => {
            write_line(stderr, &err);
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                write_line(stderr, format!("  caused by: {cause}"));
                source = cause.source();
            }
            if err.shows_usage() {
                write_line(stderr, usage("installas"));
            }
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use installas::error::InstallerError;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(42)]
    fn exit_code_mirrors_go_install(#[case] code: i32) {
        let mut stderr = Vec::new();
        assert_eq!(exit_code_for_run_result(Ok(code), &mut stderr), code);
        assert!(stderr.is_empty());
    }

    #[test]
    fn invalid_target_prints_usage() {
        let err = InstallerError::InvalidTarget {
            target: "./cmd/tool".to_owned(),
        };
        let mut stderr = Vec::new();
        assert_eq!(exit_code_for_run_result(Err(err), &mut stderr), 1);

        let text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(text.contains("package@version or @version"));
        assert!(text.contains("Usage: installas [build flags] <target>"));
    }

    #[test]
    fn error_causes_are_reported() {
        let err = InstallerError::InvalidVersion {
            version: "1.0".to_owned(),
            source: modproxy::ProxyError::InvalidVersion {
                version: "1.0".to_owned(),
                reason: "missing v prefix".to_owned(),
            },
        };
        let mut stderr = Vec::new();
        assert_eq!(exit_code_for_run_result(Err(err), &mut stderr), 1);

        let text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(text.starts_with("version \"1.0\" is invalid\n"));
        assert!(text.contains("caused by: version \"1.0\" is invalid: missing v prefix"));
        assert!(!text.contains("Usage:"));
    }
}
