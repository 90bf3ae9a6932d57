//! CLI argument definitions for installas.
//!
//! Every argument belongs to `go install`: the last one is the target and
//! the rest are build flags passed through untouched.

use clap::Parser;

/// Install a Go binary with a chosen version stamp.
#[derive(Parser, Debug, Default)]
#[command(name = "installas")]
#[command(version, about)]
#[command(override_usage = "installas [build flags] <target>")]
#[command(long_about = concat!(
    "Install a Go binary with a chosen version stamp.\n\n",
    "installas serves the current module from a temporary local module proxy ",
    "at the requested version and runs `go install <package>@<version>`, so ",
    "the installed binary reports that version in its build information.",
))]
#[command(after_help = concat!(
    "TARGET:\n",
    "  package@version (./cmd/coolbin@v0.0.1) or @version (@v0.0.1)\n\n",
    "The binary is installed in the GOBIN or GOPATH/bin directory.\n",
    "To install it in a different location, set GOBIN.\n\n",
    "EXAMPLES:\n",
    "  Install the package in the current directory as v0.0.1:\n",
    "    $ installas @v0.0.1\n\n",
    "  Install a command with build flags:\n",
    "    $ installas -trimpath -ldflags=-s ./cmd/coolbin@v1.2.3\n",
))]
pub struct Cli {
    /// Build flags for `go install`, followed by the target.
    #[arg(
        value_name = "ARGS",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,
}

impl Cli {
    /// Split the arguments into build flags and the target.
    ///
    /// Returns `None` when no arguments were given.
    #[must_use]
    pub fn split(&self) -> Option<(&[String], &str)> {
        self.args
            .split_last()
            .map(|(target, flags)| (flags, target.as_str()))
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
