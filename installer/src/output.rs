//! User-facing text for the installas CLI.

use std::fmt::Display;
use std::io::Write;

/// Usage text printed alongside target errors.
#[must_use]
pub fn usage(program: &str) -> String {
    format!(
        concat!(
            "Usage: {} [build flags] <target>\n",
            " installs the target package with the specified version.\n\n",
            " target: package@version (./cmd/coolbin@v0.0.1) or @version (@v0.0.1)\n",
            "The binary will be installed in the GOBIN or GOPATH/bin directory.\n",
            "If you want to install the binary in a different location, use GOBIN.",
        ),
        program
    )
}

/// Announcement printed before `go install` runs.
///
/// # Examples
///
/// ```
/// use installas::output::running_message;
///
/// let args = ["install", "-trimpath", "example.com/foo@v1.0.0"];
/// assert_eq!(
///     running_message("go", &args),
///     "Running go install -trimpath example.com/foo@v1.0.0"
/// );
/// ```
#[must_use]
pub fn running_message(program: &str, args: &[&str]) -> String {
    let mut message = format!("Running {program}");
    for arg in args {
        message.push(' ');
        message.push_str(arg);
    }
    message
}

/// Write `message` and a newline, ignoring write failures.
pub fn write_line(out: &mut dyn Write, message: impl Display) {
    if writeln!(out, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}
