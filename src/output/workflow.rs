//! GitHub Actions workflow commands (`::name::message` lines on stdout).

use crate::application::ports::ProgressReporter;

/// Escape a workflow command message.
#[must_use]
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Render a workflow command line.
#[must_use]
pub fn command(name: &str, message: &str) -> String {
    format!("::{name}::{}", escape_data(message))
}

/// Ask the runner to redact `secret` from all later log output.
pub fn add_mask(secret: &str) {
    println!("{}", command("add-mask", secret));
}

/// Annotate the run with an error.
pub fn error(message: &str) {
    println!("{}", command("error", message));
}

/// Collapsible log group; closed when dropped.
#[must_use = "the group closes when the guard is dropped"]
pub struct Group;

impl Group {
    pub fn open(title: &str) -> Self {
        println!("{}", command("group", title));
        Self
    }
}

impl Drop for Group {
    fn drop(&mut self) {
        println!("::endgroup::");
    }
}

/// `ProgressReporter` emitting workflow commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkflowReporter {
    quiet: bool,
}

impl WorkflowReporter {
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ProgressReporter for WorkflowReporter {
    fn step(&self, message: &str) {
        if !self.quiet {
            println!("{message}");
        }
    }

    fn success(&self, message: &str) {
        if !self.quiet {
            println!("{message}");
        }
    }

    /// Warnings are annotations and are never suppressed.
    fn warn(&self, message: &str) {
        println!("{}", command("warning", message));
    }
}
