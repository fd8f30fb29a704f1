//! Application context: unified state passed to every command handler.

use crate::output::workflow::{Group, WorkflowReporter};
use crate::output::{OutputContext, Reporter, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Running as a GitHub Actions step (`GITHUB_ACTIONS=true`): progress
    /// and errors are emitted as workflow commands.
    pub github_actions: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags and the environment.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let github_actions = std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true");
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            mode,
            github_actions,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Progress reporter for the current host.
    #[must_use]
    pub fn reporter(&self) -> Reporter<'_> {
        if self.github_actions {
            Reporter::Workflow(WorkflowReporter::new(self.output.quiet))
        } else {
            Reporter::Terminal(TerminalReporter::new(&self.output))
        }
    }

    /// Open a collapsible log group under GitHub Actions.
    #[must_use]
    pub fn group(&self, title: &str) -> Option<Group> {
        self.github_actions.then(|| Group::open(title))
    }

    /// `PATH` extension file for later workflow steps, if any.
    #[must_use]
    pub fn path_file(&self) -> Option<std::path::PathBuf> {
        std::env::var_os("GITHUB_PATH")
            .filter(|v| !v.is_empty())
            .map(std::path::PathBuf::from)
    }
}
