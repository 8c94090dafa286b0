//! Sync progress lines on stderr.

use console::{Style, Term};

/// Kind of line, which picks its color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tone {
    /// Planned change in dry-run mode.
    Plain,
    /// Page created or updated, or a clean summary.
    Done,
    /// Page left untouched.
    Unchanged,
    /// Nothing to do, or a mode banner.
    Notice,
    /// Document or run failure.
    Failed,
}

/// Writes progress and summary lines to stderr.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    /// Write one line in the given tone.
    pub(crate) fn line(&self, tone: Tone, msg: &str) {
        let style = match tone {
            Tone::Plain => Style::new(),
            Tone::Done => Style::new().green(),
            Tone::Unchanged => Style::new().dim(),
            Tone::Notice => Style::new().cyan().bold(),
            Tone::Failed => Style::new().red(),
        };
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }

    /// Write a failure line.
    pub(crate) fn error(&self, msg: &str) {
        self.line(Tone::Failed, msg);
    }
}
