//! Styled status messages on stderr.
//!
//! stdout carries the converted HTML, so everything meant for the user goes
//! to stderr.

use console::{Style, Term};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tone {
    Plain,
    Success,
    Warning,
    Error,
    Heading,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Success => Style::new().green(),
            Self::Warning => Style::new().yellow(),
            Self::Error => Style::new().red(),
            Self::Heading => Style::new().cyan().bold(),
        }
    }
}

/// Status reporter for the CLI.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        self.write(Tone::Plain, msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.write(Tone::Success, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.write(Tone::Warning, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.write(Tone::Error, msg);
    }

    /// Section title, e.g. the asset list header.
    pub(crate) fn heading(&self, msg: &str) {
        self.write(Tone::Heading, msg);
    }

    fn write(&self, tone: Tone, msg: &str) {
        // A closed stderr must not fail a conversion that already succeeded.
        let _ = self.term.write_line(&tone.style().apply_to(msg).to_string());
    }
}
