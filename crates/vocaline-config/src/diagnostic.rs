//! Non-fatal problems found while compiling a table.

use std::fmt;

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The entry was kept or a default was substituted.
    Warning,
    /// The entry was skipped.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// One problem with a table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity.
    pub severity: Severity,
    /// Dotted path of the entry, e.g. `symbols[3]` or `timing.lead_clamp`.
    pub location: String,
    /// What is wrong.
    pub message: String,
}

impl Diagnostic {
    /// A warning.
    pub fn warning(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            location: location.into(),
            message: message.into(),
        }
    }

    /// An error. The entry it names was skipped.
    pub fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            location: location.into(),
            message: message.into(),
        }
    }

    /// True for [`Severity::Error`].
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.location, self.message)
    }
}

/// Whether any diagnostic is an error.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let d = Diagnostic::error("fallbacks[1]", "expected 'from=to'");
        assert_eq!(d.to_string(), "error: fallbacks[1]: expected 'from=to'");
        let w = Diagnostic::warning("symbols", "no symbols declared");
        assert_eq!(w.to_string(), "warning: symbols: no symbols declared");
    }

    #[test]
    fn error_detection() {
        let warnings = [Diagnostic::warning("a", "b")];
        assert!(!has_errors(&warnings));
        let mixed = [Diagnostic::warning("a", "b"), Diagnostic::error("c", "d")];
        assert!(has_errors(&mixed));
        assert!(Severity::Error > Severity::Warning);
    }
}
