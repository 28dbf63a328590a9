//! Translation diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// No target equivalent; degraded to a partial translation.
    Unsupported,
    /// The translator had to guess.
    Ambiguous,
    /// Two definitions compete for one name.
    Collision,
    /// A declaration was skipped entirely.
    Ignored,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::Unsupported => "unsupported",
            DiagnosticKind::Ambiguous => "ambiguous",
            DiagnosticKind::Collision => "collision",
            DiagnosticKind::Ignored => "ignored",
        })
    }
}

/// One informational record. Diagnostics never abort a translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based source line; 0 when the record is project-wide.
    pub line: u32,
    pub kind: DiagnosticKind,
    /// What was found, e.g. "ternary expression".
    pub construct: String,
    /// What the translator did about it.
    pub action: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        line: u32,
        construct: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            line,
            kind,
            construct: construct.into(),
            action: action.into(),
        }
    }

    pub fn unsupported(line: u32, construct: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Unsupported, line, construct, action)
    }

    pub fn ambiguous(line: u32, construct: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Ambiguous, line, construct, action)
    }

    pub fn ignored(line: u32, construct: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Ignored, line, construct, "skipped")
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "line {}: ", self.line)?;
        }
        write!(f, "{} {} ({})", self.kind, self.construct, self.action)
    }
}
