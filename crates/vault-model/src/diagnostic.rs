//! Non-fatal findings reported alongside engine results
//!
//! Per-document problems never abort a pass. Each engine returns its primary
//! result together with a [`Diagnostics`] list; callers decide what is fatal.

use crate::path::VaultPath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Person page without a `name`
    MissingRequiredField,
    /// Preamble could not be parsed
    MalformedMetadata,
    /// Name, alias or email claimed by more than one person
    AmbiguousIdentity,
    /// Reference that does not resolve inside the vault
    BrokenReference,
    /// Preamble key with the wrong shape
    InvalidFieldType,
    /// Email failing syntax validation
    InvalidEmail,
    /// Tag that should no longer be used
    DeprecatedTag,
    /// `reminders.listName` differs from `name`
    ListNameMismatch,
    /// Person whose name carries task markup, skipped by task linking
    UnlinkablePerson,
    /// Listed document could not be read
    UnreadableDocument,
    /// Repaired content could not be written back
    WriteFailed,
    /// Run deadline expired before every document was processed
    RunTimedOut,
}

impl DiagnosticKind {
    /// Default severity for this kind
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::MissingRequiredField
            | DiagnosticKind::MalformedMetadata
            | DiagnosticKind::InvalidFieldType
            | DiagnosticKind::UnreadableDocument
            | DiagnosticKind::WriteFailed => Severity::Error,
            DiagnosticKind::AmbiguousIdentity
            | DiagnosticKind::BrokenReference
            | DiagnosticKind::InvalidEmail
            | DiagnosticKind::DeprecatedTag
            | DiagnosticKind::ListNameMismatch
            | DiagnosticKind::UnlinkablePerson
            | DiagnosticKind::RunTimedOut => Severity::Warning,
        }
    }

    /// Snake-case name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::MissingRequiredField => "missing_required_field",
            DiagnosticKind::MalformedMetadata => "malformed_metadata",
            DiagnosticKind::AmbiguousIdentity => "ambiguous_identity",
            DiagnosticKind::BrokenReference => "broken_reference",
            DiagnosticKind::InvalidFieldType => "invalid_field_type",
            DiagnosticKind::InvalidEmail => "invalid_email",
            DiagnosticKind::DeprecatedTag => "deprecated_tag",
            DiagnosticKind::ListNameMismatch => "list_name_mismatch",
            DiagnosticKind::UnlinkablePerson => "unlinkable_person",
            DiagnosticKind::UnreadableDocument => "unreadable_document",
            DiagnosticKind::WriteFailed => "write_failed",
            DiagnosticKind::RunTimedOut => "run_timed_out",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Document the finding is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<VaultPath>,
    /// Name, alias, email, tag or target the finding concerns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// 1-based line, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub message: String,
}

impl Diagnostic {
    /// Create diagnostic with the kind's default severity
    #[inline]
    #[must_use]
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            path: None,
            subject: None,
            line: None,
            message: message.into(),
        }
    }

    /// With document path
    #[inline]
    #[must_use]
    pub fn with_path(mut self, path: VaultPath) -> Self {
        self.path = Some(path);
        self
    }

    /// With subject
    #[inline]
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// With line number
    #[inline]
    #[must_use]
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Override severity
    #[inline]
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Whether this is an error
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{level}[{}]", self.kind)?;
        if let Some(path) = &self.path {
            write!(f, " {path}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
            }
        }
        write!(f, ": {}", self.message)
    }
}

/// Ordered list of diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Create empty list
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one diagnostic
    #[inline]
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Iterate in insertion order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Error-severity diagnostics
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Error)
    }

    /// Warning-severity diagnostics
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Warning)
    }

    /// Number of diagnostics of `kind`
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.0.iter().filter(|d| d.kind == kind).count()
    }

    /// Whether any error-severity diagnostic is present
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow as slice
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.0
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
