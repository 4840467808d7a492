//! Diagnostic types, rule descriptors and message formatting.
//!
//! Every rule publishes one or more [`DiagnosticDescriptor`]s. A descriptor
//! carries the rule id, a message template with `{0}`, `{1}`, ... placeholders
//! and the defaults (severity, enabled state) that options may override.
//! Rules turn a descriptor plus a location into a [`Diagnostic`].

use serde::{Deserialize, Serialize};

use crate::span::Span;

// =============================================================================
// Severity / Category
// =============================================================================

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Hidden = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Hidden => "hidden",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The quality area a rule belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleCategory {
    Design,
    Maintainability,
    Naming,
    Performance,
    Reliability,
    Security,
    Usage,
}

impl RuleCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            RuleCategory::Design => "Design",
            RuleCategory::Maintainability => "Maintainability",
            RuleCategory::Naming => "Naming",
            RuleCategory::Performance => "Performance",
            RuleCategory::Reliability => "Reliability",
            RuleCategory::Security => "Security",
            RuleCategory::Usage => "Usage",
        }
    }
}

// =============================================================================
// Descriptors
// =============================================================================

/// Static metadata describing one kind of diagnostic a rule can report.
///
/// Several descriptors may share an `id` when a rule reports the same problem
/// with different messages (for example a definite and a possible variant).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    /// Message template with `{0}`, `{1}`, ... placeholders.
    pub message_format: &'static str,
    pub category: RuleCategory,
    pub default_severity: Severity,
    pub is_enabled_by_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_link: Option<&'static str>,
    pub custom_tags: &'static [&'static str],
}

impl DiagnosticDescriptor {
    /// Create a diagnostic for this descriptor at `span` in `file`.
    ///
    /// `args` fill the message template placeholders in order.
    #[must_use]
    pub fn create(&self, file: &str, span: Span, args: &[&str]) -> Diagnostic {
        Diagnostic {
            file: file.to_string(),
            start: span.start,
            length: span.len(),
            message_text: format_message(self.message_format, args),
            severity: self.default_severity,
            code: self.id,
            category: self.category,
            related_information: Vec::new(),
        }
    }
}

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Related information for a diagnostic (e.g., "see also" locations).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRelatedInformation {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
}

/// A reported diagnostic with optional related information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub severity: Severity,
    /// Id of the rule that reported this diagnostic.
    pub code: &'static str,
    pub category: RuleCategory,
    /// Related information spans (e.g., where a property was declared)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Add related information to this diagnostic.
    #[must_use]
    pub fn with_related(mut self, file: String, span: Span, message: String) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            file,
            start: span.start,
            length: span.len(),
            message_text: message,
        });
        self
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        Span::at(self.start, self.length)
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
