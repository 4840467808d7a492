use colored::Colorize;
use rustc_hash::FxHashMap;

use opcheck_common::{Diagnostic, DiagnosticRelatedInformation, LineMap, Severity};
use opcheck_ir::CompilationUnit;

/// Renders diagnostics as `file(line,col): severity CODE: message` lines.
///
/// Locations are mapped through the source text a unit embeds; units without
/// source text are reported by file name only. Diagnostics name their file,
/// not their unit, so a file name shared by units with different source text
/// is also reported by file name only.
pub struct Reporter {
    color: bool,
    /// `None` marks a file name whose units disagree on the source text.
    sources: FxHashMap<String, Option<(String, LineMap)>>,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter {
            color,
            sources: FxHashMap::default(),
        }
    }

    /// Make the source text of `units` available for location mapping.
    pub fn add_sources(&mut self, units: &[CompilationUnit]) {
        for unit in units {
            let Some(source) = &unit.source else {
                continue;
            };
            match self.sources.get_mut(&unit.file) {
                None => {
                    let map = LineMap::build(source);
                    self.sources
                        .insert(unit.file.clone(), Some((source.clone(), map)));
                }
                Some(entry) => {
                    let differs = entry.as_ref().is_some_and(|(known, _)| known != source);
                    if differs {
                        tracing::warn!(
                            file = %unit.file,
                            "units share a file name but not their source; positions omitted"
                        );
                        *entry = None;
                    }
                }
            }
        }
    }

    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let mut output = self.format_location(&diagnostic.file, diagnostic.start);
        output.push_str(": ");
        output.push_str(&self.format_severity(diagnostic.severity));
        output.push(' ');
        output.push_str(&self.format_code(diagnostic.code));
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);

        for related in &diagnostic.related_information {
            output.push('\n');
            output.push_str(&self.format_related(related));
        }
        output
    }

    /// One-line count, e.g. `Found 2 diagnostics in 1 file.`
    pub fn summary(&self, diagnostics: &[Diagnostic]) -> String {
        let mut files: Vec<&str> = diagnostics.iter().map(|d| d.file.as_str()).collect();
        files.sort_unstable();
        files.dedup();

        let count = diagnostics.len();
        let text = format!(
            "Found {count} diagnostic{} in {} file{}.",
            if count == 1 { "" } else { "s" },
            files.len(),
            if files.len() == 1 { "" } else { "s" }
        );
        if self.color {
            text.bold().to_string()
        } else {
            text
        }
    }

    fn format_related(&self, related: &DiagnosticRelatedInformation) -> String {
        let location = self.format_location(&related.file, related.start);
        let prefix = if self.color {
            "  related".dimmed().to_string()
        } else {
            "  related".to_string()
        };
        format!("{prefix}: {location}: {}", related.message_text)
    }

    fn format_location(&self, file: &str, offset: u32) -> String {
        let file = if file.is_empty() { "<unknown>" } else { file };
        let Some(Some((source, map))) = self.sources.get(file) else {
            return file.to_string();
        };
        let position = map.offset_to_position(offset, source);
        format!("{file}({},{})", position.line + 1, position.character + 1)
    }

    fn format_severity(&self, severity: Severity) -> String {
        let label = severity.as_str();
        if !self.color {
            return label.to_string();
        }
        match severity {
            Severity::Error => label.red().bold().to_string(),
            Severity::Warning => label.yellow().bold().to_string(),
            Severity::Info => label.cyan().bold().to_string(),
            Severity::Hidden => label.dimmed().to_string(),
        }
    }

    fn format_code(&self, code: &str) -> String {
        if self.color {
            code.bright_blue().to_string()
        } else {
            code.to_string()
        }
    }
}

#[cfg(test)]
#[path = "../tests/reporter_tests.rs"]
mod tests;
