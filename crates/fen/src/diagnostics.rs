use serde::Serialize;

use crate::source::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticLabel {
    pub message: String,
    pub range: Range,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub range: Range,
    pub labels: Vec<DiagnosticLabel>,
}

impl Diagnostic {
    pub fn error(code: &str, message: impl Into<String>, range: Range) -> Self {
        Self {
            code: code.to_string(),
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            range,
            labels: Vec::new(),
        }
    }

    pub fn warning(code: &str, message: impl Into<String>, range: Range) -> Self {
        Self {
            code: code.to_string(),
            severity: DiagnosticSeverity::Warning,
            message: message.into(),
            range,
            labels: Vec::new(),
        }
    }

    pub fn with_label(mut self, message: impl Into<String>, range: Range) -> Self {
        self.labels.push(DiagnosticLabel {
            message: message.into(),
            range,
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

pub fn diagnostics_have_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

pub fn render_diagnostics(path: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = String::new();
    for (index, diagnostic) in diagnostics.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }
        output.push_str(&render_diagnostic(path, diagnostic));
    }
    output
}

pub fn render_diagnostic(path: &str, diagnostic: &Diagnostic) -> String {
    let mut output = String::new();
    let severity = match diagnostic.severity {
        DiagnosticSeverity::Error => "error",
        DiagnosticSeverity::Warning => "warning",
    };
    output.push_str(&format!(
        "{}[{}] {}:{} {}\n",
        severity, diagnostic.code, path, diagnostic.range.start, diagnostic.message
    ));
    for label in &diagnostic.labels {
        output.push_str(&format!(
            "  note: {} at {}:{}\n",
            label.message, path, label.range.start
        ));
    }
    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Range;

    #[test]
    fn renders_one_based_locations_with_notes() {
        let diagnostic = Diagnostic::error("E3001", "unknown variable 'x'", Range::single_line(2, 4, 1))
            .with_label("defined here", Range::single_line(0, 0, 1));
        let rendered = render_diagnostics("main.fen", &[diagnostic]);
        assert_eq!(
            rendered,
            "error[E3001] main.fen:3:5 unknown variable 'x'\n  note: defined here at main.fen:1:1"
        );
    }

    #[test]
    fn warnings_do_not_count_as_errors() {
        let warning = Diagnostic::warning("W3100", "unused", Range::default());
        assert!(!diagnostics_have_errors(&[warning.clone()]));
        let error = Diagnostic::error("E3000", "bad", Range::default());
        assert!(diagnostics_have_errors(&[warning, error]));
    }
}
