use fen::CompiledDocument;
use tower_lsp::lsp_types::{
    Diagnostic, DiagnosticRelatedInformation, DiagnosticSeverity, Location, NumberOrString, Url,
};

use crate::backend::Backend;

pub(crate) const SOURCE: &str = "fen";

impl Backend {
    /// Parse diagnostics first, then decoration errors and warnings.
    pub(crate) fn build_diagnostics(uri: &Url, compiled: &CompiledDocument) -> Vec<Diagnostic> {
        compiled
            .diagnostics()
            .iter()
            .map(|diagnostic| Self::to_lsp_diagnostic(uri, diagnostic))
            .collect()
    }

    pub(crate) fn to_lsp_diagnostic(uri: &Url, diagnostic: &fen::Diagnostic) -> Diagnostic {
        let related_information = (!diagnostic.labels.is_empty()).then(|| {
            diagnostic
                .labels
                .iter()
                .map(|label| DiagnosticRelatedInformation {
                    location: Location::new(uri.clone(), Self::to_lsp_range(label.range)),
                    message: label.message.clone(),
                })
                .collect()
        });

        Diagnostic {
            range: Self::to_lsp_range(diagnostic.range),
            severity: Some(match diagnostic.severity {
                fen::DiagnosticSeverity::Error => DiagnosticSeverity::ERROR,
                fen::DiagnosticSeverity::Warning => DiagnosticSeverity::WARNING,
            }),
            code: Some(NumberOrString::String(diagnostic.code.clone())),
            code_description: None,
            source: Some(SOURCE.to_string()),
            message: diagnostic.message.clone(),
            related_information,
            tags: None,
            data: None,
        }
    }
}
