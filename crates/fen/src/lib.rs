//! Front end and middle end of the Fen language: lexing, parsing, name
//! resolution and type decoration, plus the queries an editor needs.

pub mod config;
pub mod decorated;
pub mod decorator;
pub mod diagnostics;
pub mod errors;
pub mod lexer;
pub mod module;
pub mod nodes;
pub mod outline;
pub mod query;
pub mod semantic_tokens;
pub mod source;
pub mod surface;
pub mod syntax;
pub mod token;
pub mod type_lookup;
pub mod types;
pub mod workspace;

pub use config::ProjectConfig;
pub use decorator::{decorate_module, DecorateOptions, DecorateResult};
pub use diagnostics::{render_diagnostics, Diagnostic, DiagnosticSeverity};
pub use errors::{DecorateError, DecorateErrorKind, DecorateWarning, DecorateWarningKind, FenError};
pub use module::{Module, ModuleResolver, StaticModules};
pub use source::{DocumentUri, Position, Range, SourceFileReference};
pub use surface::{parse_source, ParseResult};
pub use workspace::{
    CompiledDocument, DocumentOverlay, DocumentProvider, FileSystemDocuments, InMemoryDocuments, Workspace,
};

/// Parses and decorates a standalone document that imports nothing it
/// cannot find in `resolver`.
pub fn compile_source(
    text: &str,
    path: Vec<String>,
    document: DocumentUri,
    resolver: &mut dyn ModuleResolver,
    options: DecorateOptions,
) -> (ParseResult, DecorateResult) {
    let parsed = parse_source(text, &document);
    let decorated = decorate_module(&parsed.module, path, document, resolver, options);
    (parsed, decorated)
}
