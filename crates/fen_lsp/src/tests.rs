use std::path::{Path, PathBuf};
use std::sync::Arc;

use fen::semantic_tokens::{TOKEN_KINDS, TOKEN_MODIFIERS};
use fen::workspace::{CompiledDocument, InMemoryDocuments, Workspace};
use log::LevelFilter;
use serde_json::json;
use tower_lsp::lsp_types::{
    DiagnosticSeverity, GotoDefinitionResponse, HoverContents, NumberOrString, Position, Range, SymbolKind, Url,
};

use crate::backend::Backend;
use crate::logging::parse_level;
use crate::settings::LspSettings;
use crate::state::BackendState;

const SHAPES: &str = "data Shape = Circle Int | Square Int Int\n\
                      area : Shape -> Int\n\
                      area s = case s of\n    Circle r -> r * r\n    Square w h -> w * h\n";

fn compile(text: &str) -> Arc<CompiledDocument> {
    let mut documents = InMemoryDocuments::new();
    documents.insert("/test/Main.fen", text);
    let mut workspace = Workspace::new(documents, vec![PathBuf::from("/test")]);
    workspace.compile(Path::new("/test/Main.fen")).expect("compile")
}

fn sample_uri() -> Url {
    Url::parse("file:///test/Main.fen").expect("valid test uri")
}

fn file_uri(path: &Path) -> Url {
    Url::from_file_path(path).expect("absolute path")
}

#[test]
fn ranges_become_exclusive() {
    let range = fen::Range::new(fen::Position::new(1, 4), fen::Position::new(1, 6));
    assert_eq!(
        Backend::to_lsp_range(range),
        Range::new(Position::new(1, 4), Position::new(1, 7))
    );
    assert_eq!(
        Backend::to_fen_position(Position::new(3, 2)),
        fen::Position::new(3, 2)
    );
}

#[test]
fn legend_follows_the_emitter_tables() {
    let legend = Backend::semantic_tokens_legend();
    let kinds: Vec<&str> = legend.token_types.iter().map(|kind| kind.as_str()).collect();
    let modifiers: Vec<&str> = legend.token_modifiers.iter().map(|modifier| modifier.as_str()).collect();
    assert_eq!(kinds, TOKEN_KINDS.to_vec());
    assert_eq!(modifiers, TOKEN_MODIFIERS.to_vec());
    assert_eq!(kinds.len(), 22);
    assert_eq!(modifiers.last(), Some(&"defaultLibrary"));
}

#[test]
fn settings_accept_the_section_or_its_contents() {
    let wrapped = LspSettings::from_value(json!({ "fen": { "unusedWarnings": false, "logLevel": "debug" } }))
        .expect("settings");
    assert_eq!(wrapped.unused_warnings, Some(false));
    assert_eq!(wrapped.level(), Some(LevelFilter::Debug));

    let bare = LspSettings::from_value(json!({ "unusedWarnings": true })).expect("settings");
    assert_eq!(bare.unused_warnings, Some(true));
    assert_eq!(bare.level(), None);

    assert_eq!(LspSettings::from_value(json!(null)).expect("settings"), LspSettings::default());
    assert!(LspSettings::from_value(json!({ "fen": { "unusedWarnings": "yes" } })).is_err());

    let project = fen::ProjectConfig::default();
    assert!(!wrapped.decorate_options(&project).unused_warnings);
    assert_eq!(LspSettings::default().decorate_options(&project), project.decorate_options());
}

#[test]
fn log_levels_parse_case_insensitively() {
    assert_eq!(parse_level("TRACE"), Some(LevelFilter::Trace));
    assert_eq!(parse_level(" warn "), Some(LevelFilter::Warn));
    assert_eq!(parse_level("loud"), None);
}

#[test]
fn decoration_errors_become_lsp_diagnostics() {
    let compiled = compile("f : Int -> Int\nf a = True\n");
    let diagnostics = Backend::build_diagnostics(&sample_uri(), &compiled);
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::ERROR));
    assert_eq!(diagnostic.code, Some(NumberOrString::String("E3001".to_string())));
    assert_eq!(diagnostic.source.as_deref(), Some("fen"));
    assert_eq!(diagnostic.range, Range::new(Position::new(1, 6), Position::new(1, 10)));
}

#[test]
fn unused_parameters_are_warnings() {
    let compiled = compile(SHAPES.replace("w * h", "w").as_str());
    let diagnostics = Backend::build_diagnostics(&sample_uri(), &compiled);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::WARNING));
}

#[test]
fn semantic_tokens_are_split_into_lsp_tokens() {
    let compiled = compile("add : Int -> Int -> Int\nadd a b = a + b\n");
    let tokens = Backend::build_semantic_tokens(&compiled.module);
    assert_eq!(tokens.data.len(), 10);
    let first = &tokens.data[0];
    assert_eq!((first.delta_line, first.delta_start, first.length), (0, 0, 3));
    assert_eq!(TOKEN_KINDS[first.token_type as usize], "function");
    assert_eq!(first.token_modifiers_bitset, 1);
    let definition = &tokens.data[4];
    assert_eq!((definition.delta_line, definition.delta_start), (1, 0));
}

#[test]
fn document_symbols_nest_variants() {
    let compiled = compile(SHAPES);
    let symbols = Backend::build_document_symbols(&compiled.module);
    assert_eq!(symbols.len(), 2);
    assert_eq!(symbols[0].kind, SymbolKind::ENUM);
    let variants: Vec<&str> = symbols[0]
        .children
        .as_ref()
        .expect("variants")
        .iter()
        .map(|variant| variant.name.as_str())
        .collect();
    assert_eq!(variants, vec!["Circle", "Square"]);
    assert_eq!(symbols[1].kind, SymbolKind::FUNCTION);
    assert!(symbols[1].children.is_none());
    assert_eq!(symbols[1].selection_range.end, Position::new(2, 4));
}

#[test]
fn hover_is_a_fenced_signature() {
    let compiled = compile("add : Int -> Int -> Int\nadd a b = a + b\n");
    let hover = Backend::build_hover(&compiled.module, Position::new(1, 1)).expect("hover");
    let HoverContents::Markup(markup) = hover.contents else {
        panic!("expected markup");
    };
    assert_eq!(markup.value, "```fen\nadd : Int -> Int -> Int\n```");
    assert_eq!(hover.range, Some(Range::new(Position::new(1, 0), Position::new(1, 3))));
    assert!(Backend::build_hover(&compiled.module, Position::new(9, 0)).is_none());
}

#[test]
fn definition_of_a_parameter_is_a_single_location() {
    let compiled = compile("add : Int -> Int -> Int\nadd a b = a + b\n");
    let Some(GotoDefinitionResponse::Scalar(location)) =
        Backend::build_definition(&compiled.module, Position::new(1, 14))
    else {
        panic!("expected a single location");
    };
    assert_eq!(location.uri, sample_uri());
    assert_eq!(location.range, Range::new(Position::new(1, 6), Position::new(1, 7)));
    assert!(Backend::build_definition(&compiled.module, Position::new(1, 12)).is_none());
}

#[test]
fn editing_an_import_republishes_open_importers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_path_buf();
    std::fs::write(root.join("fen.toml"), "[project]\nsource-roots = [\"src\"]\n").expect("write");
    std::fs::create_dir_all(root.join("src")).expect("mkdir");
    std::fs::write(root.join("src/Math.fen"), "one : Int\none = 1\n").expect("write");
    let main_text = "import Math exposing (one)\ntwo : Int\ntwo = one + one\n";
    std::fs::write(root.join("src/Main.fen"), main_text).expect("write");

    let mut state = BackendState::default();
    state.configure_root(Some(root.clone())).expect("project file");
    state.apply_settings();
    assert_eq!(state.workspace.source_roots(), &[root.join("src")]);

    let main_uri = file_uri(&root.join("src/Main.fen"));
    let math_uri = file_uri(&root.join("src/Math.fen"));
    let published = state.open_document(main_uri.clone(), Some(1), main_text.to_string());
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].uri, main_uri);
    assert_eq!(published[0].version, Some(1));
    assert!(published[0].diagnostics.is_empty(), "{:?}", published[0].diagnostics);

    let published = state.open_document(math_uri.clone(), Some(1), "uno : Int\nuno = 1\n".to_string());
    let uris: Vec<&Url> = published.iter().map(|entry| &entry.uri).collect();
    assert!(uris.contains(&&main_uri));
    assert!(uris.contains(&&math_uri));
    let main = published.iter().find(|entry| entry.uri == main_uri).expect("main republished");
    assert!(!main.diagnostics.is_empty());

    let (closed, published) = state.close_document(&math_uri);
    assert_eq!(closed, math_uri);
    assert_eq!(published.len(), 1);
    assert!(published[0].diagnostics.is_empty(), "{:?}", published[0].diagnostics);
}

#[test]
fn broken_project_file_keeps_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("fen.toml"), "[diagnostics\n").expect("write");
    let mut state = BackendState::default();
    assert!(state.configure_root(Some(dir.path().to_path_buf())).is_err());
    assert_eq!(state.project, fen::ProjectConfig::default());
    assert_eq!(state.workspace.source_roots(), &[dir.path().join(".")]);
}
