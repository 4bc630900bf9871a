use std::path::{Path, PathBuf};

use fen::nodes::{expand_module, Node};
use fen::outline::{document_symbols, OutlineKind};
use fen::query::{find_node, goto_definition, hover};
use fen::workspace::{InMemoryDocuments, Workspace};
use fen::{compile_source, DecorateOptions, DecorateResult, DocumentUri, Position, StaticModules};

fn decorate(source: &str) -> DecorateResult {
    let (parsed, decorated) = compile_source(
        source,
        Vec::new(),
        DocumentUri::new("file:///hover.fen"),
        &mut StaticModules::new(),
        DecorateOptions::default(),
    );
    assert!(parsed.diagnostics.is_empty(), "parse diagnostics: {:?}", parsed.diagnostics);
    decorated
}

const SHAPES: &str = "data Shape = Circle Int | Square Int Int\n\
                      area : Shape -> Int\n\
                      area s = case s of\n    Circle r -> r * r\n    Square w h -> w * h\n";

#[test]
fn hover_on_a_parameter_reference_shows_its_type() {
    let result = decorate("add : Int -> Int -> Int\nadd a b = a + b\n");
    let shown = hover(&result.module, Position::new(1, 10)).expect("hover");
    assert_eq!(shown.text, "a : Int");
    assert_eq!(shown.range.start, Position::new(1, 10));
    assert_eq!(shown.range.end, Position::new(1, 10));
}

#[test]
fn hover_on_definition_name_shows_signature() {
    let result = decorate("add : Int -> Int -> Int\nadd a b = a + b\n");
    let shown = hover(&result.module, Position::new(1, 1)).expect("hover");
    assert_eq!(shown.text, "add : Int -> Int -> Int");
    let annotation = hover(&result.module, Position::new(0, 0)).expect("hover");
    assert_eq!(annotation.text, "add : Int -> Int -> Int");
}

#[test]
fn hover_on_an_operator_expression_shows_the_result_type() {
    let result = decorate("same : Int -> Int -> Bool\nsame a b = a == b\n");
    let node = find_node(&result.module, Position::new(1, 13)).expect("node");
    assert!(matches!(node, Node::Operator(_)));
    assert!(hover(&result.module, Position::new(1, 13)).is_none());
    let whole = hover(&result.module, Position::new(1, 12)).expect("hover");
    assert_eq!(whole.text, "Bool");
}

#[test]
fn hover_on_a_case_variant_names_the_custom_type() {
    let result = decorate(SHAPES);
    let shown = hover(&result.module, Position::new(3, 6)).expect("hover");
    assert_eq!(shown.text, "Shape");
    let declared = hover(&result.module, Position::new(0, 14)).expect("hover");
    assert_eq!(declared.text, "Shape");
}

#[test]
fn find_node_prefers_the_smallest_range() {
    let result = decorate(SHAPES);
    let nodes = expand_module(&result.module);
    for position in [Position::new(2, 14), Position::new(3, 16), Position::new(4, 19), Position::new(1, 9)] {
        let found = find_node(&result.module, position).expect("node");
        assert!(found.range().contains(position));
        for other in nodes.iter().filter(|node| node.range().contains(position)) {
            assert!(found.range().size() <= other.range().size());
        }
    }
}

#[test]
fn nothing_is_found_outside_the_code() {
    let result = decorate("x : Int\nx = 1\n");
    assert!(find_node(&result.module, Position::new(7, 0)).is_none());
    assert!(goto_definition(&result.module, Position::new(7, 0)).is_empty());
}

#[test]
fn goto_local_binding_and_definition() {
    let result = decorate("double : Int -> Int\ndouble n = n + n\nquad : Int -> Int\nquad n = double (double n)\n");
    let binding = goto_definition(&result.module, Position::new(1, 11));
    assert_eq!(binding.len(), 1);
    assert_eq!(binding[0].range.start, Position::new(1, 7));

    let function = goto_definition(&result.module, Position::new(3, 10));
    assert_eq!(function.len(), 1);
    assert_eq!(function[0].range.start, Position::new(1, 0));
    assert_eq!(function[0].document.as_str(), "file:///hover.fen");
}

#[test]
fn goto_variant_and_type_declarations() {
    let result = decorate(SHAPES);
    let variant = goto_definition(&result.module, Position::new(4, 5));
    assert_eq!(variant.len(), 1);
    assert_eq!(variant[0].range.start, Position::new(0, 26));

    let ty = goto_definition(&result.module, Position::new(1, 8));
    assert_eq!(ty.len(), 1);
    assert_eq!(ty[0].range.start, Position::new(0, 5));
}

#[test]
fn goto_crosses_module_boundaries() {
    let root = PathBuf::from("/project");
    let mut documents = InMemoryDocuments::new();
    documents.insert(root.join("Math.fen"), "sqrt : Int -> Int\nsqrt x = x\n");
    documents.insert(
        root.join("Main.fen"),
        "import Math\nroot : Int -> Int\nroot x = Math.sqrt x\n",
    );
    let mut workspace = Workspace::new(documents, vec![root.clone()]);
    let main = workspace.compile(&root.join("Main.fen")).expect("compile");
    assert!(main.errors.is_empty(), "{:?}", main.errors);

    let targets = goto_definition(&main.module, Position::new(2, 15));
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].document, DocumentUri::from_path(Path::new("/project/Math.fen")));
    assert_eq!(targets[0].range.start, Position::new(1, 0));

    let module = goto_definition(&main.module, Position::new(2, 10));
    assert_eq!(module.len(), 1);
    assert_eq!(module[0].document, DocumentUri::from_path(Path::new("/project/Math.fen")));
}

#[test]
fn outline_nests_variants_under_their_type() {
    let result = decorate(SHAPES);
    let symbols = document_symbols(&result.module);
    let summary: Vec<(&str, OutlineKind)> = symbols.iter().map(|symbol| (symbol.name.as_str(), symbol.kind)).collect();
    assert_eq!(summary, vec![("Shape", OutlineKind::CustomType), ("area", OutlineKind::Function)]);

    let variants: Vec<(&str, Option<&str>)> = symbols[0]
        .children
        .iter()
        .map(|variant| (variant.name.as_str(), variant.detail.as_deref()))
        .collect();
    assert_eq!(variants, vec![("Circle", Some("Int")), ("Square", Some("Int Int"))]);
    assert_eq!(symbols[1].selection_range.start, Position::new(2, 0));
    assert_eq!(symbols[1].range.end.line, 4);
    assert_eq!(symbols[1].detail.as_deref(), Some("Shape -> Int"));
}

#[test]
fn outline_marks_constants_and_records() {
    let result = decorate("type Point = { x : Int, y : Int }
origin : Point
origin = Point { x = 0, y = 0 }
");
    let kinds: Vec<OutlineKind> = document_symbols(&result.module).iter().map(|symbol| symbol.kind).collect();
    assert_eq!(kinds, vec![OutlineKind::Record, OutlineKind::Constant]);
}
