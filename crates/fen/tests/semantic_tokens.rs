use fen::semantic_tokens::{semantic_tokens, semantic_tokens_full, EmitMode, TokenModifiers, TOKEN_KINDS};
use std::path::PathBuf;

use fen::workspace::{InMemoryDocuments, Workspace};
use fen::{compile_source, DecorateOptions, DecorateResult, DocumentUri, StaticModules};

fn decorate(source: &str) -> DecorateResult {
    let (parsed, decorated) = compile_source(
        source,
        Vec::new(),
        DocumentUri::new("file:///tokens.fen"),
        &mut StaticModules::new(),
        DecorateOptions::default(),
    );
    assert!(parsed.diagnostics.is_empty(), "parse diagnostics: {:?}", parsed.diagnostics);
    decorated
}

/// `(line, column, length, kind name, modifier bits)` per token.
fn decode(data: &[u32]) -> Vec<(u32, u32, u32, &'static str, u32)> {
    assert_eq!(data.len() % 5, 0);
    let (mut line, mut column) = (0, 0);
    data.chunks(5)
        .map(|chunk| {
            if chunk[0] == 0 {
                column += chunk[1];
            } else {
                line += chunk[0];
                column = chunk[1];
            }
            (line, column, chunk[2], TOKEN_KINDS[chunk[3] as usize], chunk[4])
        })
        .collect()
}

fn assert_monotonic(tokens: &[(u32, u32, u32, &'static str, u32)]) {
    for pair in tokens.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(
            b.0 > a.0 || (b.0 == a.0 && b.1 >= a.1 + a.2),
            "token {b:?} does not follow {a:?}"
        );
    }
}

const SAMPLES: &[&str] = &[
    "add : Int -> Int -> Int\nadd a b = a + b\n",
    "data Shape = Circle Int | Square Int Int\n\
     area : Shape -> Int\n\
     area s = case s of\n    Circle r -> r\n    Square w h -> w\n",
    "type Point = { x : Int, y : Int }\n\
     origin : Point\n\
     origin = Point { x = 0, y = 0 }\n\
     shift : Point -> Int\n\
     shift p = p.x + p.y\n",
    "-- a comment\n\
     data Maybe a = Just a | Nothing\n\
     first : List Int -> Maybe Int\n\
     first items = if items == [] then Nothing else Just 1\n",
];

#[test]
fn annotated_function_starts_with_declaration_tokens() {
    let result = decorate(SAMPLES[0]);
    let primitive = (TokenModifiers::DECLARATION | TokenModifiers::DEFAULT_LIBRARY).bits();
    let tokens = decode(&semantic_tokens_full(&result.module));
    assert_eq!(
        tokens,
        vec![
            (0, 0, 3, "function", TokenModifiers::DECLARATION.bits()),
            (0, 6, 3, "type", primitive),
            (0, 13, 3, "type", primitive),
            (0, 20, 3, "type", primitive),
            (1, 0, 3, "function", TokenModifiers::DEFINITION.bits()),
            (1, 4, 1, "parameter", 0),
            (1, 6, 1, "parameter", 0),
            (1, 10, 1, "parameter", 0),
            (1, 12, 1, "operator", 0),
            (1, 14, 1, "parameter", 0),
        ]
    );
}

#[test]
fn custom_types_and_case_arms() {
    let result = decorate(SAMPLES[1]);
    let tokens = decode(&semantic_tokens_full(&result.module));
    let at = |line: u32, column: u32| {
        tokens
            .iter()
            .find(|token| token.0 == line && token.1 == column)
            .map(|token| token.3)
    };
    assert_eq!(at(0, 0), Some("keyword"));
    assert_eq!(at(0, 5), Some("enum"));
    assert_eq!(at(0, 13), Some("enumMember"));
    assert_eq!(at(0, 26), Some("enumMember"));
    assert_eq!(at(1, 7), Some("enum"));
    assert_eq!(at(2, 9), Some("keyword"));
    assert_eq!(at(2, 16), Some("keyword"));
    assert_eq!(at(3, 4), Some("enumMember"));
    assert_eq!(at(3, 11), Some("parameter"));
    assert_eq!(at(3, 13), Some("operator"));
}

#[test]
fn comments_and_records_are_classified() {
    let comment = decode(&semantic_tokens_full(&decorate(SAMPLES[3]).module));
    assert_eq!(comment[0].0, 0);
    assert_eq!(comment[0].3, "comment");

    let record = decode(&semantic_tokens_full(&decorate(SAMPLES[2]).module));
    assert!(record.contains(&(0, 5, 5, "type", TokenModifiers::DECLARATION.bits())));
    assert!(record.contains(&(0, 15, 1, "property", 0)));
    assert!(record.iter().any(|token| token.0 == 4 && token.3 == "property"));
}

#[test]
fn every_sample_encodes_strictly() {
    for source in SAMPLES {
        let result = decorate(source);
        let strict = semantic_tokens(&result.module, EmitMode::Strict).expect("strictly ordered tokens");
        assert_eq!(strict, semantic_tokens_full(&result.module));
        assert_monotonic(&decode(&strict));
    }
}

#[test]
fn modules_with_errors_still_produce_tokens() {
    let (_, result) = compile_source(
        "f : Int -> Int\nf a = missing a\n",
        Vec::new(),
        DocumentUri::new("file:///broken.fen"),
        &mut StaticModules::new(),
        DecorateOptions::default(),
    );
    assert!(result.has_errors());
    let tokens = decode(&semantic_tokens_full(&result.module));
    assert!(!tokens.is_empty());
    assert_monotonic(&tokens);
}

#[test]
fn multi_line_strings_emit_one_token_per_line() {
    let result = decorate("note : String\nnote = \"\"\"first\n  second\"\"\"\n");
    assert!(!result.has_errors(), "{:?}", result.errors);
    let strict = semantic_tokens(&result.module, EmitMode::Strict).expect("strictly ordered tokens");
    let strings: Vec<_> = decode(&strict)
        .into_iter()
        .filter(|token| token.3 == "string")
        .map(|token| (token.0, token.1, token.2))
        .collect();
    assert_eq!(strings, vec![(1, 7, 8), (2, 0, 11)]);
}

#[test]
fn exposed_types_match_their_uses() {
    let root = PathBuf::from("/project");
    let mut documents = InMemoryDocuments::new();
    documents.insert(
        root.join("Geometry.fen"),
        "type Point = { x : Int, y : Int }\ndata Shape = Dot | Blob\n",
    );
    documents.insert(
        root.join("Main.fen"),
        "import Geometry exposing (Point, Shape)\nsize : Point -> Shape -> Int\nsize p s = p.x\n",
    );
    let mut workspace = Workspace::new(documents, vec![root.clone()]);
    let main = workspace.compile(&root.join("Main.fen")).expect("compile");
    assert!(main.errors.is_empty(), "{:?}", main.errors);

    let tokens = decode(&semantic_tokens_full(&main.module));
    let declaration = TokenModifiers::DECLARATION.bits();
    assert!(tokens.contains(&(0, 26, 5, "type", declaration)));
    assert!(tokens.contains(&(0, 33, 5, "enum", 0)));
    assert!(tokens.contains(&(1, 7, 5, "type", declaration)));
    assert!(tokens.contains(&(1, 16, 5, "enum", 0)));
}
