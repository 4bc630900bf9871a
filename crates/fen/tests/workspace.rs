use std::path::{Path, PathBuf};
use std::sync::Arc;

use fen::errors::{DecorateErrorKind, DecorateWarningKind, UnusedKind};
use fen::workspace::{DocumentOverlay, FileSystemDocuments, InMemoryDocuments, Workspace};
use fen::{DocumentProvider, FenError, ProjectConfig};

const ROOT: &str = "/project";

fn documents(files: &[(&str, &str)]) -> InMemoryDocuments {
    let mut documents = InMemoryDocuments::new();
    for (name, text) in files {
        documents.insert(Path::new(ROOT).join(name), *text);
    }
    documents
}

fn path(name: &str) -> PathBuf {
    Path::new(ROOT).join(name)
}

#[test]
fn nested_modules_compile_before_their_importers() {
    let mut workspace = Workspace::new(
        documents(&[
            ("Data/Numbers.fen", "square : Int -> Int\nsquare n = n * n\n"),
            (
                "Main.fen",
                "import Data.Numbers exposing (square)\nfour : Int\nfour = square 2\n",
            ),
        ]),
        vec![PathBuf::from(ROOT)],
    );
    assert_eq!(
        workspace.locate_module(&["Data".to_string(), "Numbers".to_string()]),
        Some(path("Data/Numbers.fen"))
    );

    let main = workspace.compile(&path("Main.fen")).expect("compile");
    assert!(main.errors.is_empty(), "{:?}", main.errors);
    assert!(main.warnings.is_empty(), "{:?}", main.warnings);
    assert_eq!(main.module.path, vec!["Main".to_string()]);

    let numbers = workspace.get(&path("Data/Numbers.fen")).expect("import was cached");
    assert_eq!(numbers.module.path, vec!["Data".to_string(), "Numbers".to_string()]);
    assert!(Arc::ptr_eq(&numbers.module, &main.module.imports.get(0).expect("import").module));
}

#[test]
fn cyclic_imports_are_reported_at_the_import() {
    let mut workspace = Workspace::new(
        documents(&[
            ("A.fen", "import B\na : Int\na = 1\n"),
            ("B.fen", "import A\nb : Int\nb = 2\n"),
        ]),
        vec![PathBuf::from(ROOT)],
    );
    workspace.compile(&path("A.fen")).expect("compile");

    let b = workspace.get(&path("B.fen")).expect("B compiled while importing");
    let cycle = b
        .errors
        .iter()
        .find_map(|error| match &error.kind {
            DecorateErrorKind::CouldNotImportModule { path, reason } => Some((path.clone(), reason.clone(), error.range())),
            _ => None,
        })
        .expect("cycle error");
    assert_eq!(cycle.0, "A");
    assert_eq!(cycle.1, FenError::CyclicImport(vec!["A".into(), "B".into(), "A".into()]).to_string());
    assert_eq!(cycle.2.start.line, 0);
    assert_eq!(cycle.2.start.column, 0);
}

#[test]
fn missing_modules_are_errors_not_panics() {
    let mut workspace = Workspace::new(
        documents(&[("Main.fen", "import Nowhere\nx : Int\nx = 1\n")]),
        vec![PathBuf::from(ROOT)],
    );
    let main = workspace.compile(&path("Main.fen")).expect("compile");
    assert!(main.has_errors());
    assert!(matches!(
        &main.errors[0].kind,
        DecorateErrorKind::CouldNotImportModule { path, .. } if path == "Nowhere"
    ));
}

#[test]
fn open_buffers_replace_the_compiled_document() {
    let overlay = DocumentOverlay::new(documents(&[
        ("Math.fen", "one : Int\none = 1\n"),
        ("Main.fen", "import Math exposing (one)\ntwo : Int\ntwo = one + one\n"),
    ]));
    let mut workspace = Workspace::new(overlay, vec![PathBuf::from(ROOT)]);
    let first = workspace.compile(&path("Main.fen")).expect("compile");
    assert!(!first.has_errors());

    workspace
        .provider_mut()
        .open_in_memory(path("Main.fen"), "import Math exposing (one)\ntwo : Int\ntwo = True\n");
    let second = workspace.compile(&path("Main.fen")).expect("recompile");
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(second.has_errors());
    assert!(!first.has_errors());
    assert!(Arc::ptr_eq(&second, &workspace.get(&path("Main.fen")).expect("cached")));

    workspace.provider_mut().close(&path("Main.fen"));
    workspace.invalidate(&path("Main.fen"));
    assert!(workspace.get(&path("Main.fen")).is_none());
    let third = workspace.compiled(&path("Main.fen")).expect("compile from fallback");
    assert!(!third.has_errors());
}

#[test]
fn edited_imports_are_seen_after_invalidation() {
    let overlay = DocumentOverlay::new(documents(&[
        ("Math.fen", "one : Int\none = 1\n"),
        ("Main.fen", "import Math exposing (one)\ntwo : Int\ntwo = one + one\n"),
    ]));
    let mut workspace = Workspace::new(overlay, vec![PathBuf::from(ROOT)]);
    assert!(!workspace.compile(&path("Main.fen")).expect("compile").has_errors());

    workspace
        .provider_mut()
        .open_in_memory(path("Math.fen"), "uno : Int\nuno = 1\n");
    workspace.invalidate(&path("Math.fen"));
    let main = workspace.compile(&path("Main.fen")).expect("recompile");
    assert!(main.has_errors());
}

#[test]
fn project_file_drives_roots_and_options() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    std::fs::write(
        root.join("fen.toml"),
        "[project]\nname = \"demo\"\nsource-roots = [\"src\"]\n\n[diagnostics]\nunused-definitions = true\n",
    )
    .expect("write fen.toml");
    std::fs::create_dir_all(root.join("src/Util")).expect("mkdir");
    std::fs::write(root.join("src/Util/Text.fen"), "shout : Int -> Int\nshout n = n * 2\n").expect("write");
    std::fs::write(
        root.join("src/Main.fen"),
        "import Util.Text exposing (shout)\ngreet : Int\ngreet = shout 21\n",
    )
    .expect("write");

    let config = ProjectConfig::load(root).expect("config");
    assert_eq!(config.project.name.as_deref(), Some("demo"));
    let roots = config.source_roots(root);
    assert_eq!(roots, vec![root.join("src")]);

    let mut workspace = Workspace::new(FileSystemDocuments, roots).with_options(config.decorate_options());
    assert!(workspace.provider().has_document(&root.join("src/Main.fen")));
    let main = workspace.compile(&root.join("src/Main.fen")).expect("compile");
    assert!(main.errors.is_empty(), "{:?}", main.errors);
    assert_eq!(main.module.path, vec!["Main".to_string()]);
    let warnings: Vec<&DecorateWarningKind> = main.warnings.iter().map(|warning| &warning.kind).collect();
    assert_eq!(
        warnings,
        vec![&DecorateWarningKind::Unused {
            kind: UnusedKind::Definition,
            name: "greet".to_string(),
        }]
    );
}

#[test]
fn broken_project_file_is_a_config_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("fen.toml"), "[project\n").expect("write");
    assert!(matches!(ProjectConfig::load(dir.path()), Err(FenError::Config { .. })));

    let empty = tempfile::tempdir().expect("tempdir");
    assert_eq!(ProjectConfig::load(empty.path()).expect("defaults"), ProjectConfig::default());
}

#[test]
fn edits_drop_every_transitive_importer() {
    let mut workspace = Workspace::new(
        documents(&[
            ("Base.fen", "one : Int\none = 1\n"),
            ("Middle.fen", "import Base exposing (one)\ntwo : Int\ntwo = one + one\n"),
            ("Top.fen", "import Middle exposing (two)\nfour : Int\nfour = two + two\n"),
            ("Other.fen", "five : Int\nfive = 5\n"),
        ]),
        vec![PathBuf::from(ROOT)],
    );
    workspace.compile(&path("Top.fen")).expect("compile");
    workspace.compile(&path("Other.fen")).expect("compile");
    assert_eq!(workspace.cached_paths().len(), 4);

    let removed = workspace.invalidate_with_dependents(&path("Base.fen"));
    assert_eq!(removed, vec![path("Base.fen"), path("Middle.fen"), path("Top.fen")]);
    assert_eq!(workspace.cached_paths(), vec![path("Other.fen")]);
}
