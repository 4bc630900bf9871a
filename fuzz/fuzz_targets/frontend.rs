#![no_main]

use fen::{compile_source, DecorateOptions, DocumentUri, Position, StaticModules};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 32 * 1024 {
        return;
    }
    let src = String::from_utf8_lossy(data);
    let (_, decorated) = compile_source(
        &src,
        vec!["Fuzz".to_string()],
        DocumentUri::new("file:///Fuzz.fen"),
        &mut StaticModules::new(),
        DecorateOptions::default(),
    );

    // Queries run on partially decorated modules too.
    let module = &decorated.module;
    let _ = fen::semantic_tokens::semantic_tokens_full(module);
    let _ = fen::outline::document_symbols(module);
    let lines = src.lines().count().min(64);
    for line in 0..=lines {
        for column in (0..80).step_by(3) {
            let position = Position::new(line, column);
            let _ = fen::query::hover(module, position);
            let _ = fen::query::goto_definition(module, position);
        }
    }
});
