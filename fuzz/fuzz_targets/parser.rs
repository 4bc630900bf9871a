#![no_main]

use fen::DocumentUri;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Avoid pathological allocations in the harness itself; libFuzzer will still mutate below this.
    if data.len() > 64 * 1024 {
        return;
    }
    let src = String::from_utf8_lossy(data);
    let document = DocumentUri::new("file:///fuzz.fen");
    let lexed = fen::lexer::lex(&src, &document);
    let _ = fen::surface::parse(lexed.tokens, &document);
});
