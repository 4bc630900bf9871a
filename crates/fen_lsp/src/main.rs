#[tokio::main]
async fn main() {
    let level = fen_lsp::logging::level_from_env();
    if let Err(err) = fen_lsp::logging::init(level) {
        eprintln!("fen-lsp: could not install the logger: {err}");
    }
    log::info!("fen-lsp {} starting", env!("CARGO_PKG_VERSION"));
    fen_lsp::run().await;
}
