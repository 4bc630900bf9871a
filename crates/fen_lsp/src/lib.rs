//! Language server for Fen, built on `tower-lsp`.

mod backend;
mod diagnostics;
mod document_symbols;
pub mod logging;
mod navigation;
mod semantic_tokens;
mod server;
pub mod settings;
mod state;

#[cfg(test)]
mod tests;

pub use server::run;
pub use settings::LspSettings;
