use std::path::PathBuf;
use std::sync::Arc;

use fen::SourceFileReference;
use tokio::sync::Mutex;
use tower_lsp::lsp_types::{Location, MessageType, Position, Range, Url};
use tower_lsp::Client;

use crate::state::{BackendState, Published};

pub(crate) struct Backend {
    pub(crate) client: Client,
    pub(crate) state: Arc<Mutex<BackendState>>,
}

impl Backend {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(BackendState::default())),
        }
    }

    pub(crate) fn path_from_uri(uri: &Url) -> PathBuf {
        uri.to_file_path().unwrap_or_else(|_| PathBuf::from(uri.path()))
    }

    pub(crate) fn to_fen_position(position: Position) -> fen::Position {
        fen::Position::new(position.line as usize, position.character as usize)
    }

    pub(crate) fn to_lsp_position(position: fen::Position) -> Position {
        Position::new(position.line as u32, position.column as u32)
    }

    /// Core ranges include their last character; LSP ranges end one past it.
    pub(crate) fn to_lsp_range(range: fen::Range) -> Range {
        let end = Position::new(range.end.line as u32, range.end.column as u32 + 1);
        Range::new(Self::to_lsp_position(range.start), end)
    }

    pub(crate) fn to_location(reference: &SourceFileReference) -> Option<Location> {
        match Url::parse(reference.document.as_str()) {
            Ok(uri) => Some(Location::new(uri, Self::to_lsp_range(reference.range))),
            Err(err) => {
                log::debug!("dropping location in '{}': {err}", reference.document);
                None
            }
        }
    }

    pub(crate) async fn publish(&self, published: Vec<Published>) {
        for entry in published {
            self.client
                .publish_diagnostics(entry.uri, entry.diagnostics, entry.version)
                .await;
        }
    }

    pub(crate) async fn report(&self, typ: MessageType, message: String) {
        match typ {
            MessageType::ERROR => log::error!("{message}"),
            MessageType::WARNING => log::warn!("{message}"),
            _ => log::info!("{message}"),
        }
        self.client.log_message(typ, message).await;
    }
}
