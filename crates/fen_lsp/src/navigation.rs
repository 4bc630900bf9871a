use fen::query::{goto_definition, hover};
use fen::Module;
use tower_lsp::lsp_types::{GotoDefinitionResponse, Hover, HoverContents, MarkupContent, MarkupKind, Position};

use crate::backend::Backend;

impl Backend {
    pub(crate) fn build_hover(module: &Module, position: Position) -> Option<Hover> {
        let found = hover(module, Self::to_fen_position(position))?;
        Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: format!("```fen\n{}\n```", found.text),
            }),
            range: Some(Self::to_lsp_range(found.range)),
        })
    }

    pub(crate) fn build_definition(module: &Module, position: Position) -> Option<GotoDefinitionResponse> {
        let mut locations: Vec<_> = goto_definition(module, Self::to_fen_position(position))
            .iter()
            .filter_map(Self::to_location)
            .collect();
        match locations.len() {
            0 => None,
            1 => locations.pop().map(GotoDefinitionResponse::Scalar),
            _ => Some(GotoDefinitionResponse::Array(locations)),
        }
    }
}
