use fen::semantic_tokens::{semantic_tokens_full, TOKEN_KINDS, TOKEN_MODIFIERS};
use fen::Module;
use tower_lsp::lsp_types::{
    SemanticToken, SemanticTokenModifier, SemanticTokenType, SemanticTokens, SemanticTokensLegend,
};

use crate::backend::Backend;

impl Backend {
    /// Same order as the emitter's kind and modifier indices.
    pub(crate) fn semantic_tokens_legend() -> SemanticTokensLegend {
        SemanticTokensLegend {
            token_types: TOKEN_KINDS.iter().copied().map(SemanticTokenType::new).collect(),
            token_modifiers: TOKEN_MODIFIERS.iter().copied().map(SemanticTokenModifier::new).collect(),
        }
    }

    pub(crate) fn build_semantic_tokens(module: &Module) -> SemanticTokens {
        let data = semantic_tokens_full(module)
            .chunks_exact(5)
            .map(|chunk| SemanticToken {
                delta_line: chunk[0],
                delta_start: chunk[1],
                length: chunk[2],
                token_type: chunk[3],
                token_modifiers_bitset: chunk[4],
            })
            .collect();
        SemanticTokens { result_id: None, data }
    }
}
