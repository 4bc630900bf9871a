use fen::outline::{document_symbols, OutlineKind, OutlineSymbol};
use fen::Module;
use tower_lsp::lsp_types::{DocumentSymbol, SymbolKind};

use crate::backend::Backend;

impl Backend {
    pub(crate) fn build_document_symbols(module: &Module) -> Vec<DocumentSymbol> {
        document_symbols(module).into_iter().map(Self::to_document_symbol).collect()
    }

    #[allow(deprecated)]
    fn to_document_symbol(symbol: OutlineSymbol) -> DocumentSymbol {
        let children: Vec<DocumentSymbol> = symbol.children.into_iter().map(Self::to_document_symbol).collect();
        DocumentSymbol {
            name: symbol.name,
            detail: symbol.detail,
            kind: Self::symbol_kind(symbol.kind),
            tags: None,
            deprecated: None,
            range: Self::to_lsp_range(symbol.range),
            selection_range: Self::to_lsp_range(symbol.selection_range),
            children: (!children.is_empty()).then_some(children),
        }
    }

    fn symbol_kind(kind: OutlineKind) -> SymbolKind {
        match kind {
            OutlineKind::Module => SymbolKind::MODULE,
            OutlineKind::TypeAlias => SymbolKind::INTERFACE,
            OutlineKind::Record => SymbolKind::STRUCT,
            OutlineKind::CustomType => SymbolKind::ENUM,
            OutlineKind::Variant => SymbolKind::ENUM_MEMBER,
            OutlineKind::Function => SymbolKind::FUNCTION,
            OutlineKind::Constant => SymbolKind::CONSTANT,
        }
    }
}
