use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    DidChangeConfigurationParams, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DocumentSymbolParams, DocumentSymbolResponse, GotoDefinitionParams,
    GotoDefinitionResponse, Hover, HoverParams, HoverProviderCapability, InitializeParams, InitializeResult,
    InitializedParams, MessageType, OneOf, SemanticTokensFullOptions, SemanticTokensOptions, SemanticTokensParams,
    SemanticTokensResult, SemanticTokensServerCapabilities, ServerCapabilities, ServerInfo,
    TextDocumentPositionParams, TextDocumentSyncCapability, TextDocumentSyncKind,
};
use tower_lsp::{LanguageServer, LspService, Server};

use crate::backend::Backend;
use crate::settings::LspSettings;

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.iter().find_map(|folder| folder.uri.to_file_path().ok()))
            .or_else(|| params.root_uri.as_ref().and_then(|uri| uri.to_file_path().ok()));

        let settings = match params.initialization_options {
            Some(options) => match LspSettings::from_value(options) {
                Ok(settings) => settings,
                Err(err) => {
                    self.report(MessageType::WARNING, format!("ignoring initializationOptions: {err}"))
                        .await;
                    LspSettings::default()
                }
            },
            None => LspSettings::default(),
        };

        let configured = {
            let mut state = self.state.lock().await;
            state.settings = settings;
            let configured = state.configure_root(root.clone());
            state.apply_settings();
            configured
        };
        if let Err(err) = configured {
            self.report(MessageType::WARNING, err.to_string()).await;
        }
        log::info!(
            "workspace root: {}",
            root.as_ref().map_or_else(|| "<none>".to_string(), |root| root.display().to_string())
        );

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                definition_provider: Some(OneOf::Left(true)),
                semantic_tokens_provider: Some(SemanticTokensServerCapabilities::SemanticTokensOptions(
                    SemanticTokensOptions {
                        legend: Self::semantic_tokens_legend(),
                        full: Some(SemanticTokensFullOptions::Bool(true)),
                        range: None,
                        work_done_progress_options: Default::default(),
                    },
                )),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: "fen-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.report(MessageType::INFO, "fen-lsp initialized".to_string()).await;
    }

    async fn shutdown(&self) -> Result<()> {
        log::info!("shutting down");
        Ok(())
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let settings = match LspSettings::from_value(params.settings) {
            Ok(settings) => settings,
            Err(err) => {
                self.report(MessageType::WARNING, format!("Failed to parse configuration: {err}"))
                    .await;
                return;
            }
        };
        let published = {
            let mut state = self.state.lock().await;
            state.settings = settings;
            state.apply_settings();
            state.recompile_open()
        };
        self.publish(published).await;
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        log::debug!("opened {}", document.uri);
        let published = self
            .state
            .lock()
            .await
            .open_document(document.uri, Some(document.version), document.text);
        self.publish(published).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        // Full sync: the last change carries the whole text.
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        let published = self.state.lock().await.open_document(uri, Some(version), change.text);
        self.publish(published).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let (closed, published) = self.state.lock().await.close_document(&params.text_document.uri);
        self.client.publish_diagnostics(closed, Vec::new(), None).await;
        self.publish(published).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let TextDocumentPositionParams {
            text_document,
            position,
        } = params.text_document_position_params;
        let compiled = self.state.lock().await.compiled_for(&text_document.uri);
        Ok(compiled.and_then(|compiled| Self::build_hover(&compiled.module, position)))
    }

    async fn semantic_tokens_full(&self, params: SemanticTokensParams) -> Result<Option<SemanticTokensResult>> {
        let compiled = self.state.lock().await.compiled_for(&params.text_document.uri);
        Ok(compiled.map(|compiled| SemanticTokensResult::Tokens(Self::build_semantic_tokens(&compiled.module))))
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> Result<Option<DocumentSymbolResponse>> {
        let compiled = self.state.lock().await.compiled_for(&params.text_document.uri);
        Ok(compiled.map(|compiled| DocumentSymbolResponse::Nested(Self::build_document_symbols(&compiled.module))))
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let TextDocumentPositionParams {
            text_document,
            position,
        } = params.text_document_position_params;
        let compiled = self.state.lock().await.compiled_for(&text_document.uri);
        Ok(compiled.and_then(|compiled| Self::build_definition(&compiled.module, position)))
    }
}

pub async fn run() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
