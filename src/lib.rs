//! Spell and grammar checking language server.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService};

mod checker;
mod document;
mod lsp;
mod registry;
mod schedule;
mod settings;

pub use checker::{
    service_message, Category, CheckError, CheckRequest, CheckResponse, LanguageToolClient, Match,
    Payload, Replacement, Rule, TextChecker,
};
pub use document::{
    annotate, flatten, mimetype_for, DocumentState, DocumentStore, Fragment, LineIndex,
    PositionCursor, SpanMapper,
};
pub use lsp::{
    annotation_text, build_request, code_actions_for_range, finding_to_diagnostic,
    hover_at_position, is_reportable, map_matches, run_check, to_diagnostics, Finding,
    DIAGNOSTIC_SOURCE,
};
pub use registry::{ContentMode, EditorDescriptor, EditorRegistry};
pub use schedule::{CheckScheduler, CheckTicket, MIN_DELAY};
pub use settings::{
    build_checker, build_registry, discover_settings, load_settings, CheckSettings,
    EditorSettings, Settings, SETTINGS_FILE_NAME,
};

pub struct Backend {
    client: Client,
    documents: Arc<DocumentStore>,
    workspace_root: OnceLock<PathBuf>,
    settings: OnceLock<Arc<Settings>>,
    registry: OnceLock<EditorRegistry>,
    scheduler: OnceLock<CheckScheduler>,
    checker: OnceLock<Arc<dyn TextChecker>>,
}

impl Backend {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(DocumentStore::new()),
            workspace_root: OnceLock::new(),
            settings: OnceLock::new(),
            registry: OnceLock::new(),
            scheduler: OnceLock::new(),
            checker: OnceLock::new(),
        }
    }

    fn settings(&self) -> Arc<Settings> {
        self.settings.get().cloned().unwrap_or_default()
    }

    fn scheduler(&self) -> &CheckScheduler {
        self.scheduler
            .get_or_init(|| CheckScheduler::new(self.settings().check.delay()))
    }

    /// Content mode for a document, from its language id or URI.
    fn content_mode(&self, uri: &Url, language_id: Option<&str>) -> Option<ContentMode> {
        let mimetype = mimetype_for(language_id, uri)?;
        let settings = self.settings();
        let registry = self
            .registry
            .get_or_init(|| build_registry(&settings));
        registry.mode_for(
            mimetype,
            &settings.editors.preferred,
            &settings.editors.forbidden,
        )
    }

    /// Store the new text and schedule a check.
    fn on_document_change(&self, uri: Url, text: String, version: i32, mode: Option<ContentMode>) {
        let state = self.documents.open(uri.clone(), text, version, mode);
        if state.mode.is_none() {
            tracing::debug!(%uri, "document is not checked");
            return;
        }
        self.schedule_check(uri, state);
    }

    fn schedule_check(&self, uri: Url, state: Arc<DocumentState>) {
        let Some(checker) = self.checker.get().cloned() else {
            tracing::warn!(%uri, "no checker available, skipping check");
            return;
        };
        let client = self.client.clone();
        let documents = Arc::clone(&self.documents);
        let settings = self.settings();

        self.scheduler().schedule(uri.clone(), move |ticket| async move {
            match lsp::run_check(&state, &settings.check, checker.as_ref()).await {
                Ok(findings) => {
                    // Closed or edited while the check ran; the version alone
                    // cannot tell a reopened document apart.
                    if !ticket.is_current() {
                        tracing::debug!(%uri, version = state.version, "discarding superseded findings");
                        return;
                    }
                    let Some(updated) = documents.update_findings(&uri, state.version, findings)
                    else {
                        tracing::debug!(%uri, version = state.version, "discarding stale findings");
                        return;
                    };
                    client
                        .publish_diagnostics(
                            uri,
                            lsp::to_diagnostics(&updated.findings),
                            Some(updated.version),
                        )
                        .await;
                }
                Err(e) => {
                    tracing::warn!(%uri, error = %e, "check failed");
                    client
                        .show_message(MessageType::ERROR, format!("Spell check failed: {e}"))
                        .await;
                }
            }
        });
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Extract workspace root from params
        let workspace_root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|f| f.uri.to_file_path().ok())
            .or_else(|| {
                #[allow(deprecated)]
                params.root_uri.as_ref()?.to_file_path().ok()
            });

        let settings = match workspace_root {
            Some(root) => {
                let _ = self.workspace_root.set(root.clone());
                // Discover settings by walking up the directory tree
                let (settings, settings_dir) = discover_settings(&root);
                tracing::info!(dir = %settings_dir.display(), "using settings");
                settings
            }
            None => Settings::default(),
        };

        match build_checker(&settings.check) {
            Ok(client) => {
                // A checker injected before initialization wins.
                let _ = self.checker.set(Arc::new(client));
            }
            Err(e) => tracing::error!(error = %e, "could not create checker client"),
        }
        let _ = self.settings.set(Arc::new(settings));

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                code_action_provider: Some(CodeActionProviderCapability::Options(
                    CodeActionOptions {
                        code_action_kinds: Some(vec![CodeActionKind::QUICKFIX]),
                        ..Default::default()
                    },
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let message = match self.workspace_root.get() {
            Some(root) => format!("spellsp initialized for {}", root.display()),
            None => "spellsp initialized".to_string(),
        };
        self.client.log_message(MessageType::INFO, message).await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        let mode = self.content_mode(&document.uri, Some(&document.language_id));
        self.on_document_change(document.uri, document.text, document.version, mode);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        // didChange carries no language id; keep the mode chosen on open.
        let mode = match self.documents.get(&uri) {
            Some(state) => state.mode,
            None => self.content_mode(&uri, None),
        };
        // We use FULL sync, so there's exactly one change with the full text
        if let Some(change) = params.content_changes.into_iter().next() {
            self.on_document_change(uri, change.text, params.text_document.version, mode);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.scheduler().cancel(&uri);
        self.documents.close(&uri);
        // Clear diagnostics
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(state) = self.documents.get(uri) else {
            return Ok(None);
        };
        Ok(lsp::hover_at_position(&state, position))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = &params.text_document.uri;

        let Some(state) = self.documents.get(uri) else {
            return Ok(None);
        };
        let actions = lsp::code_actions_for_range(
            uri,
            &state,
            params.range,
            self.settings().check.max_suggestions,
        );
        Ok((!actions.is_empty()).then_some(actions))
    }
}

pub fn create_service() -> (LspService<Backend>, tower_lsp::ClientSocket) {
    LspService::new(Backend::new)
}

/// Create the service with a specific checker instead of the configured HTTP client.
pub fn create_service_with_checker(
    checker: Arc<dyn TextChecker>,
) -> (LspService<Backend>, tower_lsp::ClientSocket) {
    LspService::new(move |client| {
        let backend = Backend::new(client);
        let _ = backend.checker.set(checker);
        backend
    })
}
