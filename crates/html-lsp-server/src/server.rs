//! LSP server implementation: the LanguageServer trait.

use crate::config::ServerConfig;
use dashmap::DashMap;
use html_lsp_completion::context::{classify, CompletionContext, CompletionRequest};
use html_lsp_completion::hook::{post_insert_action, PostInsertAction};
use html_lsp_completion::provider::provide_completions;
use html_lsp_data::{loader, KnowledgeBase};
use html_lsp_parser::document::Document;
use html_lsp_types::{Suggestion, SuggestionKind, TextPosition};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_lsp::jsonrpc::Result;
use tower_lsp::ls_types::*;
use tower_lsp::{Client, LanguageServer};

/// Main LSP backend holding all state.
pub struct HtmlLspBackend {
    client: Client,
    /// Open documents (URI string → Document).
    open_files: Arc<DashMap<String, Document>>,
    /// Tag and attribute data; swapped once in `initialized`.
    knowledge: Mutex<Arc<KnowledgeBase>>,
    config: Mutex<ServerConfig>,
    /// Trace level from InitializeParams (off/messages/verbose).
    trace_level: Mutex<TraceValue>,
}

/// Payload stored in `CompletionItem::data` for `completionItem/resolve`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
}

impl HtmlLspBackend {
    pub fn new(client: Client) -> Self {
        HtmlLspBackend {
            client,
            open_files: Arc::new(DashMap::new()),
            knowledge: Mutex::new(Arc::new(KnowledgeBase::bundled())),
            config: Mutex::new(ServerConfig::default()),
            trace_level: Mutex::new(TraceValue::Off),
        }
    }

    /// Log a message to the client if trace level is verbose.
    async fn log_trace(&self, message: &str) {
        let level = *self.trace_level.lock().await;
        if level == TraceValue::Verbose {
            tracing::trace!("{}", message);
            self.client.log_message(MessageType::LOG, message).await;
        }
    }
}

/// Directories searched for knowledge-base files, configured path first.
fn data_candidates(configured: Option<PathBuf>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = configured.into_iter().collect();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join("data"));
        }
    }
    candidates.push(PathBuf::from("/usr/share/html-lsp/data"));
    candidates
}

/// Convert lsp_types::CompletionItemKind to ls_types::CompletionItemKind.
fn lsp_completion_kind_to_ls(kind: lsp_types::CompletionItemKind) -> CompletionItemKind {
    // Both crates use the numeric kind values of the LSP protocol
    match kind {
        lsp_types::CompletionItemKind::METHOD => CompletionItemKind::METHOD,
        lsp_types::CompletionItemKind::PROPERTY => CompletionItemKind::PROPERTY,
        lsp_types::CompletionItemKind::VALUE => CompletionItemKind::VALUE,
        lsp_types::CompletionItemKind::SNIPPET => CompletionItemKind::SNIPPET,
        lsp_types::CompletionItemKind::KEYWORD => CompletionItemKind::KEYWORD,
        _ => CompletionItemKind::TEXT,
    }
}

/// Resolve payload for a suggestion produced in `context`.
fn completion_data(context: &CompletionContext, suggestion: &Suggestion) -> CompletionData {
    match (context, suggestion.category) {
        (_, SuggestionKind::Tag) => CompletionData {
            tag: Some(suggestion.display_text.clone()),
            attribute: None,
        },
        (CompletionContext::AttributeValue { tag, attribute, .. }, _) => CompletionData {
            tag: tag.clone(),
            attribute: Some(attribute.clone()),
        },
        (CompletionContext::AttributeName { tag, .. }, _) => CompletionData {
            tag: tag.clone(),
            attribute: Some(suggestion.display_text.clone()),
        },
        _ => CompletionData::default(),
    }
}

fn suggestion_to_item(
    suggestion: Suggestion,
    context: &CompletionContext,
    config: &ServerConfig,
) -> CompletionItem {
    let data = serde_json::to_value(completion_data(context, &suggestion)).ok();

    let command = match post_insert_action(&suggestion) {
        Some(PostInsertAction::Retrigger) if config.retrigger_after_insert => Some(Command {
            title: "Trigger suggest".to_string(),
            command: config.retrigger_command.clone(),
            arguments: None,
        }),
        _ => None,
    };

    let insert_text_format = if suggestion.category.is_snippet() {
        InsertTextFormat::SNIPPET
    } else {
        InsertTextFormat::PLAIN_TEXT
    };

    CompletionItem {
        kind: Some(lsp_completion_kind_to_ls(
            suggestion.category.to_lsp_completion_kind(),
        )),
        detail: Some(suggestion.right_label).filter(|s| !s.is_empty()),
        documentation: Some(suggestion.description)
            .filter(|s| !s.is_empty())
            .map(Documentation::String),
        insert_text: Some(suggestion.insertion_template),
        insert_text_format: Some(insert_text_format),
        label: suggestion.display_text,
        command,
        data,
        ..Default::default()
    }
}

/// Description for a resolve payload, preferring the attribute when present.
fn resolve_description(kb: &KnowledgeBase, data: &CompletionData) -> Option<String> {
    let description = match &data.attribute {
        Some(attribute) => kb
            .attribute(data.tag.as_deref(), attribute)?
            .description
            .clone(),
        None => kb.tag(data.tag.as_deref()?)?.description.clone(),
    };
    Some(description).filter(|d| !d.is_empty())
}

impl LanguageServer for HtmlLspBackend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("html-lsp: initialize");

        if let Some(trace) = params.trace {
            *self.trace_level.lock().await = trace;
            tracing::info!("Trace level: {:?}", trace);
        }

        let config =
            ServerConfig::from_initialization_options(params.initialization_options.as_ref());
        if let Some(ref path) = config.data_path {
            tracing::info!("Client provided dataPath: {}", path.display());
        }
        *self.config.lock().await = config;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::INCREMENTAL),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(false),
                        })),
                        ..Default::default()
                    },
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![
                        "<".to_string(),
                        " ".to_string(),
                        "\"".to_string(),
                        "'".to_string(),
                        "=".to_string(),
                    ]),
                    resolve_provider: Some(true),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "html-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        tracing::info!("html-lsp: initialized");
        self.client
            .log_message(MessageType::INFO, "html-lsp server initialized")
            .await;

        let candidates = data_candidates(self.config.lock().await.data_path.clone());
        match tokio::task::spawn_blocking(move || loader::load_or_bundled(&candidates)).await {
            Ok(kb) => {
                tracing::info!(
                    "Knowledge base ready: {} tags, {} attributes",
                    kb.tag_count(),
                    kb.attribute_count()
                );
                *self.knowledge.lock().await = Arc::new(kb);
            }
            Err(e) => tracing::error!("Knowledge base loading failed: {}", e),
        }
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("html-lsp: shutdown");
        Ok(())
    }

    // --- Document Synchronization ---

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri_str = params.text_document.uri.as_str().to_string();

        tracing::debug!("didOpen: {}", uri_str);
        self.log_trace(&format!("didOpen: {}", uri_str)).await;

        let document = Document::new(&params.text_document.text);
        self.open_files.insert(uri_str, document);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri_str = params.text_document.uri.as_str().to_string();

        tracing::debug!("didChange: {}", uri_str);

        if let Some(mut document) = self.open_files.get_mut(&uri_str) {
            for change in &params.content_changes {
                if let Some(range) = change.range {
                    document.apply_edit(
                        range.start.line,
                        range.start.character,
                        range.end.line,
                        range.end.character,
                        &change.text,
                    );
                } else {
                    // Full content replacement
                    document.set_text(&change.text);
                }
            }
        } else {
            tracing::warn!("didChange for unknown document: {}", uri_str);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri_str = params.text_document.uri.as_str().to_string();
        tracing::debug!("didClose: {}", uri_str);
        self.open_files.remove(&uri_str);
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        tracing::debug!("didSave: {}", params.text_document.uri.as_str());
    }

    // --- Language Features ---

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri_str = params
            .text_document_position
            .text_document
            .uri
            .as_str()
            .to_string();
        let pos = params.text_document_position.position;
        tracing::debug!("completion: {}:{}:{}", uri_str, pos.line, pos.character);

        let kb = self.knowledge.lock().await.clone();
        let config = self.config.lock().await.clone();

        // The document guard must not be held across an await.
        let context = {
            let document = match self.open_files.get(&uri_str) {
                Some(d) => d,
                None => return Ok(None),
            };
            // LSP columns are UTF-16 code units; the classifier counts chars.
            let character = document.char_column(pos.line, pos.character);
            let position = TextPosition::new(pos.line, character);
            let request = CompletionRequest::from_host(&*document, &*document, position);
            classify(&request, &*document, &*document)
        };
        self.log_trace(&format!("Completion context: {:?}", context)).await;

        if context == CompletionContext::None {
            return Ok(None);
        }

        let items: Vec<CompletionItem> = provide_completions(&context, &kb)
            .into_iter()
            .map(|suggestion| suggestion_to_item(suggestion, &context, &config))
            .collect();

        if items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(CompletionResponse::Array(items)))
        }
    }

    async fn completion_resolve(&self, mut item: CompletionItem) -> Result<CompletionItem> {
        if item.documentation.is_some() {
            return Ok(item);
        }
        let Some(data) = item
            .data
            .clone()
            .and_then(|v| serde_json::from_value::<CompletionData>(v).ok())
        else {
            return Ok(item);
        };

        let kb = self.knowledge.lock().await.clone();
        if let Some(description) = resolve_description(&kb, &data) {
            item.documentation = Some(Documentation::String(description));
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(category: SuggestionKind, text: &str, template: &str) -> Suggestion {
        Suggestion {
            display_text: text.to_string(),
            insertion_template: template.to_string(),
            category,
            description: String::new(),
            right_label: String::new(),
        }
    }

    #[test]
    fn test_value_item_is_plain_text_with_retrigger() {
        let context = CompletionContext::AttributeValue {
            tag: Some("button".to_string()),
            attribute: "type".to_string(),
            prefix: String::new(),
        };
        let item = suggestion_to_item(
            suggestion(SuggestionKind::Value, "submit", "submit"),
            &context,
            &ServerConfig::default(),
        );
        assert_eq!(item.kind, Some(CompletionItemKind::VALUE));
        assert_eq!(item.insert_text_format, Some(InsertTextFormat::PLAIN_TEXT));
        assert_eq!(item.detail, None);
        assert_eq!(
            item.command.map(|c| c.command),
            Some("editor.action.triggerSuggest".to_string())
        );
        let data: CompletionData = serde_json::from_value(item.data.unwrap()).unwrap();
        assert_eq!(data.tag.as_deref(), Some("button"));
        assert_eq!(data.attribute.as_deref(), Some("type"));
    }

    #[test]
    fn test_tag_item_is_snippet_without_command() {
        let context = CompletionContext::TagName {
            prefix: String::new(),
            after_open_angle: true,
        };
        let item = suggestion_to_item(
            suggestion(SuggestionKind::Tag, "ul", "ul><li></li></ul>"),
            &context,
            &ServerConfig::default(),
        );
        assert_eq!(item.kind, Some(CompletionItemKind::SNIPPET));
        assert_eq!(item.insert_text_format, Some(InsertTextFormat::SNIPPET));
        assert!(item.command.is_none());
        assert_eq!(item.data, Some(serde_json::json!({ "tag": "ul" })));
    }

    #[test]
    fn test_retrigger_can_be_disabled() {
        let config = ServerConfig {
            retrigger_after_insert: false,
            ..Default::default()
        };
        let context = CompletionContext::AttributeName {
            tag: None,
            prefix: String::new(),
        };
        let item = suggestion_to_item(
            suggestion(SuggestionKind::Property, "id", "id=\"$1\"$0"),
            &context,
            &config,
        );
        assert!(item.command.is_none());
    }

    #[test]
    fn test_resolve_description() {
        let kb = KnowledgeBase::bundled();
        let tag = CompletionData {
            tag: Some("div".to_string()),
            attribute: None,
        };
        assert_eq!(
            resolve_description(&kb, &tag),
            Some(kb.tag("div").unwrap().description.clone())
        );
        let attribute = CompletionData {
            tag: Some("button".to_string()),
            attribute: Some("type".to_string()),
        };
        assert_eq!(
            resolve_description(&kb, &attribute).as_deref(),
            Some("Behavior of the button.")
        );
        assert_eq!(resolve_description(&kb, &CompletionData::default()), None);
    }
}
