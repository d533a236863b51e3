//! Shared types for html-lsp.
//!
//! Contains the knowledge-base descriptors, completion suggestions, scope
//! names and the host capabilities used across the parser, data and
//! completion crates.

use serde::{Deserialize, Serialize};

pub mod scopes;

/// Kind of an attribute as declared in the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// Present-or-absent attribute, written without a value (`disabled`).
    Flag,
    /// Event-handler style attribute (`onclick`).
    Method,
    /// Takes `true` / `false` when no explicit options are listed.
    Boolean,
    #[default]
    #[serde(other)]
    Other,
}

/// Metadata for a single tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDescriptor {
    /// Tag name. Filled from the table key when loaded from JSON.
    #[serde(default)]
    pub name: String,
    /// Attribute names offered inside this tag, in display order.
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Child tags expanded into the insertion snippet.
    #[serde(default)]
    pub subtags: Vec<String>,
    /// Attributes pre-filled with a tab stop in the snippet.
    #[serde(default)]
    pub defaults: Vec<String>,
    #[serde(default)]
    pub description: String,
}

/// Metadata for an attribute, either tag-scoped (`"tag/attr"`) or global (`"attr"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    #[serde(rename = "type", default)]
    pub kind: AttributeType,
    #[serde(default)]
    pub description: String,
    /// Enumerated legal values. `Some(vec![])` is distinct from `None`:
    /// an explicit empty list suppresses the boolean fallback.
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub global: bool,
}

/// Category of a completion suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Tag,
    Property,
    Method,
    Value,
}

impl SuggestionKind {
    /// Convert to LSP CompletionItemKind.
    pub fn to_lsp_completion_kind(self) -> lsp_types::CompletionItemKind {
        match self {
            SuggestionKind::Tag => lsp_types::CompletionItemKind::SNIPPET,
            SuggestionKind::Property => lsp_types::CompletionItemKind::PROPERTY,
            SuggestionKind::Method => lsp_types::CompletionItemKind::METHOD,
            SuggestionKind::Value => lsp_types::CompletionItemKind::VALUE,
        }
    }

    /// Whether the insertion template contains tab stops.
    pub fn is_snippet(self) -> bool {
        !matches!(self, SuggestionKind::Value)
    }
}

/// A single completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Text shown in the completion list.
    pub display_text: String,
    /// Text inserted into the buffer; may contain `$N` / `$0` tab stops.
    pub insertion_template: String,
    pub category: SuggestionKind,
    pub description: String,
    /// Short hint shown on the right, e.g. `<div>`. Empty when there is none.
    pub right_label: String,
}

/// Zero-based line / character position in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TextPosition {
    pub line: u32,
    pub character: u32,
}

impl TextPosition {
    pub fn new(line: u32, character: u32) -> Self {
        TextPosition { line, character }
    }
}

/// Host capability: lexical scope labels at a buffer position.
///
/// The returned chain is ordered outermost first, starting with the
/// document root scope.
pub trait ScopeProvider {
    fn scopes_at(&self, position: TextPosition) -> Vec<String>;
}

/// Host capability: read-only access to buffer lines.
pub trait TextBuffer {
    /// Text of a line without its line terminator, or `None` past the end.
    fn line_text(&self, line: u32) -> Option<String>;

    fn line_count(&self) -> u32;

    /// Characters of `line` in `[start, end)`, clamped to the line.
    fn text_in_line_range(&self, line: u32, start: u32, end: u32) -> String {
        let text = self.line_text(line).unwrap_or_default();
        let start = start as usize;
        let end = end as usize;
        if start >= end {
            return String::new();
        }
        text.chars().skip(start).take(end - start).collect()
    }
}
