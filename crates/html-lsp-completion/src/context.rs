//! Completion context detection.
//!
//! Determines what kind of completion is appropriate from the scope chain
//! at the cursor, the scope chain one character before it, and the text of
//! the surrounding lines. This is a heuristic over lexical scopes; no tree
//! is built.

use html_lsp_types::scopes::{self, has_string_scope, has_tag_scope};
use html_lsp_types::{ScopeProvider, TextBuffer, TextPosition};
use regex::Regex;
use std::sync::OnceLock;

/// The context in which completion was triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// After `<` or while typing a tag name.
    TagName {
        /// Partial text typed before the cursor.
        prefix: String,
        /// The character right before the cursor is `<`.
        after_open_angle: bool,
    },

    /// Inside a start tag, where an attribute name can go.
    AttributeName {
        /// Nearest tag name found scanning back from the cursor.
        tag: Option<String>,
        prefix: String,
    },

    /// Inside a quoted attribute value.
    AttributeValue {
        tag: Option<String>,
        /// The attribute the value belongs to.
        attribute: String,
        prefix: String,
    },

    /// No completion available.
    None,
}

/// Per-keystroke input of the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub position: TextPosition,
    /// Word (or punctuation run) typed before the cursor.
    pub prefix: String,
    /// Scope chain at the cursor.
    pub scopes: Vec<String>,
}

impl CompletionRequest {
    /// Build a request from the host buffer and scope service.
    pub fn from_host<B, S>(buffer: &B, scopes: &S, position: TextPosition) -> Self
    where
        B: TextBuffer + ?Sized,
        S: ScopeProvider + ?Sized,
    {
        let line_before = buffer.text_in_line_range(position.line, 0, position.character);
        CompletionRequest {
            position,
            prefix: extract_prefix(&line_before),
            scopes: scopes.scopes_at(position),
        }
    }
}

fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\s+([a-zA-Z][-a-zA-Z]*)\s*=\s*$").expect("attribute pattern is valid")
    })
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<([a-zA-Z][-a-zA-Z]*)(?:\s|$)").expect("tag pattern is valid")
    })
}

fn prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(\b|['"~`!@#$%^&*(){}\[\]=+,/?>])((\w+[\w-]*)|([.:;\[{(< ]+))$"#)
            .expect("prefix pattern is valid")
    })
}

/// Extract the completion prefix from the line text before the cursor.
///
/// This is either a word (letters, digits, `_`, `-`) or a run of
/// punctuation such as `<` or spaces; empty when neither ends the text.
pub fn extract_prefix(line_before: &str) -> String {
    prefix_pattern()
        .captures(line_before)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Determine the completion context for a request.
///
/// Checks run in order: attribute value, attribute name, tag name. The
/// first match wins.
pub fn classify<B, S>(request: &CompletionRequest, buffer: &B, scopes: &S) -> CompletionContext
where
    B: TextBuffer + ?Sized,
    S: ScopeProvider + ?Sized,
{
    if scopes::contains(&request.scopes, scopes::COMMENT) {
        return CompletionContext::None;
    }

    let pos = request.position;
    let pre_scopes = scopes.scopes_at(TextPosition::new(pos.line, pos.character.saturating_sub(1)));

    if let Some(attribute) = attribute_value_start(request, &pre_scopes, buffer, scopes) {
        return CompletionContext::AttributeValue {
            tag: nearest_tag(buffer, pos),
            attribute,
            prefix: request.prefix.clone(),
        };
    }

    if is_attribute_start(request, &pre_scopes, buffer, scopes) {
        return CompletionContext::AttributeName {
            tag: nearest_tag(buffer, pos),
            prefix: request.prefix.clone(),
        };
    }

    if is_tag_start(request, buffer) {
        return CompletionContext::TagName {
            prefix: request.prefix.clone(),
            after_open_angle: preceding_char(buffer, pos) == Some('<'),
        };
    }

    CompletionContext::None
}

/// Inside a quoted value that belongs to a resolvable attribute.
fn attribute_value_start<B, S>(
    request: &CompletionRequest,
    pre_scopes: &[String],
    buffer: &B,
    scopes: &S,
) -> Option<String>
where
    B: TextBuffer + ?Sized,
    S: ScopeProvider + ?Sized,
{
    if has_string_scope(&request.scopes)
        && has_string_scope(pre_scopes)
        && !scopes::contains(pre_scopes, scopes::STRING_END)
        && has_tag_scope(&request.scopes)
    {
        preceding_attribute(buffer, scopes, request.position)
    } else {
        None
    }
}

fn is_attribute_start<B, S>(
    request: &CompletionRequest,
    pre_scopes: &[String],
    buffer: &B,
    scopes: &S,
) -> bool
where
    B: TextBuffer + ?Sized,
    S: ScopeProvider + ?Sized,
{
    let prefix = &request.prefix;

    // Whitespace typed after a tag name or a finished attribute.
    if !prefix.is_empty()
        && prefix.trim().is_empty()
        && preceding_attribute(buffer, scopes, request.position).is_none()
    {
        return has_tag_scope(&request.scopes);
    }

    if scopes::contains(pre_scopes, scopes::ATTRIBUTE_NAME) {
        return true;
    }

    if !has_tag_scope(&request.scopes) || prefix.is_empty() {
        return false;
    }

    scopes::contains(&request.scopes, scopes::TAG_END)
        && !scopes::contains(pre_scopes, scopes::TAG_END)
}

fn is_tag_start<B>(request: &CompletionRequest, buffer: &B) -> bool
where
    B: TextBuffer + ?Sized,
{
    let prefix = &request.prefix;
    if !prefix.trim().is_empty() && !prefix.contains('<') {
        return has_tag_scope(&request.scopes);
    }

    // The word prefix does not reliably capture `<`, so look at the buffer.
    preceding_char(buffer, request.position) == Some('<')
        && ((request.scopes.len() == 1 && scopes::contains(&request.scopes, scopes::ROOT))
            || scopes::contains(&request.scopes, scopes::BAD_ANGLE_BRACKET))
}

/// The character immediately before the cursor on its line.
fn preceding_char<B>(buffer: &B, pos: TextPosition) -> Option<char>
where
    B: TextBuffer + ?Sized,
{
    if pos.character == 0 {
        return None;
    }
    buffer
        .text_in_line_range(pos.line, pos.character - 1, pos.character)
        .chars()
        .next()
}

/// Name of the attribute whose quoted value contains the cursor.
///
/// Walks back from the cursor while still inside the string, stopping at the
/// opening quote, then matches `name=` right before that point.
pub fn preceding_attribute<B, S>(buffer: &B, scopes: &S, pos: TextPosition) -> Option<String>
where
    B: TextBuffer + ?Sized,
    S: ScopeProvider + ?Sized,
{
    let mut quote_index = pos.character.saturating_sub(1);
    while quote_index > 0 {
        let chain = scopes.scopes_at(TextPosition::new(pos.line, quote_index));
        if !has_string_scope(&chain) || scopes::contains(&chain, scopes::STRING_BEGIN) {
            break;
        }
        quote_index -= 1;
    }

    let text = buffer.text_in_line_range(pos.line, 0, quote_index);
    attribute_pattern()
        .captures(&text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// First `<name` found scanning lines upward from the cursor's line.
pub fn nearest_tag<B>(buffer: &B, pos: TextPosition) -> Option<String>
where
    B: TextBuffer + ?Sized,
{
    (0..=pos.line).rev().find_map(|line| {
        let text = buffer.line_text(line)?;
        tag_pattern()
            .captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    })
}
