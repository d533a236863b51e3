//! Follow-up behavior after a suggestion has been inserted.

use html_lsp_types::{Suggestion, SuggestionKind};

/// What the host should do once a suggestion is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostInsertAction {
    /// Open the completion list again at the new cursor position.
    Retrigger,
}

/// Inserting an attribute or a value usually leaves the cursor where another
/// completion applies (inside the new quotes, or after the value), so those
/// request a re-trigger. The host decides how and when to run it.
pub fn post_insert_action(suggestion: &Suggestion) -> Option<PostInsertAction> {
    match suggestion.category {
        SuggestionKind::Property | SuggestionKind::Value => Some(PostInsertAction::Retrigger),
        SuggestionKind::Tag | SuggestionKind::Method => None,
    }
}
