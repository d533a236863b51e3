//! HTML document model for html-lsp.
//!
//! Keeps open documents in a rope for incremental edits and assigns
//! TextMate-style scope chains to every character with a lexical scanner.

pub mod document;
pub mod scanner;
