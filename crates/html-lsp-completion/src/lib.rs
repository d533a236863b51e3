//! Completion engine for html-lsp.
//!
//! Classifies the cursor position from scope chains and surrounding text,
//! then builds tag, attribute and attribute-value suggestions from the
//! knowledge base.

pub mod context;
pub mod hook;
pub mod matching;
pub mod provider;
