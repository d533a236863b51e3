//! Knowledge base for html-lsp.
//!
//! Provides the immutable tag/attribute tables used by the completion
//! engine, the bundled default data set, and loading of override data
//! from a directory.

pub mod knowledge;
pub mod loader;

pub use knowledge::KnowledgeBase;
pub use loader::DataError;
