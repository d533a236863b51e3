//! HTML completion language server.

pub mod config;
mod server;

pub use config::ServerConfig;
pub use server::HtmlLspBackend;
