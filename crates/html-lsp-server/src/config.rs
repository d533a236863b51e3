//! Server settings taken from the client's `initializationOptions`.

use serde::Deserialize;
use std::path::PathBuf;

/// Command the client runs to reopen the completion list.
pub const DEFAULT_RETRIGGER_COMMAND: &str = "editor.action.triggerSuggest";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Directory holding `tags.json` and `attributes.json`.
    pub data_path: Option<PathBuf>,
    /// Client command attached to items that want a re-trigger.
    pub retrigger_command: String,
    pub retrigger_after_insert: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            data_path: None,
            retrigger_command: DEFAULT_RETRIGGER_COMMAND.to_string(),
            retrigger_after_insert: true,
        }
    }
}

impl ServerConfig {
    /// Parse `initializationOptions`. Missing keys take their defaults; an
    /// unparsable value is logged and replaced by the defaults.
    pub fn from_initialization_options(options: Option<&serde_json::Value>) -> Self {
        let Some(value) = options.filter(|v| !v.is_null()) else {
            return ServerConfig::default();
        };
        match serde_json::from_value(value.clone()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Invalid initializationOptions, using defaults: {}", e);
                ServerConfig::default()
            }
        }
    }
}
