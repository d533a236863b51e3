//! Loading knowledge-base files from disk.
//!
//! A data directory holds `tags.json` and `attributes.json`. The server
//! tries the configured directory first and falls back to the bundled set.

use crate::knowledge::KnowledgeBase;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const TAGS_FILE: &str = "tags.json";
pub const ATTRIBUTES_FILE: &str = "attributes.json";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load `tags.json` and `attributes.json` from `dir`.
pub fn load_dir(dir: &Path) -> Result<KnowledgeBase, DataError> {
    let tags = read(&dir.join(TAGS_FILE))?;
    let attributes = read(&dir.join(ATTRIBUTES_FILE))?;
    let kb = KnowledgeBase::from_json_str(&tags, &attributes)?;
    tracing::debug!(
        "Loaded knowledge base from {}: {} tags, {} attributes",
        dir.display(),
        kb.tag_count(),
        kb.attribute_count()
    );
    Ok(kb)
}

/// Load from the first candidate directory that holds valid data, else the
/// bundled data set.
pub fn load_or_bundled(candidates: &[PathBuf]) -> KnowledgeBase {
    for dir in candidates {
        if !dir.is_dir() {
            tracing::debug!("Knowledge base directory not found: {}", dir.display());
            continue;
        }
        match load_dir(dir) {
            Ok(kb) => {
                tracing::info!("Using knowledge base from {}", dir.display());
                return kb;
            }
            Err(e) => tracing::warn!("Ignoring knowledge base in {}: {}", dir.display(), e),
        }
    }
    tracing::info!("Using bundled knowledge base");
    KnowledgeBase::bundled()
}

fn read(path: &Path) -> Result<String, DataError> {
    std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_data(dir: &Path, tags: &str, attributes: &str) {
        std::fs::write(dir.join(TAGS_FILE), tags).unwrap();
        std::fs::write(dir.join(ATTRIBUTES_FILE), attributes).unwrap();
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_data(
            dir.path(),
            r#"{"x-card": {"attributes": ["elevation"]}}"#,
            r#"{"x-card/elevation": {"options": ["0", "1", "2"]}}"#,
        );
        let kb = load_dir(dir.path()).unwrap();
        assert!(kb.tag("x-card").is_some());
        assert_eq!(
            kb.attribute_values(Some("x-card"), "elevation"),
            vec!["0", "1", "2"]
        );
    }

    #[test]
    fn test_load_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TAGS_FILE), "{}").unwrap();
        let err = load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
        assert!(err.to_string().contains(ATTRIBUTES_FILE));
    }

    #[test]
    fn test_load_or_bundled_prefers_valid_candidate() {
        let broken = tempfile::tempdir().unwrap();
        write_data(broken.path(), "not json", "{}");
        let good = tempfile::tempdir().unwrap();
        write_data(good.path(), r#"{"only": {}}"#, "{}");

        let kb = load_or_bundled(&[
            PathBuf::from("/nonexistent/html-lsp-data"),
            broken.path().to_path_buf(),
            good.path().to_path_buf(),
        ]);
        assert_eq!(kb.tag_count(), 1);
        assert!(kb.tag("only").is_some());
    }

    #[test]
    fn test_load_or_bundled_falls_back() {
        let kb = load_or_bundled(&[PathBuf::from("/nonexistent/html-lsp-data")]);
        assert!(kb.tag("div").is_some());
    }
}
