//! Tag and attribute lookup tables.

use crate::loader::DataError;
use html_lsp_types::{AttributeDescriptor, AttributeType, TagDescriptor};
use std::collections::{BTreeMap, HashMap};

const BUNDLED_TAGS: &str = include_str!("../data/tags.json");
const BUNDLED_ATTRIBUTES: &str = include_str!("../data/attributes.json");

/// Immutable tag/attribute metadata.
///
/// Attribute keys are either `"tag/attribute"` (tag-scoped) or a bare
/// attribute name (global). A tag-scoped entry shadows the global one.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    /// Tag name → descriptor, iterated in name order.
    tags: BTreeMap<String, TagDescriptor>,
    /// Attribute key → descriptor.
    attributes: HashMap<String, AttributeDescriptor>,
}

impl KnowledgeBase {
    /// Build a knowledge base from already constructed descriptors.
    pub fn new<T, A>(tags: T, attributes: A) -> Self
    where
        T: IntoIterator<Item = TagDescriptor>,
        A: IntoIterator<Item = (String, AttributeDescriptor)>,
    {
        KnowledgeBase {
            tags: tags.into_iter().map(|t| (t.name.clone(), t)).collect(),
            attributes: attributes.into_iter().collect(),
        }
    }

    /// Parse `tags.json` and `attributes.json` contents.
    pub fn from_json_str(tags_json: &str, attributes_json: &str) -> Result<Self, DataError> {
        let tags: BTreeMap<String, TagDescriptor> =
            serde_json::from_str(tags_json).map_err(|source| DataError::Parse {
                file: "tags.json".to_string(),
                source,
            })?;
        let attributes: HashMap<String, AttributeDescriptor> =
            serde_json::from_str(attributes_json).map_err(|source| DataError::Parse {
                file: "attributes.json".to_string(),
                source,
            })?;

        let tags = tags
            .into_iter()
            .map(|(name, mut tag)| {
                tag.name = name.clone();
                (name, tag)
            })
            .collect();

        Ok(KnowledgeBase { tags, attributes })
    }

    /// The data set compiled into the binary.
    pub fn bundled() -> Self {
        match Self::from_json_str(BUNDLED_TAGS, BUNDLED_ATTRIBUTES) {
            Ok(kb) => kb,
            Err(e) => {
                tracing::error!("Bundled knowledge base is invalid: {}", e);
                Self::default()
            }
        }
    }

    pub fn tag(&self, name: &str) -> Option<&TagDescriptor> {
        self.tags.get(name)
    }

    /// All tags in name order.
    pub fn tags(&self) -> impl Iterator<Item = &TagDescriptor> {
        self.tags.values()
    }

    /// Attribute names declared for a tag; empty for unknown tags.
    pub fn tag_attributes(&self, tag: &str) -> &[String] {
        self.tags
            .get(tag)
            .map(|t| t.attributes.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve an attribute descriptor, preferring the tag-scoped entry.
    pub fn attribute(&self, tag: Option<&str>, attribute: &str) -> Option<&AttributeDescriptor> {
        tag.and_then(|tag| self.attributes.get(&format!("{}/{}", tag, attribute)))
            .or_else(|| self.attributes.get(attribute))
    }

    /// Legal values for an attribute.
    ///
    /// Explicit options win; a boolean attribute without options yields
    /// `true` / `false`; anything else yields nothing.
    pub fn attribute_values(&self, tag: Option<&str>, attribute: &str) -> Vec<String> {
        let Some(attr) = self.attribute(tag, attribute) else {
            return Vec::new();
        };
        match (&attr.options, attr.kind) {
            (Some(options), _) => options.clone(),
            (None, AttributeType::Boolean) => vec!["true".to_string(), "false".to_string()],
            (None, _) => Vec::new(),
        }
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }
}
