//! Suggestion builders for each completion context.

use crate::context::CompletionContext;
use crate::matching::PrefixMatcher;
use html_lsp_data::KnowledgeBase;
use html_lsp_types::{AttributeType, Suggestion, SuggestionKind, TagDescriptor};

/// Build suggestions for a classified context.
pub fn provide_completions(context: &CompletionContext, kb: &KnowledgeBase) -> Vec<Suggestion> {
    match context {
        CompletionContext::TagName {
            prefix,
            after_open_angle,
        } => tag_name_suggestions(kb, prefix, *after_open_angle),
        CompletionContext::AttributeName { tag, prefix } => {
            attribute_name_suggestions(kb, tag.as_deref(), prefix)
        }
        CompletionContext::AttributeValue {
            tag,
            attribute,
            prefix,
        } => attribute_value_suggestions(kb, tag.as_deref(), attribute, prefix),
        CompletionContext::None => Vec::new(),
    }
}

/// Every tag matching the prefix, each with an expanded snippet.
///
/// Right after `<` all tags are offered regardless of the prefix.
pub fn tag_name_suggestions(
    kb: &KnowledgeBase,
    prefix: &str,
    after_open_angle: bool,
) -> Vec<Suggestion> {
    let matcher = PrefixMatcher::new(if after_open_angle { "" } else { prefix });
    kb.tags()
        .filter(|tag| matcher.matches(&tag.name))
        .map(|tag| Suggestion {
            display_text: tag.name.clone(),
            insertion_template: build_tag_snippet(kb, tag),
            category: SuggestionKind::Tag,
            description: tag.description.clone(),
            right_label: String::new(),
        })
        .collect()
}

/// Expand a tag into a snippet with its default attributes and subtags.
///
/// The leading `<` of the root tag is omitted. Tab stops are numbered from a
/// single counter across the whole expansion.
pub fn build_tag_snippet(kb: &KnowledgeBase, tag: &TagDescriptor) -> String {
    let mut out = String::new();
    let mut slot = 0;
    let mut path = Vec::new();
    write_tag(kb, tag, true, &mut slot, &mut path, &mut out);
    out
}

fn write_tag<'a>(
    kb: &'a KnowledgeBase,
    tag: &'a TagDescriptor,
    root: bool,
    slot: &mut u32,
    path: &mut Vec<&'a str>,
    out: &mut String,
) {
    if !root {
        out.push('<');
    }
    out.push_str(&tag.name);
    for attr in &tag.defaults {
        *slot += 1;
        out.push_str(&format!(" {}=\"${}\"", attr, slot));
    }
    out.push('>');

    path.push(&tag.name);
    for sub in &tag.subtags {
        if path.contains(&sub.as_str()) {
            tracing::debug!("Skipping recursive subtag <{}> in <{}>", sub, tag.name);
            continue;
        }
        if let Some(child) = kb.tag(sub) {
            write_tag(kb, child, false, slot, path, out);
        }
    }
    path.pop();

    out.push_str("</");
    out.push_str(&tag.name);
    out.push('>');
}

/// Attributes declared for `tag` that have a descriptor and match the prefix.
///
/// A whitespace-only prefix (cursor right after a space) matches everything.
/// Nothing is offered when no enclosing tag was found.
pub fn attribute_name_suggestions(
    kb: &KnowledgeBase,
    tag: Option<&str>,
    prefix: &str,
) -> Vec<Suggestion> {
    let Some(tag) = tag else {
        return Vec::new();
    };
    let matcher = PrefixMatcher::new(prefix.trim());
    let right_label = format!("<{}>", tag);

    kb.tag_attributes(tag)
        .iter()
        .filter(|name| matcher.matches(name))
        .filter_map(|name| {
            let attr = kb.attribute(Some(tag), name)?;
            let (insertion_template, category) = match attr.kind {
                AttributeType::Flag => (format!("{} ", name), SuggestionKind::Property),
                AttributeType::Method => (format!("{}=\"$1\"$0", name), SuggestionKind::Method),
                _ => (format!("{}=\"$1\"$0", name), SuggestionKind::Property),
            };
            Some(Suggestion {
                display_text: name.to_string(),
                insertion_template,
                category,
                description: attr.description.clone(),
                right_label: right_label.clone(),
            })
        })
        .collect()
}

/// Legal values of an attribute that match the prefix.
pub fn attribute_value_suggestions(
    kb: &KnowledgeBase,
    tag: Option<&str>,
    attribute: &str,
    prefix: &str,
) -> Vec<Suggestion> {
    let Some(attr) = kb.attribute(tag, attribute) else {
        return Vec::new();
    };
    let right_label = match tag {
        Some(tag) if !attr.global => format!("<{}>", tag),
        _ => String::new(),
    };
    let matcher = PrefixMatcher::new(prefix);

    kb.attribute_values(tag, attribute)
        .into_iter()
        .filter(|value| matcher.matches(value))
        .map(|value| Suggestion {
            insertion_template: value.clone(),
            display_text: value,
            category: SuggestionKind::Value,
            description: attr.description.clone(),
            right_label: right_label.clone(),
        })
        .collect()
}
