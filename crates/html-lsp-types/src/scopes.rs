//! TextMate-style scope names produced by the scope scanner and consumed by
//! the completion context classifier.

/// Root scope of every HTML document position.
pub const ROOT: &str = "text.html.basic";

pub const TAG_STRUCTURE: &str = "meta.tag.structure.any.html";
pub const TAG_BLOCK: &str = "meta.tag.block.any.html";
pub const TAG_INLINE: &str = "meta.tag.inline.any.html";
pub const TAG_OTHER: &str = "meta.tag.other.html";
pub const TAG_ANY: &str = "meta.tag.any.html";
pub const TAG_DOCTYPE: &str = "meta.tag.sgml.doctype.html";

/// Scopes that mark a position as being inside a tag.
pub const TAG_SCOPES: &[&str] = &[TAG_ANY, TAG_OTHER, TAG_BLOCK, TAG_INLINE, TAG_STRUCTURE];

pub const TAG_BEGIN: &str = "punctuation.definition.tag.begin.html";
pub const TAG_END: &str = "punctuation.definition.tag.end.html";
pub const TAG_NAME: &str = "entity.name.tag.html";

pub const ATTRIBUTE_NAME: &str = "entity.other.attribute-name.html";
pub const KEY_VALUE_SEPARATOR: &str = "punctuation.separator.key-value.html";

pub const STRING_DOUBLE: &str = "string.quoted.double.html";
pub const STRING_SINGLE: &str = "string.quoted.single.html";
pub const STRING_UNQUOTED: &str = "string.unquoted.html";

/// Scopes that mark a position as being inside a quoted attribute value.
pub const STRING_SCOPES: &[&str] = &[STRING_DOUBLE, STRING_SINGLE];

pub const STRING_BEGIN: &str = "punctuation.definition.string.begin.html";
pub const STRING_END: &str = "punctuation.definition.string.end.html";

pub const COMMENT: &str = "comment.block.html";
pub const COMMENT_BEGIN: &str = "punctuation.definition.comment.begin.html";
pub const COMMENT_END: &str = "punctuation.definition.comment.end.html";

pub const BAD_ANGLE_BRACKET: &str = "invalid.illegal.bad-angle-bracket.html";

/// Whether any scope in the chain is a tag scope.
pub fn has_tag_scope<S: AsRef<str>>(scopes: &[S]) -> bool {
    scopes.iter().any(|s| TAG_SCOPES.contains(&s.as_ref()))
}

/// Whether any scope in the chain is a quoted string scope.
pub fn has_string_scope<S: AsRef<str>>(scopes: &[S]) -> bool {
    scopes.iter().any(|s| STRING_SCOPES.contains(&s.as_ref()))
}

/// Whether the chain contains exactly `scope`.
pub fn contains<S: AsRef<str>>(scopes: &[S], scope: &str) -> bool {
    scopes.iter().any(|s| s.as_ref() == scope)
}
