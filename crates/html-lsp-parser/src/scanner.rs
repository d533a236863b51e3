//! Lexical scope scanner.
//!
//! Tokenizes HTML line by line, the way a TextMate grammar does, and records
//! the scope chain of every character. Scanner state carries across lines so
//! tags, attribute values and comments may span several lines. No tree is
//! built: mismatched or unclosed tags are simply scanned through.

use html_lsp_types::scopes::*;
use html_lsp_types::{ScopeProvider, TextPosition};

/// Scope chain of a single character, outermost first.
pub type ScopeChain = Vec<&'static str>;

const STRUCTURE_TAGS: &[&str] = &["body", "head", "html"];

const BLOCK_TAGS: &[&str] = &[
    "address",
    "applet",
    "article",
    "aside",
    "blockquote",
    "center",
    "dd",
    "dir",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "frame",
    "frameset",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "iframe",
    "li",
    "main",
    "menu",
    "nav",
    "noframes",
    "object",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

const INLINE_TAGS: &[&str] = &[
    "a",
    "abbr",
    "acronym",
    "area",
    "b",
    "base",
    "basefont",
    "bdo",
    "big",
    "br",
    "button",
    "caption",
    "cite",
    "code",
    "col",
    "colgroup",
    "del",
    "dfn",
    "em",
    "font",
    "i",
    "img",
    "input",
    "ins",
    "kbd",
    "label",
    "legend",
    "link",
    "map",
    "meta",
    "noscript",
    "optgroup",
    "option",
    "param",
    "q",
    "s",
    "samp",
    "script",
    "select",
    "small",
    "span",
    "strike",
    "strong",
    "style",
    "sub",
    "sup",
    "textarea",
    "title",
    "tt",
    "u",
    "var",
];

/// Pick the tag meta scope for a tag name.
pub fn tag_meta_scope(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    let lower = lower.as_str();
    if STRUCTURE_TAGS.contains(&lower) {
        TAG_STRUCTURE
    } else if BLOCK_TAGS.contains(&lower) {
        TAG_BLOCK
    } else if INLINE_TAGS.contains(&lower) {
        TAG_INLINE
    } else if lower.contains('-') {
        // custom elements
        TAG_ANY
    } else {
        TAG_OTHER
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Data,
    TagName { meta: &'static str },
    InTag { meta: &'static str },
    AttrName { meta: &'static str },
    AfterEquals { meta: &'static str },
    Quoted {
        meta: &'static str,
        quote: char,
        scope: &'static str,
    },
    Unquoted { meta: &'static str },
    Comment,
    Doctype,
}

impl State {
    /// Scopes that remain open when the state spans past a character.
    fn open_scopes(self) -> ScopeChain {
        match self {
            State::Data => vec![ROOT],
            State::TagName { meta }
            | State::InTag { meta }
            | State::AttrName { meta }
            | State::AfterEquals { meta }
            | State::Unquoted { meta } => vec![ROOT, meta],
            State::Quoted { meta, scope, .. } => vec![ROOT, meta, scope],
            State::Comment => vec![ROOT, COMMENT],
            State::Doctype => vec![ROOT, TAG_DOCTYPE],
        }
    }

    /// A line break ends names and unquoted values.
    fn at_line_end(self) -> State {
        match self {
            State::TagName { meta } | State::AttrName { meta } | State::Unquoted { meta } => {
                State::InTag { meta }
            }
            other => other,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ScopeLine {
    chars: Vec<ScopeChain>,
    /// Scopes open after the last character, used for empty lines.
    trailing: ScopeChain,
}

/// Per-character scope chains for a whole document.
#[derive(Debug, Clone, Default)]
pub struct ScopeMap {
    lines: Vec<ScopeLine>,
}

impl ScopeMap {
    /// Scan a full text. Lines are split on `\n` with an optional `\r`.
    pub fn scan(text: &str) -> Self {
        Self::scan_lines(
            text.split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line)),
        )
    }

    /// Scan pre-split lines (without terminators).
    pub fn scan_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut scanner = Scanner {
            state: State::Data,
        };
        let lines = lines
            .into_iter()
            .map(|line| {
                let chars: Vec<char> = line.as_ref().chars().collect();
                scanner.scan_line(&chars)
            })
            .collect();
        ScopeMap { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Scope chain at a position.
    ///
    /// Returns the scopes of the character at the column. At or past the
    /// end of a line the last character's scopes are returned, and an empty
    /// line yields the scopes left open by the previous lines.
    pub fn chain_at(&self, line: u32, character: u32) -> ScopeChain {
        let Some(scope_line) = self.lines.get(line as usize) else {
            return vec![ROOT];
        };
        scope_line
            .chars
            .get(character as usize)
            .or_else(|| scope_line.chars.last())
            .cloned()
            .unwrap_or_else(|| scope_line.trailing.clone())
    }
}

impl ScopeProvider for ScopeMap {
    fn scopes_at(&self, position: TextPosition) -> Vec<String> {
        self.chain_at(position.line, position.character)
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

struct Scanner {
    state: State,
}

impl Scanner {
    fn scan_line(&mut self, chars: &[char]) -> ScopeLine {
        let mut out: Vec<ScopeChain> = Vec::with_capacity(chars.len());
        let mut i = 0;

        // Every branch either consumes a character or switches to a state
        // that consumes the same character on the next iteration.
        while i < chars.len() {
            let c = chars[i];
            match self.state {
                State::Data => {
                    if c == '<' {
                        i = self.open_angle(chars, i, &mut out);
                    } else {
                        out.push(vec![ROOT]);
                        i += 1;
                    }
                }
                State::TagName { meta } => {
                    if is_tag_name_char(c) {
                        out.push(vec![ROOT, meta, TAG_NAME]);
                        i += 1;
                    } else {
                        self.state = State::InTag { meta };
                    }
                }
                State::InTag { meta } => match c {
                    '>' => {
                        out.push(vec![ROOT, meta, TAG_END]);
                        self.state = State::Data;
                        i += 1;
                    }
                    '/' if chars.get(i + 1) == Some(&'>') => {
                        out.push(vec![ROOT, meta, TAG_END]);
                        i += 1;
                    }
                    '<' => self.state = State::Data,
                    '=' => {
                        out.push(vec![ROOT, meta, KEY_VALUE_SEPARATOR]);
                        self.state = State::AfterEquals { meta };
                        i += 1;
                    }
                    '"' | '\'' => self.state = State::AfterEquals { meta },
                    c if c.is_whitespace() || c == '/' => {
                        out.push(vec![ROOT, meta]);
                        i += 1;
                    }
                    _ => self.state = State::AttrName { meta },
                },
                State::AttrName { meta } => {
                    if is_attr_name_char(c) {
                        out.push(vec![ROOT, meta, ATTRIBUTE_NAME]);
                        i += 1;
                    } else {
                        self.state = State::InTag { meta };
                    }
                }
                State::AfterEquals { meta } => match c {
                    '"' | '\'' => {
                        let scope = if c == '"' { STRING_DOUBLE } else { STRING_SINGLE };
                        out.push(vec![ROOT, meta, scope, STRING_BEGIN]);
                        self.state = State::Quoted {
                            meta,
                            quote: c,
                            scope,
                        };
                        i += 1;
                    }
                    '>' | '<' => self.state = State::InTag { meta },
                    c if c.is_whitespace() => {
                        out.push(vec![ROOT, meta]);
                        i += 1;
                    }
                    _ => self.state = State::Unquoted { meta },
                },
                State::Quoted { meta, quote, scope } => {
                    if c == quote {
                        out.push(vec![ROOT, meta, scope, STRING_END]);
                        self.state = State::InTag { meta };
                    } else {
                        out.push(vec![ROOT, meta, scope]);
                    }
                    i += 1;
                }
                State::Unquoted { meta } => {
                    if c.is_whitespace() || c == '>' || c == '<' {
                        self.state = State::InTag { meta };
                    } else {
                        out.push(vec![ROOT, meta, STRING_UNQUOTED]);
                        i += 1;
                    }
                }
                State::Comment => {
                    if starts_with_at(chars, i, "-->") {
                        for _ in 0..3 {
                            out.push(vec![ROOT, COMMENT, COMMENT_END]);
                        }
                        self.state = State::Data;
                        i += 3;
                    } else {
                        out.push(vec![ROOT, COMMENT]);
                        i += 1;
                    }
                }
                State::Doctype => {
                    if c == '>' {
                        out.push(vec![ROOT, TAG_DOCTYPE, TAG_END]);
                        self.state = State::Data;
                    } else {
                        out.push(vec![ROOT, TAG_DOCTYPE]);
                    }
                    i += 1;
                }
            }
        }

        let trailing = self.state.open_scopes();
        self.state = self.state.at_line_end();
        ScopeLine {
            chars: out,
            trailing,
        }
    }

    /// Handle a `<` in text content. Returns the index after the consumed
    /// punctuation.
    fn open_angle(&mut self, chars: &[char], i: usize, out: &mut Vec<ScopeChain>) -> usize {
        match chars.get(i + 1) {
            Some(c) if c.is_ascii_alphabetic() => {
                let meta = tag_meta_scope(&read_tag_name(chars, i + 1));
                out.push(vec![ROOT, meta, TAG_BEGIN]);
                self.state = State::TagName { meta };
                i + 1
            }
            Some('/') if chars.get(i + 2).is_some_and(|c| c.is_ascii_alphabetic()) => {
                let meta = tag_meta_scope(&read_tag_name(chars, i + 2));
                out.push(vec![ROOT, meta, TAG_BEGIN]);
                out.push(vec![ROOT, meta, TAG_BEGIN]);
                self.state = State::TagName { meta };
                i + 2
            }
            Some('!') if starts_with_at(chars, i, "<!--") => {
                for _ in 0..4 {
                    out.push(vec![ROOT, COMMENT, COMMENT_BEGIN]);
                }
                self.state = State::Comment;
                i + 4
            }
            Some('!') => {
                out.push(vec![ROOT, TAG_DOCTYPE, TAG_BEGIN]);
                self.state = State::Doctype;
                i + 1
            }
            _ => {
                out.push(vec![ROOT, BAD_ANGLE_BRACKET]);
                i + 1
            }
        }
    }
}

fn is_tag_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == ':' || c == '_' || c == '.'
}

fn is_attr_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '"' | '\'' | '=' | '<' | '>' | '/')
}

fn read_tag_name(chars: &[char], start: usize) -> String {
    chars[start..]
        .iter()
        .take_while(|c| is_tag_name_char(**c))
        .collect()
}

fn starts_with_at(chars: &[char], i: usize, pattern: &str) -> bool {
    let mut idx = i;
    for p in pattern.chars() {
        if chars.get(idx) != Some(&p) {
            return false;
        }
        idx += 1;
    }
    true
}
