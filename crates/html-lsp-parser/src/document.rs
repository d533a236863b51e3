//! Document: ropey::Rope plus a scope map that is rescanned on every change.

use crate::scanner::ScopeMap;
use html_lsp_types::{ScopeProvider, TextBuffer, TextPosition};
use ropey::{Rope, RopeSlice};

/// Text and scope state of a single open HTML document.
pub struct Document {
    rope: Rope,
    scopes: ScopeMap,
}

impl Document {
    pub fn new(source: &str) -> Self {
        let mut doc = Document {
            rope: Rope::from_str(source),
            scopes: ScopeMap::default(),
        };
        doc.rescan();
        doc
    }

    /// Replace the whole content (used on didOpen and full-sync didChange).
    pub fn set_text(&mut self, source: &str) {
        self.rope = Rope::from_str(source);
        self.rescan();
    }

    /// Apply an incremental edit from LSP didChange and rescan.
    ///
    /// Coordinates are 0-based (line, character) pairs as sent by LSP, so
    /// characters count UTF-16 code units.
    pub fn apply_edit(
        &mut self,
        start_line: u32,
        start_char: u32,
        end_line: u32,
        end_char: u32,
        new_text: &str,
    ) {
        let start = self.position_to_char(start_line as usize, start_char as usize);
        let end = self
            .position_to_char(end_line as usize, end_char as usize)
            .max(start);

        self.rope.remove(start..end);
        self.rope.insert(start, new_text);
        self.rescan();
    }

    /// Get the current source as a String.
    pub fn source(&self) -> String {
        self.rope.to_string()
    }

    /// Convert an LSP (UTF-16) column to a column in Unicode scalar values,
    /// clamped to the line's content. Columns on missing lines pass through.
    pub fn char_column(&self, line: u32, utf16_column: u32) -> u32 {
        self.line_char_column(line as usize, utf16_column as usize)
            .map_or(utf16_column, |c| c as u32)
    }

    fn rescan(&mut self) {
        self.scopes = ScopeMap::scan_lines(
            self.rope
                .lines()
                .map(|line| trim_line_ending(line.to_string())),
        );
        tracing::trace!(
            "Rescanned document: {} lines, {} chars",
            self.scopes.line_count(),
            self.rope.len_chars()
        );
    }

    /// Convert (line, UTF-16 column) to a char index in the rope, clamped to
    /// the line.
    fn position_to_char(&self, line: usize, utf16_column: usize) -> usize {
        match self.line_char_column(line, utf16_column) {
            Some(column) => self.rope.line_to_char(line) + column,
            None => self.rope.len_chars(),
        }
    }

    fn line_char_column(&self, line: usize, utf16_column: usize) -> Option<usize> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let slice = self.rope.line(line);
        let content = slice.slice(..line_len_without_ending(slice));
        Some(content.utf16_cu_to_char(utf16_column.min(content.len_utf16_cu())))
    }
}

impl TextBuffer for Document {
    fn line_text(&self, line: u32) -> Option<String> {
        let line = line as usize;
        if line >= self.rope.len_lines() {
            return None;
        }
        Some(trim_line_ending(self.rope.line(line).to_string()))
    }

    fn line_count(&self) -> u32 {
        self.rope.len_lines() as u32
    }
}

impl ScopeProvider for Document {
    fn scopes_at(&self, position: TextPosition) -> Vec<String> {
        self.scopes.scopes_at(position)
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

/// Strip one trailing line terminator (`\r\n` counts as one).
fn trim_line_ending(mut line: String) -> String {
    if line.ends_with("\r\n") {
        line.truncate(line.len() - 2);
    } else if let Some(last) = line.chars().last() {
        if is_line_break(last) {
            line.truncate(line.len() - last.len_utf8());
        }
    }
    line
}

fn line_len_without_ending(line: RopeSlice<'_>) -> usize {
    let len = line.len_chars();
    if len >= 2 && line.char(len - 2) == '\r' && line.char(len - 1) == '\n' {
        len - 2
    } else if len >= 1 && is_line_break(line.char(len - 1)) {
        len - 1
    } else {
        len
    }
}
