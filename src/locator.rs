//! Best-effort mapping from tokens back to lines of the raw contract text.
//!
//! The search is purely textual. A token that appears more than once maps to
//! its first occurrence, and a token that was reformatted by the serializer
//! (quoting, flow style, escapes) may not be found at all.

use crate::types::Line;

/// Raw contract text kept as lines for line lookup.
#[derive(Debug, Clone, Default)]
pub struct SourceText {
    lines: Vec<String>,
}

impl SourceText {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Returns the first line (1-based) containing `keyword` as a substring.
    pub fn find_line(&self, keyword: &str) -> Line {
        self.lines
            .iter()
            .position(|line| line.contains(keyword))
            .map(|idx| Line::At(idx + 1))
            .unwrap_or(Line::Unknown)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}
