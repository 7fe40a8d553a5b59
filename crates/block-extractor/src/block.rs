use serde::{Deserialize, Serialize};
use variability_logic::Formula;

/// A region of source text governed by one preprocessor condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Source file path (opaque tag carried for diagnostics, never resolved)
    pub source_file: String,

    /// First line of the block (1-indexed, the line of its opening directive)
    pub start_line: usize,

    /// Last line of the block (1-indexed, inclusive; the line before the
    /// directive that closes it)
    pub end_line: usize,

    /// The condition of this block's own directive
    pub condition: Formula,

    /// Conjunction of every enclosing block's condition with this block's
    /// own, outermost first
    pub presence_condition: Formula,

    /// Nested blocks, in source order
    #[serde(default)]
    pub children: Vec<Block>,
}

impl Block {
    /// Create a new block without children
    #[must_use]
    pub fn new(
        source_file: impl Into<String>,
        start_line: usize,
        end_line: usize,
        condition: Formula,
        presence_condition: Formula,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            start_line,
            end_line,
            condition,
            presence_condition,
            children: Vec::new(),
        }
    }

    /// Get the number of lines in this block
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Check if the block spans a specific line
    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }
}
