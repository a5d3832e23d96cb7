//! Source locations attached to tree nodes

use serde::{Deserialize, Serialize};

/// Byte range in a source file plus the 1-based line it starts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            line: 1,
        }
    }

    /// Zero-width span on a line; used for synthesized nodes
    pub fn at_line(line: usize) -> Self {
        Self {
            start: 0,
            end: 0,
            line,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
