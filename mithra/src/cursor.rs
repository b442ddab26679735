use std::cmp::min;

use crate::error::{Position, Syntax, SyntaxError};

/// Maximal nesting depth of function calls accepted by the parser. Grammar
/// rules recurse on the call stack, so this bounds stack usage for hostile
/// input.
pub const MAX_NESTING: usize = 128;

/// A position-tracked view over one line of source text.
///
/// This is the only mutable state threaded through parsing. Every parser takes
/// a `&mut Cursor` and advances it as it consumes characters.
#[derive(Debug, Clone)]
pub struct Cursor {
    chars: Vec<char>,
    pointer: usize,

    /// Zero-indexed line number of this text in the program.
    line: u32,

    /// Character offset of the start of this text in the program.
    offset: usize,

    /// Current function call nesting depth.
    depth: usize,

    /// Set when the nesting limit was hit.
    overflow: Option<SyntaxError>,
}

impl Cursor {
    /// Create a cursor over the first line of a program.
    pub fn new(text: &str) -> Cursor {
        Cursor::on_line(text, 0, 0)
    }

    /// Create a cursor over a line which starts at a given line number and
    /// character offset of a larger program.
    pub fn on_line(text: &str, line: u32, offset: usize) -> Cursor {
        Cursor {
            chars: text.chars().collect(),
            pointer: 0,
            line,
            offset,
            depth: 0,
            overflow: None,
        }
    }

    /// Return the character under the pointer, or `None` at end of input.
    ///
    /// The pointer is advanced in both cases, so parsers that read one
    /// character too many to find the end of a token must give it back with
    /// [`Cursor::step_back`]. The pointer never moves further than one past the
    /// end of the text.
    pub fn next(&mut self) -> Option<char> {
        let retval = self.chars.get(self.pointer).copied();
        self.pointer = min(self.pointer + 1, self.chars.len() + 1);
        retval
    }

    /// Move the pointer back one character, unless at the start.
    pub fn step_back(&mut self) {
        self.pointer = self.pointer.saturating_sub(1);
    }

    /// Current pointer into the text.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Restore a pointer previously obtained by [`Cursor::pointer`].
    pub(crate) fn reset(&mut self, pointer: usize) {
        self.pointer = pointer;
    }

    /// True if all characters have been consumed.
    pub fn at_end(&self) -> bool {
        self.pointer >= self.chars.len()
    }

    /// Position of the pointer within the whole program.
    pub fn position(&self) -> Position {
        let column = min(self.pointer, self.chars.len());
        Position::new(self.offset + column, self.line, column as u32)
    }

    /// Create a syntax error at the current position.
    pub(crate) fn error<T>(&self, reason: T) -> SyntaxError
    where
        Syntax: From<T>,
    {
        SyntaxError::new(self.position(), Some(Syntax::from(reason)))
    }

    /// Enter one level of function call nesting.
    pub(crate) fn descend(&mut self) -> Result<(), SyntaxError> {
        if self.depth >= MAX_NESTING {
            let err = self.error(Syntax::TooDeep);
            self.overflow.get_or_insert(err);
            return Err(err);
        }
        self.depth += 1;
        Ok(())
    }

    /// Leave one level of function call nesting.
    pub(crate) fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// The first nesting limit error hit with this cursor, if any.
    pub(crate) fn overflow(&self) -> Option<SyntaxError> {
        self.overflow
    }
}
