use std::ops::Range;

use xi_rope::{LinesMetric, Rope};

/// Line/offset address inside a document
///
/// `ch` is a byte offset within the line, so it always lands on a character
/// boundary for positions produced by this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// Exact replaceable range of text, `from <= to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub from: Position,
    pub to: Position,
}

impl Span {
    pub fn new(from: Position, to: Position) -> Self {
        debug_assert!(from <= to, "span end precedes start");
        Self { from, to }
    }

    /// Span covering a byte range of a single line
    pub fn on_line(line: usize, range: Range<usize>) -> Self {
        Self::new(
            Position::new(line, range.start),
            Position::new(line, range.end),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("position {line}:{ch} is outside the document")]
    OutOfBounds { line: usize, ch: usize },
    #[error("span end {to_line}:{to_ch} precedes start {from_line}:{from_ch}")]
    Inverted {
        from_line: usize,
        from_ch: usize,
        to_line: usize,
        to_ch: usize,
    },
}

/// What the engine needs from a host editor.
///
/// The engine never holds on to a document between events; every read and
/// replace goes through this trait.
pub trait DocumentService {
    /// Number of lines; a trailing newline yields a final empty line
    fn line_count(&self) -> usize;
    /// Text of one line without its line terminator
    fn line(&self, index: usize) -> Option<String>;
    /// Entire document as one string
    fn text(&self) -> String;
    /// Replace the entire document
    fn set_text(&mut self, text: &str);
    /// Caret position (head of the selection)
    fn cursor(&self) -> Position;
    fn set_cursor(&mut self, position: Position) -> Result<(), EditError>;
    fn set_selection(&mut self, span: Span) -> Result<(), EditError>;
    /// Replace the current selection with literal text, leaving the caret after it
    fn replace_selection(&mut self, text: &str) -> Result<(), EditError>;
}

/// In-memory editor buffer
///
/// Backed by an `xi_rope::Rope` so replacements stay cheap on large files and
/// the text round-trips byte for byte.
#[derive(Debug, Clone)]
pub struct EditorDocument {
    buffer: Rope,
    /// Selection as byte offsets into the buffer, `start` is the anchor and `end` the head
    selection: Range<usize>,
    /// Incremented on every mutation
    version: u64,
}

impl EditorDocument {
    pub fn from_text(text: &str) -> Self {
        let buffer = Rope::from(text);
        let len = buffer.len();
        Self {
            buffer,
            selection: len..len,
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Current selection as a span
    pub fn selection(&self) -> Span {
        Span::new(
            self.position_of(self.selection.start),
            self.position_of(self.selection.end),
        )
    }

    /// Byte range of a line including its terminator
    fn line_range(&self, index: usize) -> Range<usize> {
        self.buffer.offset_of_line(index)..self.buffer.offset_of_line(index + 1)
    }

    fn offset_of(&self, position: Position) -> Result<usize, EditError> {
        let out_of_bounds = EditError::OutOfBounds {
            line: position.line,
            ch: position.ch,
        };
        let line = self.line(position.line).ok_or(out_of_bounds.clone())?;
        if position.ch > line.len() || !line.is_char_boundary(position.ch) {
            return Err(out_of_bounds);
        }
        Ok(self.buffer.offset_of_line(position.line) + position.ch)
    }

    fn position_of(&self, offset: usize) -> Position {
        let offset = offset.min(self.buffer.len());
        let line = self.buffer.line_of_offset(offset);
        Position::new(line, offset - self.buffer.offset_of_line(line))
    }

    fn span_to_range(&self, span: Span) -> Result<Range<usize>, EditError> {
        if span.to < span.from {
            return Err(EditError::Inverted {
                from_line: span.from.line,
                from_ch: span.from.ch,
                to_line: span.to.line,
                to_ch: span.to.ch,
            });
        }
        Ok(self.offset_of(span.from)?..self.offset_of(span.to)?)
    }
}

impl DocumentService for EditorDocument {
    fn line_count(&self) -> usize {
        self.buffer.measure::<LinesMetric>() + 1
    }

    fn line(&self, index: usize) -> Option<String> {
        if index >= self.line_count() {
            return None;
        }
        let raw = self.buffer.slice_to_cow(self.line_range(index));
        let line = raw.strip_suffix('\n').unwrap_or(&raw);
        let line = line.strip_suffix('\r').unwrap_or(line);
        Some(line.to_string())
    }

    fn text(&self) -> String {
        self.buffer.to_string()
    }

    fn set_text(&mut self, text: &str) {
        self.buffer = Rope::from(text);
        // Keep the caret where it was when it still fits
        let mut caret = self.selection.end.min(text.len());
        while !text.is_char_boundary(caret) {
            caret -= 1;
        }
        self.selection = caret..caret;
        self.version += 1;
    }

    fn cursor(&self) -> Position {
        self.position_of(self.selection.end)
    }

    fn set_cursor(&mut self, position: Position) -> Result<(), EditError> {
        let offset = self.offset_of(position)?;
        self.selection = offset..offset;
        Ok(())
    }

    fn set_selection(&mut self, span: Span) -> Result<(), EditError> {
        self.selection = self.span_to_range(span)?;
        Ok(())
    }

    fn replace_selection(&mut self, text: &str) -> Result<(), EditError> {
        let range = self.selection.clone();
        self.buffer.edit(range.clone(), text);
        let caret = range.start + text.len();
        self.selection = caret..caret;
        self.version += 1;
        Ok(())
    }
}
