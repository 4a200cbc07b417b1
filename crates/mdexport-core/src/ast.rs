// SPDX-License-Identifier: AGPL-3.0-or-later
//! Block model produced by the markdown scanner
//!
//! A parsed document is a flat, ordered `Vec<Block>`. Blocks are immutable
//! once produced and carry no references to each other; nesting inside lists
//! is expressed only through each item's raw indentation.

use serde::{Deserialize, Serialize};

/// Output target identifier for renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFormat {
    Spreadsheet,
    WordProcessor,
    PlainText,
}

impl TargetFormat {
    /// File extension appended to the input stem
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "xls.xml",
            Self::WordProcessor => "doc.xml",
            Self::PlainText => "txt",
        }
    }

    /// Short display name
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "Spreadsheet",
            Self::WordProcessor => "Word",
            Self::PlainText => "Text",
        }
    }

    /// All targets in menu order
    pub const ALL: [Self; 3] = [Self::Spreadsheet, Self::WordProcessor, Self::PlainText];
}

/// Half-open range of 0-based source lines consumed by a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Discriminant of [`Block`], one per block kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Heading,
    Table,
    Paragraph,
    List,
    Code,
    Hr,
}

/// Marker style of the run that produced a list block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Unordered,
    Ordered,
}

/// One list line: raw leading whitespace length and trimmed item text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub indent: usize,
    pub text: String,
}

impl ListItem {
    pub fn new(indent: usize, text: impl Into<String>) -> Self {
        Self {
            indent,
            text: text.into(),
        }
    }
}

/// Block-level structural unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// ATX heading with level 1-6
    Heading {
        level: u8,
        text: String,
        span: LineSpan,
    },

    /// Pipe table; `rows[0]` is the header row. Rows may differ in width.
    Table {
        rows: Vec<Vec<String>>,
        span: LineSpan,
    },

    /// Consecutive text lines joined with single spaces
    Paragraph { text: String, span: LineSpan },

    /// Contiguous run of same-style list lines
    List {
        style: ListStyle,
        items: Vec<ListItem>,
        span: LineSpan,
    },

    /// Fenced code, content captured verbatim
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        text: String,
        span: LineSpan,
    },

    /// Horizontal rule
    Rule { span: LineSpan },
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Heading { .. } => BlockKind::Heading,
            Block::Table { .. } => BlockKind::Table,
            Block::Paragraph { .. } => BlockKind::Paragraph,
            Block::List { .. } => BlockKind::List,
            Block::Code { .. } => BlockKind::Code,
            Block::Rule { .. } => BlockKind::Hr,
        }
    }

    /// Heading depth, 0 for every other kind
    pub fn level(&self) -> u8 {
        match self {
            Block::Heading { level, .. } => *level,
            _ => 0,
        }
    }

    /// Source lines this block was built from
    pub fn span(&self) -> LineSpan {
        match self {
            Block::Heading { span, .. }
            | Block::Table { span, .. }
            | Block::Paragraph { span, .. }
            | Block::List { span, .. }
            | Block::Code { span, .. }
            | Block::Rule { span } => *span,
        }
    }
}
