// SPDX-License-Identifier: AGPL-3.0-or-later
//! Markdown block scanner
//!
//! A single forward pass over the source lines. At each non-blank line the
//! rules are tried in a fixed order (heading, rule, fenced code, table,
//! unordered list, ordered list) and the first match consumes as many lines
//! as it needs; anything else becomes a paragraph. There is no backtracking.
//! Inline markup is left untouched here; see [`crate::inline::normalize`].

use crate::ast::{Block, LineSpan, ListItem, ListStyle};
use regex::Regex;
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());

/// Looser heading test used by the paragraph lookahead (no text required).
static HEADING_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{1,6}\s+").unwrap());

static RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\*{3,}|-{3,}|_{3,})\s*$").unwrap());

static TABLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|?[\s\-:|]+\|").unwrap());

static UNORDERED_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+").unwrap());

static ORDERED_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+").unwrap());

const FENCE: &str = "```";

/// Parse a whole markdown document into blocks.
///
/// Never fails: unterminated fences run to end of input and ragged tables
/// are kept as-is. Empty or all-blank input yields an empty vector.
pub fn parse(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.split('\n').collect();
    let blocks = Scanner::new(&lines).run();

    tracing::debug!(lines = lines.len(), blocks = blocks.len(), "parsed markdown");
    blocks
}

struct Scanner<'a> {
    lines: &'a [&'a str],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(lines: &'a [&'a str]) -> Self {
        Self { lines, pos: 0 }
    }

    fn current(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn run(mut self) -> Vec<Block> {
        let mut blocks = Vec::new();

        while let Some(line) = self.current() {
            if is_blank(line) {
                self.pos += 1;
                continue;
            }

            let block = self.next_block(line);
            let span = block.span();
            tracing::trace!(
                kind = ?block.kind(),
                start = span.start,
                end = span.end,
                "classified block"
            );
            blocks.push(block);
        }

        blocks
    }

    /// Classify the block starting at the current (non-blank) line.
    fn next_block(&mut self, line: &'a str) -> Block {
        if let Some(block) = self.heading(line) {
            return block;
        }
        if let Some(block) = self.rule(line) {
            return block;
        }
        if let Some(block) = self.code(line) {
            return block;
        }
        if let Some(block) = self.table(line) {
            return block;
        }
        if let Some(block) = self.list(ListStyle::Unordered) {
            return block;
        }
        if let Some(block) = self.list(ListStyle::Ordered) {
            return block;
        }
        self.paragraph()
    }

    fn heading(&mut self, line: &str) -> Option<Block> {
        let caps = HEADING.captures(line)?;
        let level = caps[1].len() as u8;
        let text = caps[2].trim().to_string();

        let start = self.pos;
        self.pos += 1;
        Some(Block::Heading {
            level,
            text,
            span: LineSpan::new(start, self.pos),
        })
    }

    fn rule(&mut self, line: &str) -> Option<Block> {
        if !RULE.is_match(line) {
            return None;
        }

        let start = self.pos;
        self.pos += 1;
        Some(Block::Rule {
            span: LineSpan::new(start, self.pos),
        })
    }

    fn code(&mut self, line: &str) -> Option<Block> {
        let info = line.trim().strip_prefix(FENCE)?.trim();
        let language = (!info.is_empty()).then(|| info.to_string());

        let start = self.pos;
        self.pos += 1;
        let body_start = self.pos;
        while let Some(line) = self.current() {
            if line.trim().starts_with(FENCE) {
                break;
            }
            self.pos += 1;
        }
        let text = self.lines[body_start..self.pos].join("\n");

        // closing fence, absent when the block runs to end of input
        if self.pos < self.lines.len() {
            self.pos += 1;
        }

        Some(Block::Code {
            language,
            text,
            span: LineSpan::new(start, self.pos),
        })
    }

    fn table(&mut self, line: &str) -> Option<Block> {
        if !self.is_table_head(self.pos) {
            return None;
        }

        let start = self.pos;
        let mut rows = vec![split_row(line)];
        // header + separator
        self.pos += 2;

        while let Some(line) = self.current() {
            if !line.contains('|') || is_blank(line) {
                break;
            }
            rows.push(split_row(line));
            self.pos += 1;
        }

        Some(Block::Table {
            rows,
            span: LineSpan::new(start, self.pos),
        })
    }

    fn list(&mut self, style: ListStyle) -> Option<Block> {
        let pattern = match style {
            ListStyle::Unordered => &*UNORDERED_ITEM,
            ListStyle::Ordered => &*ORDERED_ITEM,
        };

        let start = self.pos;
        let mut items = Vec::new();
        while let Some(line) = self.current() {
            let Some(marker) = pattern.find(line) else {
                break;
            };
            let indent = line.chars().take_while(|c| c.is_whitespace()).count();
            items.push(ListItem::new(indent, line[marker.end()..].trim()));
            self.pos += 1;
        }

        if items.is_empty() {
            return None;
        }

        Some(Block::List {
            style,
            items,
            span: LineSpan::new(start, self.pos),
        })
    }

    /// Fallback rule. The first line is always taken so the cursor advances
    /// even when the lookahead would call that line special (e.g. `"# "`).
    fn paragraph(&mut self) -> Block {
        let start = self.pos;
        let mut parts = Vec::new();

        while let Some(line) = self.current() {
            if is_blank(line) || (self.pos > start && self.starts_block(self.pos)) {
                break;
            }
            parts.push(line.trim());
            self.pos += 1;
        }

        Block::Paragraph {
            text: parts.join(" "),
            span: LineSpan::new(start, self.pos),
        }
    }

    /// Whether the line at `idx` would open a non-paragraph block.
    fn starts_block(&self, idx: usize) -> bool {
        let line = self.lines[idx];
        HEADING_START.is_match(line)
            || RULE.is_match(line)
            || line.trim().starts_with(FENCE)
            || self.is_table_head(idx)
            || UNORDERED_ITEM.is_match(line)
            || ORDERED_ITEM.is_match(line)
    }

    /// A pipe-bearing line immediately followed by a separator line.
    fn is_table_head(&self, idx: usize) -> bool {
        self.lines[idx].contains('|')
            && self
                .lines
                .get(idx + 1)
                .is_some_and(|next| TABLE_SEPARATOR.is_match(next))
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Split a table line into trimmed cells, dropping one outer pipe per side.
fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(|cell| cell.trim().to_string()).collect()
}
