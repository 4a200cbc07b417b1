// SPDX-License-Identifier: AGPL-3.0-or-later
//! mdexport core - markdown block scanning and document export
//!
//! This crate provides:
//! - A flat block model (headings, tables, paragraphs, lists, code, rules)
//! - A single-pass markdown block scanner producing that model
//! - An inline normalizer that strips emphasis, code spans and links
//! - A renderer trait with spreadsheet, word-processor and plain text targets

pub mod ast;
pub mod formats;
pub mod inline;
pub mod traits;

pub use ast::{Block, BlockKind, LineSpan, ListItem, ListStyle, TargetFormat};
pub use formats::{
    parse, PlainTextRenderer, SheetStyle, SpreadsheetRenderer, WordRenderer, WordStyle,
};
pub use inline::normalize;
pub use traits::{ExportError, RenderConfig, Renderer, RendererExt, RendererRegistry, Result};
