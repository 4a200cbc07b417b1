// SPDX-License-Identifier: AGPL-3.0-or-later
//! Markdown scanner and the renderers for each export target

pub mod markdown;
pub mod plaintext;
pub mod spreadsheet;
pub mod wordprocessor;

pub use markdown::parse;
pub use plaintext::PlainTextRenderer;
pub use spreadsheet::{SheetStyle, SpreadsheetRenderer};
pub use wordprocessor::{WordRenderer, WordStyle};

use crate::ast::{ListItem, ListStyle};
use crate::traits::RenderConfig;
use std::borrow::Cow;

const BULLET: &str = "\u{2022}";

/// Nesting depth and display marker for each item of a list block.
///
/// Ordered items are numbered per depth; a counter restarts whenever a
/// shallower item closes the deeper run.
pub(crate) fn list_markers(
    style: ListStyle,
    items: &[ListItem],
    config: &RenderConfig,
) -> Vec<(usize, String)> {
    let mut counters: Vec<usize> = Vec::new();

    items
        .iter()
        .map(|item| {
            let depth = config.depth(item.indent);
            let marker = match style {
                ListStyle::Unordered => BULLET.to_string(),
                ListStyle::Ordered => {
                    counters.resize(depth + 1, 0);
                    counters[depth] += 1;
                    format!("{}.", counters[depth])
                }
            };
            (depth, marker)
        })
        .collect()
}

/// Escape character data for XML output; newlines are kept as-is.
///
/// Control characters XML 1.0 cannot carry are dropped.
pub(crate) fn xml_text(text: &str) -> Cow<'_, str> {
    if text.chars().any(is_xml_restricted) {
        let cleaned: String = text.chars().filter(|c| !is_xml_restricted(*c)).collect();
        return Cow::Owned(html_escape::encode_text(&cleaned).into_owned());
    }
    html_escape::encode_text(text)
}

fn is_xml_restricted(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}')
}

/// Escape an attribute value for XML output.
pub(crate) fn xml_attr(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}
