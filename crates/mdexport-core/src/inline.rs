// SPDX-License-Identifier: AGPL-3.0-or-later
//! Inline span normalizer
//!
//! Strips bold, italic, inline code, links and anchor tags down to their
//! inner text and turns HTML `<br>` tags into `\n`. Each rule runs once over
//! the whole string, in a fixed order; there is no re-scan after a rule fires.

use regex::Regex;
use std::sync::LazyLock;

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

/// Substitution rules applied after line breaks, in order.
static SPAN_RULES: LazyLock<[Regex; 7]> = LazyLock::new(|| {
    [
        // bold
        Regex::new(r"\*\*(.+?)\*\*").unwrap(),
        Regex::new(r"__(.+?)__").unwrap(),
        // italic
        Regex::new(r"\*(.+?)\*").unwrap(),
        Regex::new(r"_(.+?)_").unwrap(),
        // inline code
        Regex::new(r"`(.+?)`").unwrap(),
        // [label](target)
        Regex::new(r"\[(.+?)\]\(.+?\)").unwrap(),
        // <a href=...>inner</a>
        Regex::new(r"(?i)<a\s[^>]*?>(.*?)</a>").unwrap(),
    ]
});

/// Reduce inline markdown in `text` to plain text.
///
/// Newlines produced from `<br>` tags are kept as literal `\n` so renderers
/// can split cells and paragraphs on them.
pub fn normalize(text: &str) -> String {
    let mut out = LINE_BREAK.replace_all(text, "\n").into_owned();
    for rule in SPAN_RULES.iter() {
        out = rule.replace_all(&out, "${1}").into_owned();
    }
    out
}
