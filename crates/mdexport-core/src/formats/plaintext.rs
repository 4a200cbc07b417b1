// SPDX-License-Identifier: AGPL-3.0-or-later
//! Plain text renderer

use crate::ast::{Block, ListItem, ListStyle, TargetFormat};
use crate::formats::list_markers;
use crate::inline::normalize;
use crate::traits::{RenderConfig, Renderer, Result};
use unicode_segmentation::UnicodeSegmentation;

const RULE_WIDTH: usize = 40;

/// Plain text renderer
pub struct PlainTextRenderer;

impl PlainTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn target(&self) -> TargetFormat {
        TargetFormat::PlainText
    }

    fn render(&self, blocks: &[Block], config: &RenderConfig) -> Result<String> {
        let mut output = String::new();

        if let Some(title) = &config.title {
            render_heading(&mut output, 1, title);
            if !blocks.is_empty() {
                output.push_str("\n\n");
            }
        }

        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                output.push_str("\n\n");
            }
            render_block(&mut output, block, config);
        }

        if !output.is_empty() {
            output.push('\n');
        }
        Ok(output)
    }
}

fn render_block(output: &mut String, block: &Block, config: &RenderConfig) {
    match block {
        Block::Heading { level, text, .. } => render_heading(output, *level, &normalize(text)),
        Block::Paragraph { text, .. } => output.push_str(&normalize(text)),
        Block::Table { rows, .. } => render_table(output, rows),
        Block::List { style, items, .. } => render_list(output, *style, items, config),
        Block::Code { text, .. } => {
            let lines: Vec<String> = text
                .split('\n')
                .map(|line| {
                    if line.is_empty() {
                        String::new()
                    } else {
                        format!("    {line}")
                    }
                })
                .collect();
            output.push_str(&lines.join("\n"));
        }
        Block::Rule { .. } => output.push_str(&"-".repeat(RULE_WIDTH)),
    }
}

fn render_heading(output: &mut String, level: u8, text: &str) {
    let underline = if level == 1 { "=" } else { "-" };
    let width = text
        .lines()
        .map(display_width)
        .max()
        .unwrap_or(0)
        .max(1);
    output.push_str(text);
    output.push('\n');
    output.push_str(&underline.repeat(width));
}

fn render_table(output: &mut String, rows: &[Vec<String>]) {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| single_line(&normalize(cell))).collect())
        .collect();

    let columns = cells.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; columns];
    for row in &cells {
        for (col, cell) in row.iter().enumerate() {
            widths[col] = widths[col].max(display_width(cell));
        }
    }

    let mut lines = Vec::with_capacity(cells.len() + 1);
    for (i, row) in cells.iter().enumerate() {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(col, width)| {
                let cell = row.get(col).map(String::as_str).unwrap_or("");
                let pad = width - display_width(cell);
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect();
        lines.push(padded.join(" | ").trim_end().to_string());

        if i == 0 {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(1))).collect();
            lines.push(rule.join("-+-"));
        }
    }
    output.push_str(&lines.join("\n"));
}

fn render_list(output: &mut String, style: ListStyle, items: &[ListItem], config: &RenderConfig) {
    let lines: Vec<String> = list_markers(style, items, config)
        .into_iter()
        .zip(items)
        .map(|((depth, marker), item)| {
            format!(
                "{}{marker} {}",
                "  ".repeat(depth),
                single_line(&normalize(&item.text))
            )
        })
        .collect();
    output.push_str(&lines.join("\n"));
}

fn single_line(text: &str) -> String {
    text.split('\n').collect::<Vec<_>>().join(" ")
}

fn display_width(text: &str) -> usize {
    text.graphemes(true).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::parse;
    use pretty_assertions::assert_eq;

    fn render(markdown: &str) -> String {
        PlainTextRenderer::new()
            .render(&parse(markdown), &RenderConfig::default())
            .unwrap()
    }

    #[test]
    fn test_render_heading_and_paragraph() {
        assert_eq!(
            render("# Title\n\nSome **bold** text"),
            "Title\n=====\n\nSome bold text\n"
        );
    }

    #[test]
    fn test_render_table() {
        let output = render("| Name | Qty |\n|---|---|\n| apple | 3 |\n| fig |");
        assert_eq!(
            output,
            "Name  | Qty\n------+----\napple | 3\nfig   |\n"
        );
    }

    #[test]
    fn test_render_nested_ordered_list() {
        let output = render("1. one\n2. two\n   1. inner");
        assert_eq!(output, "1. one\n2. two\n  1. inner\n");
    }

    #[test]
    fn test_code_is_verbatim() {
        let output = render("```\n**not bold**\n\nx\n```");
        assert_eq!(output, "    **not bold**\n\n    x\n");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render(""), "");
    }

    #[test]
    fn test_title() {
        let config = RenderConfig {
            title: Some("Notes".to_string()),
            ..RenderConfig::default()
        };
        let output = PlainTextRenderer::new()
            .render(&parse("---"), &config)
            .unwrap();
        assert_eq!(output, format!("Notes\n=====\n\n{}\n", "-".repeat(RULE_WIDTH)));
    }
}
