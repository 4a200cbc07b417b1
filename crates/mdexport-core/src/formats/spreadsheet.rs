// SPDX-License-Identifier: AGPL-3.0-or-later
//! Spreadsheet renderer producing Excel 2003 XML (SpreadsheetML)
//!
//! Blocks are laid out top to bottom in column A of a single worksheet,
//! with tables spreading across columns. The layout is computed into a
//! sparse grid first and serialized afterwards, so column widths can be
//! derived from the finished grid.

use crate::ast::{Block, ListItem, ListStyle, TargetFormat};
use crate::formats::{list_markers, xml_attr, xml_text};
use crate::inline::normalize;
use crate::traits::{RenderConfig, Renderer, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;
use unicode_segmentation::UnicodeSegmentation;

/// Points per character of column width
const CHAR_WIDTH_PT: f32 = 5.25;

/// Extra characters added to the longest cell in a column
const COLUMN_PADDING: usize = 4;

/// Styling applied by [`SpreadsheetRenderer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetStyle {
    pub sheet_name: String,
    pub body_font: String,
    pub body_size: f32,
    pub code_font: String,
    pub code_size: f32,
    /// Hex RGB colours without the leading `#`
    pub code_fill: String,
    pub table_header_fill: String,
    pub rule_color: String,
    /// Columns painted by heading fills and horizontal rules
    pub fill_columns: usize,
    /// Upper bound for computed column widths, in characters
    pub max_column_width: usize,
}

impl Default for SheetStyle {
    fn default() -> Self {
        Self {
            sheet_name: "Markdown".to_string(),
            body_font: "Yu Gothic".to_string(),
            body_size: 10.0,
            code_font: "Consolas".to_string(),
            code_size: 9.0,
            code_fill: "F2F2F2".to_string(),
            table_header_fill: "D6E4F0".to_string(),
            rule_color: "888888".to_string(),
            fill_columns: 7,
            max_column_width: 60,
        }
    }
}

struct HeadingLook {
    size: f32,
    italic: bool,
    color: Option<&'static str>,
    fill: Option<&'static str>,
}

const HEADINGS: [HeadingLook; 6] = [
    HeadingLook {
        size: 16.0,
        italic: false,
        color: Some("FFFFFF"),
        fill: Some("1F4E79"),
    },
    HeadingLook {
        size: 14.0,
        italic: false,
        color: Some("FFFFFF"),
        fill: Some("2E75B6"),
    },
    HeadingLook {
        size: 12.0,
        italic: false,
        color: Some("1F4E79"),
        fill: Some("9DC3E6"),
    },
    HeadingLook {
        size: 11.0,
        italic: false,
        color: None,
        fill: None,
    },
    HeadingLook {
        size: 10.0,
        italic: false,
        color: None,
        fill: None,
    },
    HeadingLook {
        size: 10.0,
        italic: true,
        color: None,
        fill: None,
    },
];

fn heading_look(level: u8) -> &'static HeadingLook {
    &HEADINGS[usize::from(level.clamp(1, 6)) - 1]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellStyle {
    Heading(u8),
    HeadingFill(u8),
    TableHeader,
    TableBody,
    Body,
    Code,
    Rule,
}

impl CellStyle {
    fn id(&self) -> String {
        match self {
            CellStyle::Heading(level) => format!("h{level}"),
            CellStyle::HeadingFill(level) => format!("h{level}fill"),
            CellStyle::TableHeader => "th".to_string(),
            CellStyle::TableBody => "td".to_string(),
            CellStyle::Body => "body".to_string(),
            CellStyle::Code => "code".to_string(),
            CellStyle::Rule => "rule".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SheetCell {
    style: CellStyle,
    text: Option<String>,
}

#[derive(Debug, Default)]
struct SheetRow {
    height: Option<f32>,
    cells: BTreeMap<usize, SheetCell>,
}

/// Sparse 1-based grid
#[derive(Debug, Default)]
struct SheetLayout {
    rows: BTreeMap<usize, SheetRow>,
}

impl SheetLayout {
    #[cfg(test)]
    fn cell(&self, row: usize, col: usize) -> Option<&SheetCell> {
        self.rows.get(&row)?.cells.get(&col)
    }

    /// Width in characters for every column holding at least one cell
    fn column_widths(&self, max_width: usize) -> BTreeMap<usize, usize> {
        let mut longest: BTreeMap<usize, usize> = BTreeMap::new();
        for row in self.rows.values() {
            for (col, cell) in &row.cells {
                let len = cell
                    .text
                    .as_deref()
                    .map(|text| {
                        text.lines()
                            .map(|l| l.graphemes(true).count())
                            .max()
                            .unwrap_or(0)
                    })
                    .unwrap_or(0);
                let entry = longest.entry(*col).or_insert(0);
                *entry = (*entry).max(len);
            }
        }
        longest
            .into_iter()
            .map(|(col, len)| (col, (len + COLUMN_PADDING).min(max_width)))
            .collect()
    }
}

struct LayoutBuilder<'a> {
    layout: SheetLayout,
    row: usize,
    config: &'a RenderConfig,
    fill_columns: usize,
}

impl<'a> LayoutBuilder<'a> {
    fn new(config: &'a RenderConfig, style: &SheetStyle) -> Self {
        Self {
            layout: SheetLayout::default(),
            row: 1,
            config,
            fill_columns: style.fill_columns.max(1),
        }
    }

    fn set(&mut self, col: usize, style: CellStyle, text: Option<String>) {
        self.layout
            .rows
            .entry(self.row)
            .or_default()
            .cells
            .insert(col, SheetCell { style, text });
    }

    fn push(&mut self, block: &Block) {
        match block {
            Block::Heading { level, text, .. } => self.heading(*level, text),
            Block::Table { rows, .. } => self.table(rows),
            Block::List { style, items, .. } => self.list(*style, items),
            Block::Code { text, .. } => self.code(text),
            Block::Rule { .. } => self.rule(),
            Block::Paragraph { text, .. } => {
                self.set(1, CellStyle::Body, Some(normalize(text)));
                self.row += 1;
            }
        }
    }

    fn heading(&mut self, level: u8, text: &str) {
        let level = level.clamp(1, 6);
        self.set(1, CellStyle::Heading(level), Some(normalize(text)));
        if heading_look(level).fill.is_some() {
            for col in 2..=self.fill_columns {
                self.set(col, CellStyle::HeadingFill(level), None);
            }
        }
        let height = if level <= 2 { 28.0 } else { 22.0 };
        self.layout.rows.entry(self.row).or_default().height = Some(height);
        self.row += 1;
    }

    fn table(&mut self, rows: &[Vec<String>]) {
        if rows.is_empty() {
            return;
        }
        for (i, cells) in rows.iter().enumerate() {
            let style = if i == 0 {
                CellStyle::TableHeader
            } else {
                CellStyle::TableBody
            };
            for (col, cell) in cells.iter().enumerate() {
                self.set(col + 1, style, Some(normalize(cell)));
            }
            self.row += 1;
        }
        self.row += 1;
    }

    fn list(&mut self, style: ListStyle, items: &[ListItem]) {
        let markers = list_markers(style, items, self.config);
        for ((depth, marker), item) in markers.into_iter().zip(items) {
            let text = format!("{}{marker} {}", "  ".repeat(depth), normalize(&item.text));
            self.set(1, CellStyle::Body, Some(text));
            self.row += 1;
        }
        self.row += 1;
    }

    fn code(&mut self, text: &str) {
        for line in text.split('\n') {
            self.set(1, CellStyle::Code, Some(line.to_string()));
            self.row += 1;
        }
        self.row += 1;
    }

    fn rule(&mut self) {
        for col in 1..=self.fill_columns {
            self.set(col, CellStyle::Rule, None);
        }
        self.row += 1;
    }

    fn finish(self) -> SheetLayout {
        self.layout
    }
}

/// Renders blocks as an Excel 2003 XML workbook with one worksheet
pub struct SpreadsheetRenderer {
    style: SheetStyle,
}

impl SpreadsheetRenderer {
    pub fn new(style: SheetStyle) -> Self {
        Self { style }
    }

    fn layout(&self, blocks: &[Block], config: &RenderConfig) -> SheetLayout {
        let mut builder = LayoutBuilder::new(config, &self.style);
        for block in blocks {
            builder.push(block);
        }
        builder.finish()
    }

    fn write_styles(&self, out: &mut String) -> std::fmt::Result {
        let s = &self.style;
        let body_font = xml_attr(&s.body_font);
        let code_font = xml_attr(&s.code_font);
        let thin_borders = ["Left", "Right", "Top", "Bottom"]
            .iter()
            .map(|pos| {
                format!(r#"<Border ss:Position="{pos}" ss:LineStyle="Continuous" ss:Weight="1"/>"#)
            })
            .collect::<String>();

        writeln!(out, " <Styles>")?;
        writeln!(
            out,
            r#"  <Style ss:ID="Default" ss:Name="Normal"><Font ss:FontName="{body_font}" ss:Size="{}"/></Style>"#,
            s.body_size
        )?;

        for level in 1..=6u8 {
            let look = heading_look(level);
            write!(
                out,
                r#"  <Style ss:ID="h{level}"><Alignment ss:Vertical="Center"/><Font ss:FontName="{body_font}" ss:Size="{}" ss:Bold="1""#,
                look.size
            )?;
            if look.italic {
                write!(out, r#" ss:Italic="1""#)?;
            }
            if let Some(color) = look.color {
                write!(out, r##" ss:Color="#{color}""##)?;
            }
            write!(out, "/>")?;
            if let Some(fill) = look.fill {
                write!(out, r##"<Interior ss:Color="#{fill}" ss:Pattern="Solid"/>"##)?;
            }
            writeln!(out, "</Style>")?;

            if let Some(fill) = look.fill {
                writeln!(
                    out,
                    r##"  <Style ss:ID="h{level}fill"><Interior ss:Color="#{fill}" ss:Pattern="Solid"/></Style>"##
                )?;
            }
        }

        writeln!(
            out,
            r##"  <Style ss:ID="th"><Alignment ss:Vertical="Center" ss:WrapText="1"/><Borders>{thin_borders}</Borders><Font ss:FontName="{body_font}" ss:Size="{}" ss:Bold="1"/><Interior ss:Color="#{}" ss:Pattern="Solid"/></Style>"##,
            s.body_size,
            xml_attr(&s.table_header_fill)
        )?;
        writeln!(
            out,
            r#"  <Style ss:ID="td"><Alignment ss:Vertical="Center" ss:WrapText="1"/><Borders>{thin_borders}</Borders><Font ss:FontName="{body_font}" ss:Size="{}"/></Style>"#,
            s.body_size
        )?;
        writeln!(
            out,
            r#"  <Style ss:ID="body"><Font ss:FontName="{body_font}" ss:Size="{}"/></Style>"#,
            s.body_size
        )?;
        writeln!(
            out,
            r##"  <Style ss:ID="code"><Font ss:FontName="{code_font}" ss:Size="{}"/><Interior ss:Color="#{}" ss:Pattern="Solid"/></Style>"##,
            s.code_size,
            xml_attr(&s.code_fill)
        )?;
        writeln!(
            out,
            r##"  <Style ss:ID="rule"><Borders><Border ss:Position="Bottom" ss:LineStyle="Continuous" ss:Weight="2" ss:Color="#{}"/></Borders></Style>"##,
            xml_attr(&s.rule_color)
        )?;
        writeln!(out, " </Styles>")
    }

    fn write_table(&self, out: &mut String, layout: &SheetLayout) -> std::fmt::Result {
        writeln!(out, "  <Table>")?;
        for (col, width) in layout.column_widths(self.style.max_column_width) {
            writeln!(
                out,
                r#"   <Column ss:Index="{col}" ss:Width="{:.2}"/>"#,
                width as f32 * CHAR_WIDTH_PT
            )?;
        }

        for (index, row) in &layout.rows {
            write!(out, r#"   <Row ss:Index="{index}""#)?;
            if let Some(height) = row.height {
                write!(out, r#" ss:Height="{height}""#)?;
            }
            writeln!(out, ">")?;
            for (col, cell) in &row.cells {
                let style = cell.style.id();
                match &cell.text {
                    Some(text) => writeln!(
                        out,
                        r#"    <Cell ss:Index="{col}" ss:StyleID="{style}"><Data ss:Type="String">{}</Data></Cell>"#,
                        cell_data(text)
                    )?,
                    None => writeln!(out, r#"    <Cell ss:Index="{col}" ss:StyleID="{style}"/>"#)?,
                }
            }
            writeln!(out, "   </Row>")?;
        }
        writeln!(out, "  </Table>")
    }
}

impl Default for SpreadsheetRenderer {
    fn default() -> Self {
        Self::new(SheetStyle::default())
    }
}

impl Renderer for SpreadsheetRenderer {
    fn target(&self) -> TargetFormat {
        TargetFormat::Spreadsheet
    }

    fn render(&self, blocks: &[Block], config: &RenderConfig) -> Result<String> {
        let layout = self.layout(blocks, config);
        let name = config.title.as_deref().unwrap_or(&self.style.sheet_name);

        let mut out = String::new();
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(out, r#"<?mso-application progid="Excel.Sheet"?>"#)?;
        writeln!(
            out,
            r#"<Workbook xmlns="urn:schemas-microsoft-com:office:spreadsheet" xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:x="urn:schemas-microsoft-com:office:excel" xmlns:ss="urn:schemas-microsoft-com:office:spreadsheet">"#
        )?;
        self.write_styles(&mut out)?;
        writeln!(out, r#" <Worksheet ss:Name="{}">"#, xml_attr(name))?;
        self.write_table(&mut out, &layout)?;
        writeln!(out, " </Worksheet>")?;
        writeln!(out, "</Workbook>")?;

        tracing::debug!(rows = layout.rows.len(), "rendered spreadsheet");
        Ok(out)
    }
}

/// Cell text with line breaks kept as character references
fn cell_data(text: &str) -> String {
    xml_text(text).replace('\n', "&#10;").replace('\r', "&#13;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::parse;
    use pretty_assertions::assert_eq;

    fn layout(markdown: &str) -> SheetLayout {
        SpreadsheetRenderer::default().layout(&parse(markdown), &RenderConfig::default())
    }

    fn text_at(layout: &SheetLayout, row: usize, col: usize) -> Option<&str> {
        layout.cell(row, col)?.text.as_deref()
    }

    #[test]
    fn test_heading_row_fill_and_height() {
        let layout = layout("# Top\n### Third\n#### Fourth");

        assert_eq!(text_at(&layout, 1, 1), Some("Top"));
        assert_eq!(layout.cell(1, 1).unwrap().style, CellStyle::Heading(1));
        assert_eq!(layout.cell(1, 7).unwrap().style, CellStyle::HeadingFill(1));
        assert!(layout.cell(1, 8).is_none());
        assert_eq!(layout.rows[&1].height, Some(28.0));

        assert_eq!(layout.cell(2, 7).unwrap().style, CellStyle::HeadingFill(3));
        assert_eq!(layout.rows[&2].height, Some(22.0));

        // level 4 has no fill
        assert!(layout.cell(3, 2).is_none());
    }

    #[test]
    fn test_table_rows_then_blank_row() {
        let layout = layout("| A | **B** |\n|---|---|\n| 1 | 2<br>3 |\n\nafter");

        assert_eq!(layout.cell(1, 1).unwrap().style, CellStyle::TableHeader);
        assert_eq!(text_at(&layout, 1, 2), Some("B"));
        assert_eq!(layout.cell(2, 1).unwrap().style, CellStyle::TableBody);
        assert_eq!(text_at(&layout, 2, 2), Some("2\n3"));
        assert!(layout.rows.get(&3).is_none());
        assert_eq!(text_at(&layout, 4, 1), Some("after"));
    }

    #[test]
    fn test_list_and_code_rows() {
        let layout = layout("- a\n  - *b*\n```\nx = 1\n\ny\n```\ntext");

        assert_eq!(text_at(&layout, 1, 1), Some("\u{2022} a"));
        assert_eq!(text_at(&layout, 2, 1), Some("  \u{2022} b"));
        // blank row 3
        assert_eq!(text_at(&layout, 4, 1), Some("x = 1"));
        assert_eq!(text_at(&layout, 5, 1), Some(""));
        assert_eq!(layout.cell(6, 1).unwrap().style, CellStyle::Code);
        // blank row 7
        assert_eq!(text_at(&layout, 8, 1), Some("text"));
    }

    #[test]
    fn test_rule_spans_fill_columns() {
        let layout = layout("***");
        for col in 1..=7 {
            assert_eq!(layout.cell(1, col).unwrap().style, CellStyle::Rule);
        }
    }

    #[test]
    fn test_column_widths_are_capped() {
        let long = "x".repeat(100);
        let layout = layout(&format!("{long}\n\n| a | bb |\n|---|---|"));
        let widths = layout.column_widths(60);
        assert_eq!(widths[&1], 60);
        assert_eq!(widths[&2], 6);
    }

    #[test]
    fn test_render_workbook_xml() {
        let renderer = SpreadsheetRenderer::default();
        let config = RenderConfig {
            title: Some("Q&A".to_string()),
            ..RenderConfig::default()
        };
        let blocks = parse("# R&D\n\na <b>\n\n```\nif a < b {}\n```");
        let xml = renderer.render(&blocks, &config).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<Worksheet ss:Name="Q&amp;A">"#));
        assert!(xml.contains(r#"<Row ss:Index="1" ss:Height="28">"#));
        assert!(xml.contains(r#"<Data ss:Type="String">R&amp;D</Data>"#));
        assert!(xml.contains(r#"<Data ss:Type="String">a &lt;b&gt;</Data>"#));
        assert!(xml.contains(r#"<Data ss:Type="String">if a &lt; b {}</Data>"#));
        assert!(xml.contains(r#"<Style ss:ID="h1fill">"#));
        assert!(xml.trim_end().ends_with("</Workbook>"));
    }

    #[test]
    fn test_cell_data_line_breaks() {
        assert_eq!(cell_data("a\nb"), "a&#10;b");
    }
}
