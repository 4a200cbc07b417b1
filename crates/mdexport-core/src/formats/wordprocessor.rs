// SPDX-License-Identifier: AGPL-3.0-or-later
//! Word-processor renderer producing Word 2003 XML (WordprocessingML)

use crate::ast::{Block, ListItem, ListStyle, TargetFormat};
use crate::formats::{list_markers, xml_attr, xml_text};
use crate::inline::normalize;
use crate::traits::{RenderConfig, Renderer, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

const WORDML_NS: &str = "http://schemas.microsoft.com/office/word/2003/wordml";
const OFFICE_NS: &str = "urn:schemas-microsoft-com:office:office";

/// Deepest heading style emitted; deeper headings reuse it
const MAX_HEADING_STYLE: u8 = 4;

/// (size in points, italic, colour) for Heading1..Heading4
const HEADING_STYLES: [(f32, bool, &str); 4] = [
    (14.0, false, "365F91"),
    (13.0, false, "4F81BD"),
    (11.0, false, "4F81BD"),
    (11.0, true, "4F81BD"),
];

/// Styling applied by [`WordRenderer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordStyle {
    pub font: String,
    pub font_size: f32,
    pub code_font: String,
    pub code_size: f32,
    pub table_size: f32,
    /// Hex RGB colours without the leading `#`
    pub code_fill: String,
    pub table_header_fill: String,
    pub rule_color: String,
    /// Left indent per list nesting level, in twentieths of a point
    pub list_indent_twips: u32,
}

impl Default for WordStyle {
    fn default() -> Self {
        Self {
            font: "Yu Gothic".to_string(),
            font_size: 10.0,
            code_font: "Consolas".to_string(),
            code_size: 9.0,
            table_size: 9.0,
            code_fill: "F2F2F2".to_string(),
            table_header_fill: "D6E4F0".to_string(),
            rule_color: "888888".to_string(),
            list_indent_twips: 360,
        }
    }
}

/// Font size in the half-point units WordprocessingML expects
fn half_points(size: f32) -> u32 {
    (size * 2.0).round() as u32
}

/// Renders blocks as a single Word 2003 XML document
pub struct WordRenderer {
    style: WordStyle,
}

impl WordRenderer {
    pub fn new(style: WordStyle) -> Self {
        Self { style }
    }

    fn write_styles(&self, out: &mut String) -> fmt::Result {
        let font = xml_attr(&self.style.font);
        write!(
            out,
            r#"<w:fonts><w:defaultFonts w:ascii="{font}" w:fareast="{font}" w:h-ansi="{font}" w:cs="{font}"/></w:fonts>"#
        )?;
        out.push_str("<w:styles>");
        write!(
            out,
            r#"<w:style w:type="paragraph" w:default="on" w:styleId="Normal"><w:name w:val="Normal"/><w:rPr><w:rFonts w:ascii="{font}" w:fareast="{font}" w:h-ansi="{font}"/><w:sz w:val="{}"/></w:rPr></w:style>"#,
            half_points(self.style.font_size)
        )?;
        for (i, (size, italic, color)) in HEADING_STYLES.iter().enumerate() {
            let level = i + 1;
            write!(
                out,
                r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="60"/><w:outlineLvl w:val="{}"/></w:pPr><w:rPr><w:b/>"#,
                level - 1
            )?;
            if *italic {
                out.push_str("<w:i/>");
            }
            write!(
                out,
                r#"<w:color w:val="{color}"/><w:sz w:val="{}"/></w:rPr></w:style>"#,
                half_points(*size)
            )?;
        }
        out.push_str(
            r#"<w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:tblPr><w:tblBorders>"#,
        );
        for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            write!(
                out,
                r#"<w:{edge} w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#
            )?;
        }
        out.push_str("</w:tblBorders></w:tblPr></w:style>");
        out.push_str("</w:styles>");
        Ok(())
    }

    fn write_block(&self, out: &mut String, block: &Block, config: &RenderConfig) -> fmt::Result {
        match block {
            Block::Heading { level, text, .. } => {
                let level = (*level).clamp(1, MAX_HEADING_STYLE);
                write!(out, r#"<w:p><w:pPr><w:pStyle w:val="Heading{level}"/></w:pPr>"#)?;
                write_run(out, &normalize(text), "")?;
                out.push_str("</w:p>");
            }
            Block::Paragraph { text, .. } => {
                out.push_str("<w:p>");
                write_run(out, &normalize(text), "")?;
                out.push_str("</w:p>");
            }
            Block::Table { rows, .. } => self.write_table(out, rows)?,
            Block::List { style, items, .. } => self.write_list(out, *style, items, config)?,
            Block::Code { text, .. } => {
                write!(
                    out,
                    r#"<w:p><w:pPr><w:shd w:val="clear" w:color="auto" w:fill="{}"/></w:pPr>"#,
                    xml_attr(&self.style.code_fill)
                )?;
                let font = xml_attr(&self.style.code_font);
                let props = format!(
                    r#"<w:rPr><w:rFonts w:ascii="{font}" w:h-ansi="{font}" w:cs="{font}"/><w:sz w:val="{}"/></w:rPr>"#,
                    half_points(self.style.code_size)
                );
                write_run(out, text, &props)?;
                out.push_str("</w:p>");
            }
            Block::Rule { .. } => {
                write!(
                    out,
                    r#"<w:p><w:pPr><w:pBdr><w:bottom w:val="single" w:sz="6" w:space="1" w:color="{}"/></w:pBdr></w:pPr></w:p>"#,
                    xml_attr(&self.style.rule_color)
                )?;
            }
        }
        Ok(())
    }

    fn write_table(&self, out: &mut String, rows: &[Vec<String>]) -> fmt::Result {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return Ok(());
        }

        out.push_str(
            r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="5000" w:type="pct"/></w:tblPr><w:tblGrid>"#,
        );
        for _ in 0..columns {
            out.push_str("<w:gridCol/>");
        }
        out.push_str("</w:tblGrid>");

        let size = half_points(self.style.table_size);
        for (i, row) in rows.iter().enumerate() {
            let header = i == 0;
            out.push_str("<w:tr>");
            for col in 0..columns {
                out.push_str("<w:tc><w:tcPr>");
                out.push_str(r#"<w:tcW w:w="0" w:type="auto"/>"#);
                if header {
                    write!(
                        out,
                        r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                        xml_attr(&self.style.table_header_fill)
                    )?;
                }
                out.push_str("</w:tcPr>");

                let text = row.get(col).map(|cell| normalize(cell)).unwrap_or_default();
                let props = if header {
                    format!(r#"<w:rPr><w:b/><w:sz w:val="{size}"/></w:rPr>"#)
                } else {
                    format!(r#"<w:rPr><w:sz w:val="{size}"/></w:rPr>"#)
                };
                // one paragraph per line inside the cell
                for line in text.split('\n') {
                    out.push_str("<w:p>");
                    write_run(out, line, &props)?;
                    out.push_str("</w:p>");
                }
                out.push_str("</w:tc>");
            }
            out.push_str("</w:tr>");
        }
        // spacing after table
        out.push_str("</w:tbl><w:p/>");
        Ok(())
    }

    fn write_list(
        &self,
        out: &mut String,
        style: ListStyle,
        items: &[ListItem],
        config: &RenderConfig,
    ) -> fmt::Result {
        let markers = list_markers(style, items, config);
        for ((depth, marker), item) in markers.into_iter().zip(items) {
            let indent = self.style.list_indent_twips as usize * depth;
            write!(out, r#"<w:p><w:pPr><w:ind w:left="{indent}"/></w:pPr>"#)?;
            write_run(out, &format!("{marker} {}", normalize(&item.text)), "")?;
            out.push_str("</w:p>");
        }
        Ok(())
    }
}

impl Default for WordRenderer {
    fn default() -> Self {
        Self::new(WordStyle::default())
    }
}

impl Renderer for WordRenderer {
    fn target(&self) -> TargetFormat {
        TargetFormat::WordProcessor
    }

    fn render(&self, blocks: &[Block], config: &RenderConfig) -> Result<String> {
        let mut out = String::new();
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#)?;
        writeln!(out, r#"<?mso-application progid="Word.Document"?>"#)?;
        write!(
            out,
            r#"<w:wordDocument xmlns:w="{WORDML_NS}" xmlns:o="{OFFICE_NS}" xml:space="preserve">"#
        )?;
        if let Some(title) = &config.title {
            write!(
                out,
                "<o:DocumentProperties><o:Title>{}</o:Title></o:DocumentProperties>",
                xml_text(title)
            )?;
        }
        self.write_styles(&mut out)?;

        out.push_str("<w:body>");
        for block in blocks {
            self.write_block(&mut out, block, config)?;
        }
        out.push_str("<w:sectPr/></w:body></w:wordDocument>\n");

        tracing::debug!(blocks = blocks.len(), bytes = out.len(), "rendered word document");
        Ok(out)
    }
}

/// A run whose `\n` markers become line breaks
fn write_run(out: &mut String, text: &str, props: &str) -> fmt::Result {
    write!(out, "<w:r>{props}")?;
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<w:br/>");
        }
        write!(out, "<w:t>{}</w:t>", xml_text(line))?;
    }
    out.push_str("</w:r>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::parse;

    fn render(markdown: &str) -> String {
        WordRenderer::default()
            .render(&parse(markdown), &RenderConfig::default())
            .unwrap()
    }

    fn body(xml: &str) -> &str {
        let start = xml.find("<w:body>").expect("body start") + "<w:body>".len();
        let end = xml.find("<w:sectPr/>").expect("body end");
        &xml[start..end]
    }

    #[test]
    fn test_heading_levels_capped() {
        let xml = render("# One\n###### Six");
        assert_eq!(
            body(&xml),
            concat!(
                r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>One</w:t></w:r></w:p>"#,
                r#"<w:p><w:pPr><w:pStyle w:val="Heading4"/></w:pPr><w:r><w:t>Six</w:t></w:r></w:p>"#,
            )
        );
    }

    #[test]
    fn test_paragraph_line_breaks() {
        let xml = render("first<br>**second**");
        assert_eq!(
            body(&xml),
            "<w:p><w:r><w:t>first</w:t><w:br/><w:t>second</w:t></w:r></w:p>"
        );
    }

    #[test]
    fn test_table_is_padded_and_header_shaded() {
        let xml = render("| A | B |\n|---|---|\n| only |");
        let body = body(&xml);

        assert_eq!(body.matches("<w:gridCol/>").count(), 2);
        assert_eq!(body.matches("<w:tc>").count(), 4);
        assert_eq!(body.matches(r#"w:fill="D6E4F0""#).count(), 2);
        assert_eq!(body.matches("<w:b/>").count(), 2);
        assert!(body.contains("<w:t>only</w:t>"));
        assert!(body.ends_with("</w:tbl><w:p/>"));
    }

    #[test]
    fn test_table_cell_newlines_become_paragraphs() {
        let xml = render("| A |\n|---|\n| x<br/>y |");
        let body = body(&xml);
        assert!(body.contains(
            r#"<w:p><w:r><w:rPr><w:sz w:val="18"/></w:rPr><w:t>x</w:t></w:r></w:p><w:p><w:r><w:rPr><w:sz w:val="18"/></w:rPr><w:t>y</w:t></w:r></w:p>"#
        ));
    }

    #[test]
    fn test_list_indent_and_markers() {
        let xml = render("1. a\n   1. b");
        assert_eq!(
            body(&xml),
            concat!(
                r#"<w:p><w:pPr><w:ind w:left="0"/></w:pPr><w:r><w:t>1. a</w:t></w:r></w:p>"#,
                r#"<w:p><w:pPr><w:ind w:left="360"/></w:pPr><w:r><w:t>1. b</w:t></w:r></w:p>"#,
            )
        );
    }

    #[test]
    fn test_code_block_verbatim_and_shaded() {
        let xml = render("```\n**x** < y\n\nz\n```");
        let body = body(&xml);
        assert!(body.starts_with(r#"<w:p><w:pPr><w:shd w:val="clear" w:color="auto" w:fill="F2F2F2"/></w:pPr>"#));
        assert!(body.contains(r#"<w:rFonts w:ascii="Consolas""#));
        assert!(body.contains("<w:t>**x** &lt; y</w:t><w:br/><w:t></w:t><w:br/><w:t>z</w:t>"));
    }

    #[test]
    fn test_rule_border() {
        let xml = render("___");
        assert!(body(&xml).contains(r#"<w:bottom w:val="single" w:sz="6" w:space="1" w:color="888888"/>"#));
    }

    #[test]
    fn test_document_envelope() {
        let config = RenderConfig {
            title: Some("Plan <v2>".to_string()),
            ..RenderConfig::default()
        };
        let xml = WordRenderer::default().render(&[], &config).unwrap();
        assert!(xml.contains(r#"<?mso-application progid="Word.Document"?>"#));
        assert!(xml.contains("<o:Title>Plan &lt;v2&gt;</o:Title>"));
        assert!(xml.contains(r#"<w:style w:type="paragraph" w:styleId="Heading4">"#));
        assert!(xml.ends_with("</w:wordDocument>\n"));
    }

    #[test]
    fn test_half_points() {
        assert_eq!(half_points(10.0), 20);
        assert_eq!(half_points(10.5), 21);
    }
}
