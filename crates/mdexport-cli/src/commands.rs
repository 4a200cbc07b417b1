// SPDX-License-Identifier: AGPL-3.0-or-later
//! File-level operations: load, derive the output path, export

use crate::config::ExportConfig;
use anyhow::{bail, Context, Result};
use mdexport_core::{parse, Block, RendererRegistry, TargetFormat};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Read a markdown document from the filesystem
pub fn load_document(path: &Path) -> Result<String> {
    if !path.is_file() {
        bail!("File not found: {}", path.display());
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Read and parse a markdown file; an empty parse result is an error here
pub fn load_blocks(path: &Path) -> Result<Vec<Block>> {
    let text = load_document(path)?;
    let blocks = parse(&text);
    if blocks.is_empty() {
        bail!("Markdown content is empty: {}", path.display());
    }
    tracing::info!(path = %path.display(), blocks = blocks.len(), "parsed input");
    Ok(blocks)
}

/// Input path with its extension replaced by the target's
pub fn output_path(input: &Path, target: TargetFormat) -> PathBuf {
    input.with_extension(target.extension())
}

/// Render `blocks` for `target` and write the result to `output`
pub fn export(
    blocks: &[Block],
    target: TargetFormat,
    output: &Path,
    config: &ExportConfig,
) -> Result<()> {
    config.render.validate().context("Invalid render settings")?;
    let registry = RendererRegistry::with_builtin(config.spreadsheet.clone(), config.word.clone());
    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    registry
        .render_writer(blocks, target, &mut writer, &config.render)
        .with_context(|| format!("Failed to export {} to {}", target.label(), output.display()))?;
    tracing::info!(path = %output.display(), target = ?target, "export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("docs/notes.md"), TargetFormat::Spreadsheet),
            PathBuf::from("docs/notes.xls.xml")
        );
        assert_eq!(
            output_path(Path::new("a.b.md"), TargetFormat::WordProcessor),
            PathBuf::from("a.b.doc.xml")
        );
        assert_eq!(
            output_path(Path::new("README"), TargetFormat::PlainText),
            PathBuf::from("README.txt")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_blocks(&dir.path().join("absent.md")).unwrap_err();
        assert!(err.to_string().starts_with("File not found"));
    }

    #[test]
    fn test_load_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_document(dir.path()).is_err());
    }

    #[test]
    fn test_load_blank_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.md");
        std::fs::write(&path, "\n   \n").unwrap();

        let err = load_blocks(&path).unwrap_err();
        assert!(err.to_string().starts_with("Markdown content is empty"));
    }

    #[test]
    fn test_export_writes_each_target() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.md");
        std::fs::write(&input, "# Notes\n\n| k | v |\n|---|---|\n| a | 1 |\n").unwrap();
        let blocks = load_blocks(&input).unwrap();

        for target in TargetFormat::ALL {
            let output = output_path(&input, target);
            export(&blocks, target, &output, &ExportConfig::default()).unwrap();
            let written = std::fs::read_to_string(&output).unwrap();
            assert!(written.contains("Notes"), "{target:?} output missing heading");
        }
    }

    #[test]
    fn test_export_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocks = parse("# Notes");
        let output = dir.path().join("missing").join("notes.txt");

        let err = export(&blocks, TargetFormat::PlainText, &output, &ExportConfig::default())
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to create"));
    }

    #[test]
    fn test_export_invalid_config_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("notes.txt");
        let mut config = ExportConfig::default();
        config.render.indent_width = 0;

        let err = export(&parse("- a"), TargetFormat::PlainText, &output, &config).unwrap_err();
        assert_eq!(err.to_string(), "Invalid render settings");
        assert!(!output.exists());
    }
}
