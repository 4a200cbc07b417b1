// SPDX-License-Identifier: AGPL-3.0-or-later
//! Renderer trait, registry and shared error type

use crate::ast::{Block, TargetFormat};
use crate::formats::{PlainTextRenderer, SheetStyle, SpreadsheetRenderer, WordRenderer, WordStyle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;

/// Error type for rendering and export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No renderer registered for {0:?}")]
    UnsupportedTarget(TargetFormat),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Configuration shared by every renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Source indentation columns per list nesting level
    pub indent_width: usize,
    /// Sheet / document title
    pub title: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            title: None,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.indent_width == 0 {
            return Err(ExportError::Config(
                "indent_width must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Nesting depth for a list item with `indent` leading whitespace
    pub fn depth(&self, indent: usize) -> usize {
        indent / self.indent_width.max(1)
    }
}

/// Renderer trait: turn a block sequence into a target document
pub trait Renderer: Send + Sync {
    /// The target format this renderer produces
    fn target(&self) -> TargetFormat;

    /// Render blocks to a string
    fn render(&self, blocks: &[Block], config: &RenderConfig) -> Result<String>;
}

/// Extension trait for writing to a destination (not dyn-compatible)
pub trait RendererExt: Renderer {
    /// Render to a writer
    fn render_writer<W: Write>(
        &self,
        blocks: &[Block],
        writer: &mut W,
        config: &RenderConfig,
    ) -> Result<()> {
        let output = self.render(blocks, config)?;
        writer.write_all(output.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

impl<T: Renderer + ?Sized> RendererExt for T {}

/// Registry of renderers keyed by target
pub struct RendererRegistry {
    renderers: HashMap<TargetFormat, Box<dyn Renderer>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// Registry holding the three built-in renderers
    pub fn with_builtin(sheet: SheetStyle, word: WordStyle) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(SpreadsheetRenderer::new(sheet)));
        registry.register(Box::new(WordRenderer::new(word)));
        registry.register(Box::new(PlainTextRenderer::new()));
        registry
    }

    pub fn register(&mut self, renderer: Box<dyn Renderer>) {
        self.renderers.insert(renderer.target(), renderer);
    }

    pub fn get(&self, target: TargetFormat) -> Option<&dyn Renderer> {
        self.renderers.get(&target).map(|r| r.as_ref())
    }

    /// Render `blocks` with the renderer registered for `target`
    pub fn render(
        &self,
        blocks: &[Block],
        target: TargetFormat,
        config: &RenderConfig,
    ) -> Result<String> {
        let renderer = self
            .get(target)
            .ok_or(ExportError::UnsupportedTarget(target))?;
        config.validate()?;
        renderer.render(blocks, config)
    }

    /// Render `blocks` for `target` into `writer`
    pub fn render_writer<W: Write>(
        &self,
        blocks: &[Block],
        target: TargetFormat,
        writer: &mut W,
        config: &RenderConfig,
    ) -> Result<()> {
        let renderer = self
            .get(target)
            .ok_or(ExportError::UnsupportedTarget(target))?;
        config.validate()?;
        renderer.render_writer(blocks, writer, config)
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_builtin(SheetStyle::default(), WordStyle::default())
    }
}
