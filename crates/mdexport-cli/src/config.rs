// SPDX-License-Identifier: AGPL-3.0-or-later
//! TOML settings for the exporter
//!
//! ```toml
//! [render]
//! indent_width = 4
//!
//! [spreadsheet]
//! body_font = "Noto Sans"
//!
//! [word]
//! code_font = "Fira Code"
//! ```

use anyhow::{Context, Result};
use mdexport_core::{RenderConfig, SheetStyle, WordStyle};
use serde::Deserialize;
use std::path::Path;

/// Every table and field is optional; missing values fall back to defaults
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub render: RenderConfig,
    pub spreadsheet: SheetStyle,
    pub word: WordStyle,
}

impl ExportConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.render.validate()?;
        Ok(config)
    }
}
