// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Formatting configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PrepbookError, Result};
use crate::types::{ExportFormat, MathRendering, Rgb};

/// Page geometry of the generated document, in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub width_in: f32,
    pub height_in: f32,
    pub margin_left_in: f32,
    pub margin_right_in: f32,
    pub margin_top_in: f32,
    pub margin_bottom_in: f32,
    /// Number of text columns.
    pub columns: u32,
    /// Gap between columns in twentieths of a point.
    pub column_space_twips: u32,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            width_in: 8.5,
            height_in: 10.65,
            margin_left_in: 0.8,
            margin_right_in: 0.6,
            margin_top_in: 0.5,
            margin_bottom_in: 0.3,
            columns: 2,
            column_space_twips: 210,
        }
    }
}

/// Thresholds that decide how MCQ options are laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutThresholds {
    /// Options at most this long fit four to a line.
    pub short_option_chars: usize,
    /// Options at most this long fit two to a line.
    pub medium_option_chars: usize,
    /// Weight of an equation whose visible text is short.
    pub equation_weight_short: usize,
    /// Weight of an equation whose visible text is medium.
    pub equation_weight_medium: usize,
    /// Weight of any longer equation.
    pub equation_weight_long: usize,
}

impl Default for LayoutThresholds {
    fn default() -> Self {
        Self {
            short_option_chars: 4,
            medium_option_chars: 18,
            equation_weight_short: 4,
            equation_weight_medium: 12,
            equation_weight_long: 1000,
        }
    }
}

/// Persistent formatting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Font applied to every run, including the East Asian and complex script slots.
    pub font_name: String,
    /// Body font size in points.
    pub font_size_pt: f32,
    /// Colour of the answer label and the CQ solution header.
    pub accent_color: Rgb,
    pub page: PageSetup,
    /// Tab stops (inches) for four options on one line.
    pub tab_stops_one_line_in: Vec<f32>,
    /// Tab stops (inches) for two options per line.
    pub tab_stops_two_line_in: Vec<f32>,
    pub layout: LayoutThresholds,
    /// Space after each question block, in points.
    pub block_spacing_pt: f32,
    /// Exports written when the caller does not choose any.
    pub default_exports: Vec<ExportFormat>,
    /// Equation rendering in exports.
    pub math_rendering: MathRendering,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            font_name: "Tiro Bangla".into(),
            font_size_pt: 11.0,
            accent_color: Rgb(0x08, 0x85, 0x65),
            page: PageSetup::default(),
            tab_stops_one_line_in: vec![0.8, 1.6, 2.4],
            tab_stops_two_line_in: vec![1.6],
            layout: LayoutThresholds::default(),
            block_spacing_pt: 8.0,
            default_exports: vec![ExportFormat::Xlsx, ExportFormat::Csv],
            math_rendering: MathRendering::Latex,
        }
    }
}

impl FormatConfig {
    /// Load a configuration file. Missing keys fall back to the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load `path` when it exists, otherwise return the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Write the configuration as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject values that would produce a broken document.
    pub fn validate(&self) -> Result<()> {
        if self.font_name.trim().is_empty() {
            return Err(PrepbookError::Config("font_name must not be empty".into()));
        }
        if self.font_size_pt.is_nan() || self.font_size_pt <= 0.0 {
            return Err(PrepbookError::Config("font_size_pt must be positive".into()));
        }
        if self.page.columns == 0 {
            return Err(PrepbookError::Config("page.columns must be at least 1".into()));
        }
        if self.layout.short_option_chars > self.layout.medium_option_chars {
            return Err(PrepbookError::Config(
                "layout.short_option_chars must not exceed layout.medium_option_chars".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = FormatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.accent_color.hex(), "088565");
        assert_eq!(config.page.columns, 2);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "font_size_pt": 12.0, "layout": { "medium_option_chars": 20 } }"#)
            .unwrap();

        let config = FormatConfig::load(&path).unwrap();
        assert_eq!(config.font_size_pt, 12.0);
        assert_eq!(config.layout.medium_option_chars, 20);
        assert_eq!(config.layout.short_option_chars, 4);
        assert_eq!(config.font_name, "Tiro Bangla");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FormatConfig::load_or_default(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, FormatConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = FormatConfig::default();
        config.default_exports = vec![ExportFormat::Json];
        config.save(&path).unwrap();

        assert_eq!(FormatConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let mut config = FormatConfig::default();
        config.layout.short_option_chars = 30;
        assert!(matches!(config.validate(), Err(PrepbookError::Config(_))));
    }
}
