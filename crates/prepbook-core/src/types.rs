// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Prepbook worksheet formatter.

use serde::{Deserialize, Serialize};

use crate::error::PrepbookError;

/// Kind of worksheet being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetKind {
    /// Multiple-choice question sheet.
    Mcq,
    /// Constructed (creative) question sheet.
    Cq,
}

impl SheetKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mcq => "MCQ",
            Self::Cq => "CQ",
        }
    }
}

/// Tabular export formats produced alongside the reformatted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Office Open XML spreadsheet.
    Xlsx,
    /// Comma separated values, UTF-8 with byte order mark.
    Csv,
    /// Pretty-printed array of objects.
    Json,
}

impl ExportFormat {
    /// File extension (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Infer the format from a file extension or a bare keyword.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = PrepbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s)
            .ok_or_else(|| PrepbookError::Config(format!("unknown export format `{s}`")))
    }
}

/// How equations are rendered when a paragraph is flattened to text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathRendering {
    /// `$\frac{a}{b}$` style LaTeX.
    #[default]
    Latex,
    /// Mathematical italic code points, `(a)/(b)` fractions.
    Unicode,
    /// Bare text of the equation's runs.
    Plain,
}

impl std::str::FromStr for MathRendering {
    type Err = PrepbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "latex" => Ok(Self::Latex),
            "unicode" => Ok(Self::Unicode),
            "plain" | "text" => Ok(Self::Plain),
            other => Err(PrepbookError::Config(format!(
                "unknown math rendering `{other}`"
            ))),
        }
    }
}

/// Arrangement of the four options of an MCQ in the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionLayout {
    /// All four options on one tab-separated line.
    OneLine,
    /// Two lines of two options.
    TwoLine,
    /// One option per line.
    FourLine,
}

/// MCQ categories used by the Bangla secondary curriculum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    /// Plain single-stem question.
    #[default]
    #[serde(rename = "সাধারণ")]
    General,
    /// Multiple-completion question with roman-numeral statements.
    #[serde(rename = "বহুপদী সমাপ্তিসূচক")]
    MultipleCompletion,
    /// Question attached to a shared stimulus passage.
    #[serde(rename = "উদ্দীপকভিত্তিক")]
    StemBased,
}

impl QuestionKind {
    /// Bangla label written to exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::General => "সাধারণ",
            Self::MultipleCompletion => "বহুপদী সমাপ্তিসূচক",
            Self::StemBased => "উদ্দীপকভিত্তিক",
        }
    }
}

/// 24-bit RGB colour stored as a hex string (`"088565"`) in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Uppercase hex without a leading `#`, as WordprocessingML expects.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl TryFrom<String> for Rgb {
    type Error = PrepbookError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(PrepbookError::Config(format!("invalid colour `{value}`")));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|err| PrepbookError::Config(format!("invalid colour `{value}`: {err}")))
        };
        Ok(Self(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.hex()
    }
}
