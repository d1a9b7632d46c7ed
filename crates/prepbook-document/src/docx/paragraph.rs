// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source paragraphs as an ordered list of text and equation parts.

use prepbook_core::MathRendering;
use regex::Regex;

use crate::omml::MathNode;

/// One piece of a paragraph's inline content.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    Math(MathNode),
}

impl Part {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Math(_) => None,
        }
    }
}

/// A body paragraph of a source document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub parts: Vec<Part>,
}

impl Paragraph {
    pub fn new(parts: Vec<Part>) -> Self {
        let mut paragraph = Self::default();
        for part in parts {
            paragraph.push(part);
        }
        paragraph
    }

    /// Convenience constructor for a text-only paragraph.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(vec![Part::Text(text.into())])
    }

    /// Append a part, merging adjacent text and dropping empty text.
    pub fn push(&mut self, part: Part) {
        match part {
            Part::Text(text) if text.is_empty() => {}
            Part::Text(text) => {
                if let Some(Part::Text(last)) = self.parts.last_mut() {
                    last.push_str(&text);
                } else {
                    self.parts.push(Part::Text(text));
                }
            }
            math => self.parts.push(math),
        }
    }

    /// Text of the runs only; equations contribute nothing.
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }

    /// Runs plus the plain text of equations, trimmed.
    pub fn content(&self) -> String {
        self.rendered(MathRendering::Plain)
    }

    /// Runs plus equations flattened with `rendering`, trimmed.
    pub fn rendered(&self, rendering: MathRendering) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Math(math) => out.push_str(&math.render(rendering)),
            }
        }
        out.trim().to_string()
    }

    pub fn has_math(&self) -> bool {
        self.parts.iter().any(|part| matches!(part, Part::Math(_)))
    }

    /// True when there is neither visible text nor an equation.
    pub fn is_blank(&self) -> bool {
        self.content().is_empty()
    }
}

/// Remove a prefix matched by `pattern` against the leading text of `parts`
/// (everything before the first equation), even when it spans several runs.
///
/// `pattern` should be anchored with `^`. Parts are returned unchanged when it
/// does not match.
pub fn strip_prefix(parts: &[Part], pattern: &Regex) -> Vec<Part> {
    let leading: String = parts
        .iter()
        .map_while(Part::as_text)
        .collect();

    let Some(found) = pattern.find(&leading) else {
        return parts.to_vec();
    };
    if found.start() != 0 {
        return parts.to_vec();
    }

    let mut to_skip = found.end();
    let mut out = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            Part::Text(text) if to_skip > 0 => {
                if text.len() <= to_skip {
                    to_skip -= text.len();
                } else {
                    out.push(Part::Text(text[to_skip..].to_string()));
                    to_skip = 0;
                }
            }
            other => {
                to_skip = 0;
                out.push(other.clone());
            }
        }
    }
    out
}

/// Remove a trailing literal (compared after trimming) from the text at the
/// end of `parts`, even when it spans several runs.
pub fn strip_suffix(parts: &[Part], suffix: &str) -> Vec<Part> {
    let suffix = suffix.trim();
    if parts.is_empty() || suffix.is_empty() {
        return parts.to_vec();
    }

    let trailing: String = {
        let mut texts: Vec<&str> = parts.iter().rev().map_while(Part::as_text).collect();
        texts.reverse();
        texts.concat()
    };
    let trimmed = trailing.trim_end();
    if !trimmed.ends_with(suffix) {
        return parts.to_vec();
    }

    // Bytes to drop from the end: the suffix plus any whitespace after it.
    let mut to_drop = trailing.len() - (trimmed.len() - suffix.len());
    let mut out: Vec<Part> = Vec::with_capacity(parts.len());
    for part in parts.iter().rev() {
        match part {
            Part::Text(text) if to_drop > 0 => {
                if text.len() <= to_drop {
                    to_drop -= text.len();
                } else {
                    out.push(Part::Text(text[..text.len() - to_drop].to_string()));
                    to_drop = 0;
                }
            }
            other => {
                to_drop = 0;
                out.push(other.clone());
            }
        }
    }
    out.reverse();
    out
}
