// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Option layout — measure option content and pick a one, two or four line
// arrangement.

use prepbook_core::OptionLayout;
use prepbook_core::config::LayoutThresholds;
use prepbook_document::Part;

/// Measured width of one option's content (label already stripped).
///
/// Each text part counts its characters after trimming that part; each
/// equation counts as a fixed weight chosen by its visible length.
pub fn effective_length(parts: &[Part], thresholds: &LayoutThresholds) -> usize {
    parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => text.trim().chars().count(),
            Part::Math(math) => equation_weight(math.visible_len(), thresholds),
        })
        .sum()
}

fn equation_weight(visible_len: usize, thresholds: &LayoutThresholds) -> usize {
    if visible_len <= thresholds.short_option_chars {
        thresholds.equation_weight_short
    } else if visible_len <= thresholds.medium_option_chars {
        thresholds.equation_weight_medium
    } else {
        thresholds.equation_weight_long
    }
}

/// Choose the layout for a set of option lengths.
pub fn classify(lengths: &[usize], thresholds: &LayoutThresholds) -> OptionLayout {
    let Some(longest) = lengths.iter().copied().max() else {
        return OptionLayout::FourLine;
    };
    if longest <= thresholds.short_option_chars {
        OptionLayout::OneLine
    } else if longest <= thresholds.medium_option_chars {
        OptionLayout::TwoLine
    } else {
        OptionLayout::FourLine
    }
}
