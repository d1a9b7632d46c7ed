// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bangla text helpers shared by the MCQ and CQ parsers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Option and sub-question labels in output order.
pub const BANGLA_LABELS: [&str; 4] = ["ক", "খ", "গ", "ঘ"];

/// Latin option labels, ordered after the Bangla ones.
pub const LATIN_LABELS: [&str; 8] = ["a", "b", "c", "d", "A", "B", "C", "D"];

/// Renumbering sequence for multiple-completion statements.
pub const ROMAN_NUMERALS: [&str; 10] = [
    "i.", "ii.", "iii.", "iv.", "v.", "vi.", "vii.", "viii.", "ix.", "x.",
];

/// Every `[...]` tag in a line.
pub static REFERENCE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static SPACE_BEFORE_CLOSER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([)\]}»”’.,?।;:])").unwrap());

static SPACE_AFTER_OPENER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([(\[{«“‘])\s+").unwrap());

/// Normalise a cell value: collapse whitespace, drop spaces before closing
/// punctuation and after opening punctuation.
pub fn clean_text(text: &str) -> String {
    let text = WHITESPACE.replace_all(text, " ");
    let text = SPACE_BEFORE_CLOSER.replace_all(&text, "$1");
    let text = SPACE_AFTER_OPENER.replace_all(&text, "$1");
    text.trim().to_string()
}

/// Whitespace-free lowercase form used to compare answer and option content.
pub fn comparison_key(text: &str) -> String {
    text.chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Bangla combining signs (vowel signs, nukta, hasanta, candrabindu, anusvara).
///
/// A consonant followed by one of these is the start of a word, so `কোনটি`
/// never reads as the option label `ক`. Visarga (`ঃ`) is excluded: it doubles
/// as a label delimiter.
pub fn is_bangla_sign(ch: char) -> bool {
    matches!(ch, '\u{0981}'..='\u{0982}' | '\u{09BC}' | '\u{09BE}'..='\u{09CD}' | '\u{09D7}')
}

/// Position of `label` in the output order: a Bangla label, or a Latin one
/// counted from `a`/`A`.
pub fn label_position(label: &str) -> Option<usize> {
    if let Some(index) = BANGLA_LABELS.iter().position(|l| *l == label) {
        return Some(index);
    }
    LATIN_LABELS.iter().position(|l| *l == label).map(|index| index % 4)
}

/// Every `[...]` tag in `text`, in order.
pub fn reference_tags(text: &str) -> Vec<String> {
    REFERENCE_TAG
        .find_iter(text)
        .map(|tag| tag.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_tightens_punctuation() {
        assert_eq!(clean_text("  কোনটি   সঠিক ?\n"), "কোনটি সঠিক?");
        assert_eq!(clean_text("( ক ) ও [ খ ]"), "(ক) ও [খ]");
        assert_eq!(clean_text("a , b । c"), "a, b। c");
        assert_eq!(clean_text("“ উদ্ধৃতি ”"), "“উদ্ধৃতি”");
    }

    #[test]
    fn clean_text_of_blank_is_empty() {
        assert_eq!(clean_text(" \t\n "), "");
    }

    #[test]
    fn comparison_key_ignores_space_and_case() {
        assert_eq!(comparison_key("১২ Cm "), "১২cm");
        assert_eq!(comparison_key("X + 1"), comparison_key("x+1"));
    }

    #[test]
    fn vowel_signs_are_signs_but_visarga_is_not() {
        assert!(is_bangla_sign('ো'));
        assert!(is_bangla_sign('ি'));
        assert!(is_bangla_sign('্'));
        assert!(!is_bangla_sign('ঃ'));
        assert!(!is_bangla_sign('ক'));
        assert!(!is_bangla_sign('.'));
    }

    #[test]
    fn label_positions() {
        assert_eq!(label_position("গ"), Some(2));
        assert_eq!(label_position("a"), Some(0));
        assert_eq!(label_position("D"), Some(3));
        assert_eq!(label_position("e"), None);
    }

    #[test]
    fn reference_tags_are_collected_in_order() {
        assert_eq!(
            reference_tags("প্রশ্ন [ঢা. বো. ২৩] আরো [রা. বো. ২২]"),
            vec!["[ঢা. বো. ২৩]", "[রা. বো. ২২]"]
        );
        assert!(reference_tags("নেই").is_empty());
    }
}
