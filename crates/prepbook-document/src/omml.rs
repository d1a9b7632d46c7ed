// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OMML (Office Math Markup Language) equations — flattening to plain text,
// LaTeX and Unicode math, and font-size patching before re-embedding.

use prepbook_core::MathRendering;
use prepbook_core::error::{PrepbookError, Result};

use crate::docx::xml::Element;

/// Symbols replaced by LaTeX commands when an equation is exported.
const LATEX_SYMBOLS: &[(char, &str)] = &[
    ('…', r"\dots"),
    ('≠', r"\neq"),
    ('≤', r"\leq"),
    ('≥', r"\geq"),
    ('×', r"\times"),
    ('÷', r"\div"),
    ('±', r"\pm"),
    ('∞', r"\infty"),
    ('°', r"^{\circ}"),
    ('α', r"\alpha"),
    ('β', r"\beta"),
    ('γ', r"\gamma"),
    ('δ', r"\delta"),
    ('ε', r"\epsilon"),
    ('θ', r"\theta"),
    ('λ', r"\lambda"),
    ('μ', r"\mu"),
    ('π', r"\pi"),
    ('ρ', r"\rho"),
    ('σ', r"\sigma"),
    ('φ', r"\phi"),
    ('ω', r"\omega"),
    ('Δ', r"\Delta"),
    ('Ω', r"\Omega"),
    ('∑', r"\sum"),
    ('∫', r"\int"),
];

const KNOWN_FUNCTIONS: &[&str] = &["sin", "cos", "tan", "log", "ln", "lim", "exp"];

/// An equation: an `m:oMath` or `m:oMathPara` subtree lifted from a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct MathNode {
    root: Element,
}

impl MathNode {
    /// Wrap an already-parsed element. Fails unless it is `oMath`/`oMathPara`.
    pub fn new(root: Element) -> Result<Self> {
        match root.local_name() {
            "oMath" | "oMathPara" => Ok(Self { root }),
            other => Err(PrepbookError::Equation(format!(
                "expected oMath or oMathPara, found <{other}>"
            ))),
        }
    }

    /// Parse equation markup such as `<m:oMath>…</m:oMath>`.
    pub fn parse(xml: &str) -> Result<Self> {
        let root = Element::parse(xml).map_err(|err| PrepbookError::Equation(err.to_string()))?;
        Self::new(root)
    }

    pub fn element(&self) -> &Element {
        &self.root
    }

    /// Concatenated text of every `m:t` run.
    pub fn plain_text(&self) -> String {
        self.root
            .descendants("t")
            .into_iter()
            .filter(|t| t.name.starts_with("m:") || !t.name.contains(':'))
            .map(Element::text)
            .collect()
    }

    /// Number of visible characters, used to weigh equations in layout decisions.
    pub fn visible_len(&self) -> usize {
        self.plain_text().chars().count()
    }

    /// LaTeX form wrapped in `$…$`.
    pub fn to_latex(&self) -> String {
        let body = latex_node(Some(&self.root));
        format!("${}$", collapse_whitespace(body.trim()))
    }

    /// Human-readable form with mathematical italic letters.
    pub fn to_unicode(&self) -> String {
        unicode_node(Some(&self.root)).trim().to_string()
    }

    /// Flatten according to the requested rendering.
    pub fn render(&self, rendering: MathRendering) -> String {
        match rendering {
            MathRendering::Latex => self.to_latex(),
            MathRendering::Unicode => self.to_unicode(),
            MathRendering::Plain => self.plain_text(),
        }
    }

    /// Copy with every run size (`w:sz`, `w:szCs`) forced to `size_pt`.
    pub fn with_font_size(&self, size_pt: f32) -> Self {
        let half_points = ((size_pt * 2.0).round() as u32).to_string();
        let mut root = self.root.clone();
        root.visit_mut(&mut |element| {
            if matches!(element.local_name(), "sz" | "szCs") {
                element.set_attribute("w:val", half_points.as_str());
            }
        });
        Self { root }
    }
}

fn child<'a>(node: &'a Element, local: &str) -> Option<&'a Element> {
    node.child(local)
}

fn latex_node(node: Option<&Element>) -> String {
    let Some(node) = node else {
        return String::new();
    };
    match node.local_name() {
        "t" => {
            let mut text = String::new();
            for ch in node.text().chars() {
                match LATEX_SYMBOLS.iter().find(|(symbol, _)| *symbol == ch) {
                    Some((_, command)) => {
                        text.push(' ');
                        text.push_str(command);
                        text.push(' ');
                    }
                    None => text.push(ch),
                }
            }
            let trimmed = text.trim();
            if KNOWN_FUNCTIONS.contains(&trimmed) {
                format!("\\{trimmed}")
            } else {
                text
            }
        }
        "f" => format!(
            "\\frac{{{}}}{{{}}}",
            latex_node(child(node, "num")).trim(),
            latex_node(child(node, "den")).trim()
        ),
        "sSup" => format!(
            "{{{}}}^{{{}}}",
            latex_node(child(node, "e")).trim(),
            latex_node(child(node, "sup")).trim()
        ),
        "sSub" => format!(
            "{{{}}}_{{{}}}",
            latex_node(child(node, "e")).trim(),
            latex_node(child(node, "sub")).trim()
        ),
        "sSubSup" => format!(
            "{{{}}}_{{{}}}^{{{}}}",
            latex_node(child(node, "e")).trim(),
            latex_node(child(node, "sub")).trim(),
            latex_node(child(node, "sup")).trim()
        ),
        "rad" => {
            let base = latex_node(child(node, "e"));
            let degree = latex_node(child(node, "deg"));
            if degree.trim().is_empty() {
                format!("\\sqrt{{{}}}", base.trim())
            } else {
                format!("\\sqrt[{}]{{{}}}", degree.trim(), base.trim())
            }
        }
        "d" => {
            let (open, close) = delimiters(node);
            let inner: Vec<String> = node
                .elements()
                .filter(|element| element.local_name() == "e")
                .map(|element| latex_node(Some(element)).trim().to_string())
                .collect();
            format!("\\left{open}{}\\right{close}", inner.join(","))
        }
        // Property blocks carry formatting only.
        "rPr" | "fPr" | "radPr" | "dPr" | "sSupPr" | "sSubPr" | "sSubSupPr" | "ctrlPr"
        | "oMathParaPr" => String::new(),
        _ => node.elements().map(|element| latex_node(Some(element))).collect(),
    }
}

/// Delimiter characters of an `m:d`, defaulting to parentheses.
fn delimiters(node: &Element) -> (String, String) {
    let props = node.child("dPr");
    let read = |local: &str, default: &str| {
        props
            .and_then(|p| p.child(local))
            .and_then(|c| c.attribute("m:val"))
            .unwrap_or(default)
            .to_string()
    };
    (read("begChr", "("), read("endChr", ")"))
}

fn unicode_node(node: Option<&Element>) -> String {
    let Some(node) = node else {
        return String::new();
    };
    match node.local_name() {
        "t" => node.text().chars().map(math_italic).collect(),
        "f" => format!(
            "({})/({})",
            unicode_node(child(node, "num")),
            unicode_node(child(node, "den"))
        ),
        "sSup" => format!(
            "{}^{{{}}}",
            unicode_node(child(node, "e")),
            unicode_node(child(node, "sup"))
        ),
        "sSub" => format!(
            "{}_{{{}}}",
            unicode_node(child(node, "e")),
            unicode_node(child(node, "sub"))
        ),
        "sSubSup" => format!(
            "{}_{{{}}}^{{{}}}",
            unicode_node(child(node, "e")),
            unicode_node(child(node, "sub")),
            unicode_node(child(node, "sup"))
        ),
        "rad" => format!("sqrt({})", unicode_node(child(node, "e"))),
        "d" => {
            let (open, close) = delimiters(node);
            let inner: Vec<String> = node
                .elements()
                .filter(|element| element.local_name() == "e")
                .map(|element| unicode_node(Some(element)))
                .collect();
            format!("{open}{}{close}", inner.join(","))
        }
        "rPr" | "fPr" | "radPr" | "dPr" | "sSupPr" | "sSubPr" | "sSubSupPr" | "ctrlPr"
        | "oMathParaPr" => String::new(),
        _ => node.elements().map(|element| unicode_node(Some(element))).collect(),
    }
}

/// Map a Latin letter to its MATHEMATICAL ITALIC code point.
fn math_italic(ch: char) -> char {
    let mapped = match ch {
        // U+210E PLANCK CONSTANT stands in for the unassigned italic small h.
        'h' => Some('\u{210E}'),
        'a'..='z' => char::from_u32(0x1D44E + (ch as u32 - 'a' as u32)),
        'A'..='Z' => char::from_u32(0x1D434 + (ch as u32 - 'A' as u32)),
        _ => None,
    };
    mapped.unwrap_or(ch)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const M: &str = r#"xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math" xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn math(body: &str) -> MathNode {
        MathNode::parse(&format!("<m:oMath {M}>{body}</m:oMath>")).unwrap()
    }

    #[test]
    fn fraction_to_latex_and_unicode() {
        let eq = math("<m:f><m:num><m:r><m:t>a</m:t></m:r></m:num><m:den><m:r><m:t>2</m:t></m:r></m:den></m:f>");
        assert_eq!(eq.to_latex(), r"$\frac{a}{2}$");
        assert_eq!(eq.to_unicode(), "(𝑎)/(2)");
        assert_eq!(eq.plain_text(), "a2");
    }

    #[test]
    fn superscript_and_symbols() {
        let eq = math("<m:sSup><m:e><m:r><m:t>x</m:t></m:r></m:e><m:sup><m:r><m:t>2</m:t></m:r></m:sup></m:sSup><m:r><m:t>≠π</m:t></m:r>");
        assert_eq!(eq.to_latex(), r"${x}^{2} \neq \pi$");
    }

    #[test]
    fn known_function_gets_backslash() {
        let eq = math("<m:r><m:t>sin</m:t></m:r>");
        assert_eq!(eq.to_latex(), r"$\sin$");
    }

    #[test]
    fn radical_with_degree() {
        let eq = math("<m:rad><m:radPr><m:degHide m:val=\"0\"/></m:radPr><m:deg><m:r><m:t>3</m:t></m:r></m:deg><m:e><m:r><m:t>8</m:t></m:r></m:e></m:rad>");
        assert_eq!(eq.to_latex(), r"$\sqrt[3]{8}$");
        assert_eq!(eq.to_unicode(), "sqrt(8)");
    }

    #[test]
    fn delimiters_use_declared_characters() {
        let eq = math("<m:d><m:dPr><m:begChr m:val=\"[\"/><m:endChr m:val=\"]\"/></m:dPr><m:e><m:r><m:t>y</m:t></m:r></m:e></m:d>");
        assert_eq!(eq.to_latex(), r"$\left[y\right]$");
        assert_eq!(eq.to_unicode(), "[𝑦]");
    }

    #[test]
    fn italic_h_uses_planck_constant() {
        assert_eq!(math_italic('h'), 'ℎ');
        assert_eq!(math_italic('৫'), '৫');
    }

    #[test]
    fn visible_length_counts_characters() {
        let eq = math("<m:r><m:t>১২৩</m:t></m:r>");
        assert_eq!(eq.visible_len(), 3);
    }

    #[test]
    fn font_size_patch_rewrites_every_size() {
        let eq = math("<m:r><w:rPr><w:sz w:val=\"28\"/><w:szCs w:val=\"28\"/></w:rPr><m:t>x</m:t></m:r>");
        let patched = eq.with_font_size(11.0);
        let sizes: Vec<_> = patched
            .element()
            .descendants("sz")
            .into_iter()
            .chain(patched.element().descendants("szCs"))
            .map(|e| e.attribute("w:val").unwrap().to_string())
            .collect();
        assert_eq!(sizes, vec!["22", "22"]);
    }

    #[test]
    fn rejects_non_math_roots() {
        assert!(matches!(
            MathNode::parse("<w:r/>"),
            Err(PrepbookError::Equation(_))
        ));
        assert!(matches!(
            MathNode::parse("<m:oMath>"),
            Err(PrepbookError::Equation(_))
        ));
    }
}
