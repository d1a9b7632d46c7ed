// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX reader — open a WordprocessingML package and lift its body paragraphs
// into text/equation parts.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use prepbook_core::error::{PrepbookError, Result};
use tracing::{debug, info, instrument, warn};
use zip::ZipArchive;

use super::paragraph::{Paragraph, Part};
use super::xml::Element;
use crate::omml::MathNode;

const DOCUMENT_PART: &str = "word/document.xml";

/// Reads the body paragraphs of an existing `.docx` file.
pub struct DocxReader {
    paragraphs: Vec<Paragraph>,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl DocxReader {
    // -- Construction ---------------------------------------------------------

    /// Open a DOCX from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening DOCX: {}", path_ref.display());

        let file = std::fs::File::open(path_ref)?;
        let paragraphs = read_paragraphs(file).map_err(|err| match err {
            PrepbookError::Docx(detail) => {
                PrepbookError::Docx(format!("failed to open {}: {}", path_ref.display(), detail))
            }
            other => other,
        })?;

        debug!(paragraphs = paragraphs.len(), "DOCX loaded");

        Ok(Self {
            paragraphs,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw DOCX bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let paragraphs = read_paragraphs(Cursor::new(data))?;
        debug!(paragraphs = paragraphs.len(), "DOCX loaded from bytes");
        Ok(Self {
            paragraphs,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn into_paragraphs(self) -> Vec<Paragraph> {
        self.paragraphs
    }

    /// Return the source path if the reader was created via [`DocxReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }
}

fn read_paragraphs<R: Read + Seek>(reader: R) -> Result<Vec<Paragraph>> {
    let mut archive =
        ZipArchive::new(reader).map_err(|err| PrepbookError::Docx(format!("not a ZIP package: {err}")))?;
    let mut entry = archive
        .by_name(DOCUMENT_PART)
        .map_err(|err| PrepbookError::Docx(format!("missing {DOCUMENT_PART}: {err}")))?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;

    let root = Element::parse(&xml)?;
    let body = root
        .child("body")
        .ok_or_else(|| PrepbookError::Docx("document has no <w:body>".into()))?;

    Ok(body
        .elements()
        .filter(|element| element.local_name() == "p")
        .map(paragraph_from_element)
        .collect())
}

/// Build a [`Paragraph`] from a `w:p` element.
pub fn paragraph_from_element(p: &Element) -> Paragraph {
    let mut paragraph = Paragraph::default();
    collect_inline(p, &mut paragraph);
    paragraph
}

fn collect_inline(container: &Element, paragraph: &mut Paragraph) {
    for child in container.elements() {
        match child.local_name() {
            "r" => paragraph.push(Part::Text(run_text(child))),
            "oMath" | "oMathPara" => match MathNode::new(child.clone()) {
                Ok(math) => paragraph.push(Part::Math(math)),
                Err(err) => warn!(%err, "skipping unreadable equation"),
            },
            // Wrappers whose runs are part of the visible text.
            "hyperlink" | "ins" | "smartTag" | "fldSimple" | "customXml" | "sdtContent" | "sdt" => {
                collect_inline(child, paragraph)
            }
            _ => {}
        }
    }
}

/// Visible text of a `w:r`: text, tabs and line breaks.
fn run_text(run: &Element) -> String {
    let mut text = String::new();
    for child in run.elements() {
        match child.local_name() {
            "t" => text.push_str(&child.text()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            "noBreakHyphen" => text.push('-'),
            _ => {}
        }
    }
    text
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use super::*;

    pub(crate) const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    pub(crate) const M_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";

    /// Build a minimal DOCX package whose body contains `body_xml`.
    pub(crate) fn docx_with_body(body_xml: &str) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}" xmlns:m="{M_NS}"><w:body>{body_xml}<w:sectPr/></w:body></w:document>"#
        );
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buffer);
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file(DOCUMENT_PART, options).unwrap();
            zip.write_all(document.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn reads_runs_tabs_and_breaks() {
        let bytes = docx_with_body(
            r#"<w:p><w:pPr><w:jc w:val="both"/></w:pPr><w:r><w:t>১.</w:t></w:r><w:r><w:tab/><w:t xml:space="preserve"> প্রশ্ন</w:t><w:br/></w:r></w:p>"#,
        );
        let reader = DocxReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.paragraphs().len(), 1);
        assert_eq!(reader.paragraphs()[0].text(), "১.\t প্রশ্ন\n");
        assert!(reader.source_path().is_none());
    }

    #[test]
    fn keeps_equations_as_parts() {
        let bytes = docx_with_body(
            r#"<w:p><w:r><w:t xml:space="preserve">ক. </w:t></w:r><m:oMath><m:r><m:t>x+1</m:t></m:r></m:oMath></w:p>"#,
        );
        let paragraphs = DocxReader::from_bytes(&bytes).unwrap().into_paragraphs();
        assert_eq!(paragraphs[0].parts.len(), 2);
        assert_eq!(paragraphs[0].content(), "ক. x+1");
        assert_eq!(paragraphs[0].text(), "ক. ");
    }

    #[test]
    fn reads_hyperlink_runs_and_skips_tables() {
        let bytes = docx_with_body(
            r#"<w:p><w:hyperlink><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p/>"#,
        );
        let paragraphs = DocxReader::from_bytes(&bytes).unwrap().into_paragraphs();
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].text(), "link");
        assert!(paragraphs[1].is_blank());
    }

    #[test]
    fn rejects_non_zip_input() {
        let err = DocxReader::from_bytes(b"plain text").err().unwrap();
        assert!(matches!(err, PrepbookError::Docx(_)));
    }

    #[test]
    fn open_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DocxReader::open(dir.path().join("absent.docx")).err().unwrap();
        assert!(matches!(err, PrepbookError::Io(_)));
    }
}
