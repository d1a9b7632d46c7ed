// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX writer — build a new WordprocessingML package from styled blocks.
//
// Documents are assembled as a list of `Block`s (paragraphs) holding text
// runs, tabs and equations, then serialised into the handful of package parts
// Word needs: content types, relationships, the main document, styles and
// core properties.

use std::io::{Cursor, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use prepbook_core::error::{PrepbookError, Result};
use prepbook_core::{FormatConfig, Rgb};
use quick_xml::escape::escape;
use tracing::{debug, info, instrument};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::paragraph::Part;
use crate::omml::MathNode;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const M_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const TWIPS_PER_INCH: f32 = 1440.0;
const TWIPS_PER_POINT: f32 = 20.0;

/// Character formatting of a text run. Font family and size come from the
/// writer's configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStyle {
    pub bold: bool,
    pub underline: bool,
    pub color: Option<Rgb>,
}

impl RunStyle {
    pub const PLAIN: Self = Self {
        bold: false,
        underline: false,
        color: None,
    };

    pub const BOLD: Self = Self {
        bold: true,
        underline: false,
        color: None,
    };

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn underlined(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn colored(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }
}

/// Horizontal alignment of a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Justify,
}

/// Inline content of a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text { text: String, style: RunStyle },
    Tab,
    Math(MathNode),
}

/// One output paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub inlines: Vec<Inline>,
    /// Left-aligned tab stops in inches.
    pub tab_stops_in: Vec<f32>,
    pub space_before_pt: f32,
    pub space_after_pt: f32,
    pub alignment: Alignment,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn justified(mut self) -> Self {
        self.alignment = Alignment::Justify;
        self
    }

    pub fn with_tab_stops(mut self, stops_in: &[f32]) -> Self {
        self.tab_stops_in = stops_in.to_vec();
        self
    }

    pub fn with_space_before(mut self, points: f32) -> Self {
        self.space_before_pt = points;
        self
    }

    pub fn push_text(&mut self, text: impl Into<String>, style: RunStyle) {
        let text = text.into();
        if !text.is_empty() {
            self.inlines.push(Inline::Text { text, style });
        }
    }

    pub fn push_tab(&mut self) {
        self.inlines.push(Inline::Tab);
    }

    pub fn push_math(&mut self, math: MathNode) {
        self.inlines.push(Inline::Math(math));
    }

    /// Append source parts in order, inserting a space where text and an
    /// equation would otherwise touch.
    pub fn push_parts(&mut self, parts: &[Part], style: RunStyle) {
        let mut previous: Option<&Part> = None;
        for part in parts {
            let needs_space = match (previous, part) {
                (Some(Part::Text(before)), Part::Math(_)) => !before.ends_with(' '),
                (Some(Part::Math(_)), Part::Text(after)) => !after.starts_with(' '),
                _ => false,
            };
            if needs_space {
                self.push_text(" ", style);
            }
            match part {
                Part::Text(text) => self.push_text(text.as_str(), style),
                Part::Math(math) => self.push_math(math.clone()),
            }
            previous = Some(part);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inlines.is_empty()
    }
}

/// Creates new `.docx` documents from [`Block`]s.
#[derive(Debug)]
pub struct DocxWriter {
    config: FormatConfig,
    blocks: Vec<Block>,
    /// Justify paragraphs by default through the Normal style.
    justify_by_default: bool,
    /// Title metadata embedded in `docProps/core.xml`.
    title: Option<String>,
}

impl DocxWriter {
    /// Create a writer using the fonts and page geometry from `config`.
    pub fn new(config: &FormatConfig) -> Self {
        Self {
            config: config.clone(),
            blocks: Vec::new(),
            justify_by_default: false,
            title: None,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn set_justify_by_default(&mut self, justify: bool) {
        self.justify_by_default = justify;
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    // -- Serialisation --------------------------------------------------------

    /// Serialise the package to bytes.
    #[instrument(skip(self), fields(blocks = self.blocks.len()))]
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let document_xml = self.document_xml();
        let styles_xml = self.styles_xml();
        let core_xml = self.core_xml();

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buffer);
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
            let parts: [(&str, &str); 6] = [
                ("[Content_Types].xml", CONTENT_TYPES_XML),
                ("_rels/.rels", PACKAGE_RELS_XML),
                ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML),
                ("word/document.xml", &document_xml),
                ("word/styles.xml", &styles_xml),
                ("docProps/core.xml", &core_xml),
            ];
            for (name, content) in parts {
                zip.start_file(name, options).map_err(docx_err)?;
                zip.write_all(content.as_bytes())?;
            }
            zip.finish().map_err(docx_err)?;
        }

        let output = buffer.into_inner();
        debug!(output_bytes = output.len(), "DOCX serialised");
        Ok(output)
    }

    /// Write the package to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote DOCX to {}", path.as_ref().display());
        Ok(())
    }

    fn document_xml(&self) -> String {
        let mut body = String::new();
        for block in &self.blocks {
            self.write_block(block, &mut body);
        }
        let page = &self.config.page;
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}" xmlns:m="{M_NS}" xmlns:r="{R_NS}"><w:body>{body}<w:sectPr><w:pgSz w:w="{w}" w:h="{h}"/><w:pgMar w:top="{top}" w:right="{right}" w:bottom="{bottom}" w:left="{left}" w:header="720" w:footer="720" w:gutter="0"/><w:cols w:num="{cols}" w:space="{space}"/></w:sectPr></w:body></w:document>"#,
            w = inches_to_twips(page.width_in),
            h = inches_to_twips(page.height_in),
            top = inches_to_twips(page.margin_top_in),
            right = inches_to_twips(page.margin_right_in),
            bottom = inches_to_twips(page.margin_bottom_in),
            left = inches_to_twips(page.margin_left_in),
            cols = page.columns,
            space = page.column_space_twips,
        )
    }

    fn write_block(&self, block: &Block, out: &mut String) {
        out.push_str("<w:p><w:pPr>");
        if !block.tab_stops_in.is_empty() {
            out.push_str("<w:tabs>");
            for stop in &block.tab_stops_in {
                out.push_str(&format!(
                    r#"<w:tab w:val="left" w:pos="{}"/>"#,
                    inches_to_twips(*stop)
                ));
            }
            out.push_str("</w:tabs>");
        }
        out.push_str(&format!(
            r#"<w:spacing w:before="{}" w:after="{}"/>"#,
            points_to_twips(block.space_before_pt),
            points_to_twips(block.space_after_pt)
        ));
        if block.alignment == Alignment::Justify {
            out.push_str(r#"<w:jc w:val="both"/>"#);
        }
        out.push_str("</w:pPr>");

        for inline in &block.inlines {
            match inline {
                Inline::Text { text, style } => self.write_run(text, *style, out),
                Inline::Tab => {
                    out.push_str("<w:r>");
                    out.push_str(&self.run_properties(RunStyle::PLAIN));
                    out.push_str("<w:tab/></w:r>");
                }
                Inline::Math(math) => {
                    math.with_font_size(self.config.font_size_pt)
                        .element()
                        .write_xml(out);
                }
            }
        }
        out.push_str("</w:p>");
    }

    fn write_run(&self, text: &str, style: RunStyle, out: &mut String) {
        out.push_str("<w:r>");
        out.push_str(&self.run_properties(style));
        let mut segment = String::new();
        let flush = |segment: &mut String, out: &mut String| {
            if !segment.is_empty() {
                out.push_str(r#"<w:t xml:space="preserve">"#);
                out.push_str(&escape(segment.as_str()));
                out.push_str("</w:t>");
                segment.clear();
            }
        };
        for ch in text.chars() {
            match ch {
                '\t' => {
                    flush(&mut segment, out);
                    out.push_str("<w:tab/>");
                }
                '\n' => {
                    flush(&mut segment, out);
                    out.push_str("<w:br/>");
                }
                '\r' => {}
                _ => segment.push(ch),
            }
        }
        flush(&mut segment, out);
        out.push_str("</w:r>");
    }

    fn run_properties(&self, style: RunStyle) -> String {
        let font = escape(self.config.font_name.as_str()).into_owned();
        let size = half_points(self.config.font_size_pt);
        let mut props = format!(
            r#"<w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/>"#
        );
        if style.bold {
            props.push_str("<w:b/><w:bCs/>");
        }
        if let Some(color) = style.color {
            props.push_str(&format!(r#"<w:color w:val="{}"/>"#, color.hex()));
        }
        props.push_str(&format!(r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#));
        if style.underline {
            props.push_str(r#"<w:u w:val="single"/>"#);
        }
        props.push_str("</w:rPr>");
        props
    }

    fn styles_xml(&self) -> String {
        let font = escape(self.config.font_name.as_str()).into_owned();
        let size = half_points(self.config.font_size_pt);
        let justify = if self.justify_by_default {
            r#"<w:jc w:val="both"/>"#
        } else {
            ""
        };
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{W_NS}"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:before="0" w:after="0"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/><w:pPr>{justify}</w:pPr></w:style></w:styles>"#
        )
    }

    fn core_xml(&self) -> String {
        let title = escape(self.title.as_deref().unwrap_or("Prepbook Document")).into_owned();
        let created = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{title}</dc:title><dc:creator>prepbook</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{created}</dcterms:modified></cp:coreProperties>"#
        )
    }
}

fn docx_err(err: zip::result::ZipError) -> PrepbookError {
    PrepbookError::Docx(format!("failed to write package: {err}"))
}

fn inches_to_twips(inches: f32) -> u32 {
    (inches * TWIPS_PER_INCH).round().max(0.0) as u32
}

fn points_to_twips(points: f32) -> u32 {
    (points * TWIPS_PER_POINT).round().max(0.0) as u32
}

fn half_points(points: f32) -> u32 {
    (points * 2.0).round().max(1.0) as u32
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::docx::reader::DocxReader;

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut xml = String::new();
        entry.read_to_string(&mut xml).unwrap();
        xml
    }

    fn math(text: &str) -> MathNode {
        MathNode::parse(&format!(
            r#"<m:oMath><m:r><w:rPr><w:sz w:val="30"/></w:rPr><m:t>{text}</m:t></m:r></m:oMath>"#
        ))
        .unwrap()
    }

    #[test]
    fn output_reads_back_as_the_same_paragraphs() {
        let config = FormatConfig::default();
        let mut writer = DocxWriter::new(&config);
        let mut block = Block::new();
        block.push_text("১. ", RunStyle::BOLD);
        block.push_text("a < b & c", RunStyle::PLAIN);
        writer.push(block);
        let mut options = Block::new().with_tab_stops(&[0.8, 1.6]);
        options.push_text("ক. ২", RunStyle::PLAIN);
        options.push_tab();
        options.push_text("খ. ৩", RunStyle::PLAIN);
        writer.push(options);

        let bytes = writer.to_bytes().unwrap();
        let paragraphs = DocxReader::from_bytes(&bytes).unwrap().into_paragraphs();
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].text(), "১. a < b & c");
        assert_eq!(paragraphs[1].text(), "ক. ২\tখ. ৩");
    }

    #[test]
    fn section_has_two_columns_and_page_size() {
        let writer = DocxWriter::new(&FormatConfig::default());
        let xml = part(&writer.to_bytes().unwrap(), "word/document.xml");
        assert!(xml.contains(r#"<w:pgSz w:w="12240" w:h="15336"/>"#));
        assert!(xml.contains(r#"<w:cols w:num="2" w:space="210"/>"#));
        assert!(xml.contains(r#"w:left="1152""#));
    }

    #[test]
    fn run_properties_carry_font_bold_and_colour() {
        let config = FormatConfig::default();
        let mut writer = DocxWriter::new(&config);
        let mut block = Block::new().justified();
        block.push_text(
            "উত্তর: ",
            RunStyle::BOLD.colored(config.accent_color).underlined(),
        );
        writer.push(block);
        let xml = part(&writer.to_bytes().unwrap(), "word/document.xml");
        assert!(xml.contains(r#"w:eastAsia="Tiro Bangla""#));
        assert!(xml.contains("<w:b/><w:bCs/>"));
        assert!(xml.contains(r#"<w:color w:val="088565"/>"#));
        assert!(xml.contains(r#"<w:u w:val="single"/>"#));
        assert!(xml.contains(r#"<w:jc w:val="both"/>"#));
        assert!(xml.contains(r#"<w:sz w:val="22"/>"#));
    }

    #[test]
    fn equations_are_resized_and_spaced() {
        let mut writer = DocxWriter::new(&FormatConfig::default());
        let mut block = Block::new();
        block.push_parts(
            &[Part::Text("মান".into()), Part::Math(math("x")), Part::Text("হলে".into())],
            RunStyle::PLAIN,
        );
        assert_eq!(block.inlines.len(), 5);
        writer.push(block);

        let bytes = writer.to_bytes().unwrap();
        let xml = part(&bytes, "word/document.xml");
        assert!(xml.contains(r#"<w:sz w:val="22"/></w:rPr><m:t>x</m:t>"#));
        let paragraphs = DocxReader::from_bytes(&bytes).unwrap().into_paragraphs();
        assert_eq!(paragraphs[0].content(), "মান x হলে");
    }

    #[test]
    fn styles_justify_when_requested() {
        let mut writer = DocxWriter::new(&FormatConfig::default());
        writer.set_justify_by_default(true);
        writer.set_title("CQ");
        let bytes = writer.to_bytes().unwrap();
        assert!(part(&bytes, "word/styles.xml").contains(r#"<w:jc w:val="both"/>"#));
        assert!(part(&bytes, "docProps/core.xml").contains("<dc:title>CQ</dc:title>"));
    }

    #[test]
    fn save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        DocxWriter::new(&FormatConfig::default()).save(&path).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }
}
