// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF grayscale — recode raster images as brightened DeviceGray and map
// vector colour operators to gray, using the `lopdf` crate.

use std::collections::BTreeSet;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use prepbook_core::error::{PrepbookError, Result};
use tracing::{debug, info, instrument, warn};

use crate::image::ImageProcessor;

/// Brightening applied when the caller does not choose one.
pub const DEFAULT_BRIGHTNESS: f32 = 1.4;

/// Luma weights, matching the `image` crate's RGB to luma conversion.
const LUMA_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// What a conversion changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrayscaleSummary {
    pub pages: usize,
    /// Pages whose content stream could not be parsed and was left as is.
    pub pages_skipped: usize,
    pub images_converted: usize,
    pub images_skipped: usize,
    /// Soft masks and stencil masks, whose samples are alpha and stay untouched.
    pub masks_kept: usize,
    pub color_operators: usize,
}

/// Converts an existing PDF to a lighter grayscale rendition in place.
pub struct PdfGrayscale {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfGrayscale {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            PrepbookError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a converter from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            PrepbookError::PdfError(format!("failed to load PDF from memory: {err}"))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    /// Convert `src` and write the result to `dst`.
    pub fn convert(
        src: impl AsRef<Path>,
        dst: impl AsRef<Path>,
        factor: f32,
    ) -> Result<GrayscaleSummary> {
        let mut pdf = Self::open(src)?;
        let summary = pdf.apply(factor)?;
        pdf.save(dst)?;
        Ok(summary)
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Return the source path if the converter was created via [`PdfGrayscale::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    // -- Conversion -----------------------------------------------------------

    /// Recode every image and page colour, brightening by `factor`.
    #[instrument(skip(self), fields(source = ?self.source_path))]
    pub fn apply(&mut self, factor: f32) -> Result<GrayscaleSummary> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(PrepbookError::PdfError(format!(
                "brightness factor must be a non-negative number, got {factor}"
            )));
        }

        let mut summary = GrayscaleSummary {
            pages: self.page_count(),
            ..GrayscaleSummary::default()
        };

        let mask_ids = self.mask_ids();
        let image_ids = self.stream_ids(b"Image");
        for id in image_ids {
            if mask_ids.contains(&id) {
                debug!(object = ?id, "keeping mask samples");
                summary.masks_kept += 1;
                continue;
            }
            let samples = match self.document.get_object(id) {
                Ok(Object::Stream(stream)) => gray_samples(&self.document, stream, factor),
                _ => continue,
            };
            match samples {
                Ok(samples) => {
                    if let Ok(Object::Stream(stream)) = self.document.get_object_mut(id) {
                        store_gray(stream, samples)?;
                        summary.images_converted += 1;
                    }
                }
                Err(reason) => {
                    warn!(object = ?id, %reason, "skipping image");
                    summary.images_skipped += 1;
                }
            }
        }

        for (page_number, page_id) in self.document.get_pages() {
            match self.rewrite_page(page_id, factor) {
                Ok(count) => summary.color_operators += count,
                Err(reason) => {
                    warn!(page = page_number, %reason, "leaving page colours unchanged");
                    summary.pages_skipped += 1;
                }
            }
        }

        // Form XObjects carry their own content streams.
        for id in self.stream_ids(b"Form") {
            if let Ok(Object::Stream(stream)) = self.document.get_object_mut(id) {
                match rewrite_form(stream, factor) {
                    Ok(count) => summary.color_operators += count,
                    Err(reason) => warn!(object = ?id, %reason, "skipping form"),
                }
            }
        }

        info!(
            pages = summary.pages,
            pages_skipped = summary.pages_skipped,
            images_converted = summary.images_converted,
            images_skipped = summary.images_skipped,
            masks_kept = summary.masks_kept,
            color_operators = summary.color_operators,
            "Grayscale conversion complete"
        );
        Ok(summary)
    }

    // -- Output ---------------------------------------------------------------

    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            PrepbookError::PdfError(format!("failed to serialise PDF: {err}"))
        })?;
        Ok(output)
    }

    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), bytes)?;
        info!("Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }

    // -- Helpers --------------------------------------------------------------

    /// Rewrite the colour operators of one page. Returns the number changed.
    fn rewrite_page(&mut self, page_id: ObjectId, factor: f32) -> std::result::Result<usize, String> {
        let raw = self
            .document
            .get_page_content(page_id)
            .map_err(|err| format!("cannot read content: {err}"))?;
        let mut content =
            Content::decode(&raw).map_err(|err| format!("cannot parse content: {err}"))?;
        let rewritten = rewrite_colors(&mut content, factor);
        if rewritten == 0 {
            return Ok(0);
        }
        let encoded = content
            .encode()
            .map_err(|err| format!("cannot encode content: {err}"))?;
        self.document
            .change_page_content(page_id, encoded)
            .map_err(|err| format!("cannot replace content: {err}"))?;
        Ok(rewritten)
    }

    /// Ids of image streams referenced as another image's `/SMask` or
    /// stencil `/Mask`.
    fn mask_ids(&self) -> BTreeSet<ObjectId> {
        self.document
            .objects
            .values()
            .filter_map(|object| match object {
                Object::Stream(stream) => Some(&stream.dict),
                _ => None,
            })
            .flat_map(|dict| {
                [b"SMask".as_slice(), b"Mask".as_slice()]
                    .into_iter()
                    .filter_map(move |key| dict.get(key).ok()?.as_reference().ok())
            })
            .collect()
    }

    /// Ids of every stream object whose `/Subtype` is `subtype`.
    fn stream_ids(&self, subtype: &[u8]) -> Vec<ObjectId> {
        self.document
            .objects
            .iter()
            .filter_map(|(id, object)| match object {
                Object::Stream(stream) if name_of(&stream.dict, b"Subtype") == Some(subtype) => {
                    Some(*id)
                }
                _ => None,
            })
            .collect()
    }
}

/// Decode an image stream into brightened luma samples, or say why it cannot be.
fn gray_samples(
    document: &Document,
    stream: &Stream,
    factor: f32,
) -> std::result::Result<Vec<u8>, String> {
    let dict = &stream.dict;
    if matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true))) {
        return Err("stencil mask".into());
    }

    let filters = filter_names(dict);
    let processor = match filters.as_slice() {
        [filter] if filter.as_slice() == b"DCTDecode" => {
            ImageProcessor::from_bytes(&stream.content).map_err(|err| err.to_string())?
        }
        [] => sample_processor(document, stream, false)?,
        [filter] if filter.as_slice() == b"FlateDecode" => {
            sample_processor(document, stream, true)?
        }
        [filter] => {
            return Err(format!("unsupported filter {}", String::from_utf8_lossy(filter)));
        }
        _ => return Err("chained filters".into()),
    };

    Ok(processor.grayscale().scale_brightness(factor).into_luma_bytes())
}

/// Wrap the unfiltered (or inflated) 8-bit samples of a gray or RGB image.
fn sample_processor(
    document: &Document,
    stream: &Stream,
    inflate: bool,
) -> std::result::Result<ImageProcessor, String> {
    let dict = &stream.dict;
    let bits = integer(dict, b"BitsPerComponent").unwrap_or(8);
    if bits != 8 {
        return Err(format!("{bits} bits per component"));
    }
    let components = component_count(document, dict)?;
    let width = dimension(dict, b"Width")?;
    let height = dimension(dict, b"Height")?;
    let samples = if inflate {
        stream
            .decompressed_content()
            .map_err(|err| format!("cannot inflate samples: {err}"))?
    } else {
        stream.content.clone()
    };
    ImageProcessor::from_samples(width, height, components, samples).map_err(|err| err.to_string())
}

/// Replace an image's samples with 8-bit DeviceGray, Flate compressed.
fn store_gray(stream: &mut Stream, samples: Vec<u8>) -> Result<()> {
    stream.set_plain_content(samples);
    stream
        .dict
        .set("ColorSpace", Object::Name(b"DeviceGray".to_vec()));
    stream.dict.set("BitsPerComponent", Object::Integer(8));
    stream.dict.remove(b"Decode");
    stream
        .compress()
        .map_err(|err| PrepbookError::PdfError(format!("cannot compress image: {err}")))
}

fn rewrite_form(stream: &mut Stream, factor: f32) -> std::result::Result<usize, String> {
    let raw = if filter_names(&stream.dict).is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .map_err(|err| format!("cannot inflate form: {err}"))?
    };
    let mut content = Content::decode(&raw).map_err(|err| err.to_string())?;
    let rewritten = rewrite_colors(&mut content, factor);
    if rewritten > 0 {
        let encoded = content.encode().map_err(|err| err.to_string())?;
        stream.set_plain_content(encoded);
        stream.compress().map_err(|err| err.to_string())?;
    }
    Ok(rewritten)
}

/// Map `rg RG k K g G` to brightened `g G`. Returns the number of operators changed.
pub fn rewrite_colors(content: &mut Content, factor: f32) -> usize {
    let mut rewritten = 0;
    for operation in &mut content.operations {
        let Some(values) = operand_values(&operation.operands) else {
            continue;
        };
        let (operator, gray) = match (operation.operator.as_str(), values.as_slice()) {
            ("rg", [r, g, b]) => ("g", rgb_luma(*r, *g, *b)),
            ("RG", [r, g, b]) => ("G", rgb_luma(*r, *g, *b)),
            ("k", [c, m, y, k]) => ("g", cmyk_luma(*c, *m, *y, *k)),
            ("K", [c, m, y, k]) => ("G", cmyk_luma(*c, *m, *y, *k)),
            ("g", [gray]) => ("g", *gray),
            ("G", [gray]) => ("G", *gray),
            _ => continue,
        };
        let brightened = (gray * factor).clamp(0.0, 1.0);
        *operation = Operation::new(operator, vec![Object::Real(brightened)]);
        rewritten += 1;
    }
    rewritten
}

fn operand_values(operands: &[Object]) -> Option<Vec<f32>> {
    operands.iter().map(|operand| operand.as_float().ok()).collect()
}

fn rgb_luma(r: f32, g: f32, b: f32) -> f32 {
    LUMA_WEIGHTS[0] * r + LUMA_WEIGHTS[1] * g + LUMA_WEIGHTS[2] * b
}

fn cmyk_luma(c: f32, m: f32, y: f32, k: f32) -> f32 {
    let white = 1.0 - k;
    rgb_luma((1.0 - c) * white, (1.0 - m) * white, (1.0 - y) * white)
}

fn name_of<'a>(dict: &'a Dictionary, key: &[u8]) -> Option<&'a [u8]> {
    dict.get(key).ok().and_then(|object| object.as_name().ok())
}

fn integer(dict: &Dictionary, key: &[u8]) -> Option<i64> {
    dict.get(key).ok().and_then(|object| object.as_i64().ok())
}

fn dimension(dict: &Dictionary, key: &[u8]) -> std::result::Result<u32, String> {
    integer(dict, key)
        .and_then(|value| u32::try_from(value).ok())
        .filter(|value| *value > 0)
        .ok_or_else(|| format!("missing {}", String::from_utf8_lossy(key)))
}

fn filter_names(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(filters)) => filters
            .iter()
            .filter_map(|filter| filter.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

/// Components per pixel of a gray or RGB colour space, following references.
fn component_count(document: &Document, dict: &Dictionary) -> std::result::Result<u8, String> {
    let space = dict
        .get(b"ColorSpace")
        .map_err(|_| "missing ColorSpace".to_string())?;
    let space = resolve(document, space);
    let count = match space {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" => 1,
            b"DeviceRGB" | b"CalRGB" => 3,
            other => return Err(format!("colour space {}", String::from_utf8_lossy(other))),
        },
        Object::Array(items) => match items.first().and_then(|item| item.as_name().ok()) {
            Some(b"ICCBased") => {
                let profile = items.get(1).map(|item| resolve(document, item));
                match profile {
                    Some(Object::Stream(profile)) => integer(&profile.dict, b"N").unwrap_or(0),
                    _ => 0,
                }
            }
            Some(b"CalGray") => 1,
            Some(b"CalRGB") => 3,
            Some(other) => {
                return Err(format!("colour space {}", String::from_utf8_lossy(other)));
            }
            None => 0,
        },
        _ => 0,
    };
    match count {
        1 => Ok(1),
        3 => Ok(3),
        other => Err(format!("{other} colour components")),
    }
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => document.get_object(*id).unwrap_or(object),
        other => other,
    }
}
