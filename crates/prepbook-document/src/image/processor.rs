// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode embedded rasters, convert to grayscale and scale
// brightness. Operates on in-memory images using the `image` crate.

use image::{DynamicImage, GrayImage, RgbImage};
use prepbook_core::error::{PrepbookError, Result};
use tracing::{debug, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// Each method consumes `self` and returns a new `ImageProcessor` wrapping the
/// transformed image, enabling method chaining.
///
/// ```ignore
/// let samples = ImageProcessor::from_bytes(&jpeg)?
///     .grayscale()
///     .scale_brightness(1.4)
///     .into_luma_bytes();
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| PrepbookError::ImageError(format!("failed to decode image: {err}")))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap unfiltered 8-bit samples with 1 (gray) or 3 (RGB) components per pixel.
    pub fn from_samples(width: u32, height: u32, components: u8, samples: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(components as usize))
            .ok_or_else(|| {
                PrepbookError::ImageError(format!("image of {width}x{height}x{components} is too large"))
            })?;
        if samples.len() < expected {
            return Err(PrepbookError::ImageError(format!(
                "expected {expected} samples for {width}x{height}x{components}, found {}",
                samples.len()
            )));
        }
        let mut samples = samples;
        samples.truncate(expected);

        let image = match components {
            1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
            other => {
                return Err(PrepbookError::ImageError(format!(
                    "unsupported component count {other}"
                )));
            }
        };
        image
            .map(|image| Self { image })
            .ok_or_else(|| PrepbookError::ImageError("sample buffer does not fit image".into()))
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Convert the image to grayscale (luma).
    pub fn grayscale(self) -> Self {
        Self {
            image: DynamicImage::ImageLuma8(self.image.to_luma8()),
        }
    }

    /// Multiply every sample by `factor`, clamping to 0..=255.
    ///
    /// Values above 1.0 lighten, below 1.0 darken. Alpha is left alone.
    #[instrument(skip(self))]
    pub fn scale_brightness(self, factor: f32) -> Self {
        let image = match self.image {
            DynamicImage::ImageLuma8(mut gray) => {
                for sample in gray.iter_mut() {
                    *sample = scale_sample(*sample, factor);
                }
                DynamicImage::ImageLuma8(gray)
            }
            other => {
                let mut rgba = other.to_rgba8();
                for pixel in rgba.pixels_mut() {
                    let image::Rgba([r, g, b, a]) = *pixel;
                    *pixel = image::Rgba([
                        scale_sample(r, factor),
                        scale_sample(g, factor),
                        scale_sample(b, factor),
                        a,
                    ]);
                }
                DynamicImage::ImageRgba8(rgba)
            }
        };
        Self { image }
    }

    // -- Output ---------------------------------------------------------------

    /// Row-major 8-bit luma samples of the current image.
    pub fn into_luma_bytes(self) -> Vec<u8> {
        self.image.into_luma8().into_raw()
    }
}

/// Scale one 8-bit sample by `factor`, rounded and clamped to 0..=255.
pub fn scale_sample(sample: u8, factor: f32) -> u8 {
    (sample as f32 * factor).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_of_rgb_samples() {
        let processor = ImageProcessor::from_samples(2, 1, 3, vec![255, 255, 255, 0, 0, 0]).unwrap();
        assert_eq!(processor.width(), 2);
        assert_eq!(processor.height(), 1);
        assert_eq!(processor.grayscale().into_luma_bytes(), vec![255, 0]);
    }

    #[test]
    fn brightness_scales_and_clamps() {
        let processor = ImageProcessor::from_samples(3, 1, 1, vec![0, 100, 200]).unwrap();
        let out = processor.scale_brightness(1.4).into_luma_bytes();
        assert_eq!(out, vec![0, 140, 255]);
    }

    #[test]
    fn factor_below_one_darkens() {
        assert_eq!(scale_sample(200, 0.5), 100);
        assert_eq!(scale_sample(10, 0.0), 0);
    }

    #[test]
    fn short_sample_buffer_is_rejected() {
        assert!(ImageProcessor::from_samples(4, 4, 1, vec![0; 3]).is_err());
        assert!(ImageProcessor::from_samples(1, 1, 4, vec![0; 4]).is_err());
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        let Err(err) = ImageProcessor::from_samples(u32::MAX, u32::MAX, 3, Vec::new()) else {
            panic!("oversized image accepted");
        };
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn decodes_encoded_png() {
        let mut png = Vec::new();
        DynamicImage::ImageLuma8(GrayImage::from_raw(1, 1, vec![50]).unwrap())
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let luma = ImageProcessor::from_bytes(&png).unwrap().grayscale().into_luma_bytes();
        assert_eq!(luma, vec![50]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            ImageProcessor::from_bytes(b"not an image"),
            Err(PrepbookError::ImageError(_))
        ));
    }
}
