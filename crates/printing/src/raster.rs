//! Optional raster capability: decoding in-memory images for blitting.
//!
//! Decoding is backed by the `image` crate when the `raster` feature is
//! enabled. Without it [`detect`] reports no capability and jobs refuse
//! image calls.

use thiserror::Error;

/// Decoded image in 8-bit RGBA, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Error)]
#[error("failed to decode image: {0}")]
pub struct RasterError(pub String);

/// Turns encoded image bytes into a [`Raster`].
pub trait RasterDecoder {
    fn decode(&self, data: &[u8]) -> Result<Raster, RasterError>;
}

/// Decoder built on the `image` crate (PNG).
#[cfg(feature = "raster")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

#[cfg(feature = "raster")]
impl RasterDecoder for ImageDecoder {
    fn decode(&self, data: &[u8]) -> Result<Raster, RasterError> {
        let image =
            image::load_from_memory(data).map_err(|err| RasterError(err.to_string()))?;
        let rgba = image.to_rgba8();
        Ok(Raster {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        })
    }
}

/// Returns the decoder compiled into this build, if any.
#[cfg(feature = "raster")]
pub fn detect() -> Option<Box<dyn RasterDecoder>> {
    Some(Box::new(ImageDecoder))
}

#[cfg(not(feature = "raster"))]
pub fn detect() -> Option<Box<dyn RasterDecoder>> {
    None
}

#[cfg(all(test, feature = "raster"))]
mod tests {
    use super::*;
    use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};

    fn encode_png(width: u32, height: u32) -> Vec<u8> {
        let pixels = vec![200u8; (width * height * 4) as usize];
        let mut data = Vec::new();
        PngEncoder::new(&mut data)
            .write_image(&pixels, width, height, ColorType::Rgba8)
            .unwrap();
        data
    }

    #[test]
    fn decodes_png_to_rgba() {
        let raster = ImageDecoder.decode(&encode_png(3, 2)).unwrap();
        assert_eq!((raster.width, raster.height), (3, 2));
        assert_eq!(raster.pixels.len(), 3 * 2 * 4);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = ImageDecoder.decode(b"not an image").unwrap_err();
        assert!(err.to_string().starts_with("failed to decode image"));
    }

    #[test]
    fn detect_reports_the_builtin_decoder() {
        assert!(detect().is_some());
    }
}
