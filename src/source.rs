//! Source image preparation.
//!
//! The interactive path decodes encoded file bytes directly; the worker path
//! receives a [`RawImage`] (straight-alpha pixel buffer) because the worker
//! context has no decoding capability of its own. Both constructions funnel
//! through the same premultiplication, so renders are pixel-identical.

use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{FrameError, FrameResult};

/// Prepared raster image in premultiplied RGBA8 form, read-only per render.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub(crate) rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Build from a straight-alpha RGBA8 buffer with explicit dimensions.
    ///
    /// This is the worker-path constructor; the buffer length must be
    /// exactly `width * height * 4`.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> FrameResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| FrameError::decode("image dimensions overflow"))?;
        if rgba8.len() != expected {
            return Err(FrameError::decode(format!(
                "pixel buffer length {} does not match {width}x{height} RGBA8",
                rgba8.len()
            )));
        }
        premultiply_rgba8_in_place(&mut rgba8);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8),
        })
    }

    /// Borrow the premultiplied pixel bytes.
    pub fn as_premul_bytes(&self) -> &[u8] {
        &self.rgba8_premul
    }
}

/// Straight-alpha RGBA8 pixel buffer, the worker protocol's image payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major straight-alpha RGBA8 bytes, length `width * height * 4`.
    pub rgba8: Vec<u8>,
}

impl RawImage {
    /// Premultiply into a [`PreparedImage`] for rendering.
    pub fn prepare(self) -> FrameResult<PreparedImage> {
        PreparedImage::from_straight_rgba8(self.width, self.height, self.rgba8)
    }
}

/// Decode encoded image bytes (any format the host's image subsystem knows)
/// into a premultiplied [`PreparedImage`].
pub fn decode_image(bytes: &[u8]) -> FrameResult<PreparedImage> {
    let raw = decode_raw_rgba8(bytes)?;
    raw.prepare()
}

/// Decode encoded image bytes into a straight-alpha [`RawImage`].
///
/// Used by the batch shell, which hands raw buffers (not file bytes) to the
/// worker context.
pub fn decode_raw_rgba8(bytes: &[u8]) -> FrameResult<RawImage> {
    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| FrameError::decode(format!("{e:#}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(RawImage {
        width,
        height,
        rgba8: rgba.into_raw(),
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png_bytes(rgba: Vec<u8>, w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_raw(w, h, rgba).unwrap();
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn decode_image_premultiplies() {
        let buf = png_bytes(vec![100, 50, 200, 128], 1, 1);
        let prepared = decode_image(&buf).unwrap();
        assert_eq!(prepared.width, 1);
        assert_eq!(prepared.height, 1);
        assert_eq!(
            prepared.as_premul_bytes(),
            &[
                ((100u16 * 128 + 127) / 255) as u8,
                ((50u16 * 128 + 127) / 255) as u8,
                ((200u16 * 128 + 127) / 255) as u8,
                128u8
            ]
        );
    }

    #[test]
    fn decode_paths_agree() {
        // Decoding directly and decoding-to-raw-then-preparing must produce
        // the same pixels; the dual-context contract depends on it.
        let buf = png_bytes(vec![10, 20, 30, 255, 40, 50, 60, 64], 2, 1);
        let direct = decode_image(&buf).unwrap();
        let via_raw = decode_raw_rgba8(&buf).unwrap().prepare().unwrap();
        assert_eq!(direct.as_premul_bytes(), via_raw.as_premul_bytes());
    }

    #[test]
    fn garbage_bytes_fail_with_decode_error() {
        let err = decode_image(&[0u8, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, FrameError::Decode(_)));
    }

    #[test]
    fn raw_buffer_length_is_checked() {
        let err = PreparedImage::from_straight_rgba8(2, 2, vec![0u8; 3]).unwrap_err();
        assert!(matches!(err, FrameError::Decode(_)));
    }

    #[test]
    fn zero_alpha_pixels_are_zeroed() {
        let img = PreparedImage::from_straight_rgba8(1, 1, vec![255, 255, 255, 0]).unwrap();
        assert_eq!(img.as_premul_bytes(), &[0, 0, 0, 0]);
    }
}
