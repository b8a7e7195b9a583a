//! Frame encoding into output blobs.

use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::config::OutputFormat;
use crate::foundation::error::{FrameError, FrameResult};
use crate::render::backend::FrameRgba;

/// Fixed JPEG quality, the integer form of the 0.95 quality factor.
pub const JPEG_QUALITY: u8 = 95;

/// An encoded output image. Ownership transfers to the export boundary;
/// the engine holds no reference afterward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResult {
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// Encoding used, which also fixes the MIME type.
    pub format: OutputFormat,
}

impl RenderResult {
    /// MIME type of the blob, chosen solely from the format.
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }
}

/// Encode a rendered frame into the configured output format.
pub fn encode_frame(frame: &FrameRgba, format: OutputFormat) -> FrameResult<RenderResult> {
    let straight = if frame.premultiplied {
        unpremultiply_rgba8(&frame.data)
    } else {
        frame.data.clone()
    };

    let bytes = match format {
        OutputFormat::Png => {
            let img = image::RgbaImage::from_raw(frame.width, frame.height, straight)
                .ok_or_else(|| FrameError::encode("frame buffer does not match dimensions"))?;
            let mut buf = Vec::new();
            image::DynamicImage::ImageRgba8(img)
                .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                .map_err(|e| FrameError::encode(format!("png encode failed: {e}")))?;
            buf
        }
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel. Dropping it from the premultiplied
            // data composites the frame over black, which is what a canvas
            // JPEG export does.
            let rgb: Vec<u8> = frame
                .data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            let mut buf = Vec::new();
            let mut cursor = Cursor::new(&mut buf);
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
            image::ImageEncoder::write_image(
                encoder,
                &rgb,
                frame.width,
                frame.height,
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| FrameError::encode(format!("jpeg encode failed: {e}")))?;
            buf
        }
    };

    Ok(RenderResult { bytes, format })
}

/// Convert premultiplied RGBA8 to straight alpha with rounding.
fn unpremultiply_rgba8(premul: &[u8]) -> Vec<u8> {
    let mut out = premul.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in 0..3 {
            let v = (u16::from(px[c]) * 255 + a / 2) / a;
            px[c] = v.min(255) as u8;
        }
    }
    out
}
