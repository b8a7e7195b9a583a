//! The frame rendering engine.
//!
//! One pure pipeline, shared by both execution contexts: the interactive
//! preview and the background worker both go through [`render_blob`], which
//! is what guarantees byte-identical output between them.

pub mod backend;
pub mod cpu;

use crate::config::FrameConfig;
use crate::encode::{RenderResult, encode_frame};
use crate::foundation::error::FrameResult;
use crate::source::PreparedImage;
use backend::RenderBackend;

/// Render one source image into one frame and encode it.
pub fn render_blob(
    image: &PreparedImage,
    config: &FrameConfig,
    backend: &mut dyn RenderBackend,
) -> FrameResult<RenderResult> {
    let frame = backend.render_framed(image, config)?;
    encode_frame(&frame, config.format)
}
