//! The rendering backend abstraction and its frame buffer type.
//!
//! Defines [`RenderBackend`], the trait every compositor implements, and
//! [`FrameRgba`], the premultiplied-alpha pixel buffer it produces.

use crate::config::FrameConfig;
use crate::foundation::error::FrameResult;
use crate::source::PreparedImage;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**; the `premultiplied` flag makes this
/// explicit at API boundaries. Dimensions always equal the configured frame
/// size; any shadow margin has already been cropped away.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// A renderer that composites one source image into one frame.
///
/// Both execution contexts (interactive preview and background worker) call
/// the same implementation, which is what guarantees byte-identical output
/// between them.
pub trait RenderBackend {
    /// Validate the configuration, composite all frame layers, and return
    /// the finished frame at exactly `config.width x config.height`.
    fn render_framed(
        &mut self,
        image: &PreparedImage,
        config: &FrameConfig,
    ) -> FrameResult<FrameRgba>;
}

/// Available backend kinds.
///
/// - `Cpu` is always available.
#[derive(Clone, Copy, Debug)]
pub enum BackendKind {
    /// CPU raster backend powered by `vello_cpu`.
    Cpu,
}

/// Create a rendering backend implementation.
pub fn create_backend(kind: BackendKind) -> FrameResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new())),
    }
}
