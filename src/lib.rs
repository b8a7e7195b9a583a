//! enframe applies a decorative frame to a raster image (background, padding,
//! rounded corners, drop shadow, border) and encodes the result as PNG or
//! JPEG, entirely in-process.
//!
//! The public API is built around one pure rendering pipeline and the two
//! execution contexts that share it:
//!
//! - Decode a source once into a [`PreparedImage`]
//! - Describe the frame with a [`FrameConfig`]
//! - Render interactively through a [`PreviewSession`], or in bulk through
//!   [`process_batch`] / a [`FrameWorker`]
//! - Hand finished [`ExportItem`]s to an [`ExportSink`]
//!
//! Both contexts produce byte-identical output for the same inputs.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Frame configuration boundary model.
pub mod config;
/// Frame encoding into output blobs.
pub mod encode;
/// Export boundary: naming and sinks.
pub mod export;
/// The rendering engine and its backends.
pub mod render;
/// Interactive preview and background worker contexts.
pub mod session;
/// Source image decoding and preparation.
pub mod source;

pub use kurbo::{BezPath, Point, Rect};

pub use crate::foundation::color::{
    ColorDef, FALLBACK_COLOR, is_valid_color, parse_color, sanitize_color,
};
pub use crate::foundation::error::{FrameError, FrameResult};
pub use crate::foundation::geometry::{
    clamp_radius, rect_path, resolve_placement, rounded_rect_path, shadow_extent,
};

pub use crate::config::{
    BackgroundKind, BorderStyle, FitMode, FrameConfig, GradientDirection, OutputFormat,
};
pub use crate::encode::{JPEG_QUALITY, RenderResult, encode_frame};
pub use crate::export::naming::{sanitize_stem, suggested_filename};
pub use crate::export::sink::{DirectoryExport, ExportItem, ExportSink, InMemoryExport, export_all};
pub use crate::render::backend::{BackendKind, FrameRgba, RenderBackend, create_backend};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::render_blob;
pub use crate::session::batch::{
    BatchItemError, BatchOutcome, BatchProgress, SourceFile, process_batch, process_batch_with,
};
pub use crate::session::preview::{Debouncer, PREVIEW_DEBOUNCE, PreviewSession, RenderTicket};
pub use crate::session::worker::{FrameWorker, WorkRequest, WorkResponse, WorkerProgress};
pub use crate::source::{PreparedImage, RawImage, decode_image, decode_raw_rgba8};
