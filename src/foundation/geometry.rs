//! Placement and path math for the frame compositor.

use crate::config::FitMode;

pub use kurbo::{BezPath, Point, Rect};

/// Compute the placement rectangle for a source image inside an image area.
///
/// Both fit modes preserve the source aspect ratio exactly and center the
/// result on both axes. `Contain` never exceeds the area; `Cover` fills the
/// area and may exceed it on exactly one axis (callers clip at the frame
/// level, not the area level). A degenerate image or area yields an empty
/// rectangle at the area center.
pub fn resolve_placement(image_w: f64, image_h: f64, area: Rect, fit: FitMode) -> Rect {
    let area_w = area.width();
    let area_h = area.height();
    if image_w <= 0.0 || image_h <= 0.0 || area_w <= 0.0 || area_h <= 0.0 {
        let c = area.center();
        return Rect::new(c.x, c.y, c.x, c.y);
    }

    let image_aspect = image_w / image_h;
    let area_aspect = area_w / area_h;

    let (w, h) = match fit {
        FitMode::Contain => {
            if image_aspect > area_aspect {
                (area_w, area_w / image_aspect)
            } else {
                (area_h * image_aspect, area_h)
            }
        }
        FitMode::Cover => {
            if image_aspect > area_aspect {
                (area_h * image_aspect, area_h)
            } else {
                (area_w, area_w / image_aspect)
            }
        }
    };

    let x = area.x0 + (area_w - w) / 2.0;
    let y = area.y0 + (area_h - h) / 2.0;
    Rect::new(x, y, x + w, y + h)
}

/// Clamp a requested corner radius to half of the rectangle's smaller side.
pub fn clamp_radius(radius: f64, w: f64, h: f64) -> f64 {
    radius.min(w / 2.0).min(h / 2.0).max(0.0)
}

/// Circle-to-bezier control point distance factor for a quarter arc.
const KAPPA: f64 = 0.552_284_749_830_793_4;

/// Build a rounded-rectangle path with a pre-clamped radius.
///
/// Construction order is deterministic: the path starts at the end of the
/// top-left arc and proceeds clockwise (top edge, top-right arc, right edge,
/// bottom-right arc, bottom edge, bottom-left arc, left edge, closing
/// top-left arc). The ordering fixes the stroke dash phase; fills are
/// order-independent. Callers use [`rect_path`] when the effective radius
/// is zero.
pub fn rounded_rect_path(rect: Rect, radius: f64) -> BezPath {
    let r = clamp_radius(radius, rect.width(), rect.height());
    let (x0, y0, x1, y1) = (rect.x0, rect.y0, rect.x1, rect.y1);
    let k = KAPPA * r;

    let mut p = BezPath::new();
    p.move_to((x0 + r, y0));
    p.line_to((x1 - r, y0));
    p.curve_to((x1 - r + k, y0), (x1, y0 + r - k), (x1, y0 + r));
    p.line_to((x1, y1 - r));
    p.curve_to((x1, y1 - r + k), (x1 - r + k, y1), (x1 - r, y1));
    p.line_to((x0 + r, y1));
    p.curve_to((x0 + r - k, y1), (x0, y1 - r + k), (x0, y1 - r));
    p.line_to((x0, y0 + r));
    p.curve_to((x0, y0 + r - k), (x0 + r - k, y0), (x0 + r, y0));
    p.close_path();
    p
}

/// Build a plain rectangle path with the same clockwise winding as
/// [`rounded_rect_path`].
pub fn rect_path(rect: Rect) -> BezPath {
    let mut p = BezPath::new();
    p.move_to((rect.x0, rect.y0));
    p.line_to((rect.x1, rect.y0));
    p.line_to((rect.x1, rect.y1));
    p.line_to((rect.x0, rect.y1));
    p.close_path();
    p
}

/// Extra working-canvas margin per side needed so shadow blur never clips:
/// `ceil(spread + max(2, spread / 5))`.
pub fn shadow_extent(spread: u32) -> u32 {
    let s = f64::from(spread);
    (s + (s / 5.0).max(2.0)).ceil() as u32
}
