//! CPU compositor backed by `vello_cpu`.
//!
//! One render walks a fixed layer stack: background fill, optional drop
//! shadow, the clipped/scaled source image, optional border stroke, then a
//! crop back to the requested frame size when a shadow margin was added.
//! Every render owns its working surfaces; only the rasterizer context,
//! blur kernels, and blur scratch are reused across sequential renders.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{BackgroundKind, FrameConfig, GradientDirection};
use crate::foundation::color::{ColorDef, parse_color};
use crate::foundation::error::{FrameError, FrameResult};
use crate::foundation::geometry::{
    clamp_radius, rect_path, resolve_placement, rounded_rect_path, shadow_extent,
};
use crate::render::backend::{FrameRgba, RenderBackend};
use crate::source::PreparedImage;
use kurbo::{Cap, Join, Rect, Stroke, StrokeOpts};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct BlurKernelKey {
    radius_px: u32,
    sigma_bits: u32,
}

/// CPU rendering backend.
pub struct CpuBackend {
    ctx: Option<vello_cpu::RenderContext>,
    blur_kernel_cache: HashMap<BlurKernelKey, Arc<Vec<u32>>>,
    blur_scratch: Vec<u8>,
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuBackend {
    /// Construct a backend with empty caches.
    pub fn new() -> Self {
        Self {
            ctx: None,
            blur_kernel_cache: HashMap::new(),
            blur_scratch: Vec::new(),
        }
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> FrameResult<R>,
    ) -> FrameResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    /// Rasterize a solid-colored path into a fresh canvas-sized pixmap.
    fn rasterize_path(
        &mut self,
        width: u16,
        height: u16,
        path: &kurbo::BezPath,
        rgba_straight: [u8; 4],
    ) -> FrameResult<vello_cpu::Pixmap> {
        let mut pm = vello_cpu::Pixmap::new(width, height);
        let cpu_path = bezpath_to_cpu(path);
        self.with_ctx_mut(width, height, |ctx| {
            ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                rgba_straight[0],
                rgba_straight[1],
                rgba_straight[2],
                rgba_straight[3],
            ));
            ctx.fill_path(&cpu_path);
            ctx.flush();
            ctx.render_to_pixmap(&mut pm);
            Ok(())
        })?;
        Ok(pm)
    }

    /// Rasterize the source image scaled into its placement rectangle.
    fn rasterize_image(
        &mut self,
        width: u16,
        height: u16,
        image: &PreparedImage,
        placement: Rect,
    ) -> FrameResult<vello_cpu::Pixmap> {
        let paint = rgba_premul_to_image(image.as_premul_bytes(), image.width, image.height)?;
        let sx = placement.width() / f64::from(image.width);
        let sy = placement.height() / f64::from(image.height);
        let transform = kurbo::Affine::translate((placement.x0, placement.y0))
            * kurbo::Affine::scale_non_uniform(sx, sy);
        let src_rect =
            vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(image.width), f64::from(image.height));

        let mut pm = vello_cpu::Pixmap::new(width, height);
        self.with_ctx_mut(width, height, |ctx| {
            ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(paint);
            ctx.fill_rect(&src_rect);
            ctx.flush();
            ctx.render_to_pixmap(&mut pm);
            Ok(())
        })?;
        Ok(pm)
    }

    fn kernel_for(&mut self, radius_px: u32, sigma: f32) -> FrameResult<Arc<Vec<u32>>> {
        let key = BlurKernelKey {
            radius_px,
            sigma_bits: sigma.to_bits(),
        };
        if let Some(k) = self.blur_kernel_cache.get(&key).cloned() {
            return Ok(k);
        }
        let k = Arc::new(gaussian_kernel_q16(radius_px, sigma)?);
        self.blur_kernel_cache.insert(key, k.clone());
        Ok(k)
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_shadow(
        &mut self,
        canvas: &mut [u8],
        canvas_w: u16,
        canvas_h: u16,
        placement: Rect,
        radius: f64,
        spread: u32,
        extent: u32,
    ) -> FrameResult<()> {
        // Shadow puppet: rasterize the opaque black placement silhouette,
        // blur it, and lay the halo under where the image will be drawn.
        let path = if radius > 0.0 {
            rounded_rect_path(placement, radius)
        } else {
            rect_path(placement)
        };
        let silhouette = self.rasterize_path(canvas_w, canvas_h, &path, [0, 0, 0, 255])?;
        let src = silhouette.data_as_u8_slice();

        if spread == 0 {
            // No blur requested; the sharp silhouette sits exactly under the
            // image and only matters if the image has transparency.
            return premul_over_in_place(canvas, src);
        }

        let kernel = self.kernel_for(extent, spread as f32 * 0.5)?;
        let mut blurred = vec![0u8; src.len()];
        self.blur_scratch.resize(src.len(), 0);
        blur_rgba8_premul_q16(
            src,
            &mut blurred,
            &mut self.blur_scratch,
            u32::from(canvas_w),
            u32::from(canvas_h),
            &kernel,
        );
        premul_over_in_place(canvas, &blurred)
    }

    fn draw_image(
        &mut self,
        canvas: &mut [u8],
        canvas_w: u16,
        canvas_h: u16,
        image: &PreparedImage,
        placement: Rect,
        radius: f64,
    ) -> FrameResult<()> {
        let mut layer = self.rasterize_image(canvas_w, canvas_h, image, placement)?;

        if radius > 0.0 {
            // Clip to the rounded placement shape by alpha-masking the layer
            // before compositing.
            let mask = self.rasterize_path(
                canvas_w,
                canvas_h,
                &rounded_rect_path(placement, radius),
                [255, 255, 255, 255],
            )?;
            mask_alpha_in_place(layer.data_as_u8_slice_mut(), mask.data_as_u8_slice());
        }

        premul_over_in_place(canvas, layer.data_as_u8_slice())
    }

    fn draw_border(
        &mut self,
        canvas: &mut [u8],
        canvas_w: u16,
        canvas_h: u16,
        placement: Rect,
        radius: f64,
        config: &FrameConfig,
    ) -> FrameResult<()> {
        let shape = if radius > 0.0 {
            rounded_rect_path(placement, radius)
        } else {
            rect_path(placement)
        };

        let mut style = Stroke::new(f64::from(config.border_width))
            .with_join(Join::Miter)
            .with_caps(Cap::Butt);
        let dashes = config.border_style.dash_pattern();
        if !dashes.is_empty() {
            style = style.with_dashes(0.0, dashes.iter().copied());
        }
        let outline = kurbo::stroke(
            shape.elements().iter().copied(),
            &style,
            &StrokeOpts::default(),
            0.25,
        );

        let color = parse_color(&config.border_color)
            .map_err(|_| FrameError::invalid_color("borderColor", &config.border_color))?;
        let layer =
            self.rasterize_path(canvas_w, canvas_h, &outline, color.to_rgba8_straight())?;
        premul_over_in_place(canvas, layer.data_as_u8_slice())
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(skip(self, image, config), fields(w = config.width, h = config.height))]
    fn render_framed(
        &mut self,
        image: &PreparedImage,
        config: &FrameConfig,
    ) -> FrameResult<FrameRgba> {
        config.validate()?;
        config.validate_colors()?;

        let extent = if config.shadow {
            shadow_extent(config.shadow_spread)
        } else {
            0
        };
        let margin = extent
            .checked_mul(2)
            .ok_or_else(|| FrameError::surface_unavailable("shadow margin overflow"))?;
        let canvas_w = config
            .width
            .checked_add(margin)
            .ok_or_else(|| FrameError::surface_unavailable("canvas width overflow"))?;
        let canvas_h = config
            .height
            .checked_add(margin)
            .ok_or_else(|| FrameError::surface_unavailable("canvas height overflow"))?;
        let cw16: u16 = canvas_w.try_into().map_err(|_| {
            FrameError::surface_unavailable(format!("canvas width {canvas_w} exceeds surface limit"))
        })?;
        let ch16: u16 = canvas_h.try_into().map_err(|_| {
            FrameError::surface_unavailable(format!(
                "canvas height {canvas_h} exceeds surface limit"
            ))
        })?;

        let mut canvas = vec![0u8; (canvas_w as usize) * (canvas_h as usize) * 4];

        let off = f64::from(extent);
        let frame_rect = Rect::new(
            off,
            off,
            off + f64::from(config.width),
            off + f64::from(config.height),
        );
        let base_area = config.image_area();
        let area = Rect::new(
            base_area.x0 + off,
            base_area.y0 + off,
            base_area.x1 + off,
            base_area.y1 + off,
        );

        fill_background(&mut canvas, canvas_w, canvas_h, frame_rect, area, config)?;

        let placement = resolve_placement(
            f64::from(image.width),
            f64::from(image.height),
            area,
            config.fit,
        );
        let radius = clamp_radius(
            f64::from(config.border_radius),
            placement.width(),
            placement.height(),
        );

        // A degenerate image area produces a background-only frame.
        if placement.width() > 0.0 && placement.height() > 0.0 {
            if config.shadow {
                self.draw_shadow(
                    &mut canvas,
                    cw16,
                    ch16,
                    placement,
                    radius,
                    config.shadow_spread,
                    extent,
                )?;
            }
            self.draw_image(&mut canvas, cw16, ch16, image, placement, radius)?;
            if config.border {
                self.draw_border(&mut canvas, cw16, ch16, placement, radius, config)?;
            }
        }

        let data = if extent > 0 {
            crop_margin(&canvas, canvas_w, extent, config.width, config.height)
        } else {
            canvas
        };

        Ok(FrameRgba {
            width: config.width,
            height: config.height,
            data,
            premultiplied: true,
        })
    }
}

/// Fill the full frame rectangle (never the rounded shape) with the
/// configured solid color or gradient.
fn fill_background(
    canvas: &mut [u8],
    canvas_w: u32,
    canvas_h: u32,
    frame_rect: Rect,
    area: Rect,
    config: &FrameConfig,
) -> FrameResult<()> {
    match config.background_kind {
        BackgroundKind::Solid => {
            let c = parse_color(&config.background)
                .map_err(|_| FrameError::invalid_color("background", &config.background))?;
            fill_rect_premul(canvas, canvas_w, canvas_h, frame_rect, c.to_rgba8_premul());
            Ok(())
        }
        BackgroundKind::Gradient => {
            let start = parse_color(&config.gradient_start).map_err(|_| {
                FrameError::invalid_color("backgroundGradientStart", &config.gradient_start)
            })?;
            let end = parse_color(&config.gradient_end).map_err(|_| {
                FrameError::invalid_color("backgroundGradientEnd", &config.gradient_end)
            })?;
            if !start.is_renderable() || !end.is_renderable() {
                return Err(FrameError::gradient_color(
                    &config.gradient_start,
                    &config.gradient_end,
                ));
            }
            fill_gradient_premul(
                canvas,
                canvas_w,
                canvas_h,
                frame_rect,
                area,
                config.gradient_direction,
                start,
                end,
            );
            Ok(())
        }
    }
}

fn fill_rect_premul(canvas: &mut [u8], canvas_w: u32, canvas_h: u32, rect: Rect, px: [u8; 4]) {
    let (x0, y0, x1, y1) = clamp_rect_to_canvas(rect, canvas_w, canvas_h);
    for y in y0..y1 {
        let row = (y * canvas_w as usize + x0) * 4;
        for x in 0..(x1 - x0) {
            canvas[row + x * 4..row + x * 4 + 4].copy_from_slice(&px);
        }
    }
}

/// Rasterize a two-stop linear gradient over the frame rectangle.
///
/// The gradient line spans the image area on the configured axis; pixels
/// outside the line's span take the clamped end colors, so the fill still
/// covers the whole frame.
#[allow(clippy::too_many_arguments)]
fn fill_gradient_premul(
    canvas: &mut [u8],
    canvas_w: u32,
    canvas_h: u32,
    frame_rect: Rect,
    area: Rect,
    direction: GradientDirection,
    start: ColorDef,
    end: ColorDef,
) {
    let (p0, dx, dy) = match direction {
        GradientDirection::Horizontal => ((area.x0, area.y0), area.width(), 0.0),
        GradientDirection::Vertical => ((area.x0, area.y0), 0.0, area.height()),
        GradientDirection::Diagonal => ((area.x0, area.y0), area.width(), area.height()),
    };
    let len_sq = dx * dx + dy * dy;

    let (x0, y0, x1, y1) = clamp_rect_to_canvas(frame_rect, canvas_w, canvas_h);
    for y in y0..y1 {
        let py = y as f64 + 0.5;
        let row = y * canvas_w as usize;
        for x in x0..x1 {
            let px = x as f64 + 0.5;
            let t = if len_sq > 0.0 {
                (((px - p0.0) * dx + (py - p0.1) * dy) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let c = ColorDef::rgba(
                start.r + (end.r - start.r) * t,
                start.g + (end.g - start.g) * t,
                start.b + (end.b - start.b) * t,
                start.a + (end.a - start.a) * t,
            );
            let idx = (row + x) * 4;
            canvas[idx..idx + 4].copy_from_slice(&c.to_rgba8_premul());
        }
    }
}

fn clamp_rect_to_canvas(rect: Rect, canvas_w: u32, canvas_h: u32) -> (usize, usize, usize, usize) {
    let x0 = rect.x0.floor().max(0.0) as usize;
    let y0 = rect.y0.floor().max(0.0) as usize;
    let x1 = (rect.x1.ceil().max(0.0) as usize).min(canvas_w as usize);
    let y1 = (rect.y1.ceil().max(0.0) as usize).min(canvas_h as usize);
    (x0.min(x1), y0.min(y1), x1, y1)
}

/// Copy the `width x height` sub-rectangle starting at `(extent, extent)`
/// out of the oversized working canvas.
fn crop_margin(canvas: &[u8], canvas_w: u32, extent: u32, width: u32, height: u32) -> Vec<u8> {
    let mut out = vec![0u8; (width as usize) * (height as usize) * 4];
    let stride = canvas_w as usize * 4;
    let row_len = width as usize * 4;
    for row in 0..height as usize {
        let src = (extent as usize + row) * stride + extent as usize * 4;
        let dst = row * row_len;
        out[dst..dst + row_len].copy_from_slice(&canvas[src..src + row_len]);
    }
    out
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> FrameResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FrameError::surface_unavailable("image width exceeds surface limit"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FrameError::surface_unavailable("image height exceeds surface limit"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(FrameError::surface_unavailable("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> FrameResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

/// Multiply a premultiplied layer by a mask's alpha channel, in place.
fn mask_alpha_in_place(layer: &mut [u8], mask: &[u8]) {
    debug_assert_eq!(layer.len(), mask.len());
    for (d, m) in layer.chunks_exact_mut(4).zip(mask.chunks_exact(4)) {
        let w = u16::from(m[3]);
        d[0] = mul_div255(u16::from(d[0]), w);
        d[1] = mul_div255(u16::from(d[1]), w);
        d[2] = mul_div255(u16::from(d[2]), w);
        d[3] = mul_div255(u16::from(d[3]), w);
    }
}

/// Porter-Duff source-over for equal-length premultiplied RGBA8 buffers.
fn premul_over_in_place(dst: &mut [u8], src: &[u8]) -> FrameResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FrameError::surface_unavailable(
            "premul_over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = s[3];
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - u16::from(sa);
        d[3] = sa.saturating_add(mul_div255(u16::from(d[3]), inv));
        for c in 0..3 {
            d[c] = s[c].saturating_add(mul_div255(u16::from(d[c]), inv));
        }
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> FrameResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FrameError::validation("blur sigma must be finite and > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(FrameError::validation("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let target: i64 = 65536;
    let delta = target - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let mid_val = i64::from(weights[mid]);
        let new_mid = (mid_val + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn blur_rgba8_premul_q16(
    src: &[u8],
    dst: &mut [u8],
    tmp: &mut [u8],
    width: u32,
    height: u32,
    kernel_q16: &[u32],
) {
    if kernel_q16.len() == 1 {
        dst.copy_from_slice(src);
        return;
    }

    horizontal_blur_q16(src, tmp, width, height, kernel_q16);
    vertical_blur_q16(tmp, dst, width, height, kernel_q16);
}

fn horizontal_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let dx = ki as i32 - radius;
                let sx = (x + dx).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let dy = ki as i32 - radius;
                let sy = (y + dy).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BorderStyle, FitMode, OutputFormat};

    fn flat_image(w: u32, h: u32, rgba: [u8; 4]) -> PreparedImage {
        PreparedImage::from_straight_rgba8(w, h, rgba.repeat((w * h) as usize)).unwrap()
    }

    fn pixel(frame: &FrameRgba, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * frame.width + x) * 4) as usize;
        frame.data[idx..idx + 4].try_into().unwrap()
    }

    fn base_config() -> FrameConfig {
        FrameConfig {
            width: 64,
            height: 64,
            background: "#ff0000".to_owned(),
            ..FrameConfig::default()
        }
    }

    #[test]
    fn background_covers_frame_and_image_lands_in_area() {
        let image = flat_image(8, 8, [0, 0, 255, 255]);
        let config = FrameConfig {
            padding: 16,
            ..base_config()
        };
        let mut backend = CpuBackend::new();
        let frame = backend.render_framed(&image, &config).unwrap();

        assert_eq!(frame.width, 64);
        assert_eq!(frame.height, 64);
        // Padding band keeps the background color.
        assert_eq!(pixel(&frame, 2, 2), [255, 0, 0, 255]);
        // Area center carries the image.
        assert_eq!(pixel(&frame, 32, 32), [0, 0, 255, 255]);
    }

    #[test]
    fn shadow_margin_is_always_cropped_back() {
        let image = flat_image(4, 4, [0, 255, 0, 255]);
        for spread in [0u32, 3, 25, 100] {
            let config = FrameConfig {
                shadow: true,
                shadow_spread: spread,
                padding: 8,
                ..base_config()
            };
            let mut backend = CpuBackend::new();
            let frame = backend.render_framed(&image, &config).unwrap();
            assert_eq!((frame.width, frame.height), (64, 64), "spread {spread}");
            assert_eq!(frame.data.len(), 64 * 64 * 4);
        }
    }

    #[test]
    fn renders_are_deterministic() {
        let image = flat_image(10, 6, [12, 34, 56, 200]);
        let config = FrameConfig {
            padding: 6,
            border_radius: 9,
            shadow: true,
            shadow_spread: 4,
            border: true,
            border_color: "#00ff00".to_owned(),
            border_width: 2,
            border_style: BorderStyle::Dashed,
            ..base_config()
        };
        let mut backend = CpuBackend::new();
        let a = backend.render_framed(&image, &config).unwrap();
        let b = backend.render_framed(&image, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn cover_bleeds_to_frame_edge_when_unpadded() {
        // 128x32 source covering a 64x64 unpadded frame overflows
        // horizontally; with radius 0 nothing clips it to the area, so the
        // frame edge shows image, not background.
        let image = flat_image(128, 32, [0, 0, 255, 255]);
        let config = FrameConfig {
            fit: FitMode::Cover,
            ..base_config()
        };
        let mut backend = CpuBackend::new();
        let frame = backend.render_framed(&image, &config).unwrap();
        assert_eq!(pixel(&frame, 0, 32), [0, 0, 255, 255]);
        assert_eq!(pixel(&frame, 63, 32), [0, 0, 255, 255]);
    }

    #[test]
    fn rounded_corners_reveal_background() {
        let image = flat_image(64, 64, [0, 0, 255, 255]);
        let config = FrameConfig {
            border_radius: 20,
            ..base_config()
        };
        let mut backend = CpuBackend::new();
        let frame = backend.render_framed(&image, &config).unwrap();
        // The very corner is outside the rounded shape.
        assert_eq!(pixel(&frame, 0, 0), [255, 0, 0, 255]);
        // The center is inside it.
        assert_eq!(pixel(&frame, 32, 32), [0, 0, 255, 255]);
    }

    #[test]
    fn border_traces_the_image_edge() {
        let image = flat_image(64, 64, [0, 0, 255, 255]);
        let config = FrameConfig {
            border: true,
            border_color: "#00ff00".to_owned(),
            border_width: 4,
            ..base_config()
        };
        let mut backend = CpuBackend::new();
        let frame = backend.render_framed(&image, &config).unwrap();
        // The stroke straddles the placement edge, so the outer rows carry
        // border color while the interior stays image-colored.
        assert_eq!(pixel(&frame, 32, 1), [0, 255, 0, 255]);
        assert_eq!(pixel(&frame, 1, 32), [0, 255, 0, 255]);
        assert_eq!(pixel(&frame, 32, 32), [0, 0, 255, 255]);
    }

    #[test]
    fn dashed_border_leaves_gaps() {
        let image = flat_image(64, 64, [0, 0, 255, 255]);
        let config = FrameConfig {
            border: true,
            border_color: "#00ff00".to_owned(),
            border_width: 4,
            border_style: BorderStyle::Dashed,
            ..base_config()
        };
        let mut backend = CpuBackend::new();
        let frame = backend.render_framed(&image, &config).unwrap();
        // Dash phase starts at the path start (top-left corner): the first
        // 8px of the top edge are stroked, the next 4 are not.
        assert_eq!(pixel(&frame, 3, 1), [0, 255, 0, 255]);
        assert_eq!(pixel(&frame, 10, 1), [0, 0, 255, 255]);
    }

    #[test]
    fn gradient_background_interpolates_between_stops() {
        let image = flat_image(1, 1, [0, 0, 0, 0]);
        let config = FrameConfig {
            width: 64,
            height: 64,
            background_kind: BackgroundKind::Gradient,
            gradient_start: "#000000".to_owned(),
            gradient_end: "#ffffff".to_owned(),
            gradient_direction: GradientDirection::Horizontal,
            ..FrameConfig::default()
        };
        let mut backend = CpuBackend::new();
        let frame = backend.render_framed(&image, &config).unwrap();
        let left = pixel(&frame, 0, 32);
        let right = pixel(&frame, 63, 32);
        assert!(left[0] < 8, "left edge near start stop: {left:?}");
        assert!(right[0] > 247, "right edge near end stop: {right:?}");
        // Monotone along the axis.
        let mid = pixel(&frame, 32, 32);
        assert!(left[0] <= mid[0] && mid[0] <= right[0]);
    }

    #[test]
    fn invalid_background_fails_before_drawing() {
        let image = flat_image(1, 1, [0, 0, 0, 255]);
        let config = FrameConfig {
            background: "notacolor".to_owned(),
            ..base_config()
        };
        let mut backend = CpuBackend::new();
        match backend.render_framed(&image, &config) {
            Err(FrameError::InvalidColor { field, value }) => {
                assert_eq!(field, "background");
                assert_eq!(value, "notacolor");
            }
            other => panic!("expected InvalidColor, got {other:?}"),
        }
    }

    #[test]
    fn unrenderable_gradient_stop_reports_both_stops() {
        let image = flat_image(1, 1, [0, 0, 0, 255]);
        let config = FrameConfig {
            background_kind: BackgroundKind::Gradient,
            gradient_start: "rgb(1e999, 0, 0)".to_owned(),
            gradient_end: "#00ff00".to_owned(),
            ..base_config()
        };
        let mut backend = CpuBackend::new();
        match backend.render_framed(&image, &config) {
            Err(FrameError::GradientColor { start, end }) => {
                assert_eq!(start, "rgb(1e999, 0, 0)");
                assert_eq!(end, "#00ff00");
            }
            other => panic!("expected GradientColor, got {other:?}"),
        }
    }

    #[test]
    fn oversized_canvas_is_surface_unavailable() {
        let image = flat_image(1, 1, [0, 0, 0, 255]);
        let config = FrameConfig {
            width: 70_000,
            height: 10,
            ..base_config()
        };
        let mut backend = CpuBackend::new();
        assert!(matches!(
            backend.render_framed(&image, &config),
            Err(FrameError::SurfaceUnavailable(_))
        ));
    }

    #[test]
    fn excess_padding_yields_background_only() {
        let image = flat_image(8, 8, [0, 0, 255, 255]);
        let config = FrameConfig {
            padding: 40,
            format: OutputFormat::Png,
            ..base_config()
        };
        let mut backend = CpuBackend::new();
        let frame = backend.render_framed(&image, &config).unwrap();
        for y in [0u32, 16, 32, 48, 63] {
            assert_eq!(pixel(&frame, 32, y), [255, 0, 0, 255]);
        }
    }
}
