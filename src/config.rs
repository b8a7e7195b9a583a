//! Frame configuration boundary model.
//!
//! A [`FrameConfig`] is produced by UI state, fully determined before a
//! render starts, and never mutated mid-render. Wire names use the
//! camelCase keys of the worker message protocol.

use crate::foundation::color::{ColorDef, parse_color};
use crate::foundation::error::{FrameError, FrameResult};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Background fill strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    /// Single solid color fill.
    #[default]
    Solid,
    /// Two-stop linear gradient fill.
    Gradient,
}

/// Gradient axis selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientDirection {
    /// Left-to-right across the image area.
    #[default]
    Horizontal,
    /// Top-to-bottom across the image area.
    Vertical,
    /// Top-left to bottom-right corner of the image area.
    Diagonal,
}

/// Scaling policy for placing the source image into the image area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Fit entirely inside the area, no cropping.
    #[default]
    Contain,
    /// Fill the area, cropping the overflow axis.
    Cover,
}

/// Border stroke dash pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    /// Continuous stroke.
    #[default]
    Solid,
    /// Dash pattern `[8, 4]`.
    Dashed,
    /// Dash pattern `[2, 4]`.
    Dotted,
}

impl BorderStyle {
    /// Dash pattern in pixels; empty means a continuous stroke.
    pub fn dash_pattern(self) -> &'static [f64] {
        match self {
            BorderStyle::Solid => &[],
            BorderStyle::Dashed => &[8.0, 4.0],
            BorderStyle::Dotted => &[2.0, 4.0],
        }
    }
}

/// Output encoding selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// JPEG at fixed quality 95.
    #[serde(rename = "jpg")]
    Jpeg,
}

impl OutputFormat {
    /// MIME type of the encoded blob.
    pub fn mime(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

/// Immutable frame description for one render call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameConfig {
    /// Final output canvas width in pixels; must be positive.
    pub width: u32,
    /// Final output canvas height in pixels; must be positive.
    pub height: u32,
    /// Solid background color, used when `background_kind` is `Solid`.
    pub background: String,
    /// Background fill strategy.
    #[serde(rename = "backgroundType")]
    pub background_kind: BackgroundKind,
    /// First gradient stop, used when `background_kind` is `Gradient`.
    #[serde(rename = "backgroundGradientStart")]
    pub gradient_start: String,
    /// Second gradient stop, used when `background_kind` is `Gradient`.
    #[serde(rename = "backgroundGradientEnd")]
    pub gradient_end: String,
    /// Gradient axis.
    #[serde(rename = "backgroundGradientDirection")]
    pub gradient_direction: GradientDirection,
    /// Inset of the image area from every frame edge, in pixels.
    pub padding: u32,
    /// Scaling policy.
    pub fit: FitMode,
    /// Corner radius applied to the placed image, clamped to half of its
    /// drawn width/height.
    pub border_radius: u32,
    /// Enable the drop shadow.
    pub shadow: bool,
    /// Shadow blur radius; also drives the extra canvas margin.
    pub shadow_spread: u32,
    /// Enable the stroked border.
    pub border: bool,
    /// Border stroke color.
    pub border_color: String,
    /// Border stroke width in pixels; must be positive when `border` is on.
    pub border_width: u32,
    /// Border dash pattern.
    pub border_style: BorderStyle,
    /// Output encoding.
    pub format: OutputFormat,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1080,
            background: "#ffffff".to_owned(),
            background_kind: BackgroundKind::Solid,
            gradient_start: "#ffffff".to_owned(),
            gradient_end: "#000000".to_owned(),
            gradient_direction: GradientDirection::Horizontal,
            padding: 0,
            fit: FitMode::Contain,
            border_radius: 0,
            shadow: false,
            shadow_spread: 0,
            border: false,
            border_color: "#000000".to_owned(),
            border_width: 1,
            border_style: BorderStyle::Solid,
            format: OutputFormat::Png,
        }
    }
}

impl FrameConfig {
    /// Structural validation: dimensions and border width must be positive.
    pub fn validate(&self) -> FrameResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::validation(
                "frame width and height must be positive",
            ));
        }
        if self.border && self.border_width == 0 {
            return Err(FrameError::validation(
                "border width must be positive when the border is enabled",
            ));
        }
        Ok(())
    }

    /// Validate all configuration colors eagerly, before any drawing.
    ///
    /// Only the colors the current configuration actually uses are checked:
    /// the solid background or both gradient stops, and the border color
    /// when the border is enabled. The first failure wins.
    pub fn validate_colors(&self) -> FrameResult<()> {
        match self.background_kind {
            BackgroundKind::Solid => {
                self.checked_color("background", &self.background)?;
            }
            BackgroundKind::Gradient => {
                self.checked_color("backgroundGradientStart", &self.gradient_start)?;
                self.checked_color("backgroundGradientEnd", &self.gradient_end)?;
            }
        }
        if self.border {
            self.checked_color("borderColor", &self.border_color)?;
        }
        Ok(())
    }

    fn checked_color(&self, field: &'static str, value: &str) -> FrameResult<ColorDef> {
        parse_color(value).map_err(|_| FrameError::invalid_color(field, value))
    }

    /// The sub-rectangle of the frame inside the padding, clamped to empty
    /// when `2 * padding` meets or exceeds a frame dimension.
    ///
    /// The engine does not reject a non-positive image area; element draws
    /// are skipped and the output is background-only at the configured size.
    pub fn image_area(&self) -> Rect {
        let pad = f64::from(self.padding);
        let w = (f64::from(self.width) - 2.0 * pad).max(0.0);
        let h = (f64::from(self.height) - 2.0 * pad).max(0.0);
        Rect::new(pad, pad, pad + w, pad + h)
    }
}
