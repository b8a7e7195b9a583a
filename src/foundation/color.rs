//! Color parsing, validation, and sanitizing.
//!
//! Frame configurations carry colors as strings (hex, named, or functional
//! `rgb()`/`hsl()` forms). Hex strings are validated structurally; everything
//! else is delegated to the parser that also feeds the drawing surface, so
//! "valid" means exactly "renderable here".

/// Parsed color with unclamped floating-point channels in 0..1 space.
///
/// Channels are clamped only at raster conversion time, so a parseable but
/// absurd input (`rgb(1e999, 0, 0)`) survives parsing and is rejected later
/// by [`ColorDef::is_renderable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorDef {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl ColorDef {
    /// Build a color from raw channel values.
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Return `true` when every channel is finite.
    pub fn is_renderable(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Convert to straight (non-premultiplied) RGBA8 with clamping.
    pub fn to_rgba8_straight(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    /// Convert to premultiplied RGBA8 with clamping.
    pub fn to_rgba8_premul(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        let a = self.a.clamp(0.0, 1.0);
        [
            to_u8(self.r.clamp(0.0, 1.0) * a),
            to_u8(self.g.clamp(0.0, 1.0) * a),
            to_u8(self.b.clamp(0.0, 1.0) * a),
            to_u8(a),
        ]
    }
}

/// Parse a color string into a [`ColorDef`].
///
/// Accepted forms: `#rgb`, `#rrggbb`, `#rrggbbaa`, CSS color names, and the
/// functional `rgb()`/`rgba()`/`hsl()`/`hsla()` notations.
pub fn parse_color(s: &str) -> Result<ColorDef, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("color string is empty".to_owned());
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(c) = named_color(&lower) {
        return Ok(c);
    }
    if let Some(args) = functional_args(&lower, "rgba").or_else(|| functional_args(&lower, "rgb")) {
        return parse_rgb_args(&args);
    }
    if let Some(args) = functional_args(&lower, "hsla").or_else(|| functional_args(&lower, "hsl")) {
        return parse_hsl_args(&args);
    }

    Err(format!("unrecognized color \"{s}\""))
}

/// Return `true` when `s` is a renderable color string.
///
/// Strings starting with `#` are valid iff exactly 3, 6, or 8 hex digits
/// follow; anything else is valid iff [`parse_color`] accepts it.
pub fn is_valid_color(s: &str) -> bool {
    let t = s.trim();
    if let Some(hex) = t.strip_prefix('#') {
        return matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    !t.is_empty() && parse_color(t).is_ok()
}

/// Safe fallback used when both the input and the caller fallback are invalid.
pub const FALLBACK_COLOR: &str = "#ffffff";

/// Return `s` when valid, else `fallback` when valid, else `"#ffffff"`.
///
/// Idempotent: sanitizing an already-sanitized value returns it unchanged.
pub fn sanitize_color(s: &str, fallback: &str) -> String {
    if is_valid_color(s) {
        s.to_owned()
    } else if is_valid_color(fallback) {
        fallback.to_owned()
    } else {
        FALLBACK_COLOR.to_owned()
    }
}

fn parse_hex(hex: &str) -> Result<ColorDef, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }
    fn hex_nibble(c: char) -> Result<u8, String> {
        c.to_digit(16)
            .map(|d| (d * 17) as u8)
            .ok_or_else(|| format!("invalid hex digit '{c}'"))
    }

    let (r, g, b, a) = match hex.len() {
        3 => {
            let mut it = hex.chars();
            let r = hex_nibble(it.next().unwrap())?;
            let g = hex_nibble(it.next().unwrap())?;
            let b = hex_nibble(it.next().unwrap())?;
            (r, g, b, 255)
        }
        6 => {
            let r = hex_byte(&hex[0..2])?;
            let g = hex_byte(&hex[2..4])?;
            let b = hex_byte(&hex[4..6])?;
            (r, g, b, 255)
        }
        8 => {
            let r = hex_byte(&hex[0..2])?;
            let g = hex_byte(&hex[2..4])?;
            let b = hex_byte(&hex[4..6])?;
            let a = hex_byte(&hex[6..8])?;
            (r, g, b, a)
        }
        _ => {
            return Err("hex color must be #rgb, #rrggbb, or #rrggbbaa".to_owned());
        }
    };

    Ok(ColorDef::rgba(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        f64::from(a) / 255.0,
    ))
}

/// Extract the comma-separated argument list of `name(...)`, if `s` has that
/// exact functional form.
fn functional_args(s: &str, name: &str) -> Option<Vec<String>> {
    let rest = s.strip_prefix(name)?.trim_start();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner.split(',').map(|p| p.trim().to_owned()).collect())
}

fn parse_number(s: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .map_err(|_| format!("invalid number \"{s}\""))
}

/// Parse a channel that may carry a `%` suffix; percentages map to 0..1 of
/// `percent_base`.
fn parse_channel(s: &str, percent_base: f64) -> Result<f64, String> {
    if let Some(p) = s.strip_suffix('%') {
        Ok(parse_number(p.trim())? / 100.0 * percent_base)
    } else {
        parse_number(s)
    }
}

fn parse_rgb_args(args: &[String]) -> Result<ColorDef, String> {
    if args.len() != 3 && args.len() != 4 {
        return Err("rgb()/rgba() expects 3 or 4 arguments".to_owned());
    }
    let r = parse_channel(&args[0], 255.0)? / 255.0;
    let g = parse_channel(&args[1], 255.0)? / 255.0;
    let b = parse_channel(&args[2], 255.0)? / 255.0;
    let a = if args.len() == 4 {
        parse_channel(&args[3], 1.0)?
    } else {
        1.0
    };
    Ok(ColorDef::rgba(r, g, b, a))
}

fn parse_hsl_args(args: &[String]) -> Result<ColorDef, String> {
    if args.len() != 3 && args.len() != 4 {
        return Err("hsl()/hsla() expects 3 or 4 arguments".to_owned());
    }
    let h = parse_number(args[0].strip_suffix("deg").unwrap_or(&args[0]).trim())?;
    let s = parse_fraction(&args[1])?;
    let l = parse_fraction(&args[2])?;
    let a = if args.len() == 4 {
        parse_channel(&args[3], 1.0)?
    } else {
        1.0
    };
    Ok(hsla_to_rgba(h, s, l, a))
}

/// Saturation/lightness accept `50%` or a bare 0..1 fraction.
fn parse_fraction(s: &str) -> Result<f64, String> {
    if let Some(p) = s.strip_suffix('%') {
        Ok(parse_number(p.trim())? / 100.0)
    } else {
        parse_number(s)
    }
}

fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f64) -> ColorDef {
    // Standard HSL -> RGB conversion (sRGB space, normalized 0..1 inputs).
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return ColorDef::rgba(l, l, l, a);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);
    ColorDef::rgba(r, g, b, a)
}

fn named_color(name: &str) -> Option<ColorDef> {
    // CSS Level 1/2 names plus the handful of extended names that show up in
    // practice. Unknown names fail parsing, which is the contract.
    const NAMED: &[(&str, [u8; 3])] = &[
        ("black", [0, 0, 0]),
        ("silver", [192, 192, 192]),
        ("gray", [128, 128, 128]),
        ("grey", [128, 128, 128]),
        ("white", [255, 255, 255]),
        ("maroon", [128, 0, 0]),
        ("red", [255, 0, 0]),
        ("purple", [128, 0, 128]),
        ("fuchsia", [255, 0, 255]),
        ("magenta", [255, 0, 255]),
        ("green", [0, 128, 0]),
        ("lime", [0, 255, 0]),
        ("olive", [128, 128, 0]),
        ("yellow", [255, 255, 0]),
        ("navy", [0, 0, 128]),
        ("blue", [0, 0, 255]),
        ("teal", [0, 128, 128]),
        ("aqua", [0, 255, 255]),
        ("cyan", [0, 255, 255]),
        ("orange", [255, 165, 0]),
        ("pink", [255, 192, 203]),
        ("hotpink", [255, 105, 180]),
        ("brown", [165, 42, 42]),
        ("gold", [255, 215, 0]),
        ("indigo", [75, 0, 130]),
        ("violet", [238, 130, 238]),
        ("coral", [255, 127, 80]),
        ("salmon", [250, 128, 114]),
        ("khaki", [240, 230, 140]),
        ("crimson", [220, 20, 60]),
        ("chocolate", [210, 105, 30]),
        ("tan", [210, 180, 140]),
        ("beige", [245, 245, 220]),
        ("ivory", [255, 255, 240]),
        ("snow", [255, 250, 250]),
        ("tomato", [255, 99, 71]),
        ("orchid", [218, 112, 214]),
        ("plum", [221, 160, 221]),
        ("turquoise", [64, 224, 208]),
        ("skyblue", [135, 206, 235]),
        ("steelblue", [70, 130, 180]),
        ("slategray", [112, 128, 144]),
        ("lightgray", [211, 211, 211]),
        ("darkgray", [169, 169, 169]),
        ("lightblue", [173, 216, 230]),
        ("darkblue", [0, 0, 139]),
        ("lightgreen", [144, 238, 144]),
        ("darkgreen", [0, 100, 0]),
        ("darkred", [139, 0, 0]),
        ("lavender", [230, 230, 250]),
        ("gainsboro", [220, 220, 220]),
        ("dimgray", [105, 105, 105]),
    ];

    if name == "transparent" {
        return Some(ColorDef::rgba(0.0, 0.0, 0.0, 0.0));
    }
    NAMED.iter().find(|(n, _)| *n == name).map(|&(_, [r, g, b])| {
        ColorDef::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            1.0,
        )
    })
}
