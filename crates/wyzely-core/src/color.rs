// ── Color conversions ──
//
// Pure translations between the service's 6-digit hex colors and the
// hue/saturation spaces hosts expose, plus the linear re-ranging used
// for color-temperature units. Hue is degrees in [0, 360); saturation,
// value, and lightness are percentages in [0, 100]. Parsing is the
// only fallible step; the conversions themselves are total.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    /// Input was not a 6-digit hex color.
    #[error("malformed hex color {0:?}")]
    MalformedHex(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

// ── Hex ─────────────────────────────────────────────────────────────

/// Parse a 6-digit hex color. A leading `#` is tolerated; anything
/// else malformed is rejected.
pub fn parse_hex(raw: &str) -> Result<Rgb, ColorError> {
    let hex = raw.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorError::MalformedHex(raw.to_owned()));
    }
    let channel = |at: usize| {
        u8::from_str_radix(&hex[at..at + 2], 16)
            .map_err(|_| ColorError::MalformedHex(raw.to_owned()))
    };
    Ok(Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// Format as the bare lowercase `rrggbb` the service expects (no `#`).
pub fn format_hex(rgb: Rgb) -> String {
    format!("{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
}

// ── HSV ─────────────────────────────────────────────────────────────

pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let (r, g, b) = normalized(rgb);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    Hsv {
        hue: hue_degrees(r, g, b, max, delta),
        saturation: if max == 0.0 { 0.0 } else { delta / max * 100.0 },
        value: max * 100.0,
    }
}

pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let h = hsv.hue.rem_euclid(360.0);
    let s = hsv.saturation / 100.0;
    let v = hsv.value / 100.0;

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;
    from_sector(h, c, x, m)
}

// ── HSL ─────────────────────────────────────────────────────────────

pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    let (r, g, b) = normalized(rgb);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let lightness = (max + min) / 2.0;

    let saturation = if delta == 0.0 {
        0.0
    } else {
        delta / (1.0 - (2.0 * lightness - 1.0).abs())
    };

    Hsl {
        hue: hue_degrees(r, g, b, max, delta),
        saturation: saturation * 100.0,
        lightness: lightness * 100.0,
    }
}

pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let h = hsl.hue.rem_euclid(360.0);
    let s = hsl.saturation / 100.0;
    let l = hsl.lightness / 100.0;

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    from_sector(h, c, x, m)
}

// ── Hex conveniences ────────────────────────────────────────────────

pub fn hex_to_hsv(hex: &str) -> Result<Hsv, ColorError> {
    Ok(rgb_to_hsv(parse_hex(hex)?))
}

pub fn hsv_to_hex(hsv: Hsv) -> String {
    format_hex(hsv_to_rgb(hsv))
}

pub fn hex_to_hsl(hex: &str) -> Result<Hsl, ColorError> {
    Ok(rgb_to_hsl(parse_hex(hex)?))
}

pub fn hsl_to_hex(hsl: Hsl) -> String {
    format_hex(hsl_to_rgb(hsl))
}

// ── Linear re-ranging ───────────────────────────────────────────────

/// Map `value` in `[min, max]` onto `[0, 1]`.
pub fn range_to_float(value: f64, min: f64, max: f64) -> f64 {
    (value - min) / (max - min)
}

/// Map a `[0, 1]` fraction onto `[min, max]`, rounding to the nearest
/// integer step. Inverted ranges (`min > max`) work unchanged, which
/// is how the host's warm-is-larger color-temperature scale maps
/// against Kelvin.
pub fn float_to_range(fraction: f64, min: f64, max: f64) -> f64 {
    (fraction * (max - min) + min).round()
}

// ── Shared helpers ──────────────────────────────────────────────────

fn normalized(rgb: Rgb) -> (f64, f64, f64) {
    (
        f64::from(rgb.r) / 255.0,
        f64::from(rgb.g) / 255.0,
        f64::from(rgb.b) / 255.0,
    )
}

/// Hue from the max/min/delta channel decomposition, shared by the
/// HSV and HSL directions.
fn hue_degrees(r: f64, g: f64, b: f64, max: f64, delta: f64) -> f64 {
    if delta == 0.0 {
        return 0.0;
    }
    let raw = if max == r {
        (g - b) / delta % 6.0
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    let degrees = raw * 60.0;
    if degrees < 0.0 { degrees + 360.0 } else { degrees }
}

fn from_sector(h: f64, c: f64, x: f64, m: f64) -> Rgb {
    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Rgb {
        r: channel_byte(r + m),
        g: channel_byte(g + m),
        b: channel_byte(b + m),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel_byte(f: f64) -> u8 {
    (f * 255.0).round().clamp(0.0, 255.0) as u8
}
