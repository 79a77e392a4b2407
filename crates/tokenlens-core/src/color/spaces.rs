//! Color space conversions into sRGB.
//!
//! Only the forward direction (some space → 8-bit sRGB) is needed: every
//! notation the canonicalizer accepts ends up as an `(r, g, b)` byte triple.
//!
//! - **OKLab / OKLCH**: closed-form pipeline used directly by the canonicalizer.
//! - **CIE LAB / LCH** (D50), **HSL**, **HWB**: used by the built-in oracle.

// ─── sRGB transfer ─────────────────────────────────────────────────────────

/// Convert a linear light value to an 8-bit sRGB channel.
///
/// Applies the piecewise sRGB gamma curve, then scales by 255, clamps to
/// `0..=255` and rounds to the nearest integer.
pub(crate) fn linear_to_srgb(c: f64) -> u8 {
    let s = if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    unit_to_byte(s)
}

/// Scale a `0.0..=1.0` channel to a byte, clamping out-of-gamut values.
pub(crate) fn unit_to_byte(c: f64) -> u8 {
    let scaled = c * 255.0;
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(0.0, 255.0).round() as u8
}

// ─── OKLab ─────────────────────────────────────────────────────────────────

/// A color in the OKLab perceptual space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OkLab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl OkLab {
    /// Builds an OKLab color from OKLCH polar coordinates (hue in degrees).
    pub(crate) fn from_polar(l: f64, chroma: f64, hue_degrees: f64) -> Self {
        let h = hue_degrees * std::f64::consts::PI / 180.0;
        Self {
            l,
            a: chroma * h.cos(),
            b: chroma * h.sin(),
        }
    }

    /// Converts to 8-bit sRGB.
    pub(crate) fn to_srgb(self) -> (u8, u8, u8) {
        let l_ = self.l + 0.3963377774 * self.a + 0.2158037573 * self.b;
        let m_ = self.l - 0.1055613458 * self.a - 0.0638541728 * self.b;
        let s_ = self.l - 0.0894841775 * self.a - 1.2914855480 * self.b;

        // LMS → linear LMS
        let l = l_ * l_ * l_;
        let m = m_ * m_ * m_;
        let s = s_ * s_ * s_;

        // linear LMS → linear sRGB
        let r = 4.0767416621 * l - 3.3077115913 * m + 0.2309699292 * s;
        let g = -1.2684380046 * l + 2.6097574011 * m - 0.3413193965 * s;
        let b = -0.0041960863 * l - 0.7034186147 * m + 1.7076147010 * s;

        (linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b))
    }
}

// ─── CIE LAB (D50) ─────────────────────────────────────────────────────────

/// D50 reference white, the white point CSS `lab()` is defined against.
const XN_D50: f64 = 0.96422;
const YN_D50: f64 = 1.0;
const ZN_D50: f64 = 0.82521;

const EPSILON: f64 = 216.0 / 24389.0;
const KAPPA: f64 = 24389.0 / 27.0;

/// Converts CIE LAB (D50) to 8-bit sRGB.
pub(crate) fn lab_to_srgb(l: f64, a: f64, b: f64) -> (u8, u8, u8) {
    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let fx3 = fx * fx * fx;
    let fz3 = fz * fz * fz;

    let xr = if fx3 > EPSILON {
        fx3
    } else {
        (116.0 * fx - 16.0) / KAPPA
    };
    let yr = if l > KAPPA * EPSILON {
        fy * fy * fy
    } else {
        l / KAPPA
    };
    let zr = if fz3 > EPSILON {
        fz3
    } else {
        (116.0 * fz - 16.0) / KAPPA
    };

    let (x, y, z) = (xr * XN_D50, yr * YN_D50, zr * ZN_D50);

    // Bradford D50 → D65
    let x65 = 0.9555766 * x - 0.0230393 * y + 0.0631636 * z;
    let y65 = -0.0282895 * x + 1.0099416 * y + 0.0210077 * z;
    let z65 = 0.0122982 * x - 0.0204830 * y + 1.3299098 * z;

    // XYZ (D65) → linear sRGB
    let r = 3.2409699419 * x65 - 1.5373831776 * y65 - 0.4986107603 * z65;
    let g = -0.9692436363 * x65 + 1.8759675015 * y65 + 0.0415550574 * z65;
    let bl = 0.0556300797 * x65 - 0.2039769589 * y65 + 1.0569715142 * z65;

    (linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(bl))
}

/// Converts CIE LCH (D50, hue in degrees) to 8-bit sRGB.
pub(crate) fn lch_to_srgb(l: f64, chroma: f64, hue_degrees: f64) -> (u8, u8, u8) {
    let h = hue_degrees.to_radians();
    lab_to_srgb(l, chroma * h.cos(), chroma * h.sin())
}

// ─── HSL / HWB ─────────────────────────────────────────────────────────────

/// Wraps a hue into `0.0..360.0`.
pub(crate) fn normalize_hue(h: f64) -> f64 {
    let h = h % 360.0;
    if h < 0.0 {
        h + 360.0
    } else {
        h
    }
}

/// Converts HSL (hue in degrees, saturation and lightness as `0.0..=1.0`) to sRGB.
pub(crate) fn hsl_to_srgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let (r, g, b) = hsl_to_unit(h, s, l);
    (unit_to_byte(r), unit_to_byte(g), unit_to_byte(b))
}

fn hsl_to_unit(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    if s == 0.0 {
        return (l, l, l);
    }

    let h = normalize_hue(h) / 360.0;
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    (
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Converts HWB (hue in degrees, whiteness and blackness as `0.0..=1.0`) to sRGB.
pub(crate) fn hwb_to_srgb(h: f64, whiteness: f64, blackness: f64) -> (u8, u8, u8) {
    let w = whiteness.clamp(0.0, 1.0);
    let bk = blackness.clamp(0.0, 1.0);
    if w + bk >= 1.0 {
        let gray = w / (w + bk);
        return (unit_to_byte(gray), unit_to_byte(gray), unit_to_byte(gray));
    }

    let (r, g, b) = hsl_to_unit(h, 1.0, 0.5);
    let scale = 1.0 - w - bk;
    (
        unit_to_byte(r * scale + w),
        unit_to_byte(g * scale + w),
        unit_to_byte(b * scale + w),
    )
}

// ─── Tests ──────────────────────────────────────────────────────────────────
