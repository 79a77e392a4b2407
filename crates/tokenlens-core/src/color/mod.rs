//! Color canonicalization.
//!
//! Every color string the extractor encounters (computed styles, custom
//! property values, shadow layers) is reduced to a single canonical
//! [`ColorValue`]: 8-bit sRGB channels plus a `0.0..=1.0` alpha.
//!
//! # Parsing order
//!
//! The first notation that matches wins:
//!
//! 1. Hex: `#rgb`, `#rrggbb`, `#rrggbbaa`
//! 2. `rgb()` / `rgba()`, legacy comma or modern space syntax
//! 3. `transparent` (→ `rgba(0, 0, 0, 0)`) and `currentColor` (→ no color)
//! 4. `oklch(L C H [/ alpha])`
//! 5. `oklab(L a b [/ alpha])`
//! 6. Anything else is delegated to a [`ColorOracle`]. An oracle that hands
//!    the input back unchanged means "not a color".
//!
//! # Example
//!
//! ```rust
//! use tokenlens_core::color::canonicalize;
//!
//! let brand = canonicalize("#5167fc").unwrap();
//! assert_eq!((brand.r, brand.g, brand.b), (81, 103, 252));
//!
//! let white = canonicalize("oklch(100% 0 0)").unwrap();
//! assert_eq!(white.to_hex(), "#ffffff");
//!
//! assert!(canonicalize("currentColor").is_none());
//! assert!(canonicalize("12px").is_none());
//! ```

mod components;
mod named;
mod oracle;
mod spaces;

use serde::{Deserialize, Serialize};
use tracing::trace;

pub use oracle::{BuiltinOracle, ColorOracle, PassthroughOracle};

use components::parse_function;
use spaces::OkLab;

/// Alpha at or below which a color counts as transparent.
pub const TRANSPARENT_ALPHA_MAX: f64 = 0.05;

/// Minimum value every channel needs for a color to count as near-white.
pub const NEAR_WHITE_MIN: u8 = 240;

// ─── ColorValue ─────────────────────────────────────────────────────────────

/// A canonical sRGB color with alpha, remembering the string it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorValue {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity, `0.0` (transparent) to `1.0` (opaque).
    pub a: f64,
    /// The input string this value was canonicalized from.
    pub source: String,
}

impl ColorValue {
    /// Creates a color value, clamping alpha into `0.0..=1.0`.
    pub fn new(r: u8, g: u8, b: u8, a: f64, source: impl Into<String>) -> Self {
        let a = if a.is_nan() { 1.0 } else { a.clamp(0.0, 1.0) };
        Self {
            r,
            g,
            b,
            a,
            source: source.into(),
        }
    }

    /// Alpha quantized to a byte, as used by 8-digit hex.
    pub fn alpha_byte(&self) -> u8 {
        (self.a * 255.0).round() as u8
    }

    /// Lowercase hex form: `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    ///
    /// This is the identity key for de-duplication.
    pub fn to_hex(&self) -> String {
        if self.alpha_byte() == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r,
                self.g,
                self.b,
                self.alpha_byte()
            )
        }
    }

    /// Computed-style form: `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    pub fn to_css(&self) -> String {
        oracle::format_rgb(self.r, self.g, self.b, self.a)
    }

    /// Euclidean distance over normalized RGB, ignoring alpha.
    ///
    /// Ranges from `0.0` (same channels) to `√3` (black vs. white).
    pub fn distance(&self, other: &ColorValue) -> f64 {
        let dr = (self.r as f64 - other.r as f64) / 255.0;
        let dg = (self.g as f64 - other.g as f64) / 255.0;
        let db = (self.b as f64 - other.b as f64) / 255.0;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// Whether the color is (almost) fully transparent.
    pub fn is_transparent(&self) -> bool {
        self.a <= TRANSPARENT_ALPHA_MAX
    }

    /// Whether every channel is at least [`NEAR_WHITE_MIN`].
    pub fn is_near_white(&self) -> bool {
        self.r >= NEAR_WHITE_MIN && self.g >= NEAR_WHITE_MIN && self.b >= NEAR_WHITE_MIN
    }

    /// Perceived brightness (ITU-R BT.601 luma), `0.0..=1.0`.
    pub fn brightness(&self) -> f64 {
        (0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
    }

    /// HSL saturation, `0.0..=1.0`.
    pub fn saturation(&self) -> f64 {
        let (max, min) = self.extremes();
        if max == min {
            return 0.0;
        }
        let l = (max + min) / 2.0;
        let d = max - min;
        if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        }
    }

    /// HSL hue in degrees, `0.0..360.0` (`0.0` for grays).
    pub fn hue(&self) -> f64 {
        let (max, min) = self.extremes();
        if max == min {
            return 0.0;
        }
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;
        let d = max - min;
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        h * 60.0
    }

    fn extremes(&self) -> (f64, f64) {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;
        (r.max(g).max(b), r.min(g).min(b))
    }
}

/// Distance between two colors; see [`ColorValue::distance`].
pub fn distance(a: &ColorValue, b: &ColorValue) -> f64 {
    a.distance(b)
}

// ─── Canonicalization ───────────────────────────────────────────────────────

/// Canonicalizes a CSS color string using the [`BuiltinOracle`].
///
/// Returns `None` when the string is not a color (or is `currentColor`).
pub fn canonicalize(input: &str) -> Option<ColorValue> {
    canonicalize_with(input, &BuiltinOracle)
}

/// Canonicalizes a CSS color string, delegating unsupported notations to `oracle`.
pub fn canonicalize_with(input: &str, oracle: &dyn ColorOracle) -> Option<ColorValue> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(direct) = parse_direct(trimmed) {
        return direct.map(|(r, g, b, a)| ColorValue::new(r, g, b, a, input));
    }

    let resolved = oracle.resolve(trimmed);
    if resolved.trim() == trimmed {
        trace!(input = trimmed, "color not resolvable by oracle");
        return None;
    }

    // The oracle's answer is parsed locally only; it is never delegated again.
    match parse_direct(resolved.trim()) {
        Some(Some((r, g, b, a))) => Some(ColorValue::new(r, g, b, a, input)),
        _ => {
            trace!(input = trimmed, resolved = %resolved, "oracle answer is not a color");
            None
        }
    }
}

type Channels = (u8, u8, u8, f64);

/// Closed-form notations, tried before the oracle.
///
/// `None` means no closed-form notation matched; `Some(None)` means the input
/// matched a keyword that denotes "no color".
fn parse_direct(s: &str) -> Option<Option<Channels>> {
    if let Some(hex) = s.strip_prefix('#') {
        if let Some(channels) = parse_hex(hex) {
            return Some(Some(channels));
        }
        return None;
    }

    let lower = s.to_ascii_lowercase();
    if lower.starts_with("rgb(") || lower.starts_with("rgba(") {
        return parse_rgb(s).map(Some);
    }
    if lower == "transparent" {
        return Some(Some((0, 0, 0, 0.0)));
    }
    if lower == "currentcolor" {
        return Some(None);
    }
    if lower.starts_with("oklch(") {
        return parse_oklab_like(s, true).map(Some);
    }
    if lower.starts_with("oklab(") {
        return parse_oklab_like(s, false).map(Some);
    }
    None
}

/// Parses 3, 6 or 8 hex digits (without the `#`).
fn parse_hex(hex: &str) -> Option<Channels> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    match hex.len() {
        // #rgb -> #rrggbb
        3 => Some((
            byte(0..1)? * 17,
            byte(1..2)? * 17,
            byte(2..3)? * 17,
            1.0,
        )),
        6 => Some((byte(0..2)?, byte(2..4)?, byte(4..6)?, 1.0)),
        8 => Some((
            byte(0..2)?,
            byte(2..4)?,
            byte(4..6)?,
            byte(6..8)? as f64 / 255.0,
        )),
        _ => None,
    }
}

fn parse_rgb(s: &str) -> Option<Channels> {
    let mut args = parse_function(s)?;
    args.take_legacy_alpha(3);
    if args.channels.len() != 3 {
        return None;
    }
    let channel = |i: usize| {
        let value = args.channels[i].number(255.0);
        value.clamp(0.0, 255.0).round() as u8
    };
    Some((channel(0), channel(1), channel(2), args.alpha_value()))
}

fn parse_oklab_like(s: &str, polar: bool) -> Option<Channels> {
    let args = parse_function(s)?;
    let [l, second, third] = match args.channels.as_slice() {
        [l, second, third] => [*l, *second, *third],
        _ => return None,
    };

    let l = l.number(1.0).clamp(0.0, 1.0);
    let lab = if polar {
        let chroma = second.number(0.4).max(0.0);
        OkLab::from_polar(l, chroma, third.hue()?)
    } else {
        OkLab {
            l,
            a: second.number(0.4),
            b: third.number(0.4),
        }
    };

    let (r, g, b) = lab.to_srgb();
    Some((r, g, b, args.alpha_value()))
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(input: &str) -> (u8, u8, u8, f64) {
        let c = canonicalize(input).unwrap_or_else(|| panic!("{} should parse", input));
        (c.r, c.g, c.b, c.a)
    }

    // =========================================================================
    // Hex
    // =========================================================================

    #[test]
    fn test_hex_six_digits() {
        assert_eq!(rgba("#5167fc"), (81, 103, 252, 1.0));
        assert_eq!(rgba("#5167FC"), (81, 103, 252, 1.0));
    }

    #[test]
    fn test_hex_three_digits_doubles_channels() {
        assert_eq!(rgba("#fff"), (255, 255, 255, 1.0));
        assert_eq!(rgba("#a1c"), (0xaa, 0x11, 0xcc, 1.0));
    }

    #[test]
    fn test_hex_eight_digits_alpha() {
        let (r, g, b, a) = rgba("#5167fc80");
        assert_eq!((r, g, b), (81, 103, 252));
        assert!((a - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_hex_invalid() {
        assert!(canonicalize("#ggg").is_none());
        assert!(canonicalize("#12345").is_none());
        assert!(canonicalize("#").is_none());
    }

    #[test]
    fn test_hex_four_digits_goes_through_oracle() {
        let (r, g, b, a) = rgba("#f00f");
        assert_eq!((r, g, b), (255, 0, 0));
        assert_eq!(a, 1.0);
        assert!(canonicalize_with("#f00f", &PassthroughOracle).is_none());
    }

    // =========================================================================
    // rgb()
    // =========================================================================

    #[test]
    fn test_rgb_legacy_and_modern() {
        assert_eq!(rgba("rgb(81, 103, 252)"), (81, 103, 252, 1.0));
        assert_eq!(rgba("rgba(0, 0, 0, 0.5)"), (0, 0, 0, 0.5));
        assert_eq!(rgba("rgb(81 103 252 / 50%)"), (81, 103, 252, 0.5));
        assert_eq!(rgba("RGB(1,2,3)"), (1, 2, 3, 1.0));
    }

    #[test]
    fn test_rgb_percent_channels_and_clamping() {
        assert_eq!(rgba("rgb(100% 0% 50%)"), (255, 0, 128, 1.0));
        assert_eq!(rgba("rgb(300, -20, 12.6)"), (255, 0, 13, 1.0));
        assert_eq!(rgba("rgba(0, 0, 0, 2)"), (0, 0, 0, 1.0));
    }

    #[test]
    fn test_rgb_malformed() {
        assert!(canonicalize("rgb(1, 2)").is_none());
        assert!(canonicalize("rgb(var(--x), 0, 0)").is_none());
    }

    // =========================================================================
    // Keywords
    // =========================================================================

    #[test]
    fn test_transparent_and_current_color() {
        assert_eq!(rgba("transparent"), (0, 0, 0, 0.0));
        assert_eq!(rgba("TRANSPARENT"), (0, 0, 0, 0.0));
        assert!(canonicalize("currentColor").is_none());
        assert!(canonicalize("currentcolor").is_none());
    }

    // =========================================================================
    // OKLCH / OKLab
    // =========================================================================

    #[test]
    fn test_oklch_white_boundary() {
        assert_eq!(rgba("oklch(100% 0 0)"), (255, 255, 255, 1.0));
        assert_eq!(rgba("oklch(1 0 0)"), (255, 255, 255, 1.0));
        assert_eq!(rgba("oklch(0% 0 0)"), (0, 0, 0, 1.0));
    }

    #[test]
    fn test_oklch_alpha() {
        let (_, _, _, a) = rgba("oklch(70% 0.09 255 / 0.25)");
        assert_eq!(a, 0.25);
    }

    #[test]
    fn test_oklch_hue_units_agree() {
        assert_eq!(
            canonicalize("oklch(60% 0.15 0.5turn)").map(|c| c.to_hex()),
            canonicalize("oklch(60% 0.15 180)").map(|c| c.to_hex())
        );
    }

    #[test]
    fn test_oklab_red() {
        assert_eq!(rgba("oklab(0.627955 0.224863 0.125846)"), (255, 0, 0, 1.0));
    }

    #[test]
    fn test_oklab_zero_ab_matches_oklch_zero_chroma() {
        assert_eq!(
            canonicalize("oklab(0.5 0 0)").map(|c| c.to_hex()),
            canonicalize("oklch(0.5 0 90)").map(|c| c.to_hex())
        );
    }

    // =========================================================================
    // Oracle delegation
    // =========================================================================

    #[test]
    fn test_oracle_handles_other_spaces() {
        assert_eq!(rgba("hsl(0 100% 50%)"), (255, 0, 0, 1.0));
        assert_eq!(rgba("red"), (255, 0, 0, 1.0));
        assert_eq!(rgba("lab(0 0 0)"), (0, 0, 0, 1.0));
    }

    #[test]
    fn test_unchanged_oracle_answer_is_not_a_color() {
        assert!(canonicalize_with("red", &PassthroughOracle).is_none());
        assert!(canonicalize("12px").is_none());
        assert!(canonicalize("").is_none());
        assert!(canonicalize("   ").is_none());
    }

    struct LoopingOracle;

    impl ColorOracle for LoopingOracle {
        fn resolve(&self, _input: &str) -> String {
            "hsl(0 100% 50%)".to_string()
        }
    }

    #[test]
    fn test_oracle_answer_is_never_redelegated() {
        // The answer is itself an oracle-only notation; it must not recurse.
        assert!(canonicalize_with("brand-red", &LoopingOracle).is_none());
    }

    #[test]
    fn test_source_is_preserved() {
        let c = canonicalize(" #FFF ").unwrap();
        assert_eq!(c.source, " #FFF ");
        assert_eq!(c.to_hex(), "#ffffff");
    }

    // =========================================================================
    // Derived values
    // =========================================================================

    #[test]
    fn test_distance() {
        let black = canonicalize("#000").unwrap();
        let white = canonicalize("#fff").unwrap();
        assert_eq!(black.distance(&black), 0.0);
        assert!((black.distance(&white) - 3f64.sqrt()).abs() < 1e-12);
        // alpha is ignored
        let clear = canonicalize("transparent").unwrap();
        assert_eq!(distance(&black, &clear), 0.0);
    }

    #[test]
    fn test_hex_output_with_alpha() {
        assert_eq!(canonicalize("#5167fc80").unwrap().to_hex(), "#5167fc80");
        assert_eq!(canonicalize("rgba(0,0,0,0)").unwrap().to_hex(), "#00000000");
    }

    #[test]
    fn test_to_css() {
        assert_eq!(canonicalize("#5167fc").unwrap().to_css(), "rgb(81, 103, 252)");
        assert_eq!(
            canonicalize("rgba(1, 2, 3, 0.5)").unwrap().to_css(),
            "rgba(1, 2, 3, 0.5)"
        );
    }

    #[test]
    fn test_hsl_components() {
        let red = canonicalize("#ff0000").unwrap();
        assert_eq!(red.hue(), 0.0);
        assert_eq!(red.saturation(), 1.0);
        let blue = canonicalize("#0000ff").unwrap();
        assert_eq!(blue.hue(), 240.0);
        let gray = canonicalize("#808080").unwrap();
        assert_eq!(gray.saturation(), 0.0);
    }

    #[test]
    fn test_transparency_and_near_white() {
        assert!(canonicalize("transparent").unwrap().is_transparent());
        assert!(!canonicalize("rgba(0,0,0,0.5)").unwrap().is_transparent());
        assert!(canonicalize("#f8f9fa").unwrap().is_near_white());
        assert!(!canonicalize("#e0e0e0").unwrap().is_near_white());
    }
}
