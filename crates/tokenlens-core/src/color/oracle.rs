//! Color resolution oracles.
//!
//! The canonicalizer only carries closed-form conversions for hex, `rgb()`,
//! OKLab and OKLCH. Everything else it recognizes as a possible color (`hsl()`,
//! `lab()`, `lch()`, named colors, ...) is handed to a [`ColorOracle`], which
//! normalizes the string to an `rgb(...)`/`rgba(...)` string the way a host
//! environment's computed-style machinery would.
//!
//! An oracle that cannot resolve a string returns it unchanged; the
//! canonicalizer treats that as "not a color".
//!
//! Two oracles ship with the crate:
//!
//! - [`BuiltinOracle`]: deterministic, in-process resolution of `hsl()`/`hsla()`,
//!   `hwb()`, CIE `lab()`/`lch()`, the 148 CSS named colors and `#rgba` hex.
//! - [`PassthroughOracle`]: resolves nothing, disabling delegation.

use super::components::{parse_function, Component, FunctionArgs};
use super::named;
use super::spaces::{hsl_to_srgb, hwb_to_srgb, lab_to_srgb, lch_to_srgb};

/// A synchronous color-normalization capability.
///
/// Implementations must be deterministic and side-effect free: the same input
/// always produces the same output for a fixed oracle.
pub trait ColorOracle: Send + Sync {
    /// Resolves `input` to an `rgb(r, g, b)` or `rgba(r, g, b, a)` string.
    ///
    /// Returns the input unchanged when it cannot be resolved.
    fn resolve(&self, input: &str) -> String;
}

/// In-process oracle covering the CSS color notations without a closed-form
/// path in the canonicalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinOracle;

impl ColorOracle for BuiltinOracle {
    fn resolve(&self, input: &str) -> String {
        match resolve_builtin(input.trim()) {
            Some((r, g, b, a)) => format_rgb(r, g, b, a),
            None => input.to_string(),
        }
    }
}

/// Oracle that never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughOracle;

impl ColorOracle for PassthroughOracle {
    fn resolve(&self, input: &str) -> String {
        input.to_string()
    }
}

/// Formats channels the way computed styles serialize colors.
pub(crate) fn format_rgb(r: u8, g: u8, b: u8, a: f64) -> String {
    if a >= 1.0 {
        format!("rgb({}, {}, {})", r, g, b)
    } else {
        format!("rgba({}, {}, {}, {})", r, g, b, (a * 1000.0).round() / 1000.0)
    }
}

fn resolve_builtin(input: &str) -> Option<(u8, u8, u8, f64)> {
    if let Some(hex) = input.strip_prefix('#') {
        return parse_short_alpha_hex(hex);
    }

    if let Some((r, g, b)) = named::lookup(input) {
        return Some((r, g, b, 1.0));
    }

    let mut args = parse_function(input)?;
    match args.name.as_str() {
        "hsl" | "hsla" => {
            args.take_legacy_alpha(3);
            hsl(&args)
        }
        "hwb" => hwb(&args),
        "lab" => lab(&args),
        "lch" => lch(&args),
        _ => None,
    }
}

/// `#rgba`: each digit doubled, the fourth is alpha.
fn parse_short_alpha_hex(hex: &str) -> Option<(u8, u8, u8, f64)> {
    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
    Some((
        digit(0)?,
        digit(1)?,
        digit(2)?,
        digit(3)? as f64 / 255.0,
    ))
}

fn three_channels(args: &FunctionArgs) -> Option<[Component; 3]> {
    match args.channels.as_slice() {
        [a, b, c] => Some([*a, *b, *c]),
        _ => None,
    }
}

fn hsl(args: &FunctionArgs) -> Option<(u8, u8, u8, f64)> {
    let [h, s, l] = three_channels(args)?;
    // Bare numbers in modern syntax are percentages without the sign.
    let (r, g, b) = hsl_to_srgb(h.hue()?, s.number(100.0) / 100.0, l.number(100.0) / 100.0);
    Some((r, g, b, args.alpha_value()))
}

fn hwb(args: &FunctionArgs) -> Option<(u8, u8, u8, f64)> {
    let [h, w, bk] = three_channels(args)?;
    let (r, g, b) = hwb_to_srgb(h.hue()?, w.number(100.0) / 100.0, bk.number(100.0) / 100.0);
    Some((r, g, b, args.alpha_value()))
}

fn lab(args: &FunctionArgs) -> Option<(u8, u8, u8, f64)> {
    let [l, a, b] = three_channels(args)?;
    let l = l.number(100.0).clamp(0.0, 100.0);
    let (r, g, bl) = lab_to_srgb(l, a.number(125.0), b.number(125.0));
    Some((r, g, bl, args.alpha_value()))
}

fn lch(args: &FunctionArgs) -> Option<(u8, u8, u8, f64)> {
    let [l, c, h] = three_channels(args)?;
    let l = l.number(100.0).clamp(0.0, 100.0);
    let c = c.number(150.0).max(0.0);
    let (r, g, b) = lch_to_srgb(l, c, h.hue()?);
    Some((r, g, b, args.alpha_value()))
}
