//! Box-shadow parsing and elevation grouping.
//!
//! Shadows are the main depth cue of a design system. Every `box-shadow`
//! value is split into its layers, each layer is parsed into a
//! [`ParsedShadow`], and shadows are bucketed into five elevation tiers by
//! how far they spread (`blur + spread`):
//!
//! | Level | Name | `blur + spread` |
//! |-------|------|-----------------|
//! | 1 | subtle | `< 3px` |
//! | 2 | low | `< 8px` |
//! | 3 | medium | `< 16px` |
//! | 4 | high | `< 32px` |
//! | 5 | heavy | `≥ 32px` |
//!
//! Inside a tier, near-identical shadows (geometry within 2px, opacity within
//! 0.1, same `inset`) are merged into one [`ShadowVariant`] with a usage count.

use std::collections::BTreeMap;
use std::fmt;

use cssparser::{ParseError, Parser, ParserInput, Token};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::color::{canonicalize_with, BuiltinOracle, ColorOracle, ColorValue};
use crate::style::length_from_token;

/// Maximum geometry difference, in pixels, for two shadows to merge.
pub const MERGE_DISTANCE_PX: f64 = 2.0;
/// Maximum opacity difference for two shadows to merge.
pub const MERGE_OPACITY: f64 = 0.1;

// ─── Parsing ────────────────────────────────────────────────────────────────

/// One shadow layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedShadow {
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
    pub spread: f64,
    pub color: ColorValue,
    pub inset: bool,
}

impl ParsedShadow {
    /// Parses every usable layer of a `box-shadow` value.
    ///
    /// `none`, malformed layers, fully transparent layers and layers without
    /// any geometry are dropped.
    ///
    /// ```rust
    /// use tokenlens_core::shadow::ParsedShadow;
    ///
    /// let layers = ParsedShadow::parse_all("0 1px 3px rgba(0, 0, 0, 0.1), 0 1px 2px -1px rgba(0, 0, 0, 0.1)");
    /// assert_eq!(layers.len(), 2);
    /// assert_eq!(layers[1].spread, -1.0);
    /// ```
    pub fn parse_all(value: &str) -> Vec<ParsedShadow> {
        Self::parse_all_with(value, &BuiltinOracle)
    }

    /// Like [`ParsedShadow::parse_all`], canonicalizing colors with `oracle`.
    pub fn parse_all_with(value: &str, oracle: &dyn ColorOracle) -> Vec<ParsedShadow> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("none") {
            return Vec::new();
        }
        split_layers(value)
            .into_iter()
            .filter_map(|layer| {
                let parsed = parse_layer(layer, oracle);
                if parsed.is_none() {
                    trace!(layer, "skipping shadow layer");
                }
                parsed
            })
            .filter(|s| s.color.a > 0.0 && !s.is_flat())
            .collect()
    }

    /// The spread magnitude tiers are assigned by.
    pub fn magnitude(&self) -> f64 {
        self.blur + self.spread
    }

    /// Every geometric component is zero.
    pub fn is_flat(&self) -> bool {
        self.offset_x == 0.0 && self.offset_y == 0.0 && self.blur == 0.0 && self.spread == 0.0
    }

    /// Whether two shadows are close enough to count as one variant.
    pub fn is_similar(&self, other: &ParsedShadow) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= MERGE_DISTANCE_PX;
        self.inset == other.inset
            && close(self.offset_x, other.offset_x)
            && close(self.offset_y, other.offset_y)
            && close(self.blur, other.blur)
            && close(self.spread, other.spread)
            && (self.color.a - other.color.a).abs() <= MERGE_OPACITY
    }

    /// Serializes back to a `box-shadow` layer.
    pub fn to_css(&self) -> String {
        format!(
            "{}{}px {}px {}px {}px {}",
            if self.inset { "inset " } else { "" },
            self.offset_x,
            self.offset_y,
            self.blur,
            self.spread,
            self.color.to_css()
        )
    }
}

impl fmt::Display for ParsedShadow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Splits at commas outside parentheses.
fn split_layers(value: &str) -> Vec<&str> {
    let mut layers = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                layers.push(value[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    layers.push(value[start..].trim());
    layers
}

fn skip_block<'i>(parser: &mut Parser<'i, '_>) -> Result<(), ParseError<'i, ()>> {
    while parser.next().is_ok() {}
    Ok(())
}

fn parse_layer(layer: &str, oracle: &dyn ColorOracle) -> Option<ParsedShadow> {
    let mut input = ParserInput::new(layer);
    let mut parser = Parser::new(&mut input);

    let mut lengths: Vec<f64> = Vec::with_capacity(4);
    let mut color_text: Option<&str> = None;
    let mut inset = false;

    while !parser.is_exhausted() {
        let start = parser.position();
        let token = parser.next().ok()?.clone();
        let text = match token {
            Token::Ident(ref ident) if ident.eq_ignore_ascii_case("inset") => {
                if inset {
                    return None;
                }
                inset = true;
                continue;
            }
            Token::Number { .. } | Token::Dimension { .. } => {
                lengths.push(length_from_token(&token)?);
                continue;
            }
            Token::Function(_) => {
                parser.parse_nested_block(skip_block).ok()?;
                parser.slice_from(start).trim()
            }
            Token::Hash(_) | Token::IDHash(_) | Token::Ident(_) => parser.slice_from(start).trim(),
            _ => return None,
        };
        if color_text.replace(text).is_some() {
            return None;
        }
    }

    let (offset_x, offset_y, blur, spread) = match lengths.as_slice() {
        [x, y] => (*x, *y, 0.0, 0.0),
        [x, y, blur] => (*x, *y, *blur, 0.0),
        [x, y, blur, spread] => (*x, *y, *blur, *spread),
        _ => return None,
    };
    if blur < 0.0 {
        return None;
    }

    let color = match color_text {
        None => default_color(),
        Some(text) if text.eq_ignore_ascii_case("currentcolor") => default_color(),
        Some(text) => canonicalize_with(text, oracle)?,
    };

    Some(ParsedShadow {
        offset_x,
        offset_y,
        blur,
        spread,
        color,
        inset,
    })
}

fn default_color() -> ColorValue {
    ColorValue::new(0, 0, 0, 1.0, "rgba(0, 0, 0, 1)")
}

// ─── Tiers ──────────────────────────────────────────────────────────────────

/// Elevation tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationTier {
    Subtle = 1,
    Low = 2,
    Medium = 3,
    High = 4,
    Heavy = 5,
}

impl ElevationTier {
    /// Tier for a `blur + spread` magnitude in pixels.
    pub fn from_magnitude(m: f64) -> Self {
        if m < 3.0 {
            ElevationTier::Subtle
        } else if m < 8.0 {
            ElevationTier::Low
        } else if m < 16.0 {
            ElevationTier::Medium
        } else if m < 32.0 {
            ElevationTier::High
        } else {
            ElevationTier::Heavy
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ElevationTier::Subtle => "subtle",
            ElevationTier::Low => "low",
            ElevationTier::Medium => "medium",
            ElevationTier::High => "high",
            ElevationTier::Heavy => "heavy",
        }
    }
}

/// A distinct shadow within a tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadowVariant {
    /// CSS text of the first occurrence.
    pub css: String,
    pub shadow: ParsedShadow,
    pub usage_count: usize,
}

/// All shadows of one elevation tier, most used first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElevationGroup {
    pub level: u8,
    pub name: String,
    pub shadows: Vec<ShadowVariant>,
    pub usage_count: usize,
}

impl ElevationGroup {
    /// The tier's most used shadow.
    pub fn representative(&self) -> Option<&ShadowVariant> {
        self.shadows.first()
    }
}

/// Groups raw `box-shadow` values into elevation tiers.
pub fn group_elevations<I, S>(raw_shadows: I) -> Vec<ElevationGroup>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    group_elevations_with(raw_shadows, &BuiltinOracle)
}

/// Groups raw `box-shadow` values, canonicalizing colors with `oracle`.
pub fn group_elevations_with<I, S>(raw_shadows: I, oracle: &dyn ColorOracle) -> Vec<ElevationGroup>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tiers: BTreeMap<ElevationTier, Vec<ShadowVariant>> = BTreeMap::new();

    for raw in raw_shadows {
        for shadow in ParsedShadow::parse_all_with(raw.as_ref(), oracle) {
            let variants = tiers
                .entry(ElevationTier::from_magnitude(shadow.magnitude()))
                .or_default();
            match variants.iter_mut().find(|v| v.shadow.is_similar(&shadow)) {
                Some(variant) => variant.usage_count += 1,
                None => variants.push(ShadowVariant {
                    css: shadow.to_css(),
                    shadow,
                    usage_count: 1,
                }),
            }
        }
    }

    tiers
        .into_iter()
        .map(|(tier, mut shadows)| {
            shadows.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
            ElevationGroup {
                level: tier.level(),
                name: tier.name().to_string(),
                usage_count: shadows.iter().map(|s| s.usage_count).sum(),
                shadows,
            }
        })
        .collect()
}
