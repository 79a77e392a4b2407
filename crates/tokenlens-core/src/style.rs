//! Typed component styles.
//!
//! Samples arrive as computed-style maps (`property -> string`), which is how
//! a browser reports them. Clustering and classification work on the closed
//! [`ComponentStyle`] record instead: colors are canonical, lengths are CSS
//! pixels, and missing or unparseable properties take neutral defaults.
//!
//! Length syntax accepted by [`parse_length`]:
//!
//! | Input | Pixels |
//! |-------|--------|
//! | `12px` | 12 |
//! | `1.5rem`, `1.5em` | 24 (16px root) |
//! | `0`, `8` | unitless numbers are pixels |
//! | `50%`, `auto`, `normal` | not a length |

use std::collections::BTreeMap;

use cssparser::{Parser, ParserInput, Token};
use serde::{Deserialize, Serialize};

use crate::color::{canonicalize_with, BuiltinOracle, ColorOracle, ColorValue};

/// Pixels per `rem`/`em`.
pub const ROOT_FONT_SIZE: f64 = 16.0;

const DEFAULT_FONT_SIZE: f64 = 16.0;
const DEFAULT_FONT_WEIGHT: u16 = 400;

/// Padding box in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Same padding on every side.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Expands a 1–4 value `padding` shorthand (`8px 16px` etc.).
    pub fn from_shorthand(value: &str) -> Option<Self> {
        let lengths: Vec<f64> = value
            .split_whitespace()
            .map(parse_length)
            .collect::<Option<_>>()?;
        match lengths.as_slice() {
            [all] => Some(Self::uniform(*all)),
            [v, h] => Some(Self::new(*v, *h, *v, *h)),
            [t, h, b] => Some(Self::new(*t, *h, *b, *h)),
            [t, r, b, l] => Some(Self::new(*t, *r, *b, *l)),
            _ => None,
        }
    }

    /// The single scalar used for similarity: the mean of the four sides.
    pub fn scalar(&self) -> f64 {
        (self.top + self.right + self.bottom + self.left) / 4.0
    }
}

/// The closed set of visual properties the extractor compares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<ColorValue>,
    pub border_width: f64,
    pub border_radius: f64,
    pub padding: Padding,
    pub font_size: f64,
    pub font_weight: u16,
    #[serde(default)]
    pub underline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_shadow: Option<String>,
}

impl Default for ComponentStyle {
    fn default() -> Self {
        Self {
            background: None,
            color: None,
            border_color: None,
            border_width: 0.0,
            border_radius: 0.0,
            padding: Padding::default(),
            font_size: DEFAULT_FONT_SIZE,
            font_weight: DEFAULT_FONT_WEIGHT,
            underline: false,
            box_shadow: None,
        }
    }
}

impl ComponentStyle {
    /// Builds a style from a computed-style map using the built-in oracle.
    pub fn from_computed(styles: &BTreeMap<String, String>) -> Self {
        Self::from_computed_with(styles, &BuiltinOracle)
    }

    /// Builds a style from a computed-style map.
    ///
    /// Longhand properties (`padding-top`, `border-top-width`, ...) win over
    /// their shorthands when both are present.
    pub fn from_computed_with(styles: &BTreeMap<String, String>, oracle: &dyn ColorOracle) -> Self {
        let get = |name: &str| styles.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());
        let color = |name: &str| get(name).and_then(|v| canonicalize_with(v, oracle));

        let border_style_none = get("border-style")
            .or_else(|| get("border-top-style"))
            .map_or(false, |s| s == "none" || s == "hidden");
        let border_width = if border_style_none {
            0.0
        } else {
            get("border-top-width")
                .or_else(|| get("border-width"))
                .and_then(first_length)
                .unwrap_or(0.0)
        };

        let padding = match (
            get("padding-top"),
            get("padding-right"),
            get("padding-bottom"),
            get("padding-left"),
        ) {
            (None, None, None, None) => get("padding")
                .and_then(Padding::from_shorthand)
                .unwrap_or_default(),
            (t, r, b, l) => {
                let side = |v: Option<&str>| v.and_then(parse_length).unwrap_or(0.0);
                Padding::new(side(t), side(r), side(b), side(l))
            }
        };

        let font_weight = get("font-weight")
            .and_then(parse_font_weight)
            .unwrap_or(DEFAULT_FONT_WEIGHT);

        let underline = get("text-decoration-line")
            .or_else(|| get("text-decoration"))
            .map_or(false, |v| v.contains("underline"));

        let box_shadow = get("box-shadow")
            .filter(|v| *v != "none")
            .map(str::to_string);

        Self {
            background: color("background-color").or_else(|| color("background")),
            color: color("color"),
            border_color: color("border-top-color").or_else(|| color("border-color")),
            border_width,
            border_radius: get("border-top-left-radius")
                .or_else(|| get("border-radius"))
                .and_then(first_length)
                .unwrap_or(0.0),
            padding,
            font_size: get("font-size")
                .and_then(parse_length)
                .unwrap_or(DEFAULT_FONT_SIZE),
            font_weight,
            underline,
            box_shadow,
        }
    }

    /// True when the element draws a border that is not fully transparent.
    pub fn has_visible_border(&self) -> bool {
        self.border_width > 0.0
            && self
                .border_color
                .as_ref()
                .map_or(false, |c| !c.is_transparent())
    }

    /// True when the background is missing or (nearly) fully transparent.
    pub fn has_transparent_background(&self) -> bool {
        self.background.as_ref().map_or(true, ColorValue::is_transparent)
    }
}

/// Converts a single length token to pixels.
pub fn parse_length(value: &str) -> Option<f64> {
    let mut input = ParserInput::new(value.trim());
    let mut parser = Parser::new(&mut input);
    parser
        .parse_entirely(|p| {
            let length = length_from_token(p.next()?);
            length.ok_or_else(|| p.new_custom_error::<(), ()>(()))
        })
        .ok()
}

/// Pixel value of a length token, if it is one.
pub(crate) fn length_from_token(token: &Token<'_>) -> Option<f64> {
    match *token {
        Token::Number { value, .. } => Some(value as f64),
        Token::Dimension {
            value, ref unit, ..
        } => {
            let value = value as f64;
            match unit.to_ascii_lowercase().as_str() {
                "px" => Some(value),
                "rem" | "em" => Some(value * ROOT_FONT_SIZE),
                _ => None,
            }
        }
        _ => None,
    }
}

/// First length of a multi-value property (`8px 8px 4px 4px` → 8).
fn first_length(value: &str) -> Option<f64> {
    value.split_whitespace().next().and_then(parse_length)
}

fn parse_font_weight(value: &str) -> Option<u16> {
    match value.to_ascii_lowercase().as_str() {
        "normal" => Some(400),
        "bold" => Some(700),
        "lighter" => Some(300),
        "bolder" => Some(800),
        other => other
            .parse::<f64>()
            .ok()
            .filter(|w| (1.0..=1000.0).contains(w))
            .map(|w| w.round() as u16),
    }
}
