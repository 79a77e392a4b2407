//! Argument tokenizing for CSS color functions.
//!
//! Every functional notation the canonicalizer and the built-in oracle handle
//! (`rgb()`, `oklch()`, `hsl()`, `lab()`, ...) shares the same argument shape:
//! a list of numbers, percentages or angles, optionally separated by commas,
//! with an optional `/ alpha` tail. This module turns the text between the
//! parentheses into [`Component`]s using the `cssparser` tokenizer, so the
//! individual notations only deal with numeric interpretation.

use cssparser::{Parser, ParserInput, Token};

/// One numeric argument of a color function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Component {
    /// A plain number (`0.5`, `255`).
    Number(f64),
    /// A percentage as a unit value (`50%` is `0.5`).
    Percentage(f64),
    /// An angle normalized to degrees (`1turn` is `360.0`).
    Angle(f64),
    /// The `none` keyword.
    None,
}

impl Component {
    /// Interprets the component as a number, scaling percentages by `percent_scale`.
    pub(crate) fn number(self, percent_scale: f64) -> f64 {
        match self {
            Component::Number(n) | Component::Angle(n) => n,
            Component::Percentage(p) => p * percent_scale,
            Component::None => 0.0,
        }
    }

    /// Interprets the component as a hue in degrees.
    pub(crate) fn hue(self) -> Option<f64> {
        match self {
            Component::Number(n) | Component::Angle(n) => Some(n),
            Component::None => Some(0.0),
            Component::Percentage(_) => None,
        }
    }

    /// Interprets the component as an alpha value clamped to `0.0..=1.0`.
    ///
    /// Rounded to four decimals so `0.1` stays `0.1` after the f32 round trip
    /// through the tokenizer.
    pub(crate) fn alpha(self) -> f64 {
        let alpha = match self {
            Component::Number(n) => n.clamp(0.0, 1.0),
            Component::Percentage(p) => p.clamp(0.0, 1.0),
            Component::Angle(_) | Component::None => return 1.0,
        };
        (alpha * 10_000.0).round() / 10_000.0
    }
}

/// A parsed `name(args)` color function.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FunctionArgs {
    /// Lowercased function name.
    pub name: String,
    /// Components before the `/`.
    pub channels: Vec<Component>,
    /// Component after the `/`, if any.
    pub alpha: Option<Component>,
}

impl FunctionArgs {
    /// Splits off a legacy comma-syntax alpha (`rgba(0, 0, 0, 0.5)`) when
    /// the function carries one more channel than it expects.
    pub(crate) fn take_legacy_alpha(&mut self, expected: usize) {
        if self.alpha.is_none() && self.channels.len() == expected + 1 {
            self.alpha = self.channels.pop();
        }
    }

    /// Resolved alpha, defaulting to fully opaque.
    pub(crate) fn alpha_value(&self) -> f64 {
        self.alpha.map(Component::alpha).unwrap_or(1.0)
    }
}

/// Parses `name(arg arg arg / alpha)` into its components.
///
/// Returns `None` when the text is not a function call or when any argument
/// is something other than a number, percentage, angle or `none`.
pub(crate) fn parse_function(input: &str) -> Option<FunctionArgs> {
    let (name, rest) = input.trim().split_once('(')?;
    let body = rest.trim_end().strip_suffix(')')?;
    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut parser_input = ParserInput::new(body);
    let mut parser = Parser::new(&mut parser_input);

    let mut channels = Vec::new();
    let mut alpha = None;
    let mut after_slash = false;

    while !parser.is_exhausted() {
        let token = parser.next().ok()?.clone();
        let component = match token {
            Token::Comma => continue,
            Token::Delim('/') => {
                if after_slash {
                    return None;
                }
                after_slash = true;
                continue;
            }
            Token::Number { value, .. } => Component::Number(value as f64),
            Token::Percentage { unit_value, .. } => Component::Percentage(unit_value as f64),
            Token::Dimension {
                value, ref unit, ..
            } => Component::Angle(angle_to_degrees(value as f64, unit.as_ref())?),
            Token::Ident(ref ident) if ident.eq_ignore_ascii_case("none") => Component::None,
            _ => return None,
        };

        if after_slash {
            if alpha.is_some() {
                return None;
            }
            alpha = Some(component);
        } else {
            channels.push(component);
        }
    }

    if after_slash && alpha.is_none() {
        return None;
    }

    Some(FunctionArgs {
        name,
        channels,
        alpha,
    })
}

fn angle_to_degrees(value: f64, unit: &str) -> Option<f64> {
    match unit.to_ascii_lowercase().as_str() {
        "deg" => Some(value),
        "grad" => Some(value * 0.9),
        "rad" => Some(value.to_degrees()),
        "turn" => Some(value * 360.0),
        _ => None,
    }
}
