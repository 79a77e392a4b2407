//! Variant and size classification of sampled elements.
//!
//! Every sample gets a [`VariantLabel`] before clustering; the label is the
//! hard partition key of the clustering pass. The classifier looks at three
//! sources of evidence, strongest first:
//!
//! 1. **Class keywords**: `btn-primary`, `button--ghost`, `is-danger`, ...
//! 2. **Visual analysis** of the background: transparent backgrounds are
//!    outline/link/ghost variants, saturated ones are split into hue bands,
//!    grey ones are secondary. Near-white opaque backgrounds are undecided.
//! 3. **Text hints**: "Delete", "Cancel", "Learn more", ...
//!
//! A sample matching none of these is [`VariantLabel::Default`].

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::style::ComponentStyle;

/// The visual role of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantLabel {
    Primary,
    Secondary,
    #[serde(alias = "danger", alias = "error")]
    Destructive,
    Success,
    Warning,
    Ghost,
    Outline,
    Link,
    Default,
}

impl VariantLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantLabel::Primary => "primary",
            VariantLabel::Secondary => "secondary",
            VariantLabel::Destructive => "destructive",
            VariantLabel::Success => "success",
            VariantLabel::Warning => "warning",
            VariantLabel::Ghost => "ghost",
            VariantLabel::Outline => "outline",
            VariantLabel::Link => "link",
            VariantLabel::Default => "default",
        }
    }
}

impl fmt::Display for VariantLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secondary size label. Never used to partition clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeScale {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
}

impl SizeScale {
    /// Size band for a font size in pixels.
    pub fn from_font_size(px: f64) -> Option<Self> {
        if !(px > 0.0) {
            return None;
        }
        Some(if px < 13.0 {
            SizeScale::Sm
        } else if px <= 16.0 {
            SizeScale::Md
        } else if px <= 20.0 {
            SizeScale::Lg
        } else {
            SizeScale::Xl
        })
    }
}

/// Non-visual evidence about a sampled element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleHints {
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub text: String,
}

impl SampleHints {
    pub fn new(class_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            text: text.into(),
        }
    }
}

/// Keyword lists in match priority order. A class list mentioning both
/// `outline` and `primary` (`btn-outline-primary`) is an outline variant.
static VARIANT_KEYWORDS: Lazy<Vec<(VariantLabel, &'static [&'static str])>> = Lazy::new(|| {
    vec![
        (VariantLabel::Outline, &["outline", "outlined", "bordered"][..]),
        (VariantLabel::Ghost, &["ghost", "subtle", "plain"][..]),
        (VariantLabel::Link, &["link"][..]),
        (
            VariantLabel::Destructive,
            &["destructive", "danger", "error", "critical"][..],
        ),
        (VariantLabel::Success, &["success", "positive"][..]),
        (VariantLabel::Warning, &["warning", "warn", "caution"][..]),
        (VariantLabel::Secondary, &["secondary", "muted", "neutral"][..]),
        (VariantLabel::Primary, &["primary", "cta", "brand"][..]),
    ]
});

static SIZE_KEYWORDS: Lazy<HashMap<&'static str, SizeScale>> = Lazy::new(|| {
    [
        ("xs", SizeScale::Xs),
        ("tiny", SizeScale::Xs),
        ("sm", SizeScale::Sm),
        ("small", SizeScale::Sm),
        ("md", SizeScale::Md),
        ("medium", SizeScale::Md),
        ("lg", SizeScale::Lg),
        ("large", SizeScale::Lg),
        ("xl", SizeScale::Xl),
        ("2xl", SizeScale::Xl),
    ]
    .into_iter()
    .collect()
});

/// Saturation above which a background counts as a brand color.
const SATURATED_MIN: f64 = 0.35;
/// Brightness at or above which a grey background is treated like white.
const LIGHT_GREY_MIN: f64 = 0.9;

/// Labels a sample with its variant and, when known, its size.
pub fn classify(hints: &SampleHints, style: &ComponentStyle) -> (VariantLabel, Option<SizeScale>) {
    let parts = class_parts(&hints.class_name);

    let label = keyword_variant(&parts)
        .or_else(|| visual_variant(style))
        .or_else(|| text_variant(&hints.text))
        .unwrap_or(VariantLabel::Default);

    let size = parts
        .iter()
        .find_map(|part| SIZE_KEYWORDS.get(part.as_str()).copied())
        .or_else(|| SizeScale::from_font_size(style.font_size));

    (label, size)
}

/// Splits a class attribute into lowercase words: `btn btn-outline-primary`
/// becomes `btn, btn, outline, primary`. Tailwind-style variant prefixes
/// (`hover:`) and BEM separators (`__`, `--`) split as well.
fn class_parts(class_name: &str) -> Vec<String> {
    class_name
        .split(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | ':' | '/'))
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

fn keyword_variant(parts: &[String]) -> Option<VariantLabel> {
    VARIANT_KEYWORDS.iter().find_map(|(label, keywords)| {
        parts
            .iter()
            .any(|part| keywords.contains(&part.as_str()))
            .then_some(*label)
    })
}

fn visual_variant(style: &ComponentStyle) -> Option<VariantLabel> {
    let background = match &style.background {
        Some(bg) if !bg.is_transparent() => bg,
        _ => {
            return Some(if style.has_visible_border() {
                VariantLabel::Outline
            } else if style.underline {
                VariantLabel::Link
            } else {
                VariantLabel::Ghost
            });
        }
    };

    if background.is_near_white() {
        return None;
    }

    if background.saturation() > SATURATED_MIN {
        let hue = background.hue();
        return Some(if !(15.0..345.0).contains(&hue) {
            VariantLabel::Destructive
        } else if (90.0..=160.0).contains(&hue) {
            VariantLabel::Success
        } else if (30.0..=60.0).contains(&hue) {
            VariantLabel::Warning
        } else {
            VariantLabel::Primary
        });
    }

    (background.brightness() < LIGHT_GREY_MIN).then_some(VariantLabel::Secondary)
}

fn text_variant(text: &str) -> Option<VariantLabel> {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    let has = |word: &str| words.iter().any(|w| w == word);
    let phrase = words.join(" ");

    if has("delete") || has("remove") {
        Some(VariantLabel::Destructive)
    } else if has("cancel") || has("back") {
        Some(VariantLabel::Secondary)
    } else if phrase.contains("learn more") || phrase.contains("read more") {
        Some(VariantLabel::Link)
    } else {
        None
    }
}
