//! Theme contexts for custom property declarations.
//!
//! A declaration applies to the light theme unless the selector of the rule
//! it appears in carries a dark-mode marker:
//!
//! | Marker | Example |
//! |--------|---------|
//! | `.dark` class | `.dark`, `html.dark`, `.dark button` |
//! | `.theme-dark` class | `body.theme-dark` |
//! | `data-theme` attribute | `[data-theme="dark"]`, `[data-theme='dark']`, `[data-theme=dark]` |
//!
//! `:root`, `html`, `body` and any selector without a marker are light.
//! Nesting at-rules (`@media (prefers-color-scheme: dark)` included) never
//! contribute a theme; only the rule's own selector does.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which UI theme a declaration applies to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ThemeContext {
    /// The default theme (`:root`, `html`, unrecognized selectors).
    Light,
    /// A dark theme, recognized from selector markers.
    Dark,
    /// A caller-supplied theme name.
    Custom(String),
}

impl ThemeContext {
    /// Classifies a rule selector into a theme context.
    ///
    /// ```rust
    /// use tokenlens_core::ThemeContext;
    ///
    /// assert_eq!(ThemeContext::from_selector(":root"), ThemeContext::Light);
    /// assert_eq!(ThemeContext::from_selector(".dark button"), ThemeContext::Dark);
    /// assert_eq!(ThemeContext::from_selector("[data-theme='dark']"), ThemeContext::Dark);
    /// ```
    pub fn from_selector(selector: &str) -> Self {
        let lower = selector.to_ascii_lowercase();
        if has_class(&lower, "dark") || has_class(&lower, "theme-dark") || has_dark_attribute(&lower)
        {
            ThemeContext::Dark
        } else {
            ThemeContext::Light
        }
    }

    /// The context's name as used in output.
    pub fn as_str(&self) -> &str {
        match self {
            ThemeContext::Light => "light",
            ThemeContext::Dark => "dark",
            ThemeContext::Custom(name) => name,
        }
    }
}

impl Default for ThemeContext {
    fn default() -> Self {
        ThemeContext::Light
    }
}

impl fmt::Display for ThemeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ThemeContext {
    fn from(name: String) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "light" | "" => ThemeContext::Light,
            "dark" => ThemeContext::Dark,
            _ => ThemeContext::Custom(name),
        }
    }
}

impl From<&str> for ThemeContext {
    fn from(name: &str) -> Self {
        ThemeContext::from(name.to_string())
    }
}

impl From<ThemeContext> for String {
    fn from(theme: ThemeContext) -> Self {
        match theme {
            ThemeContext::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Finds `.class` as a whole class token (so `.dark` does not match `.darker`).
fn has_class(selector: &str, class: &str) -> bool {
    let needle = format!(".{}", class);
    selector.match_indices(&needle).any(|(start, _)| {
        selector[start + needle.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_ident_char(c))
    })
}

fn has_dark_attribute(selector: &str) -> bool {
    let compact: String = selector.chars().filter(|c| !c.is_whitespace()).collect();
    ["[data-theme=\"dark\"]", "[data-theme='dark']", "[data-theme=dark]"]
        .iter()
        .any(|marker| compact.contains(marker))
}
