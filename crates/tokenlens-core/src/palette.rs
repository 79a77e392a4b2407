//! De-duplicated color palette.

use std::collections::HashMap;

use serde::Serialize;

use crate::color::ColorValue;
use crate::variables::ResolvedVariableTable;

/// One distinct color of the extracted palette.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorToken {
    /// Identity key, `#rrggbb` or `#rrggbbaa`.
    pub hex: String,
    /// `rgb(...)` / `rgba(...)` form.
    pub css: String,
    pub color: ColorValue,
    pub usage_count: usize,
    /// Custom properties resolving to this exact color.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<String>,
}

/// Accumulates canonical colors into [`ColorToken`]s.
///
/// Colors are keyed by [`ColorValue::to_hex`]; the first value seen for a
/// key is kept. Fully transparent colors are ignored.
#[derive(Debug, Default)]
pub struct PaletteBuilder {
    entries: HashMap<String, (ColorValue, usize)>,
}

impl PaletteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `color`.
    pub fn add(&mut self, color: &ColorValue) {
        if color.is_transparent() {
            return;
        }
        self.entries
            .entry(color.to_hex())
            .or_insert_with(|| (color.clone(), 0))
            .1 += 1;
    }

    /// Counts every color in `colors`.
    pub fn extend<'a, I>(&mut self, colors: I)
    where
        I: IntoIterator<Item = &'a ColorValue>,
    {
        for color in colors {
            self.add(color);
        }
    }

    /// Counts each resolved variable color once per theme entry.
    pub fn add_variables(&mut self, table: &ResolvedVariableTable) {
        self.extend(table.iter().filter_map(|(_, _, v)| v.color.as_ref()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Emits tokens sorted by usage (descending), then hex.
    pub fn build(self, variables: &ResolvedVariableTable) -> Vec<ColorToken> {
        let mut tokens: Vec<ColorToken> = self
            .entries
            .into_iter()
            .map(|(hex, (color, usage_count))| ColorToken {
                css: color.to_css(),
                variables: variables.variables_for_color(&color).to_vec(),
                hex,
                color,
                usage_count,
            })
            .collect();
        tokens.sort_by(|a, b| {
            b.usage_count
                .cmp(&a.usage_count)
                .then_with(|| a.hex.cmp(&b.hex))
        });
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::canonicalize;
    use crate::variables::{resolve, CssVariableDeclaration};
    use crate::ThemeContext;

    fn color(s: &str) -> ColorValue {
        canonicalize(s).unwrap()
    }

    #[test]
    fn test_dedupes_by_hex() {
        let mut palette = PaletteBuilder::new();
        palette.add(&color("#fff"));
        palette.add(&color("rgb(255, 255, 255)"));
        palette.add(&color("white"));
        palette.add(&color("#000"));

        let tokens = palette.build(&ResolvedVariableTable::default());
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].hex, "#ffffff");
        assert_eq!(tokens[0].usage_count, 3);
        // first-seen source is kept
        assert_eq!(tokens[0].color.source, "#fff");
        assert_eq!(tokens[1].css, "rgb(0, 0, 0)");
    }

    #[test]
    fn test_ties_sorted_by_hex() {
        let mut palette = PaletteBuilder::new();
        palette.extend(&[color("#ff0000"), color("#00ff00"), color("#0000ff")]);
        let hexes: Vec<_> = palette
            .build(&ResolvedVariableTable::default())
            .into_iter()
            .map(|t| t.hex)
            .collect();
        assert_eq!(hexes, vec!["#0000ff", "#00ff00", "#ff0000"]);
    }

    #[test]
    fn test_transparent_is_not_a_token() {
        let mut palette = PaletteBuilder::new();
        palette.add(&color("transparent"));
        palette.add(&color("rgba(0, 0, 0, 0.02)"));
        assert!(palette.is_empty());

        palette.add(&color("rgba(0, 0, 0, 0.5)"));
        assert_eq!(palette.len(), 1);
    }

    #[test]
    fn test_same_as_variables() {
        let table = resolve(&[
            CssVariableDeclaration::new("--primary", ThemeContext::Light, "#5167fc"),
            CssVariableDeclaration::new("--accent", ThemeContext::Light, "var(--primary)"),
            CssVariableDeclaration::new("--muted", ThemeContext::Light, "#6b7280"),
        ]);

        let mut palette = PaletteBuilder::new();
        palette.add(&color("rgb(81, 103, 252)"));
        palette.add(&color("rgb(81, 103, 252)"));
        palette.add_variables(&table);

        let tokens = palette.build(&table);
        assert_eq!(tokens[0].hex, "#5167fc");
        assert_eq!(tokens[0].usage_count, 4);
        assert_eq!(tokens[0].variables, vec!["--accent", "--primary"]);
        assert_eq!(tokens[1].hex, "#6b7280");
        assert_eq!(tokens[1].variables, vec!["--muted"]);
    }
}
