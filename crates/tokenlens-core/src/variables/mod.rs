//! CSS custom property resolution.
//!
//! Declarations are grouped by name and [`ThemeContext`], then every value's
//! `var(--name[, fallback])` references are substituted until none remain:
//!
//! 1. the referenced variable in the same theme,
//! 2. else the referenced variable in the light theme,
//! 3. else the reference's fallback text,
//! 4. else the reference is left as literal text.
//!
//! A reference back to a declaration that is already being expanded is a
//! cycle: that declaration is skipped and the lookup continues down the same
//! list, so a dark `--x: var(--x)` picks up the light `--x`. Substitution
//! nests at most [`MAX_RESOLUTION_DEPTH`] levels deep and writes at most
//! [`MAX_EXPANSION_BYTES`]; past either bound the remaining references stay
//! literal and the value is marked incomplete.
//!
//! Every resolved value that parses as a color is tagged with its canonical
//! [`ColorValue`], and the table keeps a reverse index from canonical hex to
//! the variables that produce it.
//!
//! # Example
//!
//! ```rust
//! use tokenlens_core::variables::{resolve, CssVariableDeclaration};
//! use tokenlens_core::ThemeContext;
//!
//! let table = resolve(&[
//!     CssVariableDeclaration::new("--brand", ThemeContext::Light, "#5167fc"),
//!     CssVariableDeclaration::new("--button-bg", ThemeContext::Light, "var(--brand)"),
//!     CssVariableDeclaration::new("--brand", ThemeContext::Dark, "#8da0ff"),
//! ]);
//!
//! assert_eq!(table.value("--button-bg", &ThemeContext::Light), Some("#5167fc"));
//! // The dark theme has no --button-bg of its own; its light value is reused
//! assert_eq!(table.value("--button-bg", &ThemeContext::Dark), Some("#5167fc"));
//! ```

mod reference;
mod theme;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::color::{canonicalize_with, BuiltinOracle, ColorOracle, ColorValue};

use reference::{contains_reference, find_references, VarReference};

pub use theme::ThemeContext;

/// Maximum nesting of substitutions applied to one value.
pub const MAX_RESOLUTION_DEPTH: usize = 10;

/// Maximum bytes written while expanding one value.
pub const MAX_EXPANSION_BYTES: usize = 64 * 1024;

/// A single custom property declaration as found in a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssVariableDeclaration {
    /// Property name, including the leading `--`.
    pub name: String,
    #[serde(default)]
    pub theme: ThemeContext,
    pub raw_value: String,
}

impl CssVariableDeclaration {
    pub fn new(
        name: impl Into<String>,
        theme: ThemeContext,
        raw_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            theme,
            raw_value: raw_value.into(),
        }
    }

    /// Creates a declaration whose theme is classified from its rule selector.
    pub fn from_selector(
        name: impl Into<String>,
        selector: &str,
        raw_value: impl Into<String>,
    ) -> Self {
        Self::new(name, ThemeContext::from_selector(selector), raw_value)
    }
}

/// The outcome of resolving one declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedVariable {
    /// The value as declared.
    pub raw: String,
    /// The value after substitution.
    pub value: String,
    /// Canonical color, when the resolved value is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorValue>,
    /// False when `var()` references survived substitution.
    pub complete: bool,
}

/// Resolved custom properties keyed by name, then theme.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedVariableTable {
    variables: BTreeMap<String, BTreeMap<ThemeContext, ResolvedVariable>>,
    /// Canonical hex -> names of the variables resolving to that color.
    colors: BTreeMap<String, Vec<String>>,
}

impl ResolvedVariableTable {
    /// Exact lookup for one theme.
    pub fn get(&self, name: &str, theme: &ThemeContext) -> Option<&ResolvedVariable> {
        self.variables.get(name)?.get(theme)
    }

    /// Lookup with the same light-theme fallback substitution uses.
    pub fn lookup(&self, name: &str, theme: &ThemeContext) -> Option<&ResolvedVariable> {
        let themes = self.variables.get(name)?;
        themes.get(theme).or_else(|| themes.get(&ThemeContext::Light))
    }

    /// Resolved value for `name`, falling back to the light theme.
    pub fn value(&self, name: &str, theme: &ThemeContext) -> Option<&str> {
        self.lookup(name, theme).map(|v| v.value.as_str())
    }

    /// Names of the variables whose resolved color equals `color`.
    pub fn variables_for_color(&self, color: &ColorValue) -> &[String] {
        self.colors
            .get(&color.to_hex())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Variable names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Every resolved entry as `(name, theme, variable)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ThemeContext, &ResolvedVariable)> {
        self.variables.iter().flat_map(|(name, themes)| {
            themes
                .iter()
                .map(move |(theme, resolved)| (name.as_str(), theme, resolved))
        })
    }

    /// Entries resolved for one theme, with light values filling gaps.
    pub fn for_theme<'a>(
        &'a self,
        theme: &'a ThemeContext,
    ) -> impl Iterator<Item = (&'a str, &'a ResolvedVariable)> + 'a {
        self.variables
            .keys()
            .filter_map(move |name| self.lookup(name, theme).map(|v| (name.as_str(), v)))
    }

    /// Number of distinct variable names.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Raw declarations after last-wins de-duplication.
type RawTable<'d> = BTreeMap<&'d str, BTreeMap<ThemeContext, &'d str>>;

/// Resolves declarations against a color oracle.
pub struct Resolver<'o> {
    oracle: &'o dyn ColorOracle,
}

impl Resolver<'static> {
    /// A resolver using the [`BuiltinOracle`] for color tagging.
    pub fn new() -> Self {
        Self {
            oracle: &BuiltinOracle,
        }
    }
}

impl Default for Resolver<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'o> Resolver<'o> {
    /// Replaces the oracle used for color tagging.
    pub fn with_oracle<'n>(self, oracle: &'n dyn ColorOracle) -> Resolver<'n> {
        Resolver { oracle }
    }

    /// Resolves every declaration into a table.
    pub fn resolve(&self, declarations: &[CssVariableDeclaration]) -> ResolvedVariableTable {
        let raw = group_declarations(declarations);
        let mut table = ResolvedVariableTable::default();

        for (name, themes) in &raw {
            for (theme, raw_value) in themes {
                let (value, complete) = substitute(&raw, *name, theme, *raw_value);
                if !complete {
                    debug!(variable = name, theme = %theme, "var() references left unresolved");
                }

                let color = canonicalize_with(&value, self.oracle);
                if let Some(color) = &color {
                    let names = table.colors.entry(color.to_hex()).or_default();
                    if !names.iter().any(|n| n == name) {
                        names.push(name.to_string());
                    }
                }

                table.variables.entry(name.to_string()).or_default().insert(
                    theme.clone(),
                    ResolvedVariable {
                        raw: raw_value.to_string(),
                        value,
                        color,
                        complete,
                    },
                );
            }
        }

        table
    }
}

/// Resolves declarations with the built-in oracle.
pub fn resolve(declarations: &[CssVariableDeclaration]) -> ResolvedVariableTable {
    Resolver::new().resolve(declarations)
}

fn group_declarations(declarations: &[CssVariableDeclaration]) -> RawTable<'_> {
    let mut raw: RawTable<'_> = BTreeMap::new();
    for decl in declarations {
        if !decl.name.starts_with("--") {
            trace!(name = %decl.name, "ignoring non-custom property");
            continue;
        }
        raw.entry(decl.name.as_str())
            .or_default()
            .insert(decl.theme.clone(), decl.raw_value.trim());
    }
    raw
}

/// Expands a raw value, returning it and whether it is free of references.
fn substitute<'d>(
    raw: &RawTable<'d>,
    name: &'d str,
    theme: &ThemeContext,
    value: &'d str,
) -> (String, bool) {
    if !contains_reference(value) {
        return (value.to_string(), true);
    }

    let mut expansion = Expansion {
        raw,
        theme,
        path: vec![(name, theme.clone())],
        written: 0,
    };
    let out = expansion.expand(value, 0);
    if expansion.written > MAX_EXPANSION_BYTES {
        debug!(
            variable = name,
            theme = %theme,
            bytes = out.len(),
            "expansion budget exhausted"
        );
    }

    let complete = find_references(&out).is_empty();
    (out, complete)
}

/// State for expanding one declaration.
struct Expansion<'r, 'd> {
    raw: &'r RawTable<'d>,
    /// Theme of the declaration being resolved; nested lookups use it too.
    theme: &'r ThemeContext,
    /// Declarations currently being expanded, outermost first.
    path: Vec<(&'d str, ThemeContext)>,
    written: usize,
}

impl<'d> Expansion<'_, 'd> {
    fn expand(&mut self, value: &'d str, depth: usize) -> String {
        let mut out = String::with_capacity(value.len());
        let mut cursor = 0;

        for reference in find_references(value) {
            self.push(&mut out, &value[cursor..reference.start]);
            let within_bounds = depth < MAX_RESOLUTION_DEPTH && self.written <= MAX_EXPANSION_BYTES;
            let replacement = if within_bounds {
                self.replace(&reference, depth)
            } else {
                None
            };
            match replacement {
                Some(text) => self.push(&mut out, &text),
                None => self.push(&mut out, &value[reference.start..reference.end]),
            }
            cursor = reference.end;
        }
        self.push(&mut out, &value[cursor..]);
        out
    }

    fn replace(&mut self, reference: &VarReference<'d>, depth: usize) -> Option<String> {
        if let Some((theme, raw_value)) = self.lookup(reference.name) {
            self.path.push((reference.name, theme));
            let text = self.expand(raw_value, depth + 1);
            self.path.pop();
            return Some(text);
        }
        reference
            .fallback
            .map(|fallback| self.expand(fallback.trim(), depth + 1))
    }

    /// Same-theme declaration, else light, skipping any on the current path.
    fn lookup(&self, name: &'d str) -> Option<(ThemeContext, &'d str)> {
        let themes = self.raw.get(name)?;
        [self.theme, &ThemeContext::Light]
            .into_iter()
            .find_map(|theme| {
                let value = themes.get(theme)?;
                let on_path = self.path.iter().any(|(n, t)| *n == name && t == theme);
                if on_path {
                    trace!(variable = name, theme = %theme, "cyclic reference");
                    return None;
                }
                Some((theme.clone(), *value))
            })
    }

    fn push(&mut self, out: &mut String, text: &str) {
        self.written += text.len();
        out.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PassthroughOracle;

    fn decl(name: &str, theme: ThemeContext, value: &str) -> CssVariableDeclaration {
        CssVariableDeclaration::new(name, theme, value)
    }

    fn light(name: &str, value: &str) -> CssVariableDeclaration {
        decl(name, ThemeContext::Light, value)
    }

    fn dark(name: &str, value: &str) -> CssVariableDeclaration {
        decl(name, ThemeContext::Dark, value)
    }

    // =========================================================================
    // Substitution
    // =========================================================================

    #[test]
    fn test_plain_value_is_unchanged() {
        let table = resolve(&[light("--radius", "  0.5rem ")]);
        let v = table.get("--radius", &ThemeContext::Light).unwrap();
        assert_eq!(v.raw, "0.5rem");
        assert_eq!(v.value, "0.5rem");
        assert!(v.complete);
        assert!(v.color.is_none());
    }

    #[test]
    fn test_chain_resolves() {
        let table = resolve(&[
            light("--a", "var(--b)"),
            light("--b", "var(--c)"),
            light("--c", "#ff0000"),
        ]);
        assert_eq!(table.value("--a", &ThemeContext::Light), Some("#ff0000"));
    }

    #[test]
    fn test_same_theme_preferred_over_light() {
        let table = resolve(&[
            light("--fg", "#000000"),
            dark("--fg", "#ffffff"),
            light("--text", "var(--fg)"),
            dark("--text", "var(--fg)"),
        ]);
        assert_eq!(table.value("--text", &ThemeContext::Light), Some("#000000"));
        assert_eq!(table.value("--text", &ThemeContext::Dark), Some("#ffffff"));
    }

    #[test]
    fn test_dark_falls_back_to_light_reference() {
        let table = resolve(&[light("--brand", "#123456"), dark("--button", "var(--brand)")]);
        assert_eq!(table.value("--button", &ThemeContext::Dark), Some("#123456"));
    }

    #[test]
    fn test_missing_uses_fallback() {
        let table = resolve(&[light("--x", "var(--missing, #000)")]);
        assert_eq!(table.value("--x", &ThemeContext::Light), Some("#000"));
    }

    #[test]
    fn test_nested_fallback() {
        let table = resolve(&[
            light("--x", "var(--missing, var(--also-missing, var(--present)))"),
            light("--present", "red"),
        ]);
        let v = table.get("--x", &ThemeContext::Light).unwrap();
        assert_eq!(v.value, "red");
        assert!(v.complete);
    }

    #[test]
    fn test_missing_without_fallback_stays_literal() {
        let table = resolve(&[light("--x", "1px solid var(--missing)")]);
        let v = table.get("--x", &ThemeContext::Light).unwrap();
        assert_eq!(v.value, "1px solid var(--missing)");
        assert!(!v.complete);
    }

    #[test]
    fn test_multiple_references() {
        let table = resolve(&[
            light("--x", "var(--w) solid var(--c)"),
            light("--w", "2px"),
            light("--c", "blue"),
        ]);
        assert_eq!(table.value("--x", &ThemeContext::Light), Some("2px solid blue"));
    }

    #[test]
    fn test_mutual_cycle_terminates() {
        let table = resolve(&[light("--a", "var(--b)"), light("--b", "var(--a)")]);
        let a = table.get("--a", &ThemeContext::Light).unwrap();
        assert!(!a.complete);
        assert_eq!(a.value, "var(--a)");
    }

    #[test]
    fn test_self_reference_terminates() {
        let table = resolve(&[light("--a", "var(--a)")]);
        assert_eq!(table.value("--a", &ThemeContext::Light), Some("var(--a)"));
    }

    #[test]
    fn test_repeated_self_reference_stays_literal() {
        let raw = vec!["var(--a)"; 8].join(" ");
        let table = resolve(&[light("--a", &raw)]);
        let a = table.get("--a", &ThemeContext::Light).unwrap();
        assert!(!a.complete);
        assert_eq!(a.value, raw);
    }

    #[test]
    fn test_fan_out_chain_is_bounded() {
        let mut decls: Vec<_> = (0..11)
            .map(|i| {
                let refs = vec![format!("var(--c{})", i + 1); 8].join(" ");
                light(&format!("--c{}", i), &refs)
            })
            .collect();
        decls.push(light("--c11", "#abcdef"));
        let table = resolve(&decls);

        let head = table.get("--c0", &ThemeContext::Light).unwrap();
        assert!(!head.complete);
        assert!(head.value.len() < 2 * MAX_EXPANSION_BYTES);

        let near_tail = table.get("--c9", &ThemeContext::Light).unwrap();
        assert!(near_tail.complete);
        assert_eq!(near_tail.value, vec!["#abcdef"; 64].join(" "));
    }

    #[test]
    fn test_cycle_falls_back_to_light() {
        let table = resolve(&[light("--x", "#ff0000"), dark("--x", "var(--x)")]);
        let x = table.get("--x", &ThemeContext::Dark).unwrap();
        assert_eq!(x.value, "#ff0000");
        assert!(x.complete);
    }

    #[test]
    fn test_mutual_cycle_in_dark_falls_back_to_light() {
        let table = resolve(&[
            light("--a", "#111111"),
            dark("--a", "var(--b)"),
            dark("--b", "var(--a)"),
        ]);
        assert_eq!(table.value("--a", &ThemeContext::Dark), Some("#111111"));
    }

    #[test]
    fn test_cycle_uses_fallback_without_light() {
        let table = resolve(&[light("--a", "var(--a, red)")]);
        let a = table.get("--a", &ThemeContext::Light).unwrap();
        assert_eq!(a.value, "red");
        assert!(a.complete);
    }

    #[test]
    fn test_deep_chain_beyond_bound_is_partial() {
        let mut decls: Vec<_> = (0..15)
            .map(|i| light(&format!("--v{}", i), &format!("var(--v{})", i + 1)))
            .collect();
        decls.push(light("--v15", "#fff"));
        let table = resolve(&decls);

        let head = table.get("--v0", &ThemeContext::Light).unwrap();
        assert_eq!(head.value, "var(--v11)");
        assert!(!head.complete);

        let tail = table.get("--v10", &ThemeContext::Light).unwrap();
        assert_eq!(tail.value, "#fff");
    }

    #[test]
    fn test_later_declaration_wins() {
        let table = resolve(&[light("--x", "1px"), light("--x", "2px")]);
        assert_eq!(table.value("--x", &ThemeContext::Light), Some("2px"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_non_custom_property_ignored() {
        let table = resolve(&[light("color", "red")]);
        assert!(table.is_empty());
    }

    // =========================================================================
    // Color tagging
    // =========================================================================

    #[test]
    fn test_colors_are_tagged() {
        let table = resolve(&[light("--primary", "oklch(100% 0 0)"), light("--gap", "4px")]);
        let primary = table.get("--primary", &ThemeContext::Light).unwrap();
        assert_eq!(primary.color.as_ref().map(|c| c.to_hex()), Some("#ffffff".to_string()));
        assert!(table.get("--gap", &ThemeContext::Light).unwrap().color.is_none());
    }

    #[test]
    fn test_reverse_index() {
        let table = resolve(&[
            light("--white", "#fff"),
            light("--surface", "var(--white)"),
            dark("--surface", "rgb(255, 255, 255)"),
            light("--black", "#000"),
        ]);
        let white = ColorValue::new(255, 255, 255, 1.0, "white");
        assert_eq!(
            table.variables_for_color(&white),
            &["--surface".to_string(), "--white".to_string()]
        );
        let red = ColorValue::new(255, 0, 0, 1.0, "red");
        assert!(table.variables_for_color(&red).is_empty());
    }

    #[test]
    fn test_oracle_controls_tagging() {
        let decls = [light("--accent", "hsl(0, 100%, 50%)")];
        let builtin = resolve(&decls);
        assert!(builtin.get("--accent", &ThemeContext::Light).unwrap().color.is_some());

        let passthrough = Resolver::new().with_oracle(&PassthroughOracle).resolve(&decls);
        assert!(passthrough
            .get("--accent", &ThemeContext::Light)
            .unwrap()
            .color
            .is_none());
    }

    #[test]
    fn test_for_theme_fills_from_light() {
        let table = resolve(&[light("--a", "1px"), light("--b", "2px"), dark("--b", "3px")]);
        let dark_theme = ThemeContext::Dark;
        let values: Vec<_> = table
            .for_theme(&dark_theme)
            .map(|(name, v)| (name, v.value.as_str()))
            .collect();
        assert_eq!(values, vec![("--a", "1px"), ("--b", "3px")]);
    }

    #[test]
    fn test_serializes_by_theme_name() {
        let table = resolve(&[dark("--x", "1px")]);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["variables"]["--x"]["dark"]["value"], "1px");
    }
}
