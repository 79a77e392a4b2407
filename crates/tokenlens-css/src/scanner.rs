//! Custom property collection from stylesheet text.
//!
//! The scanner walks a stylesheet with `cssparser` and records every custom
//! property declaration (`--name: value`) together with the theme its rule
//! selector targets:
//!
//! ```css
//! :root { --bg: #fff; }              /* light */
//! .dark { --bg: #0b0b0f; }           /* dark */
//!
//! @media (min-width: 640px) {
//!     [data-theme="dark"] .card { --radius: 12px; }   /* dark, media is flattened */
//! }
//! ```
//!
//! Grouping at-rules (`@media`, `@supports`, `@layer`, `@container`, `@scope`,
//! `@document`) are flattened: their rules are scanned as if written at top
//! level, and the at-rule itself never contributes a theme. Other at-rules
//! (`@font-face`, `@keyframes`, `@import`, ...) are consumed and ignored.
//!
//! Values are kept as written, minus comments and `!important`. Regular
//! properties are ignored. Rules the tokenizer cannot make sense of are
//! skipped and reported in [`ScanReport::skipped`].

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, Token,
};
use serde::{Deserialize, Serialize};
use tokenlens_core::{CssVariableDeclaration, ThemeContext};
use tracing::{debug, trace};

use crate::error::{Result, ScanError};

/// Longest rule excerpt kept for a skipped rule.
const SNIPPET_MAX: usize = 80;

/// Scanner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Custom properties whose names start with any of these are not
    /// collected. Defaults to Tailwind's internal `--tw-` plumbing.
    pub ignore_prefixes: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            ignore_prefixes: vec!["--tw-".to_string()],
        }
    }
}

impl ScanOptions {
    /// Whether `name` matches one of the ignored prefixes.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }
}

/// A rule the scanner could not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRule {
    /// 1-based line of the parse error.
    pub line: u32,
    pub column: u32,
    /// The start of the offending rule text.
    pub snippet: String,
}

/// What one stylesheet contributed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Custom property declarations in stylesheet order.
    pub declarations: Vec<CssVariableDeclaration>,
    /// Number of style rules visited, nested ones included.
    pub rules: usize,
    pub skipped: Vec<SkippedRule>,
}

impl ScanReport {
    pub fn skipped_rules(&self) -> usize {
        self.skipped.len()
    }

    /// Appends another report, keeping declaration order.
    pub fn merge(&mut self, other: ScanReport) {
        self.declarations.extend(other.declarations);
        self.rules += other.rules;
        self.skipped.extend(other.skipped);
    }
}

/// Collects custom property declarations from a stylesheet.
///
/// Never fails: unparseable rules are counted in the report.
pub fn scan_stylesheet(css: &str, options: &ScanOptions) -> ScanReport {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);

    let mut collector = VariableCollector {
        options,
        report: ScanReport::default(),
    };
    collector.scan_rules(&mut parser);

    debug!(
        declarations = collector.report.declarations.len(),
        rules = collector.report.rules,
        skipped = collector.report.skipped.len(),
        "scanned stylesheet"
    );
    collector.report
}

/// Like [`scan_stylesheet`], but fails on the first unparseable rule.
pub fn scan_stylesheet_strict(css: &str, options: &ScanOptions) -> Result<ScanReport> {
    let report = scan_stylesheet(css, options);
    match report.skipped.first() {
        Some(rule) => Err(ScanError::InvalidRule {
            line: rule.line,
            column: rule.column,
            snippet: rule.snippet.clone(),
        }),
        None => Ok(report),
    }
}

/// Reads and scans a stylesheet file.
pub fn scan_file(path: impl AsRef<std::path::Path>, options: &ScanOptions) -> Result<ScanReport> {
    let path = path.as_ref();
    let css = std::fs::read_to_string(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(scan_stylesheet(&css, options))
}

// ─── Rule level ─────────────────────────────────────────────────────────────

struct VariableCollector<'o> {
    options: &'o ScanOptions,
    report: ScanReport,
}

impl VariableCollector<'_> {
    fn scan_rules<'i>(&mut self, input: &mut Parser<'i, '_>) {
        let rules = cssparser::StyleSheetParser::new(input, self);
        let mut skipped = Vec::new();
        for result in rules {
            if let Err((error, slice)) = result {
                skipped.push(SkippedRule {
                    line: error.location.line + 1,
                    column: error.location.column,
                    snippet: snippet(slice),
                });
            }
        }
        for rule in &skipped {
            trace!(line = rule.line, snippet = %rule.snippet, "skipping rule");
        }
        self.report.skipped.extend(skipped);
    }
}

/// How an at-rule's block is treated.
enum AtRuleKind {
    /// Contains rules to scan as if at top level.
    Group,
    /// Consumed without looking inside.
    Ignored,
}

impl<'i> QualifiedRuleParser<'i> for VariableCollector<'_> {
    type Prelude = String;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let start = input.position();
        loop {
            let location = input.current_source_location();
            match input.next_including_whitespace_and_comments() {
                Ok(
                    Token::CloseCurlyBracket
                    | Token::CloseParenthesis
                    | Token::CloseSquareBracket
                    | Token::BadString(_)
                    | Token::BadUrl(_),
                ) => return Err(location.new_custom_error(())),
                Ok(_) => {}
                Err(_) => break,
            }
        }
        Ok(input.slice_from(start).trim().to_string())
    }

    fn parse_block<'t>(
        &mut self,
        selector: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        self.report.rules += 1;
        let theme = ThemeContext::from_selector(&selector);

        let mut decl_parser = CustomPropertyParser;
        let body = RuleBodyParser::new(input, &mut decl_parser);

        for (name, value) in body.flatten().flatten() {
            if self.options.is_ignored(&name) {
                continue;
            }
            trace!(name = %name, theme = %theme, selector = %selector, "custom property");
            self.report
                .declarations
                .push(CssVariableDeclaration::new(name, theme.clone(), value));
        }
        Ok(())
    }
}

impl<'i> AtRuleParser<'i> for VariableCollector<'_> {
    type Prelude = AtRuleKind;
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::Prelude, ParseError<'i, Self::Error>> {
        while input.next().is_ok() {}
        let kind = match name.to_ascii_lowercase().as_str() {
            "media" | "supports" | "layer" | "container" | "scope" | "document" => {
                AtRuleKind::Group
            }
            _ => AtRuleKind::Ignored,
        };
        Ok(kind)
    }

    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
    ) -> std::result::Result<Self::AtRule, ()> {
        // @import, @charset, @layer a, b;
        Ok(())
    }

    fn parse_block<'t>(
        &mut self,
        kind: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::AtRule, ParseError<'i, Self::Error>> {
        match kind {
            AtRuleKind::Group => self.scan_rules(input),
            AtRuleKind::Ignored => while input.next().is_ok() {},
        }
        Ok(())
    }
}

// ─── Declaration level ──────────────────────────────────────────────────────

/// Yields `Some((name, value))` for custom properties, `None` for the rest.
struct CustomPropertyParser;

type Declaration = Option<(String, String)>;

impl<'i> DeclarationParser<'i> for CustomPropertyParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        if !name.starts_with("--") {
            return Ok(None);
        }
        let value = clean_value(input.slice_from(start));
        Ok(Some((name.as_ref().to_string(), value)))
    }
}

impl<'i> AtRuleParser<'i> for CustomPropertyParser {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for CustomPropertyParser {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, Declaration, ()> for CustomPropertyParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

// ─── Value cleanup ──────────────────────────────────────────────────────────

/// Drops comments and a trailing `!important`, then trims.
fn clean_value(raw: &str) -> String {
    let without_comments = strip_comments(raw);
    strip_important(without_comments.trim()).to_string()
}

fn strip_important(value: &str) -> &str {
    if let Some(bang) = value.rfind('!') {
        if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
            return value[..bang].trim_end();
        }
    }
    value
}

fn strip_comments(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    let mut quote: Option<char> = None;

    while let Some(c) = rest.chars().next() {
        if quote.is_none() && rest.starts_with("/*") {
            rest = match rest[2..].find("*/") {
                Some(end) => &rest[2 + end + 2..],
                None => "",
            };
            continue;
        }
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            _ => {}
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

fn snippet(slice: &str) -> String {
    let flat: String = slice.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(SNIPPET_MAX) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(css: &str) -> ScanReport {
        scan_stylesheet(css, &ScanOptions::default())
    }

    fn pairs(report: &ScanReport) -> Vec<(&str, &str, &str)> {
        report
            .declarations
            .iter()
            .map(|d| (d.name.as_str(), d.theme.as_str(), d.raw_value.as_str()))
            .collect()
    }

    #[test]
    fn test_root_and_dark() {
        let report = scan(":root { --bg: #fff; color: red; } .dark { --bg: #000; }");
        assert_eq!(
            pairs(&report),
            vec![("--bg", "light", "#fff"), ("--bg", "dark", "#000")]
        );
        assert_eq!(report.rules, 2);
        assert_eq!(report.skipped_rules(), 0);
    }

    #[test]
    fn test_value_kept_verbatim() {
        let report = scan(":root { --shadow: 0 1px 2px rgb(0 0 0 / 0.05), 0 0 0 1px var(--ring, #e5e7eb); }");
        assert_eq!(
            report.declarations[0].raw_value,
            "0 1px 2px rgb(0 0 0 / 0.05), 0 0 0 1px var(--ring, #e5e7eb)"
        );
    }

    #[test]
    fn test_important_and_comments_stripped() {
        let report = scan(":root { --a: red !important; --b: /* brand */ blue /* x */; --c: \"/* kept */\"; }");
        assert_eq!(
            pairs(&report),
            vec![
                ("--a", "light", "red"),
                ("--b", "light", "blue"),
                ("--c", "light", "\"/* kept */\""),
            ]
        );
    }

    #[test]
    fn test_media_and_supports_are_flattened() {
        let css = r#"
            @media (prefers-color-scheme: dark) {
                :root { --fg: #eee; }
            }
            @supports (color: oklch(0 0 0)) {
                @layer base {
                    [data-theme="dark"] { --fg: oklch(0.9 0 0); }
                }
            }
        "#;
        let report = scan(css);
        assert_eq!(
            pairs(&report),
            vec![("--fg", "light", "#eee"), ("--fg", "dark", "oklch(0.9 0 0)")]
        );
    }

    #[test]
    fn test_ignored_at_rules() {
        let css = r#"
            @charset "utf-8";
            @import url("theme.css");
            @layer reset, base;
            @font-face { font-family: X; src: url(x.woff2); }
            @keyframes spin { from { --angle: 0deg; } to { --angle: 360deg; } }
            :root { --ok: 1; }
        "#;
        let report = scan(css);
        assert_eq!(pairs(&report), vec![("--ok", "light", "1")]);
        assert_eq!(report.skipped_rules(), 0);
    }

    #[test]
    fn test_ignore_prefixes() {
        let css = ":root { --tw-ring-offset-width: 0px; --radius: 8px; }";
        assert_eq!(pairs(&scan(css)), vec![("--radius", "light", "8px")]);

        let keep_all = ScanOptions {
            ignore_prefixes: Vec::new(),
        };
        assert_eq!(scan_stylesheet(css, &keep_all).declarations.len(), 2);
    }

    #[test]
    fn test_stylesheet_order_preserved() {
        let report = scan(":root { --a: 1; } .x { --b: 2; } :root { --a: 3; }");
        let values: Vec<_> = report.declarations.iter().map(|d| d.raw_value.as_str()).collect();
        assert_eq!(values, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_broken_rule_is_skipped() {
        let report = scan(":root { --a: 1; }\n} .b { --b: 2; }");
        assert!(report.skipped_rules() >= 1);
        assert_eq!(report.skipped[0].line, 2);
        assert!(report.declarations.iter().any(|d| d.name == "--a"));
    }

    #[test]
    fn test_strict_scan_reports_first_error() {
        let err = scan_stylesheet_strict("} :root { --a: 1; }", &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, ScanError::InvalidRule { line: 1, .. }));

        let ok = scan_stylesheet_strict(":root { --a: 1; }", &ScanOptions::default()).unwrap();
        assert_eq!(ok.declarations.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(scan(""), ScanReport::default());
    }

    #[test]
    fn test_strip_important_variants() {
        assert_eq!(strip_important("1px ! IMPORTANT"), "1px");
        assert_eq!(strip_important("a!b"), "a!b");
    }

    #[test]
    fn test_snippet_is_truncated() {
        let long = "x ".repeat(100);
        let s = snippet(&long);
        assert!(s.ends_with("..."));
        assert_eq!(s.chars().count(), SNIPPET_MAX + 3);
    }
}
