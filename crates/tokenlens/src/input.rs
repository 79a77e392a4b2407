//! The scan document handed over by the page-side collector.
//!
//! A scan document is JSON. Every field is optional:
//!
//! ```json
//! {
//!   "declarations": [{ "name": "--brand", "theme": "dark", "raw_value": "#60a5fa" }],
//!   "stylesheets": [":root { --brand: #2563eb; }"],
//!   "samples": [{
//!     "element_id": "btn-1",
//!     "category": "button",
//!     "class_name": "btn btn-primary",
//!     "text": "Save",
//!     "styles": { "background-color": "rgb(37, 99, 235)", "border-radius": "6px" }
//!   }],
//!   "shadows": ["0 1px 2px rgba(0, 0, 0, 0.05)"],
//!   "colors": ["#111827"]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokenlens_core::{ComponentCategory, CssVariableDeclaration, SampleHints, VariantLabel};
use tokenlens_css::{scan_stylesheet, scan_stylesheet_strict, ScanOptions, ScanReport};

use crate::error::{Result, TokenlensError};

/// Everything sampled from one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanInput {
    /// Custom properties already collected page-side, in document order.
    pub declarations: Vec<CssVariableDeclaration>,
    /// Raw stylesheet texts, scanned after `declarations`.
    pub stylesheets: Vec<String>,
    pub samples: Vec<RawSample>,
    /// Raw `box-shadow` values seen outside of samples.
    pub shadows: Vec<String>,
    /// Raw color values seen outside of samples.
    pub colors: Vec<String>,
}

/// One sampled element with its computed styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub element_id: String,
    pub category: ComponentCategory,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub text: String,
    /// Computed style properties, `property -> value`.
    #[serde(default)]
    pub styles: BTreeMap<String, String>,
    /// Skips classification when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_label: Option<VariantLabel>,
}

impl RawSample {
    pub fn hints(&self) -> SampleHints {
        SampleHints::new(self.class_name.as_str(), self.text.as_str())
    }
}

impl ScanInput {
    /// Parses a scan document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a scan document file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| TokenlensError::io(path, e))?;
        Self::from_json(&json)
    }
}

/// Reads a stylesheet file and collects its custom properties.
///
/// With `strict` set the first rule that fails to parse is an error;
/// otherwise such rules are skipped and counted in the report.
pub fn load_stylesheet(
    path: impl AsRef<Path>,
    options: &ScanOptions,
    strict: bool,
) -> Result<ScanReport> {
    let path = path.as_ref();
    let css = std::fs::read_to_string(path).map_err(|e| TokenlensError::io(path, e))?;
    if strict {
        Ok(scan_stylesheet_strict(&css, options)?)
    } else {
        Ok(scan_stylesheet(&css, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenlens_core::ThemeContext;

    #[test]
    fn test_minimal_document() {
        let input = ScanInput::from_json("{}").unwrap();
        assert_eq!(input, ScanInput::default());
    }

    #[test]
    fn test_full_document() {
        let json = r##"{
            "declarations": [
                { "name": "--brand", "raw_value": "#2563eb" },
                { "name": "--brand", "theme": "dark", "raw_value": "#60a5fa" }
            ],
            "samples": [
                {
                    "element_id": "nav-1",
                    "category": "nav",
                    "styles": { "background-color": "#fff" },
                    "variant_label": "danger"
                }
            ],
            "shadows": ["none"]
        }"##;
        let input = ScanInput::from_json(json).unwrap();

        assert_eq!(input.declarations[0].theme, ThemeContext::Light);
        assert_eq!(input.declarations[1].theme, ThemeContext::Dark);

        let sample = &input.samples[0];
        assert_eq!(sample.category, ComponentCategory::Navigation);
        assert_eq!(sample.variant_label, Some(VariantLabel::Destructive));
        assert_eq!(sample.class_name, "");
        assert_eq!(sample.styles["background-color"], "#fff");
    }

    #[test]
    fn test_unknown_category_is_an_error() {
        let json = r#"{ "samples": [{ "element_id": "x", "category": "carousel" }] }"#;
        assert!(matches!(
            ScanInput::from_json(json),
            Err(TokenlensError::Json(_))
        ));
    }

    // =========================================================================
    // Stylesheet files
    // =========================================================================

    const BROKEN: &str = ":root { --a: 1px; }\n)broken { --b: 2px; }\n:root { --c: 3px; }";

    fn stylesheet(css: &str) -> tempfile::NamedTempFile {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", css).unwrap();
        file
    }

    #[test]
    fn test_lenient_stylesheet_skips_broken_rules() {
        let file = stylesheet(BROKEN);
        let report = load_stylesheet(file.path(), &ScanOptions::default(), false).unwrap();
        assert_eq!(report.skipped_rules(), 1);
        let names: Vec<_> = report.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["--a", "--c"]);
    }

    #[test]
    fn test_strict_stylesheet_fails_on_broken_rule() {
        let file = stylesheet(BROKEN);
        let err = load_stylesheet(file.path(), &ScanOptions::default(), true).unwrap_err();
        assert!(matches!(
            err,
            TokenlensError::Scan(tokenlens_css::ScanError::InvalidRule { line: 2, .. })
        ));
        assert!(err.to_string().contains(")broken"));

        let file = stylesheet(":root { --a: 1; }");
        let report = load_stylesheet(file.path(), &ScanOptions::default(), true).unwrap();
        assert_eq!(report.declarations.len(), 1);
    }

    #[test]
    fn test_missing_stylesheet() {
        let err = load_stylesheet("missing.css", &ScanOptions::default(), false).unwrap_err();
        assert!(matches!(err, TokenlensError::Io { .. }));
    }
}
