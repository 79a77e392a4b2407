//! tokenlens-css - collect theme-scoped custom properties from stylesheets.
//!
//! This crate is the stylesheet front end of tokenlens. It reads CSS text,
//! finds every `--name: value` declaration and tags it with the theme its
//! selector targets, ready for [`tokenlens_core::resolve`].
//!
//! ```rust
//! use tokenlens_css::{scan_stylesheet, ScanOptions};
//! use tokenlens_core::{resolve, ThemeContext};
//!
//! let report = scan_stylesheet(
//!     ":root { --brand: #2563eb; } .dark { --brand: #60a5fa; }",
//!     &ScanOptions::default(),
//! );
//! assert_eq!(report.declarations.len(), 2);
//!
//! let table = resolve(&report.declarations);
//! assert_eq!(table.value("--brand", &ThemeContext::Dark), Some("#60a5fa"));
//! ```
//!
//! Scanning is lenient: malformed rules are skipped and listed in the
//! [`ScanReport`]. Use [`scan_stylesheet_strict`] to fail instead.

pub mod error;
pub mod scanner;

pub use error::{Result, ScanError};
pub use scanner::{
    scan_file, scan_stylesheet, scan_stylesheet_strict, ScanOptions, ScanReport, SkippedRule,
};
