//! tokenlens - design token extraction.
//!
//! The pipeline crate: it takes a scan document sampled from a live page
//! ([`ScanInput`]), runs the algorithms of [`tokenlens_core`] and the
//! stylesheet scanner of [`tokenlens_css`] over it, and produces a
//! serializable [`TokenModel`].
//!
//! ```rust
//! use tokenlens::{ExtractionConfig, Extractor, ScanInput};
//! use tokenlens_core::ComponentCategory;
//!
//! let input = ScanInput::from_json(r##"{
//!     "stylesheets": [":root { --brand: #2563eb; }"],
//!     "samples": [
//!         { "element_id": "a", "category": "button", "styles": { "background-color": "#2563eb" } },
//!         { "element_id": "b", "category": "button", "styles": { "background-color": "#2563eb" } }
//!     ]
//! }"##).unwrap();
//!
//! let model = Extractor::new(ExtractionConfig::default()).extract(&input);
//! assert_eq!(model.colors[0].hex, "#2563eb");
//! assert_eq!(model.colors[0].variables, vec!["--brand"]);
//! assert_eq!(model.components_for(ComponentCategory::Button)[0].count, 2);
//! ```
//!
//! The `tokenlens` binary wraps this with a small CLI (`extract`, `color`,
//! `vars`).

pub mod config;
pub mod error;
pub mod extract;
pub mod input;
pub mod logging;

pub use config::ExtractionConfig;
pub use error::{Result, TokenlensError};
pub use extract::Extractor;
pub use input::{load_stylesheet, RawSample, ScanInput};
pub use logging::init_tracing;

pub use tokenlens_core::TokenModel;
