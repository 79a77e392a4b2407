//! tokenlens-core - design token extraction algorithms.
//!
//! This crate turns the raw styling surface of a web page into a compact
//! design token model. It has no I/O: callers hand it strings and style
//! samples and get plain data back.
//!
//! - [`color`]: canonicalizes any supported CSS color notation to sRGB(A)
//! - [`variables`]: resolves `var()` references across light/dark themes
//! - [`cluster`]: groups sampled elements into component variants
//! - [`shadow`]: parses `box-shadow` values into elevation tiers
//!
//! Supporting modules type raw computed styles ([`style`]), label samples
//! before clustering ([`variant`]), de-duplicate colors ([`palette`]) and hold
//! the final [`TokenModel`] ([`model`]).
//!
//! # Quick Start
//!
//! ```rust
//! use tokenlens_core::{canonicalize, cluster, group_elevations, resolve};
//! use tokenlens_core::{ComponentStyle, CssVariableDeclaration, StyleSample, ThemeContext, VariantLabel};
//!
//! let brand = canonicalize("oklch(100% 0 0)").unwrap();
//! assert_eq!(brand.to_hex(), "#ffffff");
//!
//! let table = resolve(&[
//!     CssVariableDeclaration::from_selector("--bg", ":root", "#fff"),
//!     CssVariableDeclaration::from_selector("--bg", ".dark", "#0b0b0f"),
//!     CssVariableDeclaration::from_selector("--card", ":root", "var(--bg)"),
//! ]);
//! assert_eq!(table.value("--card", &ThemeContext::Dark), Some("#fff"));
//!
//! let style = ComponentStyle { background: Some(brand), ..ComponentStyle::default() };
//! let clusters = cluster(vec![
//!     StyleSample::new("a", style.clone(), VariantLabel::Default),
//!     StyleSample::new("b", style, VariantLabel::Default),
//! ]);
//! assert_eq!(clusters[0].count, 2);
//!
//! let tiers = group_elevations(["0 1px 2px rgba(0, 0, 0, 0.05)"]);
//! assert_eq!(tiers[0].name, "subtle");
//! ```
//!
//! The `--card` lookup in the dark theme yields the light value: `--card` is
//! only declared under `:root`, and substitution reads raw declarations of
//! the referencing declaration's own theme (here light).
//!
//! # Determinism
//!
//! Every operation is a pure function of its inputs. Clustering is greedy and
//! order sensitive: the first sample of a cluster becomes its representative.

pub mod cluster;
pub mod color;
pub mod model;
pub mod palette;
pub mod shadow;
pub mod style;
pub mod variables;
pub mod variant;

// Re-export public API
pub use cluster::{
    cluster, cluster_category, cluster_with, CategoryCaps, ClusterTolerances, ComponentCategory,
    ComponentCluster, ProfileTolerance, StyleSample, ToleranceProfile,
};
pub use color::{canonicalize, canonicalize_with, distance, ColorOracle, ColorValue};
pub use model::{ExtractionStats, TokenModel};
pub use palette::{ColorToken, PaletteBuilder};
pub use shadow::{group_elevations, ElevationGroup, ElevationTier, ParsedShadow, ShadowVariant};
pub use style::{ComponentStyle, Padding};
pub use variables::{
    resolve, CssVariableDeclaration, ResolvedVariable, ResolvedVariableTable, Resolver,
    ThemeContext,
};
pub use variant::{classify, SampleHints, SizeScale, VariantLabel};
