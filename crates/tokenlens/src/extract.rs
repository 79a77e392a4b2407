//! The extraction pipeline.
//!
//! One [`Extractor::extract`] call turns a [`ScanInput`] into a
//! [`TokenModel`]:
//!
//! 1. stylesheets are scanned and their declarations appended to the
//!    page-side ones, then everything is resolved per theme;
//! 2. each sample's computed styles are typed, classified (unless the sample
//!    carries a label) and clustered within its category;
//! 3. colors from samples, loose color values and resolved variables are
//!    folded into the palette;
//! 4. sample and loose shadows are grouped into elevation tiers.

use std::collections::BTreeMap;

use tokenlens_core::color::BuiltinOracle;
use tokenlens_core::shadow::group_elevations_with;
use tokenlens_core::{
    canonicalize_with, classify, cluster_with, ColorOracle, ComponentCategory, ComponentStyle,
    CssVariableDeclaration, PaletteBuilder, Resolver, StyleSample, TokenModel,
};
use tokenlens_css::scan_stylesheet;
use tracing::{debug, trace};

use crate::config::ExtractionConfig;
use crate::input::ScanInput;

/// Runs extractions with one configuration.
pub struct Extractor<'o> {
    config: ExtractionConfig,
    oracle: &'o dyn ColorOracle,
}

impl Extractor<'static> {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            oracle: &BuiltinOracle,
        }
    }
}

impl Default for Extractor<'static> {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

impl<'o> Extractor<'o> {
    /// Replaces the color oracle used by every stage.
    pub fn with_oracle<'n>(self, oracle: &'n dyn ColorOracle) -> Extractor<'n> {
        Extractor {
            config: self.config,
            oracle,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn extract(&self, input: &ScanInput) -> TokenModel {
        let (declarations, skipped_rules) = self.collect_declarations(input);
        let variables = Resolver::new()
            .with_oracle(self.oracle)
            .resolve(&declarations);

        let mut palette = PaletteBuilder::new();
        let mut shadows: Vec<String> = Vec::new();
        let mut by_category: BTreeMap<ComponentCategory, Vec<StyleSample>> = BTreeMap::new();

        for raw in &input.samples {
            let style = ComponentStyle::from_computed_with(&raw.styles, self.oracle);
            palette.extend(
                [&style.background, &style.color, &style.border_color]
                    .into_iter()
                    .flatten(),
            );
            if let Some(shadow) = &style.box_shadow {
                shadows.push(shadow.clone());
            }

            let (classified, size) = classify(&raw.hints(), &style);
            let label = raw.variant_label.unwrap_or(classified);
            trace!(element = %raw.element_id, category = raw.category.as_str(), label = %label, "sample");

            by_category
                .entry(raw.category)
                .or_default()
                .push(StyleSample::new(raw.element_id.as_str(), style, label).with_size(size));
        }

        for value in &input.colors {
            match canonicalize_with(value, self.oracle) {
                Some(color) => palette.add(&color),
                None => trace!(value = %value, "ignoring unparseable color"),
            }
        }
        palette.add_variables(&variables);

        let components: BTreeMap<_, _> = by_category
            .into_iter()
            .map(|(category, samples)| {
                let cap = self.config.caps.cap(category);
                let clusters = cluster_with(samples, &self.config.tolerances, Some(cap));
                debug!(category = category.as_str(), clusters = clusters.len(), "clustered");
                (category, clusters)
            })
            .collect();

        let elevations =
            group_elevations_with(shadows.iter().chain(input.shadows.iter()), self.oracle);

        let model = TokenModel::assemble(
            palette.build(&variables),
            variables,
            components,
            elevations,
            input.samples.len(),
            skipped_rules,
        );
        debug!(
            colors = model.stats.colors,
            variables = model.stats.variables,
            clusters = model.stats.clusters,
            elevations = model.elevations.len(),
            "extraction finished"
        );
        model
    }

    /// Page-side declarations followed by every stylesheet's, in order, and
    /// the number of stylesheet rules that had to be skipped.
    fn collect_declarations(&self, input: &ScanInput) -> (Vec<CssVariableDeclaration>, usize) {
        let scan = &self.config.scan;
        let mut declarations: Vec<CssVariableDeclaration> = input
            .declarations
            .iter()
            .filter(|d| !scan.is_ignored(&d.name))
            .cloned()
            .collect();
        let mut skipped = 0;

        for css in &input.stylesheets {
            let report = scan_stylesheet(css, scan);
            skipped += report.skipped_rules();
            declarations.extend(report.declarations);
        }
        (declarations, skipped)
    }
}
