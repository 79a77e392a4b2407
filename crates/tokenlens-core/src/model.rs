//! The token model produced by one extraction run.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cluster::{ComponentCategory, ComponentCluster};
use crate::palette::ColorToken;
use crate::shadow::ElevationGroup;
use crate::variables::ResolvedVariableTable;

/// Counters describing what an extraction run saw and kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    /// Style samples fed to clustering.
    pub samples: usize,
    /// Clusters kept after capping, across all categories.
    pub clusters: usize,
    /// Distinct palette colors.
    pub colors: usize,
    /// Distinct custom property names.
    pub variables: usize,
    /// Custom property values with `var()` references left after resolution.
    pub unresolved_variables: usize,
    /// Shadow layers that made it into an elevation tier.
    pub shadow_layers: usize,
    /// Stylesheet rules the scanner could not parse.
    pub skipped_rules: usize,
}

/// Everything extracted from one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenModel {
    pub colors: Vec<ColorToken>,
    pub variables: ResolvedVariableTable,
    pub components: BTreeMap<ComponentCategory, Vec<ComponentCluster>>,
    pub elevations: Vec<ElevationGroup>,
    pub stats: ExtractionStats,
}

impl TokenModel {
    /// Assembles a model and derives its statistics.
    ///
    /// `samples` and `skipped_rules` are inputs the model itself cannot
    /// recount.
    pub fn assemble(
        colors: Vec<ColorToken>,
        variables: ResolvedVariableTable,
        components: BTreeMap<ComponentCategory, Vec<ComponentCluster>>,
        elevations: Vec<ElevationGroup>,
        samples: usize,
        skipped_rules: usize,
    ) -> Self {
        let stats = ExtractionStats {
            samples,
            clusters: components.values().map(Vec::len).sum(),
            colors: colors.len(),
            variables: variables.len(),
            unresolved_variables: variables.iter().filter(|(_, _, v)| !v.complete).count(),
            shadow_layers: elevations.iter().map(|g| g.usage_count).sum(),
            skipped_rules,
        };
        Self {
            colors,
            variables,
            components,
            elevations,
            stats,
        }
    }

    /// Clusters of one category, most common first.
    pub fn components_for(&self, category: ComponentCategory) -> &[ComponentCluster] {
        self.components
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{cluster, StyleSample};
    use crate::shadow::group_elevations;
    use crate::style::ComponentStyle;
    use crate::variables::{resolve, CssVariableDeclaration};
    use crate::variant::VariantLabel;
    use crate::ThemeContext;

    #[test]
    fn test_assemble_counts() {
        let variables = resolve(&[
            CssVariableDeclaration::new("--a", ThemeContext::Light, "var(--missing)"),
            CssVariableDeclaration::new("--b", ThemeContext::Light, "1px"),
        ]);
        let mut components = BTreeMap::new();
        components.insert(
            ComponentCategory::Button,
            cluster(vec![
                StyleSample::new("x", ComponentStyle::default(), VariantLabel::Ghost),
                StyleSample::new("y", ComponentStyle::default(), VariantLabel::Link),
            ]),
        );
        let elevations = group_elevations(["0 1px 2px black, 0 4px 8px black"]);

        let model = TokenModel::assemble(Vec::new(), variables, components, elevations, 2, 3);

        assert_eq!(
            model.stats,
            ExtractionStats {
                samples: 2,
                clusters: 2,
                colors: 0,
                variables: 2,
                unresolved_variables: 1,
                shadow_layers: 2,
                skipped_rules: 3,
            }
        );
        assert_eq!(model.components_for(ComponentCategory::Button).len(), 2);
        assert!(model.components_for(ComponentCategory::Card).is_empty());
    }

    #[test]
    fn test_categories_serialize_as_names() {
        let mut components = BTreeMap::new();
        components.insert(ComponentCategory::Navigation, Vec::new());
        let model = TokenModel {
            components,
            ..TokenModel::default()
        };
        let json = serde_json::to_value(&model).unwrap();
        assert!(json["components"]["navigation"].is_array());
    }
}
