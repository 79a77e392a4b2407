//! Property-based tests for the extraction pipeline.

use std::collections::BTreeMap;

use proptest::prelude::*;
use tokenlens::{ExtractionConfig, Extractor, RawSample, ScanInput};
use tokenlens_core::ComponentCategory;

// ============================================================================
// Test helpers
// ============================================================================

fn category_strategy() -> impl Strategy<Value = ComponentCategory> {
    prop::sample::select(ComponentCategory::ALL.to_vec())
}

fn sample_strategy() -> impl Strategy<Value = (ComponentCategory, [u8; 3], u8, u8)> {
    (category_strategy(), any::<[u8; 3]>(), 0u8..24, 0u8..32)
}

fn build_input(raw: Vec<(ComponentCategory, [u8; 3], u8, u8)>) -> ScanInput {
    let samples = raw
        .into_iter()
        .enumerate()
        .map(|(i, (category, rgb, radius, padding))| {
            let mut styles = BTreeMap::new();
            styles.insert(
                "background-color".to_string(),
                format!("rgb({}, {}, {})", rgb[0], rgb[1], rgb[2]),
            );
            styles.insert("border-radius".to_string(), format!("{}px", radius));
            styles.insert("padding".to_string(), format!("{}px", padding));
            RawSample {
                element_id: format!("el-{}", i),
                category,
                class_name: String::new(),
                text: String::new(),
                styles,
                variant_label: None,
            }
        })
        .collect();
    ScanInput {
        samples,
        ..ScanInput::default()
    }
}

fn uncapped() -> ExtractionConfig {
    let yaml = "caps: { button: 1000, input: 1000, badge: 1000, link: 1000, card: 1000, navigation: 1000, container: 1000 }";
    ExtractionConfig::from_yaml(yaml).unwrap()
}

// ============================================================================
// Pipeline properties
// ============================================================================

proptest! {
    /// Without effective caps every sample lands in exactly one cluster of
    /// its own category.
    #[test]
    fn samples_are_conserved(raw in prop::collection::vec(sample_strategy(), 0..40)) {
        let mut expected: BTreeMap<ComponentCategory, usize> = BTreeMap::new();
        for (category, ..) in &raw {
            *expected.entry(*category).or_default() += 1;
        }

        let model = Extractor::new(uncapped()).extract(&build_input(raw));
        for (category, clusters) in &model.components {
            let counted: usize = clusters.iter().map(|c| c.count).sum();
            prop_assert_eq!(Some(&counted), expected.get(category));
        }
        prop_assert_eq!(model.components.len(), expected.len());
    }

    /// Caps bound the number of clusters per category.
    #[test]
    fn caps_are_respected(raw in prop::collection::vec(sample_strategy(), 0..60)) {
        let config = ExtractionConfig::default();
        let model = Extractor::new(config.clone()).extract(&build_input(raw));
        for (category, clusters) in &model.components {
            prop_assert!(clusters.len() <= config.caps.cap(*category));
        }
    }

    /// Palette tokens are unique and sorted by usage, then hex.
    #[test]
    fn palette_is_sorted_and_unique(raw in prop::collection::vec(sample_strategy(), 0..40)) {
        let model = Extractor::default().extract(&build_input(raw));
        for pair in model.colors.windows(2) {
            let ordered = pair[0].usage_count > pair[1].usage_count
                || (pair[0].usage_count == pair[1].usage_count && pair[0].hex < pair[1].hex);
            prop_assert!(ordered, "{:?} before {:?}", pair[0].hex, pair[1].hex);
        }
    }

    /// Extraction is a pure function of its input.
    #[test]
    fn extraction_is_deterministic(raw in prop::collection::vec(sample_strategy(), 0..20)) {
        let input = build_input(raw);
        let extractor = Extractor::default();
        prop_assert_eq!(extractor.extract(&input), extractor.extract(&input));
    }
}
