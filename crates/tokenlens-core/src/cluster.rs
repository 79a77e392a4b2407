//! Greedy clustering of style samples into component variants.
//!
//! Sampling a page yields hundreds of buttons that are really three or four
//! variants. Clustering walks the samples once, in order, and either adds a
//! sample to the first compatible cluster or opens a new one:
//!
//! ```text
//! sample ──► same variant label? ──► background ──► text ──► radius ──► padding ──► font size
//!                  │ no                  │ fail        ...                                │ pass
//!                  ▼                     ▼                                                ▼
//!             next cluster          next cluster                                  join cluster
//! ```
//!
//! The first sample of a cluster is its representative. Results are sorted by
//! member count (ties keep creation order) and truncated to the category cap.
//!
//! Similarity thresholds depend on the variant's [`ToleranceProfile`]:
//!
//! | Profile | Background | Text | Radius |
//! |---------|-----------|------|--------|
//! | filled (primary, destructive, success, warning, default) | 0.12 | 0.12 | 6px |
//! | secondary | 0.15 | 0.12 | 10px |
//! | outline | 0.15 | 0.20 | 10px |
//! | ghost | 0.20 | 0.20 | 10px |
//! | link | 0.20 | 0.20 | 10px |
//!
//! Padding (mean of the four sides) may differ by 12px and font size by 6px;
//! a font size gap above 4px additionally requires padding within 6px.
//!
//! The pass is order sensitive: reordering samples can change which element
//! represents a cluster, and for borderline inputs which clusters form.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::color::ColorValue;
use crate::style::ComponentStyle;
use crate::variant::{SizeScale, VariantLabel};

// ─── Categories ─────────────────────────────────────────────────────────────

/// The kind of UI component a sample was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    #[serde(alias = "buttons")]
    Button,
    #[serde(alias = "inputs")]
    Input,
    #[serde(alias = "badges")]
    Badge,
    #[serde(alias = "links")]
    Link,
    #[serde(alias = "cards")]
    Card,
    #[serde(alias = "nav")]
    Navigation,
    #[serde(alias = "containers")]
    Container,
}

impl ComponentCategory {
    pub const ALL: [ComponentCategory; 7] = [
        ComponentCategory::Button,
        ComponentCategory::Input,
        ComponentCategory::Badge,
        ComponentCategory::Link,
        ComponentCategory::Card,
        ComponentCategory::Navigation,
        ComponentCategory::Container,
    ];

    /// Maximum number of variants reported for the category.
    pub fn default_cap(&self) -> usize {
        match self {
            ComponentCategory::Button
            | ComponentCategory::Input
            | ComponentCategory::Badge
            | ComponentCategory::Link => 5,
            ComponentCategory::Card | ComponentCategory::Navigation | ComponentCategory::Container => {
                10
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentCategory::Button => "button",
            ComponentCategory::Input => "input",
            ComponentCategory::Badge => "badge",
            ComponentCategory::Link => "link",
            ComponentCategory::Card => "card",
            ComponentCategory::Navigation => "navigation",
            ComponentCategory::Container => "container",
        }
    }
}

/// Per-category variant caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryCaps {
    pub button: usize,
    pub input: usize,
    pub badge: usize,
    pub link: usize,
    pub card: usize,
    pub navigation: usize,
    pub container: usize,
}

impl Default for CategoryCaps {
    fn default() -> Self {
        Self {
            button: ComponentCategory::Button.default_cap(),
            input: ComponentCategory::Input.default_cap(),
            badge: ComponentCategory::Badge.default_cap(),
            link: ComponentCategory::Link.default_cap(),
            card: ComponentCategory::Card.default_cap(),
            navigation: ComponentCategory::Navigation.default_cap(),
            container: ComponentCategory::Container.default_cap(),
        }
    }
}

impl CategoryCaps {
    pub fn cap(&self, category: ComponentCategory) -> usize {
        match category {
            ComponentCategory::Button => self.button,
            ComponentCategory::Input => self.input,
            ComponentCategory::Badge => self.badge,
            ComponentCategory::Link => self.link,
            ComponentCategory::Card => self.card,
            ComponentCategory::Navigation => self.navigation,
            ComponentCategory::Container => self.container,
        }
    }

    /// Every cap paired with its category.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentCategory, usize)> + '_ {
        ComponentCategory::ALL
            .into_iter()
            .map(move |c| (c, self.cap(c)))
    }
}

// ─── Tolerances ─────────────────────────────────────────────────────────────

/// Families of variants that share similarity thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToleranceProfile {
    Filled,
    Secondary,
    Outline,
    Ghost,
    Link,
}

impl From<VariantLabel> for ToleranceProfile {
    fn from(label: VariantLabel) -> Self {
        match label {
            VariantLabel::Secondary => ToleranceProfile::Secondary,
            VariantLabel::Outline => ToleranceProfile::Outline,
            VariantLabel::Ghost => ToleranceProfile::Ghost,
            VariantLabel::Link => ToleranceProfile::Link,
            VariantLabel::Primary
            | VariantLabel::Destructive
            | VariantLabel::Success
            | VariantLabel::Warning
            | VariantLabel::Default => ToleranceProfile::Filled,
        }
    }
}

impl ToleranceProfile {
    /// Whether transparent and near-white backgrounds count as the same.
    fn blends_light_backgrounds(self) -> bool {
        matches!(self, ToleranceProfile::Ghost | ToleranceProfile::Outline)
    }
}

/// Thresholds for one [`ToleranceProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileTolerance {
    /// Maximum background color distance.
    pub background: f64,
    /// Maximum text color distance.
    pub text: f64,
    /// Maximum border radius difference in pixels.
    pub radius: f64,
}

impl ProfileTolerance {
    pub const fn new(background: f64, text: f64, radius: f64) -> Self {
        Self {
            background,
            text,
            radius,
        }
    }
}

/// All clustering thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterTolerances {
    pub filled: ProfileTolerance,
    pub secondary: ProfileTolerance,
    pub outline: ProfileTolerance,
    pub ghost: ProfileTolerance,
    pub link: ProfileTolerance,
    /// Maximum padding difference in pixels.
    pub padding: f64,
    /// Maximum font size difference in pixels.
    pub font_size: f64,
    /// Font size difference above which padding must be within `strict_padding`.
    pub font_size_strict: f64,
    pub strict_padding: f64,
}

impl Default for ClusterTolerances {
    fn default() -> Self {
        Self {
            filled: ProfileTolerance::new(0.12, 0.12, 6.0),
            secondary: ProfileTolerance::new(0.15, 0.12, 10.0),
            outline: ProfileTolerance::new(0.15, 0.20, 10.0),
            ghost: ProfileTolerance::new(0.20, 0.20, 10.0),
            link: ProfileTolerance::new(0.20, 0.20, 10.0),
            padding: 12.0,
            font_size: 6.0,
            font_size_strict: 4.0,
            strict_padding: 6.0,
        }
    }
}

impl ClusterTolerances {
    pub fn profile(&self, profile: ToleranceProfile) -> &ProfileTolerance {
        match profile {
            ToleranceProfile::Filled => &self.filled,
            ToleranceProfile::Secondary => &self.secondary,
            ToleranceProfile::Outline => &self.outline,
            ToleranceProfile::Ghost => &self.ghost,
            ToleranceProfile::Link => &self.link,
        }
    }

    /// Every numeric threshold with a name, for validation and reporting.
    pub fn values(&self) -> Vec<(String, f64)> {
        let mut values = Vec::new();
        for (name, p) in [
            ("filled", &self.filled),
            ("secondary", &self.secondary),
            ("outline", &self.outline),
            ("ghost", &self.ghost),
            ("link", &self.link),
        ] {
            values.push((format!("{}.background", name), p.background));
            values.push((format!("{}.text", name), p.text));
            values.push((format!("{}.radius", name), p.radius));
        }
        values.push(("padding".to_string(), self.padding));
        values.push(("font_size".to_string(), self.font_size));
        values.push(("font_size_strict".to_string(), self.font_size_strict));
        values.push(("strict_padding".to_string(), self.strict_padding));
        values
    }

    /// Whether `candidate` is close enough to `representative` to share a
    /// cluster. Labels are not compared here.
    pub fn matches(
        &self,
        label: VariantLabel,
        representative: &ComponentStyle,
        candidate: &ComponentStyle,
    ) -> bool {
        let profile = ToleranceProfile::from(label);
        let limits = self.profile(profile);

        if !backgrounds_match(profile, limits, representative, candidate) {
            return false;
        }

        let text_ok = match (&representative.color, &candidate.color) {
            (None, None) => true,
            (Some(a), Some(b)) => a.distance(b) <= limits.text,
            _ => false,
        };
        if !text_ok {
            return false;
        }

        if (representative.border_radius - candidate.border_radius).abs() > limits.radius {
            return false;
        }

        let padding_diff = (representative.padding.scalar() - candidate.padding.scalar()).abs();
        if padding_diff > self.padding {
            return false;
        }

        let font_diff = (representative.font_size - candidate.font_size).abs();
        if font_diff > self.font_size {
            return false;
        }
        font_diff <= self.font_size_strict || padding_diff <= self.strict_padding
    }
}

fn transparent_black() -> ColorValue {
    ColorValue::new(0, 0, 0, 0.0, "transparent")
}

fn backgrounds_match(
    profile: ToleranceProfile,
    limits: &ProfileTolerance,
    a: &ComponentStyle,
    b: &ComponentStyle,
) -> bool {
    let a = a.background.clone().unwrap_or_else(transparent_black);
    let b = b.background.clone().unwrap_or_else(transparent_black);

    let light = |c: &ColorValue| c.is_transparent() || c.is_near_white();
    if profile.blends_light_backgrounds() && light(&a) && light(&b) {
        return true;
    }
    a.distance(&b) <= limits.background
}

// ─── Samples & clusters ─────────────────────────────────────────────────────

/// One sampled element, ready for clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSample {
    pub element_id: String,
    pub style: ComponentStyle,
    pub variant_label: VariantLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeScale>,
}

impl StyleSample {
    pub fn new(element_id: impl Into<String>, style: ComponentStyle, label: VariantLabel) -> Self {
        Self {
            element_id: element_id.into(),
            style,
            variant_label: label,
            size: None,
        }
    }

    pub fn with_size(mut self, size: Option<SizeScale>) -> Self {
        self.size = size;
        self
    }
}

/// A group of visually equivalent samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentCluster {
    /// The first sample that opened the cluster.
    pub representative: StyleSample,
    pub count: usize,
    /// Element ids of every member, representative first.
    pub members: Vec<String>,
}

impl ComponentCluster {
    fn open(sample: StyleSample) -> Self {
        Self {
            members: vec![sample.element_id.clone()],
            representative: sample,
            count: 1,
        }
    }

    pub fn variant_label(&self) -> VariantLabel {
        self.representative.variant_label
    }
}

/// Clusters samples with default tolerances and no cap.
pub fn cluster<I>(samples: I) -> Vec<ComponentCluster>
where
    I: IntoIterator<Item = StyleSample>,
{
    cluster_with(samples, &ClusterTolerances::default(), None)
}

/// Clusters samples of one category, capped at the category's default cap.
pub fn cluster_category<I>(
    samples: I,
    category: ComponentCategory,
    tolerances: &ClusterTolerances,
) -> Vec<ComponentCluster>
where
    I: IntoIterator<Item = StyleSample>,
{
    cluster_with(samples, tolerances, Some(category.default_cap()))
}

/// Clusters samples, sorts by count and keeps at most `cap` clusters.
pub fn cluster_with<I>(
    samples: I,
    tolerances: &ClusterTolerances,
    cap: Option<usize>,
) -> Vec<ComponentCluster>
where
    I: IntoIterator<Item = StyleSample>,
{
    let mut clusters = samples
        .into_iter()
        .fold(Vec::new(), |clusters, sample| assign(clusters, sample, tolerances));

    // sort_by is stable: equal counts keep creation order
    clusters.sort_by(|a, b| b.count.cmp(&a.count));
    if let Some(cap) = cap {
        if clusters.len() > cap {
            trace!(dropped = clusters.len() - cap, cap, "truncating clusters");
            clusters.truncate(cap);
        }
    }
    clusters
}

fn assign(
    mut clusters: Vec<ComponentCluster>,
    sample: StyleSample,
    tolerances: &ClusterTolerances,
) -> Vec<ComponentCluster> {
    let label = sample.variant_label;
    let existing = clusters.iter_mut().find(|c| {
        c.representative.variant_label == label
            && tolerances.matches(label, &c.representative.style, &sample.style)
    });

    match existing {
        Some(found) => {
            found.count += 1;
            found.members.push(sample.element_id);
        }
        None => {
            debug!(
                element = %sample.element_id,
                label = %label,
                "opening cluster {}",
                clusters.len() + 1
            );
            clusters.push(ComponentCluster::open(sample));
        }
    }
    clusters
}
