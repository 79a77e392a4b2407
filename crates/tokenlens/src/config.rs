//! Extraction configuration.
//!
//! Configuration is a YAML document; every key is optional:
//!
//! ```yaml
//! tolerances:
//!   filled: { background: 0.10, text: 0.12, radius: 4.0 }
//!   padding: 8.0
//! caps:
//!   button: 8
//! scan:
//!   ignore_prefixes: ["--tw-", "--chakra-"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokenlens_core::{CategoryCaps, ClusterTolerances};
use tokenlens_css::ScanOptions;
use tracing::debug;

use crate::error::{Result, TokenlensError};

/// Settings for one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    pub tolerances: ClusterTolerances,
    pub caps: CategoryCaps,
    pub scan: ScanOptions,
}

impl ExtractionConfig {
    /// Parses and validates a YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| TokenlensError::io(path, e))?;
        let config = Self::from_yaml(&yaml)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Rejects negative or non-finite tolerances and zero caps.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.tolerances.values() {
            if !value.is_finite() || value < 0.0 {
                return Err(TokenlensError::invalid_config(
                    format!("tolerances.{}", name),
                    format!("must be a non-negative number, got {}", value),
                ));
            }
        }
        for (category, cap) in self.caps.iter() {
            if cap == 0 {
                return Err(TokenlensError::invalid_config(
                    format!("caps.{}", category.as_str()),
                    "must be at least 1",
                ));
            }
        }
        Ok(())
    }
}
