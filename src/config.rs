//! Annotation configuration.

use crate::granularity::NerGranularity;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for [`AnnotationOrchestrator`](crate::AnnotationOrchestrator).
///
/// Deserializes from JSON with every field optional:
///
/// ```rust
/// use coreflink::{CorefLinkConfig, NerGranularity};
///
/// let config: CorefLinkConfig = serde_json::from_str(r#"{"granularity": "fine"}"#).unwrap();
/// assert_eq!(config.granularity, NerGranularity::Fine);
/// assert!(config.compute_links);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorefLinkConfig {
    /// NER tag granularity the clustering engine sees.
    pub granularity: NerGranularity,
    /// Include chain links in the annotation report.
    pub compute_links: bool,
    /// Drop single-member chains after clustering.
    pub remove_singletons: bool,
}

impl Default for CorefLinkConfig {
    fn default() -> Self {
        Self {
            granularity: NerGranularity::Default,
            compute_links: true,
            remove_singletons: false,
        }
    }
}

impl CorefLinkConfig {
    /// Set the granularity.
    #[must_use]
    pub fn with_granularity(mut self, granularity: NerGranularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Set whether reports carry chain links.
    #[must_use]
    pub fn with_links(mut self, compute_links: bool) -> Self {
        self.compute_links = compute_links;
        self
    }

    /// Set whether single-member chains are dropped.
    #[must_use]
    pub fn with_remove_singletons(mut self, remove: bool) -> Self {
        self.remove_singletons = remove;
        self
    }

    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
