//! Projector configuration
//!
//! Defaults match the key names the optimization engine writes into its
//! serialized campaigns.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default key of the executed-trials table blob.
pub const DEFAULT_MEASUREMENTS_KEY: &str = "_measurements_exp";

/// Default key of the pending-recommendation table blob.
pub const DEFAULT_RECOMMENDATION_KEY: &str = "_cached_recommendation";

/// Default maximum recommender nesting depth.
pub const DEFAULT_MAX_RECOMMENDER_DEPTH: usize = 2;

/// Configuration of the record projector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectorConfig {
    /// Campaign key holding the executed-trials blob
    pub measurements_key: String,
    /// Campaign key holding the pending-recommendation blob
    pub recommendation_key: String,
    /// Maximum nesting depth of the recommender tree
    pub max_recommender_depth: usize,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            measurements_key: DEFAULT_MEASUREMENTS_KEY.to_string(),
            recommendation_key: DEFAULT_RECOMMENDATION_KEY.to_string(),
            max_recommender_depth: DEFAULT_MAX_RECOMMENDER_DEPTH,
        }
    }
}

impl ProjectorConfig {
    /// Create a configuration builder
    #[must_use]
    pub fn builder() -> ProjectorConfigBuilder {
        ProjectorConfigBuilder::default()
    }

    /// Parse a JSON configuration document. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the document is not valid JSON, has unknown keys,
    /// or fails [`validate`](Self::validate).
    pub fn from_json_str(document: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for empty or identical blob keys.
    pub fn validate(&self) -> Result<()> {
        if self.measurements_key.is_empty() || self.recommendation_key.is_empty() {
            return Err(Error::InvalidConfig(
                "table blob keys must not be empty".to_string(),
            ));
        }
        if self.measurements_key == self.recommendation_key {
            return Err(Error::InvalidConfig(format!(
                "measurements and recommendation blobs share the key '{}'",
                self.measurements_key
            )));
        }
        Ok(())
    }
}

/// Builder for `ProjectorConfig`.
#[derive(Debug, Default)]
pub struct ProjectorConfigBuilder {
    config: ProjectorConfig,
}

impl ProjectorConfigBuilder {
    /// Set the executed-trials blob key
    #[must_use]
    pub fn measurements_key(mut self, key: impl Into<String>) -> Self {
        self.config.measurements_key = key.into();
        self
    }

    /// Set the pending-recommendation blob key
    #[must_use]
    pub fn recommendation_key(mut self, key: impl Into<String>) -> Self {
        self.config.recommendation_key = key.into();
        self
    }

    /// Set the maximum recommender nesting depth
    #[must_use]
    pub const fn max_recommender_depth(mut self, depth: usize) -> Self {
        self.config.max_recommender_depth = depth;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid
    pub fn build(self) -> Result<ProjectorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
