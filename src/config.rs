//! Configuration for structural type prediction

use serde::{Deserialize, Serialize};

/// Policy thresholds for prediction and synthesis.
///
/// These encode heuristics, not invariants, and are deliberately
/// overridable: the defaults reproduce the behavior of the reference
/// heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictorConfig {
    /// Recursion cap for analysis and synthesis. Past this depth a node
    /// degrades to a permissive open type instead of recursing further.
    pub max_depth: usize,

    /// Minimum number of sibling keys before a node may classify as an
    /// open dictionary instead of a fixed object.
    pub record_min_keys: usize,

    /// Minimum number of distinct string samples before a path may be
    /// promoted to a closed enumeration.
    pub enum_min_values: usize,

    /// Maximum spread between the shortest and longest string sample for
    /// enum promotion.
    pub enum_length_spread: usize,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            max_depth: 100,
            record_min_keys: 2,
            enum_min_values: 2,
            enum_length_spread: 5,
        }
    }
}

impl PredictorConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> PredictorConfigBuilder {
        PredictorConfigBuilder::default()
    }
}

/// Builder for PredictorConfig
#[derive(Debug, Default)]
pub struct PredictorConfigBuilder {
    config: PredictorConfig,
}

impl PredictorConfigBuilder {
    /// Set the recursion depth cap
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set the minimum sibling-key count for dictionary classification
    pub fn record_min_keys(mut self, keys: usize) -> Self {
        self.config.record_min_keys = keys.max(1);
        self
    }

    /// Set the minimum distinct-value count for enum promotion
    pub fn enum_min_values(mut self, values: usize) -> Self {
        self.config.enum_min_values = values.max(2);
        self
    }

    /// Set the maximum length spread for enum promotion
    pub fn enum_length_spread(mut self, spread: usize) -> Self {
        self.config.enum_length_spread = spread;
        self
    }

    /// Build the configuration
    pub fn build(self) -> PredictorConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PredictorConfig::default();
        assert_eq!(config.max_depth, 100);
        assert_eq!(config.record_min_keys, 2);
        assert_eq!(config.enum_min_values, 2);
        assert_eq!(config.enum_length_spread, 5);
    }

    #[test]
    fn test_builder() {
        let config = PredictorConfig::builder()
            .max_depth(10)
            .record_min_keys(3)
            .enum_length_spread(8)
            .build();

        assert_eq!(config.max_depth, 10);
        assert_eq!(config.record_min_keys, 3);
        assert_eq!(config.enum_length_spread, 8);
    }

    #[test]
    fn test_enum_minimum_clamping() {
        // A single sample can never establish a closed value set.
        let config = PredictorConfig::builder().enum_min_values(0).build();
        assert_eq!(config.enum_min_values, 2);
    }
}
