//! Configuration loading for the Strategist.
//!
//! All strategist settings are loaded from a TOML configuration file. Every
//! section is optional; missing values fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Largest accepted `expansion.min_expansion_distance`. The scorer also
/// queries one step beyond it for the penalty ring.
pub const MAX_EXPANSION_DISTANCE: u32 = 50;

/// Complete Strategist configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrategistConfig {
    /// When expansion is evaluated
    #[serde(default)]
    pub cadence: CadenceConfig,
    /// Spacing and sponsor rules
    #[serde(default)]
    pub expansion: ExpansionConfig,
    /// Candidate score adjustments
    #[serde(default)]
    pub scoring: ScoringWeights,
    /// Owned-site caps
    #[serde(default)]
    pub capacity: CapacityConfig,
}

impl StrategistConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks values that would make the strategist misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cadence.check_frequency == 0 {
            return Err(ConfigError::Invalid(
                "cadence.check_frequency must be greater than zero".to_string(),
            ));
        }
        if self.cadence.trigger_phase >= self.cadence.check_frequency {
            return Err(ConfigError::Invalid(format!(
                "cadence.trigger_phase ({}) must be below cadence.check_frequency ({})",
                self.cadence.trigger_phase, self.cadence.check_frequency
            )));
        }
        if self.expansion.min_expansion_distance > MAX_EXPANSION_DISTANCE {
            return Err(ConfigError::Invalid(format!(
                "expansion.min_expansion_distance ({}) must be at most {}",
                self.expansion.min_expansion_distance, MAX_EXPANSION_DISTANCE
            )));
        }
        let weights = [
            ("unowned_mineral_bonus", self.scoring.unowned_mineral_bonus),
            ("catalyst_bonus", self.scoring.catalyst_bonus),
            ("too_close_penalty", self.scoring.too_close_penalty),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "scoring.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// How often expansion is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    /// Evaluate once every this many ticks
    pub check_frequency: u64,
    /// Offset within the period, keeps clear of work scheduled on tick 0
    pub trigger_phase: u64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            check_frequency: 1000,
            trigger_phase: 17,
        }
    }
}

impl CadenceConfig {
    /// Returns true if `tick` is an evaluation tick.
    pub fn is_due(&self, tick: u64) -> bool {
        tick % self.check_frequency == self.trigger_phase
    }
}

/// Spacing and sponsorship rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Sites this close to a colony can never be claimed
    pub min_expansion_distance: u32,
    /// Minimum colony tier to sponsor an expansion
    pub required_tier: u8,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            min_expansion_distance: 2,
            required_tier: 3,
        }
    }
}

/// Adjustments applied on top of a candidate's raw suitability score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Bonus for a mineral no colony owns yet
    pub unowned_mineral_bonus: f64,
    /// Extra bonus for the catalyst mineral
    pub catalyst_bonus: f64,
    /// Penalty for sitting one step outside the exclusion zone
    pub too_close_penalty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            unowned_mineral_bonus: 100.0,
            catalyst_bonus: 75.0,
            too_close_penalty: 100.0,
        }
    }
}

impl ScoringWeights {
    /// Largest amount the adjustments can add to a raw score.
    ///
    /// Negative weights flip direction (a negative penalty raises ring
    /// scores), so each weight contributes whichever sign can raise a score.
    pub fn max_possible_bonus(&self) -> f64 {
        self.unowned_mineral_bonus.max(0.0)
            + self.catalyst_bonus.max(0.0)
            + (-self.too_close_penalty).max(0.0)
    }
}

/// Limits on how many sites the network may own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    /// Platform with an additional hard cap
    pub capped_platform: String,
    /// Owned-site cap on that platform
    pub capped_platform_max_sites: usize,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            capped_platform: "shard3".to_string(),
            capped_platform_max_sites: 3,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing TOML config
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Error writing TOML config
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Values parsed but make no sense together
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Strategist Configuration

[cadence]
check_frequency = 1000
trigger_phase = 17

[expansion]
min_expansion_distance = 2
required_tier = 3

[scoring]
unowned_mineral_bonus = 100.0
catalyst_bonus = 75.0
too_close_penalty = 100.0

[capacity]
capped_platform = "shard3"
capped_platform_max_sites = 3
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = StrategistConfig::default();

        assert_eq!(config.cadence.check_frequency, 1000);
        assert_eq!(config.cadence.trigger_phase, 17);
        assert_eq!(config.expansion.min_expansion_distance, 2);
        assert_eq!(config.expansion.required_tier, 3);
        assert_eq!(config.scoring.max_possible_bonus(), 175.0);
        assert_eq!(config.capacity.capped_platform, "shard3");
        assert_eq!(config.capacity.capped_platform_max_sites, 3);
    }

    #[test]
    fn test_cadence_is_due() {
        let cadence = CadenceConfig::default();

        assert!(cadence.is_due(17));
        assert!(cadence.is_due(5017));
        assert!(!cadence.is_due(0));
        assert!(!cadence.is_due(1000));
        assert!(!cadence.is_due(18));
    }

    #[test]
    fn test_default_config_toml_parses() {
        let config = StrategistConfig::from_str(&default_config_toml()).unwrap();
        assert_eq!(config, StrategistConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [scoring]
            catalyst_bonus = 20.0

            [cadence]
            check_frequency = 50
            trigger_phase = 3
        "#;

        let config = StrategistConfig::from_str(toml).unwrap();

        assert_eq!(config.scoring.catalyst_bonus, 20.0);
        assert_eq!(config.scoring.unowned_mineral_bonus, 100.0);
        assert_eq!(config.cadence.check_frequency, 50);
        assert_eq!(config.expansion.required_tier, 3);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = StrategistConfig::from_str("").unwrap();
        assert_eq!(config, StrategistConfig::default());
    }

    #[test]
    fn test_rejects_zero_frequency() {
        let toml = r#"
            [cadence]
            check_frequency = 0
            trigger_phase = 0
        "#;
        assert!(matches!(
            StrategistConfig::from_str(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_expansion_distance() {
        let mut config = StrategistConfig::default();
        config.expansion.min_expansion_distance = 1 << 31;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.expansion.min_expansion_distance = MAX_EXPANSION_DISTANCE + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.expansion.min_expansion_distance = MAX_EXPANSION_DISTANCE;
        assert!(config.validate().is_ok());

        let toml = "[expansion]\nmin_expansion_distance = 100000\n";
        assert!(matches!(
            StrategistConfig::from_str(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_max_bonus_counts_negative_weights() {
        let weights = ScoringWeights {
            unowned_mineral_bonus: 0.0,
            catalyst_bonus: -30.0,
            too_close_penalty: -100.0,
        };
        assert_eq!(weights.max_possible_bonus(), 100.0);
    }

    #[test]
    fn test_rejects_phase_outside_period() {
        let toml = r#"
            [cadence]
            check_frequency = 10
            trigger_phase = 10
        "#;
        assert!(matches!(
            StrategistConfig::from_str(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_negative_weights() {
        let toml = r#"
            [scoring]
            too_close_penalty = -5.0
        "#;
        assert!(matches!(
            StrategistConfig::from_str(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            StrategistConfig::from_str("[cadence\ncheck_frequency = 1"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_config_to_toml() {
        let config = StrategistConfig::default();
        let toml = config.to_toml().unwrap();

        assert!(toml.contains("[cadence]"));
        assert!(toml.contains("[scoring]"));
        assert_eq!(StrategistConfig::from_str(&toml).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("strategist.toml");
        std::fs::write(&path, "[expansion]\nrequired_tier = 5\n").unwrap();

        let config = StrategistConfig::from_file(&path).unwrap();
        assert_eq!(config.expansion.required_tier, 5);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            StrategistConfig::from_file(&missing),
            Err(ConfigError::Io(_))
        ));
    }
}
