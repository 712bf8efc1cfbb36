use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ai::eval::EvalWeights;
use crate::error::ConfigError;

/// Named AI strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 4] = [
        DifficultyTier::Easy,
        DifficultyTier::Medium,
        DifficultyTier::Hard,
        DifficultyTier::Expert,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Hard => "hard",
            DifficultyTier::Expert => "expert",
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DifficultyTier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|tier| tier.name() == lowered)
            .ok_or_else(|| ConfigError::UnknownTier(s.to_string()))
    }
}

/// Search limits of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSettings {
    pub depth: u8,
    pub time_budget_ms: u64,
}

impl TierSettings {
    pub const fn new(depth: u8, time_budget_ms: u64) -> Self {
        Self {
            depth,
            time_budget_ms,
        }
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }
}

/// Tier to search-limit table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTable {
    pub easy: TierSettings,
    pub medium: TierSettings,
    pub hard: TierSettings,
    pub expert: TierSettings,
}

impl DifficultyTable {
    /// Parses and validates a JSON table such as
    /// `{"easy": {"depth": 2, "time_budget_ms": 1000}, ...}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let table: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    pub fn get(&self, tier: DifficultyTier) -> TierSettings {
        match tier {
            DifficultyTier::Easy => self.easy,
            DifficultyTier::Medium => self.medium,
            DifficultyTier::Hard => self.hard,
            DifficultyTier::Expert => self.expert,
        }
    }

    /// Every tier searches at least one ply with a non-zero budget, and no
    /// tier is weaker than the one below it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut previous: Option<(DifficultyTier, TierSettings)> = None;

        for tier in DifficultyTier::ALL {
            let settings = self.get(tier);
            if settings.depth == 0 {
                return Err(ConfigError::InvalidTier {
                    tier: tier.to_string(),
                    reason: "depth must be at least 1".to_string(),
                });
            }
            if settings.time_budget_ms == 0 {
                return Err(ConfigError::InvalidTier {
                    tier: tier.to_string(),
                    reason: "time budget must be positive".to_string(),
                });
            }
            if let Some((prev_tier, prev)) = previous
                && (settings.depth < prev.depth || settings.time_budget_ms < prev.time_budget_ms)
            {
                return Err(ConfigError::NonMonotonic {
                    tier: tier.to_string(),
                    previous: prev_tier.to_string(),
                });
            }
            previous = Some((tier, settings));
        }

        Ok(())
    }
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: TierSettings::new(2, 1_000),
            medium: TierSettings::new(4, 2_000),
            hard: TierSettings::new(6, 4_000),
            expert: TierSettings::new(8, 8_000),
        }
    }
}

/// Per-game settings handed to the controller and the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub difficulty: DifficultyTier,
    pub tiers: DifficultyTable,
    pub weights: EvalWeights,
}

impl SessionConfig {
    pub fn new(difficulty: DifficultyTier) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Parses a session from JSON; omitted fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.tiers.validate()?;
        Ok(config)
    }

    /// Limits of the configured tier.
    pub fn settings(&self) -> TierSettings {
        self.tiers.get(self.difficulty)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: DifficultyTier::Medium,
            tiers: DifficultyTable::default(),
            weights: EvalWeights::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_classic_depths_and_is_valid() {
        let table = DifficultyTable::default();

        let depths: Vec<u8> = DifficultyTier::ALL
            .iter()
            .map(|&tier| table.get(tier).depth)
            .collect();

        assert_eq!(depths, vec![2, 4, 6, 8]);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn tier_names_parse_case_insensitively() {
        assert_eq!("EXPERT".parse::<DifficultyTier>(), Ok(DifficultyTier::Expert));
        assert_eq!(" easy ".parse::<DifficultyTier>(), Ok(DifficultyTier::Easy));
        assert!(matches!(
            "nightmare".parse::<DifficultyTier>(),
            Err(ConfigError::UnknownTier(_))
        ));
    }

    #[test]
    fn from_json_loads_custom_table() {
        let json = r#"{
            "easy":   {"depth": 1, "time_budget_ms": 100},
            "medium": {"depth": 3, "time_budget_ms": 500},
            "hard":   {"depth": 5, "time_budget_ms": 900},
            "expert": {"depth": 9, "time_budget_ms": 3000}
        }"#;

        let table = DifficultyTable::from_json(json).expect("valid table");

        assert_eq!(table.get(DifficultyTier::Expert), TierSettings::new(9, 3000));
        assert_eq!(
            table.get(DifficultyTier::Medium).time_budget(),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn validation_rejects_zero_depth_and_weaker_higher_tier() {
        let mut table = DifficultyTable::default();
        table.easy.depth = 0;
        assert!(matches!(
            table.validate(),
            Err(ConfigError::InvalidTier { .. })
        ));

        let mut table = DifficultyTable::default();
        table.hard.time_budget_ms = 10;
        assert_eq!(
            table.validate(),
            Err(ConfigError::NonMonotonic {
                tier: "hard".to_string(),
                previous: "medium".to_string(),
            })
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            DifficultyTable::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn session_from_partial_json_fills_defaults() {
        let config = SessionConfig::from_json(r#"{"difficulty": "hard"}"#).expect("valid");

        assert_eq!(config.difficulty, DifficultyTier::Hard);
        assert_eq!(config.settings(), TierSettings::new(6, 4_000));
        assert_eq!(config.weights, EvalWeights::default());
    }
}
