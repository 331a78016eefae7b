//! Rule constants and tunable parameters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed game config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid game config: {0}")]
    Invalid(&'static str),
}

/// Game configuration. Every field has a standard-rules default, so a partial
/// JSON document only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Victory points that end the game.
    pub victory_points_to_win: u32,
    /// Shortest road chain that can claim the longest-road card.
    pub longest_road_min: u32,
    /// Fewest knights played that can claim the largest-army card.
    pub largest_army_min: u32,
    /// Hand size a player may keep when a 7 is rolled.
    pub robber_hand_limit: u32,
    /// Victory points carried by each special card.
    pub special_card_points: u32,
}

impl GameConfig {
    pub const DEFAULT_VICTORY_POINTS_TO_WIN: u32 = 10;
    pub const DEFAULT_LONGEST_ROAD_MIN: u32 = 5;
    pub const DEFAULT_LARGEST_ARMY_MIN: u32 = 3;
    pub const DEFAULT_ROBBER_HAND_LIMIT: u32 = 7;
    pub const DEFAULT_SPECIAL_CARD_POINTS: u32 = 2;

    pub fn new() -> Self {
        Self {
            victory_points_to_win: Self::DEFAULT_VICTORY_POINTS_TO_WIN,
            longest_road_min: Self::DEFAULT_LONGEST_ROAD_MIN,
            largest_army_min: Self::DEFAULT_LARGEST_ARMY_MIN,
            robber_hand_limit: Self::DEFAULT_ROBBER_HAND_LIMIT,
            special_card_points: Self::DEFAULT_SPECIAL_CARD_POINTS,
        }
    }

    /// Parse a config from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.victory_points_to_win == 0 {
            return Err(ConfigError::Invalid("victory_points_to_win must be positive"));
        }
        if self.longest_road_min == 0 {
            return Err(ConfigError::Invalid("longest_road_min must be positive"));
        }
        if self.largest_army_min == 0 {
            return Err(ConfigError::Invalid("largest_army_min must be positive"));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_standard_rules() {
        let config = GameConfig::default();
        assert_eq!(config.victory_points_to_win, 10);
        assert_eq!(config.longest_road_min, 5);
        assert_eq!(config.largest_army_min, 3);
        assert_eq!(config.robber_hand_limit, 7);
        assert_eq!(config.special_card_points, 2);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "victory_points_to_win": 12 }"#).unwrap();
        assert_eq!(
            config,
            GameConfig {
                victory_points_to_win: 12,
                ..GameConfig::new()
            }
        );
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(GameConfig::from_json("{}").unwrap(), GameConfig::new());
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_zero_target_is_rejected() {
        assert!(matches!(
            GameConfig::from_json(r#"{ "victory_points_to_win": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }
}
