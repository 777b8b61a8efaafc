//! Application configuration file
//!
//! Every field is optional; anything missing keeps its default.
//!
//! ```json
//! {
//!   "game": { "gravity": 0.6, "rewards": { "food_reward": 5.0 } },
//!   "dqn": { "batch_size": 32 }
//! }
//! ```

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::game::GameConfig;
use crate::rl::DqnConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub dqn: DqnConfig,
}

impl AppConfig {
    /// Read and validate a JSON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: AppConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.game
            .validate()
            .map_err(|msg| anyhow!("Invalid game configuration: {msg}"))?;
        self.dqn
            .validate()
            .map_err(|msg| anyhow!("Invalid DQN configuration: {msg}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"game": {"gravity": 0.6}, "dqn": {"batch_size": 32}}"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();

        assert_eq!(config.game.gravity, 0.6);
        assert_eq!(config.game.screen_width, 800.0);
        assert_eq!(config.dqn.batch_size, 32);
        assert_eq!(config.dqn.gamma, 0.99);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"dqn": {"gamma": 2.0}}"#).unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid DQN configuration"));
    }

    #[test]
    fn test_load_rejects_negative_max_velocity() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"game": {"max_velocity": -1.0}}"#).unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid game configuration"));
        assert!(err.to_string().contains("max_velocity"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = AppConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_empty_object_is_default() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
